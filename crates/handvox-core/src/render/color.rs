//! RGBA color type and blending

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color. Alpha 255 is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque_alpha")]
    pub a: u8,
}

fn opaque_alpha() -> u8 {
    255
}

impl Color {
    pub const BLACK: Self = Color::rgb(0, 0, 0);
    pub const WHITE: Self = Color::rgb(255, 255, 255);
    pub const GREY: Self = Color::rgb(128, 128, 128);
    pub const RED: Self = Color::rgb(255, 0, 0);
    pub const GREEN: Self = Color::rgb(0, 255, 0);
    pub const BLUE: Self = Color::rgb(0, 0, 255);
    pub const YELLOW: Self = Color::rgb(255, 255, 0);
    pub const MAGENTA: Self = Color::rgb(255, 0, 255);
    pub const CYAN: Self = Color::rgb(0, 255, 255);
    pub const ORANGE: Self = Color::rgb(255, 128, 0);
    pub const PURPLE: Self = Color::rgb(128, 0, 255);
    /// Dark blue-black backdrop
    pub const BACKDROP: Self = Color::rgb(5, 7, 12);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Composite `self` over `dst` using `self.a` (source-over). Result is opaque.
    pub fn blend_over(&self, dst: &Color) -> Color {
        let alpha = self.a as f32 / 255.0;
        let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
        Color::rgb(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b))
    }

    /// Scale RGB by `factor` (clamped to [0, 1]); alpha is kept
    pub fn shade(&self, factor: f32) -> Color {
        let f = factor.clamp(0.0, 1.0);
        let s = |c: u8| (c as f32 * f).round() as u8;
        Color::rgba(s(self.r), s(self.g), s(self.b), self.a)
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Drawing palette: red, green, blue, yellow, magenta, cyan, orange, purple
pub const DEFAULT_PALETTE: [Color; 8] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::YELLOW,
    Color::MAGENTA,
    Color::CYAN,
    Color::ORANGE,
    Color::PURPLE,
];
