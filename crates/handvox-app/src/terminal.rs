//! Terminal surface
//!
//! Each character cell shows two canvas pixels with the upper half block
//! glyph: the foreground paints the top pixel, the background the bottom
//! one. The last rows hold the HUD. Only cells that changed since the
//! previous frame are written.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Print, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use handvox_core::{Canvas, Color};
use unicode_width::UnicodeWidthChar;

const HALF_BLOCK: char = '▀';

/// Rows at the bottom of the terminal reserved for text
pub const HUD_ROWS: u16 = 2;

const HUD_FG: Color = Color::rgb(200, 220, 255);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    top: Color,
    bottom: Color,
}

/// Double-buffered half-block renderer
pub struct TerminalSurface {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    prev_cells: Vec<Cell>,
    hud: Vec<String>,
    prev_hud: Vec<String>,
    background: Color,
    full_redraw: bool,
}

impl TerminalSurface {
    pub fn new(width: u16, height: u16, background: Color) -> Self {
        let blank = Cell {
            top: background,
            bottom: background,
        };
        let size = width as usize * Self::scene_rows(height) as usize;
        Self {
            width,
            height,
            cells: vec![blank; size],
            prev_cells: vec![blank; size],
            hud: vec![String::new(); HUD_ROWS as usize],
            prev_hud: vec![String::new(); HUD_ROWS as usize],
            background,
            full_redraw: true,
        }
    }

    /// Sized to the current terminal
    pub fn from_terminal(background: Color) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::new(width, height, background))
    }

    fn scene_rows(height: u16) -> u16 {
        height.saturating_sub(HUD_ROWS)
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Canvas pixels the scene area can show
    pub fn canvas_size(&self) -> (usize, usize) {
        (
            self.width as usize,
            Self::scene_rows(self.height) as usize * 2,
        )
    }

    /// Returns true when the size changed. The next flush repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        *self = Self::new(width, height, self.background);
        true
    }

    /// Copy a canvas and the HUD lines into the back buffer
    ///
    /// Pixels outside the canvas show the background.
    pub fn compose(&mut self, canvas: &Canvas, hud: &[String]) {
        let pixel = |x: usize, y: usize| canvas.pixel(x, y).unwrap_or(self.background);
        let width = self.width as usize;
        for row in 0..Self::scene_rows(self.height) as usize {
            for col in 0..width {
                self.cells[row * width + col] = Cell {
                    top: pixel(col, row * 2),
                    bottom: pixel(col, row * 2 + 1),
                };
            }
        }
        for (i, line) in self.hud.iter_mut().enumerate() {
            *line = hud
                .get(i)
                .map(|text| fit_to_width(text, width))
                .unwrap_or_else(|| " ".repeat(width));
        }
    }

    /// Write changed cells and HUD lines to `out`; returns the number of
    /// scene cells written.
    pub fn flush_to<W: Write>(&mut self, out: &mut W) -> io::Result<usize> {
        queue!(out, cursor::Hide)?;

        let width = self.width as usize;
        let mut written = 0;
        for (idx, cell) in self.cells.iter().enumerate() {
            if !self.full_redraw && *cell == self.prev_cells[idx] {
                continue;
            }
            let (x, y) = ((idx % width) as u16, (idx / width) as u16);
            queue!(
                out,
                cursor::MoveTo(x, y),
                SetForegroundColor(to_crossterm(cell.top)),
                SetBackgroundColor(to_crossterm(cell.bottom)),
                Print(HALF_BLOCK)
            )?;
            written += 1;
        }

        let hud_top = Self::scene_rows(self.height);
        for (i, line) in self.hud.iter().enumerate() {
            if !self.full_redraw && *line == self.prev_hud[i] {
                continue;
            }
            let y = hud_top + i as u16;
            if y >= self.height {
                break;
            }
            queue!(
                out,
                cursor::MoveTo(0, y),
                SetForegroundColor(to_crossterm(HUD_FG)),
                SetBackgroundColor(to_crossterm(self.background)),
                Print(line)
            )?;
        }

        queue!(out, style::ResetColor)?;
        out.flush()?;

        self.prev_cells.copy_from_slice(&self.cells);
        self.prev_hud.clone_from(&self.hud);
        self.full_redraw = false;
        Ok(written)
    }

    pub fn flush(&mut self) -> io::Result<usize> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(&mut lock)
    }
}

fn to_crossterm(color: Color) -> style::Color {
    let (r, g, b) = color.to_rgb();
    style::Color::Rgb { r, g, b }
}

/// Truncate or pad `text` to exactly `width` display columns
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}
