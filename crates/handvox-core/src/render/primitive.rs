//! Screen-space output of the render pipeline

use super::color::Color;
use crate::world::Opacity;

/// Pixel position (y grows downward) with the vertex's view-space distance
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Closed, filled polygon
    Polygon,
    /// Segment between exactly two points
    Line,
}

/// A polygon or line ready to be drawn
///
/// Primitives must be drawn in the order they are emitted for translucent
/// faces to blend correctly.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawablePrimitive {
    pub kind: PrimitiveKind,
    pub points: Vec<ScreenPoint>,
    /// Representative distance from the camera: the mean of the vertex
    /// depths. Larger is farther.
    pub depth: f32,
    pub color: Color,
    pub opacity: Opacity,
}

impl DrawablePrimitive {
    pub fn polygon(points: Vec<ScreenPoint>, color: Color, opacity: Opacity) -> Self {
        Self {
            kind: PrimitiveKind::Polygon,
            depth: mean_depth(&points),
            points,
            color,
            opacity,
        }
    }

    pub fn line(a: ScreenPoint, b: ScreenPoint, color: Color) -> Self {
        Self {
            kind: PrimitiveKind::Line,
            depth: (a.depth + b.depth) * 0.5,
            points: vec![a, b],
            color,
            opacity: Opacity::Wireframe,
        }
    }

    /// Only opaque primitives take part in depth testing
    pub fn is_depth_tested(&self) -> bool {
        self.opacity == Opacity::Opaque
    }
}

fn mean_depth(points: &[ScreenPoint]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.depth).sum::<f32>() / points.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_depth_is_mean() {
        let quad = DrawablePrimitive::polygon(
            vec![
                ScreenPoint::new(0.0, 0.0, 2.0),
                ScreenPoint::new(1.0, 0.0, 4.0),
                ScreenPoint::new(1.0, 1.0, 4.0),
                ScreenPoint::new(0.0, 1.0, 2.0),
            ],
            Color::RED,
            Opacity::Translucent,
        );
        assert_eq!(quad.depth, 3.0);
        assert!(!quad.is_depth_tested());
    }

    #[test]
    fn test_line_is_wireframe() {
        let line = DrawablePrimitive::line(
            ScreenPoint::new(0.0, 0.0, 1.0),
            ScreenPoint::new(5.0, 5.0, 3.0),
            Color::WHITE,
        );
        assert_eq!(line.kind, PrimitiveKind::Line);
        assert_eq!(line.opacity, Opacity::Wireframe);
        assert_eq!(line.depth, 2.0);
    }
}
