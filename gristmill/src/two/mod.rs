mod quad;

use glam::Vec2;
use silica::IRect;

pub use quad::*;

/// Floating point screen rectangle used by the quad renderer.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }
    pub fn y(&self) -> f32 {
        self.position.y
    }
    pub fn width(&self) -> f32 {
        self.size.x
    }
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn is_offscreen(&self, screen_size: Vec2) -> bool {
        self.x() + self.width() < 0.
            || self.y() + self.height() < 0.
            || self.x() >= screen_size.x
            || self.y() >= screen_size.y
    }
}

impl From<IRect> for Rect {
    fn from(rect: IRect) -> Self {
        Rect {
            position: rect.position.as_vec2(),
            size: rect.size.as_vec2(),
        }
    }
}
impl From<glyph_brush::ab_glyph::Rect> for Rect {
    fn from(rect: glyph_brush::ab_glyph::Rect) -> Self {
        Rect {
            position: Vec2::new(rect.min.x, rect.min.y),
            size: Vec2::new(rect.width(), rect.height()),
        }
    }
}
impl From<Rect> for [f32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.position.x, rect.position.y, rect.size.x, rect.size.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offscreen_rects() {
        let screen = Vec2::new(800., 600.);
        assert!(!Rect::new(10., 10., 5., 5.).is_offscreen(screen));
        assert!(Rect::new(-20., 10., 5., 5.).is_offscreen(screen));
        assert!(Rect::new(800., 10., 5., 5.).is_offscreen(screen));
        assert!(!Rect::from(IRect::new(-2, -2, 5, 5)).is_offscreen(screen));
    }
}
