use glam::{IVec2, Vec2};
use palette::{LinSrgba, Srgba};
use std::{any::Any, sync::Arc};

use crate::IRect;

pub type Color = LinSrgba;

/// Builds a color from 8-bit sRGB components.
pub fn color_rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
    Srgba::new(r, g, b, a).into_linear()
}

/// Replaces the alpha component of `color`.
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    let mut color = color;
    color.alpha = alpha.clamp(0.0, 1.0);
    color
}

/// Something the renderer can put on screen. Engines implement this for
/// their texture handle and downcast in [`Renderer::draw_texture`].
pub trait Drawable: 'static {
    /// Native size in pixels.
    fn size(&self) -> IVec2;
    fn as_any(&self) -> &dyn Any;
}

/// Shared drawable resource. Dropping the last clone releases it.
pub type Image = Arc<dyn Drawable>;

pub trait Renderer {
    fn draw_texture(&mut self, image: &Image, rect: IRect, tint: Color);
    fn draw_text_with_shadow(&mut self, text: &str, font_index: usize, position: IVec2, color: Color);
}

pub trait TextMeasure {
    /// Rendered width and height of `text` in the given font.
    fn measure_text(&mut self, text: &str, font_index: usize) -> Vec2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_endpoints_map_exactly() {
        let white = color_rgba8(255, 255, 255, 255);
        assert!((white.color.red - 1.0).abs() < 1e-6);
        assert!((white.alpha - 1.0).abs() < 1e-6);
        let black = color_rgba8(0, 0, 0, 0);
        assert!(black.color.green.abs() < 1e-6);
        assert!(black.alpha.abs() < 1e-6);
    }

    #[test]
    fn with_alpha_clamps() {
        let color = with_alpha(LinSrgba::new(1.0, 0.0, 0.0, 0.2), 1.5);
        assert_eq!(color.alpha, 1.0);
        assert_eq!(color.color.red, 1.0);
    }
}
