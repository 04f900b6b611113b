use crate::{color_rgba8, Color, Image};

/// Default checkbox visuals used when a checkbox does not configure its own.
#[derive(Clone, Default)]
pub struct CheckboxVisuals {
    pub checked: Option<Image>,
    pub clear: Option<Image>,
    pub disabled_checked: Option<Image>,
    pub disabled_clear: Option<Image>,
}

/// Process-wide UI defaults applied when controls are constructed.
#[derive(Clone)]
pub struct UiSettings {
    pub button_color: Color,
    pub button_hover_color: Color,
    pub text_color: Color,
    pub alt_color: Color,
    pub disabled_color: Color,
    pub default_alpha_rate: f32,
    /// Checkboxes animate at twice this rate.
    pub checkbox_alpha_rate: f64,
    pub checkbox: CheckboxVisuals,
}

impl Default for UiSettings {
    fn default() -> Self {
        UiSettings {
            button_color: color_rgba8(196, 196, 196, 255),
            button_hover_color: color_rgba8(255, 255, 255, 255),
            text_color: color_rgba8(196, 196, 196, 255),
            alt_color: color_rgba8(255, 255, 255, 255),
            disabled_color: color_rgba8(128, 128, 128, 255),
            default_alpha_rate: 0.01,
            checkbox_alpha_rate: 0.05,
            checkbox: CheckboxVisuals::default(),
        }
    }
}
