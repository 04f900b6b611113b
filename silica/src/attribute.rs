//! Declarative configuration of controls.
//!
//! Each control type owns a table mapping attribute keys to typed setters.
//! Keys a table does not know are forwarded to the base control's table.

use glam::IVec2;

use crate::{
    error::{AssetKind, AttributeError, LoadError},
    color_rgba8, Color, Image, SoundEffect, TextMeasure,
};

/// Resource loading used by attribute setters.
pub trait AssetSource {
    fn load_image(&mut self, path: &str) -> Result<Image, LoadError>;
    fn load_sound(&mut self, path: &str) -> Result<SoundEffect, LoadError>;
}

/// Services available while attributes are applied.
pub struct AttributeContext<'a> {
    pub assets: &'a mut dyn AssetSource,
    pub fonts: &'a mut dyn TextMeasure,
}

impl<'a> AttributeContext<'a> {
    pub fn new(assets: &'a mut dyn AssetSource, fonts: &'a mut dyn TextMeasure) -> Self {
        AttributeContext { assets, fonts }
    }

    pub fn load_image(&mut self, path: &str) -> Result<Image, AttributeError> {
        self.assets
            .load_image(path)
            .map_err(|source| AttributeError::Asset {
                kind: AssetKind::Image,
                path: path.to_owned(),
                source,
            })
    }
    pub fn load_sound(&mut self, path: &str) -> Result<SoundEffect, AttributeError> {
        self.assets
            .load_sound(path)
            .map_err(|source| AttributeError::Asset {
                kind: AssetKind::Sound,
                path: path.to_owned(),
                source,
            })
    }
}

pub type Setter<C> = fn(&mut C, &str, &mut AttributeContext<'_>) -> Result<(), AttributeError>;

pub struct Attribute<C> {
    pub key: &'static str,
    pub apply: Setter<C>,
}

/// Runs the setter registered for `key`. Returns `None` when the table has
/// no entry for it, so the caller can fall back to the next table.
pub fn dispatch<C>(
    table: &[Attribute<C>],
    control: &mut C,
    key: &str,
    value: &str,
    ctx: &mut AttributeContext<'_>,
) -> Option<Result<(), AttributeError>> {
    table
        .iter()
        .find(|attribute| attribute.key == key)
        .map(|attribute| (attribute.apply)(control, value, ctx))
}

pub fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => true,
        "false" | "no" | "n" | "off" | "0" => false,
        other => {
            log::warn!("invalid boolean \"{other}\", using {default}");
            default
        }
    }
}

pub fn parse_i32(value: &str, default: i32) -> i32 {
    value.trim().parse().unwrap_or_else(|_| {
        log::warn!("invalid integer \"{value}\", using {default}");
        default
    })
}

pub fn parse_f32(value: &str, default: f32) -> f32 {
    match value.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            log::warn!("invalid number \"{value}\", using {default}");
            default
        }
    }
}

pub fn parse_f64(value: &str, default: f64) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            log::warn!("invalid number \"{value}\", using {default}");
            default
        }
    }
}

/// Parses `"r,g,b"` or `"r,g,b,a"` with 8-bit sRGB components.
pub fn parse_color(value: &str) -> Option<Color> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match parts[..] {
        [r, g, b] => Some(color_rgba8(r, g, b, 255)),
        [r, g, b, a] => Some(color_rgba8(r, g, b, a)),
        _ => None,
    }
}

/// Parses `"x,y"`.
pub fn parse_pair(value: &str) -> Option<IVec2> {
    let (x, y) = value.split_once(',')?;
    Some(IVec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Parses a font index, rejecting negative values.
pub fn parse_font_index(value: &str) -> usize {
    usize::try_from(parse_i32(value, 0)).unwrap_or_else(|_| {
        log::warn!("negative font index \"{value}\", using 0");
        0
    })
}
