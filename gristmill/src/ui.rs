//! Glue between the engine's asset folders and `silica` controls.

use serde::{Deserialize, Serialize};
use silica::{
    color_rgba8, error::LoadError, AssetSource, CheckboxVisuals, Color, ControlDefinitions, Image,
    SoundEffect, UiSettings,
};

use crate::{
    asset::{self, AssetError},
    RenderingContext,
};

/// Process-wide UI defaults, stored in `config/ui.yaml`. Colors are 8-bit
/// sRGBA, textures are paths under `textures/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub button_color: [u8; 4],
    pub button_hover_color: [u8; 4],
    pub text_color: [u8; 4],
    pub alt_color: [u8; 4],
    pub disabled_color: [u8; 4],
    pub default_alpha_rate: f32,
    pub checkbox_alpha_rate: f64,
    pub checkbox_checked_texture: Option<String>,
    pub checkbox_clear_texture: Option<String>,
    pub checkbox_disabled_checked_texture: Option<String>,
    pub checkbox_disabled_clear_texture: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            button_color: [196, 196, 196, 255],
            button_hover_color: [255, 255, 255, 255],
            text_color: [196, 196, 196, 255],
            alt_color: [255, 255, 255, 255],
            disabled_color: [128, 128, 128, 255],
            default_alpha_rate: 0.01,
            checkbox_alpha_rate: 0.05,
            checkbox_checked_texture: None,
            checkbox_clear_texture: None,
            checkbox_disabled_checked_texture: None,
            checkbox_disabled_clear_texture: None,
        }
    }
}

fn color([r, g, b, a]: [u8; 4]) -> Color {
    color_rgba8(r, g, b, a)
}

fn load_default_image(assets: &mut dyn AssetSource, path: &Option<String>) -> Option<Image> {
    let path = path.as_deref()?;
    match assets.load_image(path) {
        Ok(image) => Some(image),
        Err(error) => {
            log::warn!("could not load default checkbox texture {path}: {error}");
            None
        }
    }
}

impl UiConfig {
    const FILENAME: &'static str = "ui.yaml";

    pub fn create_default_config_if_missing() -> asset::Result<()> {
        let path = asset::get_path("config", Self::FILENAME);
        if path.exists() {
            return Ok(());
        }
        log::info!("creating default file {}", path.display());
        asset::save_yaml_file("config", Self::FILENAME, &UiConfig::default())
    }
    pub fn load_config() -> asset::Result<Self> {
        asset::load_yaml_file_or_default("config", Self::FILENAME)
    }

    /// Resolves colors and loads the default checkbox textures. Textures that
    /// fail to load are left unset.
    pub fn to_settings(&self, assets: &mut dyn AssetSource) -> UiSettings {
        UiSettings {
            button_color: color(self.button_color),
            button_hover_color: color(self.button_hover_color),
            text_color: color(self.text_color),
            alt_color: color(self.alt_color),
            disabled_color: color(self.disabled_color),
            default_alpha_rate: self.default_alpha_rate,
            checkbox_alpha_rate: self.checkbox_alpha_rate,
            checkbox: CheckboxVisuals {
                checked: load_default_image(assets, &self.checkbox_checked_texture),
                clear: load_default_image(assets, &self.checkbox_clear_texture),
                disabled_checked: load_default_image(assets, &self.checkbox_disabled_checked_texture),
                disabled_clear: load_default_image(assets, &self.checkbox_disabled_clear_texture),
            },
        }
    }
}

/// Loads control resources from `textures/` and `sounds/`.
pub struct ContextAssets<'a> {
    context: &'a mut RenderingContext,
}

impl<'a> ContextAssets<'a> {
    pub fn new(context: &'a mut RenderingContext) -> Self {
        ContextAssets { context }
    }
}

impl AssetSource for ContextAssets<'_> {
    fn load_image(&mut self, path: &str) -> Result<Image, LoadError> {
        let texture = asset::load_png_file(self.context, "textures", path)?;
        Ok(texture.into_image())
    }
    fn load_sound(&mut self, path: &str) -> Result<SoundEffect, LoadError> {
        Ok(asset::load_sound_file("sounds", path)?)
    }
}

/// Loads control definitions from `ui/<file>`.
pub fn load_definitions(file: &str) -> asset::Result<ControlDefinitions> {
    let text = asset::load_text_file("ui", file)?;
    ControlDefinitions::from_yaml(&text)
        .map_err(|error| AssetError::new_format(asset::get_path("ui", file), error.to_string()))
}
