//! Recording and fixed-metric collaborators for control tests.

use glam::{IVec2, Vec2};
use std::{any::Any, cell::Cell, collections::HashMap, rc::Rc, sync::Arc};

use crate::{
    error::LoadError, AssetSource, Audio, Color, Drawable, IRect, Image, Keyboard, Renderer,
    SoundEffect, SoundInstance, TextMeasure, UiContext, UiSettings,
};

pub struct FakeImage {
    pub name: &'static str,
    pub size: IVec2,
}

impl Drawable for FakeImage {
    fn size(&self) -> IVec2 {
        self.size
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn image(name: &'static str, width: i32, height: i32) -> Image {
    Arc::new(FakeImage {
        name,
        size: IVec2::new(width, height),
    })
}

/// Every character is `char_width` wide, every line `line_height` tall.
pub struct FixedFont {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for FixedFont {
    fn default() -> Self {
        FixedFont {
            char_width: 8.0,
            line_height: 16.0,
        }
    }
}

impl TextMeasure for FixedFont {
    fn measure_text(&mut self, text: &str, _font_index: usize) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }
        Vec2::new(text.chars().count() as f32 * self.char_width, self.line_height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Texture {
        name: &'static str,
        rect: IRect,
        tint: Color,
    },
    Text {
        text: String,
        position: IVec2,
        color: Color,
    },
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn textures(&self) -> Vec<(&'static str, f32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Texture { name, tint, .. } => Some((*name, tint.alpha)),
                _ => None,
            })
            .collect()
    }
    pub fn text_color(&self) -> Option<Color> {
        self.calls.iter().find_map(|call| match call {
            DrawCall::Text { color, .. } => Some(*color),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn draw_texture(&mut self, image: &Image, rect: IRect, tint: Color) {
        let name = image
            .as_any()
            .downcast_ref::<FakeImage>()
            .map(|image| image.name)
            .unwrap_or("?");
        self.calls.push(DrawCall::Texture { name, rect, tint });
    }
    fn draw_text_with_shadow(&mut self, text: &str, _font_index: usize, position: IVec2, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_owned(),
            position,
            color,
        });
    }
}

#[derive(Default, Clone)]
pub struct AudioCounters {
    pub instances: Rc<Cell<u32>>,
    pub instance_plays: Rc<Cell<u32>>,
    pub pooled_plays: Rc<Cell<u32>>,
}

struct CountingInstance {
    sound: SoundEffect,
    plays: Rc<Cell<u32>>,
}

impl SoundInstance for CountingInstance {
    fn sound(&self) -> &SoundEffect {
        &self.sound
    }
    fn play(&mut self) {
        self.plays.set(self.plays.get() + 1);
    }
}

#[derive(Default)]
pub struct CountingAudio {
    pub counters: AudioCounters,
}

impl Audio for CountingAudio {
    fn create_instance(&mut self, sound: &SoundEffect) -> Box<dyn SoundInstance> {
        let instances = &self.counters.instances;
        instances.set(instances.get() + 1);
        Box::new(CountingInstance {
            sound: sound.clone(),
            plays: self.counters.instance_plays.clone(),
        })
    }
    fn play_pooled(&mut self, _instance: &dyn SoundInstance) {
        let plays = &self.counters.pooled_plays;
        plays.set(plays.get() + 1);
    }
}

/// Serves images from a fixed size table and any sound except `missing.wav`.
#[derive(Default)]
pub struct FakeAssets {
    pub images: HashMap<String, IVec2>,
}

impl FakeAssets {
    pub fn with_image(mut self, path: &str, width: i32, height: i32) -> Self {
        self.images.insert(path.to_owned(), IVec2::new(width, height));
        self
    }
}

impl AssetSource for FakeAssets {
    fn load_image(&mut self, path: &str) -> Result<Image, LoadError> {
        match self.images.get(path) {
            Some(size) => Ok(image("loaded", size.x, size.y)),
            None => Err(format!("{path} not found").into()),
        }
    }
    fn load_sound(&mut self, path: &str) -> Result<SoundEffect, LoadError> {
        if path == "missing.wav" {
            return Err(format!("{path} not found").into());
        }
        Ok(SoundEffect::new(path, Vec::new()))
    }
}

#[derive(Default)]
pub struct Services {
    pub audio: CountingAudio,
    pub fonts: FixedFont,
    pub keyboard: Keyboard,
    pub settings: UiSettings,
}

impl Services {
    pub fn context(&mut self) -> UiContext<'_> {
        UiContext::new(&mut self.audio, &mut self.fonts, &self.keyboard, &self.settings)
    }
}
