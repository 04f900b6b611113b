use glam::IVec2;
use grist::{impl_add_event_listener, Event};
use std::time::Duration;

use crate::{
    attribute::{self, parse_bool, parse_color, parse_f64, parse_font_index, parse_i32, Attribute},
    control::{Control, ControlBase, UiContext},
    error::{AttributeError, ControlError},
    color_rgba8, with_alpha, AttributeContext, Color, Drawable, IRect, Image, Renderer, SoundEffect,
    SoundInstance, TextMeasure, UiSettings,
};

pub const DEFAULT_TEXT_PADDING: i32 = 5;

/// A labelled check box whose indicator fades between its clear and checked
/// visuals.
pub struct Checkbox {
    base: ControlBase,
    checked: bool,
    checked_intensity: f64,
    checked_texture: Option<Image>,
    clear_texture: Option<Image>,
    disabled_checked_texture: Option<Image>,
    disabled_clear_texture: Option<Image>,
    check_sound: Option<SoundEffect>,
    check_sound_instance: Option<Box<dyn SoundInstance>>,
    allow_checking: bool,
    text_padding: i32,
    text_offset: IVec2,
    highlight_color: Color,
    text_color: Color,
    disabled_text_color: Color,
    alpha_rate: f64,
    checked_changed: Event<bool>,
}

impl Checkbox {
    pub fn new(name: &str, settings: &UiSettings) -> Self {
        let mut base = ControlBase::new(name);
        base.set_remap_color(settings.text_color);
        Checkbox {
            base,
            checked: false,
            checked_intensity: 0.0,
            checked_texture: None,
            clear_texture: None,
            disabled_checked_texture: None,
            disabled_clear_texture: None,
            check_sound: None,
            check_sound_instance: None,
            allow_checking: true,
            text_padding: DEFAULT_TEXT_PADDING,
            text_offset: IVec2::ZERO,
            highlight_color: settings.alt_color,
            text_color: settings.text_color,
            disabled_text_color: settings.disabled_color,
            alpha_rate: settings.checkbox_alpha_rate * 2.0,
            checked_changed: Event::new(),
        }
    }

    pub fn checked(&self) -> bool {
        self.checked
    }
    /// Listeners run after the state changes and only when it does.
    pub fn set_checked(&mut self, checked: bool) {
        if self.checked == checked {
            return;
        }
        self.checked = checked;
        self.checked_changed.emit(&checked);
    }
    pub fn checked_intensity(&self) -> f64 {
        self.checked_intensity
    }

    pub fn allow_checking(&self) -> bool {
        self.allow_checking
    }
    pub fn set_allow_checking(&mut self, allow_checking: bool) {
        self.allow_checking = allow_checking;
    }

    pub fn text(&self) -> &str {
        self.base.text()
    }
    pub fn set_text(&mut self, text: impl Into<String>, fonts: &mut dyn TextMeasure) {
        self.base.set_text_raw(text.into());
        self.layout(fonts);
    }
    pub fn set_font_index(&mut self, font_index: usize, fonts: &mut dyn TextMeasure) {
        self.base.set_font_index(font_index);
        self.layout(fonts);
    }
    pub fn text_offset(&self) -> IVec2 {
        self.text_offset
    }
    pub fn text_padding(&self) -> i32 {
        self.text_padding
    }
    pub fn set_text_padding(&mut self, padding: i32, fonts: &mut dyn TextMeasure) {
        self.text_padding = padding;
        self.layout(fonts);
    }

    pub fn highlight_color(&self) -> Color {
        self.highlight_color
    }
    pub fn set_highlight_color(&mut self, color: Color) {
        self.highlight_color = color;
    }
    /// Color the label is drawn with while checking is allowed.
    pub fn text_color(&self) -> Color {
        self.text_color
    }

    pub fn alpha_rate(&self) -> f64 {
        self.alpha_rate
    }
    pub fn set_alpha_rate(&mut self, alpha_rate: f64) {
        self.alpha_rate = alpha_rate;
    }

    pub fn checked_texture(&self) -> Option<&Image> {
        self.checked_texture.as_ref()
    }
    /// The checked visual defines the indicator's footprint, so this also
    /// re-lays out the label.
    pub fn set_checked_texture(&mut self, texture: Image, fonts: &mut dyn TextMeasure) {
        self.checked_texture = Some(texture);
        self.layout(fonts);
    }
    pub fn set_clear_texture(&mut self, texture: Option<Image>) {
        self.clear_texture = texture;
    }
    pub fn set_disabled_checked_texture(&mut self, texture: Option<Image>) {
        self.disabled_checked_texture = texture;
    }
    pub fn set_disabled_clear_texture(&mut self, texture: Option<Image>) {
        self.disabled_clear_texture = texture;
    }

    /// Takes effect on the next `initialize`.
    pub fn set_check_sound(&mut self, sound: Option<SoundEffect>) {
        self.check_sound = sound;
    }

    /// Places the label right of the indicator and sizes the bounds to fit
    /// both. Does nothing until a checked visual is known.
    fn layout(&mut self, fonts: &mut dyn TextMeasure) {
        let Some(glyph) = self.checked_texture.as_ref().map(|texture| texture.size()) else {
            return;
        };
        self.text_offset.x = glyph.x + self.text_padding;

        if self.base.text().is_empty() {
            self.text_offset.y = 0;
            self.base.set_size(glyph);
            return;
        }
        let text = fonts.measure_text(self.base.text(), self.base.font_index());
        let text = IVec2::new(text.x as i32, text.y as i32);
        self.text_offset.y = (glyph.y - text.y) / 2 - 1;
        self.base.set_size(IVec2::new(
            text.x + self.text_padding + glyph.x,
            text.y.max(glyph.y),
        ));
    }

    fn apply_font_index(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.set_font_index(parse_font_index(value), ctx.fonts);
        Ok(())
    }
    fn apply_highlight_color(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        match parse_color(value) {
            Some(color) => self.highlight_color = color,
            None => log::warn!("{}: invalid HighlightColor \"{value}\"", self.base.name()),
        }
        Ok(())
    }
    fn apply_alpha_rate(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.alpha_rate = parse_f64(value, self.alpha_rate);
        Ok(())
    }
    fn apply_allow_checking(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.allow_checking = parse_bool(value, true);
        Ok(())
    }
    fn apply_checked(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.set_checked(parse_bool(value, true));
        Ok(())
    }
    fn apply_text_padding(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        let padding = parse_i32(value, self.text_padding);
        self.set_text_padding(padding, ctx.fonts);
        Ok(())
    }
    fn apply_check_sound(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.check_sound = Some(ctx.load_sound(value)?);
        Ok(())
    }
    fn apply_checked_texture(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        let texture = ctx.load_image(value)?;
        self.set_checked_texture(texture, ctx.fonts);
        Ok(())
    }
    fn apply_clear_texture(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.clear_texture = Some(ctx.load_image(value)?);
        Ok(())
    }
    fn apply_disabled_checked_texture(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.disabled_checked_texture = Some(ctx.load_image(value)?);
        Ok(())
    }
    fn apply_disabled_clear_texture(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.disabled_clear_texture = Some(ctx.load_image(value)?);
        Ok(())
    }
    fn apply_text(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.set_text(value, ctx.fonts);
        Ok(())
    }
}

const CHECKBOX_ATTRIBUTES: &[Attribute<Checkbox>] = &[
    Attribute { key: "FontIndex", apply: Checkbox::apply_font_index },
    Attribute { key: "HighlightColor", apply: Checkbox::apply_highlight_color },
    Attribute { key: "AlphaRate", apply: Checkbox::apply_alpha_rate },
    Attribute { key: "AllowChecking", apply: Checkbox::apply_allow_checking },
    Attribute { key: "Checked", apply: Checkbox::apply_checked },
    Attribute { key: "TextPadding", apply: Checkbox::apply_text_padding },
    Attribute { key: "CheckSoundEffect", apply: Checkbox::apply_check_sound },
    Attribute { key: "CheckedTexture", apply: Checkbox::apply_checked_texture },
    Attribute { key: "ClearTexture", apply: Checkbox::apply_clear_texture },
    Attribute { key: "DisabledCheckedTexture", apply: Checkbox::apply_disabled_checked_texture },
    Attribute { key: "DisabledClearTexture", apply: Checkbox::apply_disabled_clear_texture },
    Attribute { key: "Text", apply: Checkbox::apply_text },
];

impl_add_event_listener!(Checkbox, checked_changed, bool, add_checked_changed_listener);

fn or_default(texture: &mut Option<Image>, default: &Option<Image>) {
    if texture.is_none() {
        *texture = default.clone();
    }
}

impl Control for Checkbox {
    fn base(&self) -> &ControlBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn initialize(&mut self, ctx: &mut UiContext) -> Result<(), ControlError> {
        let defaults = &ctx.settings.checkbox;
        or_default(&mut self.checked_texture, &defaults.checked);
        or_default(&mut self.clear_texture, &defaults.clear);
        or_default(&mut self.disabled_checked_texture, &defaults.disabled_checked);
        or_default(&mut self.disabled_clear_texture, &defaults.disabled_clear);
        if self.checked_texture.is_none() {
            return Err(ControlError::MissingCheckedVisual {
                control: self.base.name().to_owned(),
            });
        }

        self.layout(ctx.fonts);
        self.text_color = self.base.remap_color();
        self.checked_intensity = if self.checked { 1.0 } else { 0.0 };

        if self.check_sound_instance.is_none() {
            self.check_sound_instance = self
                .check_sound
                .as_ref()
                .map(|sound| ctx.audio.create_instance(sound));
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &mut UiContext, elapsed: Duration) {
        let delta = self.alpha_rate * (elapsed.as_secs_f64() * 1000.0 / 10.0);
        self.checked_intensity = if self.checked {
            (self.checked_intensity + delta).min(1.0)
        } else {
            (self.checked_intensity - delta).max(0.0)
        };
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let (clear, checked) = if self.allow_checking {
            (&self.clear_texture, &self.checked_texture)
        } else {
            (&self.disabled_clear_texture, &self.disabled_checked_texture)
        };
        let bounds = self.base.bounds();
        let alpha = self.base.alpha();

        let mut glyph_y = bounds.y();
        let mut text_y = bounds.y() + self.text_offset.y;
        if self.text_offset.y < 0 {
            glyph_y -= self.text_offset.y;
            text_y = bounds.y();
        }

        if !self.base.text().is_empty() {
            let color = if self.allow_checking {
                self.text_color
            } else {
                self.disabled_text_color
            };
            renderer.draw_text_with_shadow(
                self.base.text(),
                self.base.font_index(),
                IVec2::new(bounds.x() + self.text_offset.x, text_y),
                with_alpha(color, color.alpha * alpha),
            );
        }

        // Both visuals are drawn at the clear visual's size.
        let Some(size) = clear.as_ref().or(checked.as_ref()).map(|texture| texture.size()) else {
            return;
        };
        let rect = IRect::new(bounds.x(), glyph_y, size.x, size.y);
        // The indicator ignores the control's alpha.
        let white = color_rgba8(255, 255, 255, 255);

        if self.checked_intensity == 0.0 {
            if let Some(clear) = clear {
                renderer.draw_texture(clear, rect, white);
            }
        } else if self.checked_intensity == 1.0 {
            if let Some(checked) = checked {
                renderer.draw_texture(checked, rect, white);
            }
        } else {
            if let Some(clear) = clear {
                renderer.draw_texture(clear, rect, white);
            }
            if let Some(checked) = checked {
                renderer.draw_texture(checked, rect, with_alpha(white, self.checked_intensity as f32));
            }
        }
    }

    fn on_pointer_enter(&mut self, _ctx: &mut UiContext) {
        self.text_color = self.highlight_color;
    }

    fn on_pointer_leave(&mut self, _ctx: &mut UiContext) {
        self.text_color = self.base.remap_color();
    }

    fn on_left_click(&mut self, ctx: &mut UiContext) {
        if self.allow_checking {
            self.set_checked(!self.checked);
            if let Some(instance) = self.check_sound_instance.as_deref() {
                ctx.audio.play_pooled(instance);
            }
        }
        self.base.on_left_click();
    }

    fn apply_attribute(
        &mut self,
        key: &str,
        value: &str,
        ctx: &mut AttributeContext<'_>,
    ) -> Result<(), AttributeError> {
        match attribute::dispatch(CHECKBOX_ATTRIBUTES, self, key, value, ctx) {
            Some(result) => result,
            None => self.base.apply_attribute(key, value, ctx),
        }
    }

    fn teardown(&mut self) {
        self.checked_texture = None;
        self.clear_texture = None;
        self.disabled_checked_texture = None;
        self.disabled_clear_texture = None;
        self.check_sound_instance = None;
        self.check_sound = None;
    }
}
