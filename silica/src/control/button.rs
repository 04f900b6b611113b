use glam::IVec2;
use std::time::Duration;

use crate::{
    attribute::{self, parse_bool, parse_color, parse_f32, parse_font_index, Attribute},
    control::{Control, ControlBase, UiContext},
    error::{AttributeError, ControlError},
    input::parse_key,
    with_alpha, AttributeContext, Color, Drawable, Image, KeyCode, Renderer, SoundEffect,
    SoundInstance, TextMeasure, UiSettings,
};

const DEFAULT_ALPHA_RATE: f32 = 0.01;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ButtonAnimation {
    /// Fading the hover visual in.
    Highlighting,
    /// Fading back to the idle visual.
    Returning,
}

/// A clickable button that cross-fades between an idle and a hover texture.
pub struct Button {
    base: ControlBase,
    idle_texture: Option<Image>,
    hover_texture: Option<Image>,
    hover_sound: Option<SoundEffect>,
    click_sound: Option<SoundEffect>,
    hover_sound_instance: Option<Box<dyn SoundInstance>>,
    click_sound_instance: Option<Box<dyn SoundInstance>>,
    alpha_rate: f32,
    idle_intensity: f32,
    hover_intensity: f32,
    animation: ButtonAnimation,
    hotkey: Option<KeyCode>,
    allow_click: bool,
    adaptive_text: bool,
    text_offset: IVec2,
    text_color_idle: Color,
    text_color_hover: Color,
    text_color: Color,
    disabled_text_color: Color,
}

impl Button {
    pub fn new(name: &str, settings: &UiSettings) -> Self {
        Button {
            base: ControlBase::new(name),
            idle_texture: None,
            hover_texture: None,
            hover_sound: None,
            click_sound: None,
            hover_sound_instance: None,
            click_sound_instance: None,
            alpha_rate: settings.default_alpha_rate,
            idle_intensity: 1.0,
            hover_intensity: 0.0,
            animation: ButtonAnimation::Returning,
            hotkey: None,
            allow_click: true,
            adaptive_text: true,
            text_offset: IVec2::ZERO,
            text_color_idle: settings.button_color,
            text_color_hover: settings.button_hover_color,
            text_color: settings.button_color,
            disabled_text_color: settings.disabled_color,
        }
    }

    pub fn text(&self) -> &str {
        self.base.text()
    }
    pub fn set_text(&mut self, text: impl Into<String>, fonts: &mut dyn TextMeasure) {
        self.base.set_text_raw(text.into());
        if self.adaptive_text {
            self.layout_text(fonts);
        }
    }
    pub fn set_font_index(&mut self, font_index: usize, fonts: &mut dyn TextMeasure) {
        self.base.set_font_index(font_index);
        if self.adaptive_text {
            self.layout_text(fonts);
        }
    }

    pub fn text_offset(&self) -> IVec2 {
        self.text_offset
    }
    pub fn set_text_offset(&mut self, offset: IVec2) {
        self.text_offset = offset;
    }
    pub fn adaptive_text(&self) -> bool {
        self.adaptive_text
    }
    pub fn set_adaptive_text(&mut self, adaptive_text: bool) {
        self.adaptive_text = adaptive_text;
    }

    pub fn idle_texture(&self) -> Option<&Image> {
        self.idle_texture.as_ref()
    }
    /// Sets the idle texture and resizes the button to it.
    pub fn set_idle_texture(&mut self, texture: Image, fonts: &mut dyn TextMeasure) {
        self.base.set_size(texture.size());
        self.idle_texture = Some(texture);
        if self.adaptive_text {
            self.layout_text(fonts);
        }
    }
    pub fn hover_texture(&self) -> Option<&Image> {
        self.hover_texture.as_ref()
    }
    pub fn set_hover_texture(&mut self, texture: Option<Image>) {
        self.hover_texture = texture;
    }

    /// Takes effect on the next `initialize`.
    pub fn set_hover_sound(&mut self, sound: Option<SoundEffect>) {
        self.hover_sound = sound;
    }
    /// Takes effect on the next `initialize`.
    pub fn set_click_sound(&mut self, sound: Option<SoundEffect>) {
        self.click_sound = sound;
    }

    pub fn alpha_rate(&self) -> f32 {
        self.alpha_rate
    }
    /// Non-positive rates are rejected.
    pub fn set_alpha_rate(&mut self, alpha_rate: f32) {
        if alpha_rate > 0.0 {
            self.alpha_rate = alpha_rate;
        } else {
            log::warn!("{}: alpha rate must be positive, got {alpha_rate}", self.base.name());
        }
    }
    pub fn idle_intensity(&self) -> f32 {
        self.idle_intensity
    }
    pub fn hover_intensity(&self) -> f32 {
        self.hover_intensity
    }
    pub fn animation(&self) -> ButtonAnimation {
        self.animation
    }

    pub fn hotkey(&self) -> Option<KeyCode> {
        self.hotkey
    }
    pub fn set_hotkey(&mut self, hotkey: Option<KeyCode>) {
        self.hotkey = hotkey;
    }
    pub fn allow_click(&self) -> bool {
        self.allow_click
    }
    pub fn set_allow_click(&mut self, allow_click: bool) {
        self.allow_click = allow_click;
    }

    pub fn text_color_idle(&self) -> Color {
        self.text_color_idle
    }
    pub fn set_text_color_idle(&mut self, color: Color) {
        self.text_color_idle = color;
        self.text_color = color;
    }
    pub fn text_color_hover(&self) -> Color {
        self.text_color_hover
    }
    pub fn set_text_color_hover(&mut self, color: Color) {
        self.text_color_hover = color;
    }
    /// Color the text is drawn with while clicking is allowed.
    pub fn text_color(&self) -> Color {
        self.text_color
    }

    /// Centers the text inside the bounds. An axis where the text exactly
    /// fills the bounds keeps its current offset. Offsets truncate, except a
    /// vertical overflow which rounds half to even.
    fn layout_text(&mut self, fonts: &mut dyn TextMeasure) {
        let text_size = fonts.measure_text(self.base.text(), self.base.font_index());
        let bounds = self.base.bounds().size.as_vec2();
        self.text_offset.x =
            centered_offset(self.text_offset.x, bounds.x, text_size.x, truncate, truncate);
        self.text_offset.y = centered_offset(self.text_offset.y, bounds.y, text_size.y, truncate, |v| {
            v.round_ties_even() as i32
        });
    }

    fn apply_text_color_idle(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        match parse_color(value) {
            Some(color) => self.set_text_color_idle(color),
            None => log::warn!("{}: invalid TextColorIdle \"{value}\"", self.base.name()),
        }
        Ok(())
    }
    fn apply_text_color_hover(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        match parse_color(value) {
            Some(color) => self.text_color_hover = color,
            None => log::warn!("{}: invalid TextColorHover \"{value}\"", self.base.name()),
        }
        Ok(())
    }
    fn apply_hover_sound(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.hover_sound = Some(ctx.load_sound(value)?);
        Ok(())
    }
    fn apply_click_sound(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.click_sound = Some(ctx.load_sound(value)?);
        Ok(())
    }
    fn apply_adaptive_text(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.adaptive_text = parse_bool(value, true);
        Ok(())
    }
    fn apply_alpha_rate(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        let rate = parse_f32(value, DEFAULT_ALPHA_RATE);
        self.alpha_rate = if rate > 0.0 { rate } else { DEFAULT_ALPHA_RATE };
        Ok(())
    }
    fn apply_font_index(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.set_font_index(parse_font_index(value), ctx.fonts);
        Ok(())
    }
    fn apply_idle_texture(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        let texture = ctx.load_image(value)?;
        self.set_idle_texture(texture, ctx.fonts);
        Ok(())
    }
    fn apply_hover_texture(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.hover_texture = Some(ctx.load_image(value)?);
        Ok(())
    }
    fn apply_hotkey(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        match parse_key(value) {
            Some(key) => self.hotkey = Some(key),
            None => log::warn!("{}: unknown HotKey \"{value}\"", self.base.name()),
        }
        Ok(())
    }
    fn apply_allow_click(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.allow_click = parse_bool(value, true);
        Ok(())
    }
    fn apply_text(&mut self, value: &str, ctx: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.set_text(value, ctx.fonts);
        Ok(())
    }
}

fn truncate(value: f32) -> i32 {
    value as i32
}

fn centered_offset(
    current: i32,
    bounds: f32,
    text: f32,
    inside: fn(f32) -> i32,
    overflow: fn(f32) -> i32,
) -> i32 {
    if text < bounds {
        inside((bounds - text) / 2.0)
    } else if text > bounds {
        overflow((text - bounds) / -2.0)
    } else {
        current
    }
}

const BUTTON_ATTRIBUTES: &[Attribute<Button>] = &[
    Attribute { key: "TextColorIdle", apply: Button::apply_text_color_idle },
    Attribute { key: "TextColorHover", apply: Button::apply_text_color_hover },
    Attribute { key: "HoverSoundEffect", apply: Button::apply_hover_sound },
    Attribute { key: "ClickSoundEffect", apply: Button::apply_click_sound },
    Attribute { key: "AdaptiveText", apply: Button::apply_adaptive_text },
    Attribute { key: "AlphaRate", apply: Button::apply_alpha_rate },
    Attribute { key: "FontIndex", apply: Button::apply_font_index },
    Attribute { key: "IdleTexture", apply: Button::apply_idle_texture },
    Attribute { key: "HoverTexture", apply: Button::apply_hover_texture },
    Attribute { key: "HotKey", apply: Button::apply_hotkey },
    Attribute { key: "AllowClick", apply: Button::apply_allow_click },
    Attribute { key: "Text", apply: Button::apply_text },
];

impl Control for Button {
    fn base(&self) -> &ControlBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn initialize(&mut self, ctx: &mut UiContext) -> Result<(), ControlError> {
        self.hover_sound_instance = self
            .hover_sound
            .as_ref()
            .map(|sound| ctx.audio.create_instance(sound));
        self.click_sound_instance = self
            .click_sound
            .as_ref()
            .map(|sound| ctx.audio.create_instance(sound));

        if let Some(texture) = &self.idle_texture {
            let size = texture.size();
            self.base.set_size(size);
            if self.adaptive_text {
                self.layout_text(ctx.fonts);
            }
        }

        self.idle_intensity = 1.0;
        self.hover_intensity = 0.0;
        self.animation = ButtonAnimation::Returning;
        self.text_color = self.text_color_idle;
        Ok(())
    }

    fn update(&mut self, ctx: &mut UiContext, _elapsed: Duration) {
        match self.animation {
            ButtonAnimation::Highlighting => {
                self.idle_intensity = (self.idle_intensity - self.alpha_rate).max(0.0);
                self.hover_intensity = (self.hover_intensity + self.alpha_rate).min(1.0);
            }
            ButtonAnimation::Returning => {
                self.hover_intensity = (self.hover_intensity - self.alpha_rate).max(0.0);
                self.idle_intensity = (self.idle_intensity + self.alpha_rate).min(1.0);
            }
        }

        let hotkey_held = self
            .hotkey
            .is_some_and(|key| ctx.keyboard.is_pressed(key));
        if ctx.parent_active && hotkey_held {
            self.on_left_click(ctx);
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let rect = self.base.bounds();
        let alpha = self.base.alpha();
        let remap = self.base.remap_color();

        if let Some(idle) = &self.idle_texture {
            if self.idle_intensity > 0.0 {
                renderer.draw_texture(idle, rect, with_alpha(remap, self.idle_intensity * alpha));
            }
            if let Some(hover) = &self.hover_texture {
                if self.hover_intensity > 0.0 {
                    renderer.draw_texture(hover, rect, with_alpha(remap, self.hover_intensity * alpha));
                }
            }
        }

        if self.base.text().is_empty() {
            return;
        }
        let color = if !self.base.enabled() || !self.allow_click {
            self.disabled_text_color
        } else {
            self.text_color
        };
        renderer.draw_text_with_shadow(
            self.base.text(),
            self.base.font_index(),
            rect.position + self.text_offset,
            with_alpha(color, color.alpha * alpha),
        );
    }

    fn on_pointer_enter(&mut self, _ctx: &mut UiContext) {
        if !self.allow_click {
            return;
        }
        self.animation = ButtonAnimation::Highlighting;
        self.idle_intensity = 0.5;
        self.hover_intensity = 0.75;
        self.text_color = self.text_color_hover;
        if let Some(instance) = self.hover_sound_instance.as_mut() {
            instance.play();
        }
    }

    fn on_pointer_leave(&mut self, _ctx: &mut UiContext) {
        if !self.allow_click {
            return;
        }
        self.animation = ButtonAnimation::Returning;
        self.idle_intensity = 0.75;
        self.hover_intensity = 0.5;
        self.text_color = self.text_color_idle;
    }

    fn on_left_click(&mut self, _ctx: &mut UiContext) {
        if !self.allow_click {
            return;
        }
        if let Some(instance) = self.click_sound_instance.as_mut() {
            instance.play();
        }
        self.base.on_left_click();
    }

    fn apply_attribute(
        &mut self,
        key: &str,
        value: &str,
        ctx: &mut AttributeContext<'_>,
    ) -> Result<(), AttributeError> {
        match attribute::dispatch(BUTTON_ATTRIBUTES, self, key, value, ctx) {
            Some(result) => result,
            None => self.base.apply_attribute(key, value, ctx),
        }
    }

    fn teardown(&mut self) {
        self.idle_texture = None;
        self.hover_texture = None;
        self.hover_sound_instance = None;
        self.click_sound_instance = None;
        self.hover_sound = None;
        self.click_sound = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color_rgba8,
        IRect,
        test_support::{image, FakeAssets, RecordingRenderer, Services},
    };
    use std::{cell::Cell, rc::Rc};

    fn button(services: &mut Services, text: &str) -> Button {
        let mut button = Button::new("button", &services.settings);
        button.set_idle_texture(image("idle", 100, 30), &mut services.fonts);
        button.set_hover_texture(Some(image("hover", 100, 30)));
        button.set_text(text, &mut services.fonts);
        button
    }

    fn count_clicks(button: &mut Button) -> Rc<Cell<u32>> {
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        button
            .base_mut()
            .add_left_click_listener(move |_| counter.set(counter.get() + 1));
        clicks
    }

    #[test]
    fn enter_then_three_updates_saturates() {
        let mut services = Services::default();
        let mut button = button(&mut services, "Play");
        button.initialize(&mut services.context()).unwrap();
        button.set_alpha_rate(0.2);

        button.on_pointer_enter(&mut services.context());
        assert_eq!(button.animation(), ButtonAnimation::Highlighting);
        for _ in 0..3 {
            button.update(&mut services.context(), Duration::from_millis(16));
        }
        assert_eq!(button.idle_intensity(), 0.0);
        assert_eq!(button.hover_intensity(), 1.0);
    }

    #[test]
    fn ramps_are_monotonic_and_bounded() {
        let mut services = Services::default();
        for rate in [0.01, 0.07, 0.3, 1.0, 5.0] {
            let mut button = button(&mut services, "");
            button.initialize(&mut services.context()).unwrap();
            button.set_alpha_rate(rate);
            button.on_pointer_enter(&mut services.context());

            let steps = (1.0 / rate).ceil() as usize;
            let (mut idle, mut hover) = (button.idle_intensity(), button.hover_intensity());
            for _ in 0..steps {
                button.update(&mut services.context(), Duration::ZERO);
                assert!(button.idle_intensity() <= idle && button.idle_intensity() >= 0.0);
                assert!(button.hover_intensity() >= hover && button.hover_intensity() <= 1.0);
                idle = button.idle_intensity();
                hover = button.hover_intensity();
            }
            assert_eq!(idle, 0.0);
            assert_eq!(hover, 1.0);

            button.on_pointer_leave(&mut services.context());
            for _ in 0..steps {
                button.update(&mut services.context(), Duration::ZERO);
            }
            assert_eq!(button.idle_intensity(), 1.0);
            assert_eq!(button.hover_intensity(), 0.0);
        }
    }

    #[test]
    fn adaptive_text_centers_per_axis() {
        let mut services = Services::default();

        // 4 chars at 8px by 16px inside 100x30
        let small = button(&mut services, "Play");
        assert_eq!(small.text_offset(), IVec2::new(34, 7));

        // 15 chars: 120px wide, overflows by 20
        let wide = button(&mut services, "A very long one");
        assert_eq!(wide.text_offset().x, -10);

        services.fonts.line_height = 33.0;
        let tall = button(&mut services, "Play");
        // -1.5 rounds half to even
        assert_eq!(tall.text_offset().y, -2);
    }

    #[test]
    fn odd_vertical_gap_truncates() {
        let mut services = Services::default();
        services.fonts.line_height = 15.0;
        // 7.5 inside 30px bounds
        let short = button(&mut services, "Play");
        assert_eq!(short.text_offset(), IVec2::new(34, 7));

        services.fonts.line_height = 35.0;
        let tall = button(&mut services, "Play");
        // -2.5 rounds half to even
        assert_eq!(tall.text_offset().y, -2);
    }

    #[test]
    fn text_filling_bounds_keeps_offset() {
        let mut services = Services::default();
        let mut button = Button::new("exact", &services.settings);
        button.base_mut().set_size(IVec2::new(32, 16));
        button.set_text("Fits", &mut services.fonts);
        assert_eq!(button.text_offset(), IVec2::ZERO);
    }

    #[test]
    fn fixed_text_is_not_recentered() {
        let mut services = Services::default();
        let mut button = Button::new("fixed", &services.settings);
        button.set_adaptive_text(false);
        button.set_text_offset(IVec2::new(3, 4));
        button.set_idle_texture(image("idle", 100, 30), &mut services.fonts);
        button.set_text("Play", &mut services.fonts);
        assert_eq!(button.text_offset(), IVec2::new(3, 4));
    }

    #[test]
    fn click_plays_private_sound_and_propagates() {
        let mut services = Services::default();
        let mut button = button(&mut services, "Go");
        button.set_click_sound(Some(SoundEffect::new("click.wav", Vec::new())));
        button.set_hover_sound(Some(SoundEffect::new("hover.wav", Vec::new())));
        button.initialize(&mut services.context()).unwrap();
        let clicks = count_clicks(&mut button);

        button.on_pointer_enter(&mut services.context());
        button.on_left_click(&mut services.context());

        let counters = &services.audio.counters;
        assert_eq!(clicks.get(), 1);
        assert_eq!(counters.instances.get(), 2);
        assert_eq!(counters.instance_plays.get(), 2);
        assert_eq!(counters.pooled_plays.get(), 0);
    }

    #[test]
    fn disallowed_click_ignores_pointer() {
        let mut services = Services::default();
        let mut button = button(&mut services, "Locked");
        button.initialize(&mut services.context()).unwrap();
        button.set_allow_click(false);
        let clicks = count_clicks(&mut button);

        button.on_pointer_enter(&mut services.context());
        button.on_left_click(&mut services.context());

        assert_eq!(clicks.get(), 0);
        assert_eq!(button.animation(), ButtonAnimation::Returning);
        assert_eq!(button.idle_intensity(), 1.0);

        let mut renderer = RecordingRenderer::default();
        button.draw(&mut renderer);
        assert_eq!(renderer.text_color(), Some(services.settings.disabled_color));
    }

    #[test]
    fn hotkey_clicks_while_held_and_parent_active() {
        let mut services = Services::default();
        let mut button = button(&mut services, "Ok");
        button.set_hotkey(parse_key("Enter"));
        let clicks = count_clicks(&mut button);

        button.update(&mut services.context(), Duration::from_millis(16));
        assert_eq!(clicks.get(), 0);

        services.keyboard.handle_key(KeyCode::Enter, true);
        button.update(&mut services.context(), Duration::from_millis(16));
        button.update(&mut services.context(), Duration::from_millis(16));
        assert_eq!(clicks.get(), 2);

        let mut ctx = services.context();
        ctx.parent_active = false;
        button.update(&mut ctx, Duration::from_millis(16));
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn draw_blends_idle_and_hover() {
        let mut services = Services::default();
        let mut button = button(&mut services, "Play");
        button.initialize(&mut services.context()).unwrap();

        let mut renderer = RecordingRenderer::default();
        button.draw(&mut renderer);
        assert_eq!(renderer.textures(), [("idle", 1.0)]);
        assert_eq!(renderer.text_color(), Some(services.settings.button_color));

        button.on_pointer_enter(&mut services.context());
        let mut renderer = RecordingRenderer::default();
        button.draw(&mut renderer);
        assert_eq!(renderer.textures(), [("idle", 0.5), ("hover", 0.75)]);
        assert_eq!(renderer.text_color(), Some(services.settings.button_hover_color));
    }

    #[test]
    fn attributes() {
        let mut services = Services::default();
        let mut assets = FakeAssets::default().with_image("play.png", 80, 20);
        let mut ctx = AttributeContext::new(&mut assets, &mut services.fonts);
        let mut button = Button::new("attrs", &services.settings);

        button.apply_attribute("Text", "Play", &mut ctx).unwrap();
        button.apply_attribute("IdleTexture", "play.png", &mut ctx).unwrap();
        button.apply_attribute("AlphaRate", "-3", &mut ctx).unwrap();
        button.apply_attribute("TextColorIdle", "10,20,30", &mut ctx).unwrap();
        button.apply_attribute("HotKey", "Escape", &mut ctx).unwrap();
        button.apply_attribute("AllowClick", "false", &mut ctx).unwrap();
        button.apply_attribute("Y", "12", &mut ctx).unwrap();
        button.apply_attribute("Bogus", "1", &mut ctx).unwrap();
        assert!(button
            .apply_attribute("ClickSoundEffect", "missing.wav", &mut ctx)
            .is_err());

        assert_eq!(button.base().bounds(), IRect::new(0, 12, 80, 20));
        assert_eq!(button.text_offset(), IVec2::new(24, 2));
        assert_eq!(button.alpha_rate(), DEFAULT_ALPHA_RATE);
        assert_eq!(button.text_color(), color_rgba8(10, 20, 30, 255));
        assert_eq!(button.hotkey(), Some(KeyCode::Escape));
        assert!(!button.allow_click());
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut services = Services::default();
        let mut button = button(&mut services, "Bye");
        button.teardown();
        button.teardown();
        assert!(button.idle_texture().is_none());
        assert!(button.hover_texture().is_none());
    }
}
