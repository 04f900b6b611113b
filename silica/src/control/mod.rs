pub mod button;
pub mod checkbox;

use glam::IVec2;
use grist::{impl_add_event_listener, Event};
use std::time::Duration;

use crate::{
    attribute::{self, parse_bool, parse_color, parse_f32, parse_font_index, parse_i32, parse_pair, Attribute},
    error::{AttributeError, ControlError},
    color_rgba8, Audio, AttributeContext, Color, IRect, Keyboard, PointerState, Renderer,
    TextMeasure, UiSettings,
};

/// Services a control may use from its per-frame and input callbacks.
pub struct UiContext<'a> {
    pub audio: &'a mut dyn Audio,
    pub fonts: &'a mut dyn TextMeasure,
    pub keyboard: &'a Keyboard,
    pub settings: &'a UiSettings,
    /// Whether every ancestor of the control being called is active.
    pub parent_active: bool,
}

impl<'a> UiContext<'a> {
    pub fn new(
        audio: &'a mut dyn Audio,
        fonts: &'a mut dyn TextMeasure,
        keyboard: &'a Keyboard,
        settings: &'a UiSettings,
    ) -> Self {
        UiContext {
            audio,
            fonts,
            keyboard,
            settings,
            parent_active: true,
        }
    }
}

/// State every control shares: bounds, flags, tint, text and click
/// propagation to the host.
pub struct ControlBase {
    name: String,
    bounds: IRect,
    enabled: bool,
    visible: bool,
    remap_color: Color,
    alpha: f32,
    text: String,
    font_index: usize,
    pointer: PointerState,
    left_click: Event<()>,
}

impl ControlBase {
    pub fn new(name: &str) -> Self {
        ControlBase {
            name: name.to_owned(),
            bounds: IRect::ZERO,
            enabled: true,
            visible: true,
            remap_color: color_rgba8(255, 255, 255, 255),
            alpha: 1.0,
            text: String::new(),
            font_index: 0,
            pointer: PointerState::None,
            left_click: Event::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> IRect {
        self.bounds
    }
    pub fn set_bounds(&mut self, bounds: IRect) {
        self.bounds = bounds;
    }
    pub fn set_position(&mut self, position: IVec2) {
        self.bounds.position = position;
    }
    pub fn set_size(&mut self, size: IVec2) {
        self.bounds.size = size;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    pub fn visible(&self) -> bool {
        self.visible
    }
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn remap_color(&self) -> Color {
        self.remap_color
    }
    pub fn set_remap_color(&mut self, color: Color) {
        self.remap_color = color;
    }
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn text(&self) -> &str {
        &self.text
    }
    /// Stores the text without any layout. Controls expose their own
    /// `set_text` that also re-lays out.
    pub(crate) fn set_text_raw(&mut self, text: String) {
        self.text = text;
    }
    pub fn font_index(&self) -> usize {
        self.font_index
    }
    pub(crate) fn set_font_index(&mut self, font_index: usize) {
        self.font_index = font_index;
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }
    pub fn is_hovered(&self) -> bool {
        self.pointer != PointerState::None
    }

    /// Propagates a click to the host.
    pub fn on_left_click(&mut self) {
        self.left_click.emit(&());
    }

    /// Applies one of the attributes every control understands. Unknown keys
    /// are accepted and ignored.
    pub fn apply_attribute(
        &mut self,
        key: &str,
        value: &str,
        ctx: &mut AttributeContext<'_>,
    ) -> Result<(), AttributeError> {
        match attribute::dispatch(BASE_ATTRIBUTES, self, key, value, ctx) {
            Some(result) => result,
            None => {
                log::debug!("{}: ignoring unknown attribute {key}", self.name);
                Ok(())
            }
        }
    }

    fn apply_x(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.bounds.position.x = parse_i32(value, self.bounds.position.x);
        Ok(())
    }
    fn apply_y(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.bounds.position.y = parse_i32(value, self.bounds.position.y);
        Ok(())
    }
    fn apply_width(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.bounds.size.x = parse_i32(value, self.bounds.size.x);
        Ok(())
    }
    fn apply_height(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.bounds.size.y = parse_i32(value, self.bounds.size.y);
        Ok(())
    }
    fn apply_location(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        match parse_pair(value) {
            Some(position) => self.bounds.position = position,
            None => log::warn!("{}: invalid Location \"{value}\"", self.name),
        }
        Ok(())
    }
    fn apply_size(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        match parse_pair(value) {
            Some(size) => self.bounds.size = size,
            None => log::warn!("{}: invalid Size \"{value}\"", self.name),
        }
        Ok(())
    }
    fn apply_remap_color(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        match parse_color(value) {
            Some(color) => self.remap_color = color,
            None => log::warn!("{}: invalid RemapColor \"{value}\"", self.name),
        }
        Ok(())
    }
    fn apply_text(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.text = value.to_owned();
        Ok(())
    }
    fn apply_font_index(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.font_index = parse_font_index(value);
        Ok(())
    }
    fn apply_enabled(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.enabled = parse_bool(value, true);
        Ok(())
    }
    fn apply_visible(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        self.visible = parse_bool(value, true);
        Ok(())
    }
    fn apply_alpha(&mut self, value: &str, _: &mut AttributeContext<'_>) -> Result<(), AttributeError> {
        let alpha = parse_f32(value, self.alpha);
        self.set_alpha(alpha);
        Ok(())
    }
}

const BASE_ATTRIBUTES: &[Attribute<ControlBase>] = &[
    Attribute { key: "X", apply: ControlBase::apply_x },
    Attribute { key: "Y", apply: ControlBase::apply_y },
    Attribute { key: "Width", apply: ControlBase::apply_width },
    Attribute { key: "Height", apply: ControlBase::apply_height },
    Attribute { key: "Location", apply: ControlBase::apply_location },
    Attribute { key: "Size", apply: ControlBase::apply_size },
    Attribute { key: "RemapColor", apply: ControlBase::apply_remap_color },
    Attribute { key: "Text", apply: ControlBase::apply_text },
    Attribute { key: "FontIndex", apply: ControlBase::apply_font_index },
    Attribute { key: "Enabled", apply: ControlBase::apply_enabled },
    Attribute { key: "Visible", apply: ControlBase::apply_visible },
    Attribute { key: "Alpha", apply: ControlBase::apply_alpha },
];

impl_add_event_listener!(ControlBase, left_click, (), add_left_click_listener);

/// A control driven by the host: configured through attributes, initialized
/// once, then updated and drawn every frame and fed pointer transitions.
pub trait Control: 'static {
    fn base(&self) -> &ControlBase;
    fn base_mut(&mut self) -> &mut ControlBase;

    fn initialize(&mut self, _ctx: &mut UiContext) -> Result<(), ControlError> {
        Ok(())
    }
    fn update(&mut self, _ctx: &mut UiContext, _elapsed: Duration) {}
    fn draw(&self, renderer: &mut dyn Renderer);

    fn on_pointer_enter(&mut self, _ctx: &mut UiContext) {}
    fn on_pointer_leave(&mut self, _ctx: &mut UiContext) {}
    fn on_left_click(&mut self, _ctx: &mut UiContext) {
        self.base_mut().on_left_click();
    }

    fn apply_attribute(
        &mut self,
        key: &str,
        value: &str,
        ctx: &mut AttributeContext<'_>,
    ) -> Result<(), AttributeError> {
        self.base_mut().apply_attribute(key, value, ctx)
    }

    /// Releases owned resources. Safe to call more than once.
    fn teardown(&mut self) {}

    /// Turns a pointer state change into enter, leave and click callbacks.
    /// A click is a press followed by a release while still over the control.
    fn handle_pointer(&mut self, ctx: &mut UiContext, state: PointerState) {
        let previous = self.base().pointer;
        if previous == state {
            return;
        }
        self.base_mut().pointer = state;
        match (previous, state) {
            (PointerState::None, _) => self.on_pointer_enter(ctx),
            (_, PointerState::None) => self.on_pointer_leave(ctx),
            (PointerState::Press, PointerState::Over) => self.on_left_click(ctx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAssets, FixedFont, Services};
    use std::{cell::Cell, rc::Rc};

    struct Plain {
        base: ControlBase,
        entered: u32,
        left: u32,
    }

    impl Control for Plain {
        fn base(&self) -> &ControlBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ControlBase {
            &mut self.base
        }
        fn draw(&self, _renderer: &mut dyn Renderer) {}
        fn on_pointer_enter(&mut self, _ctx: &mut UiContext) {
            self.entered += 1;
        }
        fn on_pointer_leave(&mut self, _ctx: &mut UiContext) {
            self.left += 1;
        }
    }

    #[test]
    fn base_attributes() {
        let mut assets = FakeAssets::default();
        let mut fonts = FixedFont::default();
        let mut ctx = AttributeContext::new(&mut assets, &mut fonts);
        let mut base = ControlBase::new("base");

        base.apply_attribute("Location", "10,20", &mut ctx).unwrap();
        base.apply_attribute("Width", "30", &mut ctx).unwrap();
        base.apply_attribute("Height", "oops", &mut ctx).unwrap();
        base.apply_attribute("Enabled", "no", &mut ctx).unwrap();
        base.apply_attribute("Unknown", "whatever", &mut ctx).unwrap();

        assert_eq!(base.bounds(), IRect::new(10, 20, 30, 0));
        assert!(!base.enabled());
    }

    #[test]
    fn pointer_transitions() {
        let mut services = Services::default();
        let mut ctx = services.context();
        let clicks = Rc::new(Cell::new(0));
        let mut control = Plain {
            base: ControlBase::new("plain"),
            entered: 0,
            left: 0,
        };
        let counter = clicks.clone();
        control
            .base_mut()
            .add_left_click_listener(move |_| counter.set(counter.get() + 1));

        control.handle_pointer(&mut ctx, PointerState::Over);
        control.handle_pointer(&mut ctx, PointerState::Over);
        control.handle_pointer(&mut ctx, PointerState::Press);
        control.handle_pointer(&mut ctx, PointerState::Over);
        control.handle_pointer(&mut ctx, PointerState::None);

        assert_eq!(control.entered, 1);
        assert_eq!(control.left, 1);
        assert_eq!(clicks.get(), 1);
    }
}
