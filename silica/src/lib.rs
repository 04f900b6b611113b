pub mod attribute;
mod audio;
pub mod control;
mod definitions;
pub mod error;
mod geometry;
pub mod input;
mod render;
mod settings;

#[cfg(test)]
mod test_support;

use glam::IVec2;
use grist::{obj_upcast, Obj};
use std::time::Duration;

pub use attribute::{AssetSource, AttributeContext};
pub use audio::*;
pub use control::{
    button::{Button, ButtonAnimation},
    checkbox::Checkbox,
    Control, ControlBase, UiContext,
};
pub use definitions::ControlDefinitions;
pub use error::{AttributeError, ControlError, DefinitionError};
pub use geometry::IRect;
pub use input::{KeyCode, Keyboard};
pub use render::*;
pub use settings::{CheckboxVisuals, UiSettings};

pub use glam;
pub use palette;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerState {
    None,
    Over,
    Press,
}

/// Flat host for a screen's controls. Routes pointer input to the topmost
/// control under the pointer and drives update and draw in insertion order.
pub struct Gui {
    active: bool,
    controls: Vec<Obj<dyn Control>>,
    hovered: Option<Obj<dyn Control>>,
    pointer_down: bool,
}

impl Gui {
    pub fn new() -> Self {
        Gui {
            active: true,
            controls: Vec::new(),
            hovered: None,
            pointer_down: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
    /// An inactive gui still updates and draws its controls but suppresses
    /// hotkeys and pointer input.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn add_control<C: Control>(&mut self, control: &Obj<C>) {
        self.controls.push(obj_upcast!(control).upgrade());
    }
    pub fn remove_control<C: Control>(&mut self, control: &Obj<C>) {
        let control: Obj<dyn Control> = obj_upcast!(control).upgrade();
        self.controls.retain(|c| *c != control);
        if self.hovered.as_ref() == Some(&control) {
            self.hovered = None;
        }
    }
    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    pub fn initialize(&mut self, ctx: &mut UiContext) -> Result<(), ControlError> {
        ctx.parent_active = self.active;
        for control in self.controls.iter() {
            control.get_mut().initialize(ctx)?;
        }
        Ok(())
    }

    pub fn update(&mut self, ctx: &mut UiContext, elapsed: Duration) {
        ctx.parent_active = self.active;
        for control in self.controls.iter() {
            let mut control = control.get_mut();
            if control.base().enabled() {
                control.update(ctx, elapsed);
            }
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for control in self.controls.iter() {
            let control = control.get();
            if control.base().visible() {
                control.draw(renderer);
            }
        }
    }

    pub fn handle_pointer_motion(&mut self, ctx: &mut UiContext, position: IVec2) {
        ctx.parent_active = self.active;
        let hit = if self.active {
            self.hit_control(position)
        } else {
            None
        };
        if hit == self.hovered {
            return;
        }
        if let Some(control) = self.hovered.take() {
            control.get_mut().handle_pointer(ctx, PointerState::None);
        }
        if let Some(control) = &hit {
            let state = if self.pointer_down {
                PointerState::Press
            } else {
                PointerState::Over
            };
            control.get_mut().handle_pointer(ctx, state);
        }
        self.hovered = hit;
    }

    pub fn handle_pointer_button(&mut self, ctx: &mut UiContext, pressed: bool) {
        if self.pointer_down == pressed {
            return;
        }
        self.pointer_down = pressed;
        ctx.parent_active = self.active;
        if let Some(control) = &self.hovered {
            let state = if pressed {
                PointerState::Press
            } else {
                PointerState::Over
            };
            control.get_mut().handle_pointer(ctx, state);
        }
    }

    /// Tears down every control and empties the gui.
    pub fn teardown(&mut self) {
        self.hovered = None;
        for control in self.controls.drain(..) {
            control.get_mut().teardown();
        }
    }

    fn hit_control(&self, position: IVec2) -> Option<Obj<dyn Control>> {
        self.controls
            .iter()
            .rev()
            .find(|control| {
                let control = control.get();
                let base = control.base();
                base.enabled() && base.visible() && base.bounds().contains(position)
            })
            .cloned()
    }
}

impl Default for Gui {
    fn default() -> Self {
        Gui::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{image, Services};
    use std::{cell::Cell, rc::Rc};

    fn button(services: &mut Services, name: &str, x: i32) -> Obj<Button> {
        let mut button = Button::new(name, &services.settings);
        button.set_idle_texture(image("idle", 40, 20), &mut services.fonts);
        button.base_mut().set_position(IVec2::new(x, 0));
        Obj::new(button)
    }

    fn count_clicks(button: &Obj<Button>) -> Rc<Cell<u32>> {
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        button
            .get_mut()
            .base_mut()
            .add_left_click_listener(move |_| counter.set(counter.get() + 1));
        clicks
    }

    #[test]
    fn topmost_control_receives_the_click() {
        let mut services = Services::default();
        let below = button(&mut services, "below", 0);
        let above = button(&mut services, "above", 10);
        let below_clicks = count_clicks(&below);
        let above_clicks = count_clicks(&above);

        let mut gui = Gui::new();
        gui.add_control(&below);
        gui.add_control(&above);
        gui.initialize(&mut services.context()).unwrap();

        let mut ctx = services.context();
        gui.handle_pointer_motion(&mut ctx, IVec2::new(15, 5));
        gui.handle_pointer_button(&mut ctx, true);
        gui.handle_pointer_button(&mut ctx, false);
        assert_eq!(above_clicks.get(), 1);
        assert_eq!(below_clicks.get(), 0);

        gui.handle_pointer_motion(&mut ctx, IVec2::new(5, 5));
        assert_eq!(below.get().base().pointer_state(), PointerState::Over);
        assert_eq!(above.get().base().pointer_state(), PointerState::None);
    }

    #[test]
    fn release_outside_is_not_a_click() {
        let mut services = Services::default();
        let target = button(&mut services, "target", 0);
        let clicks = count_clicks(&target);
        let mut gui = Gui::new();
        gui.add_control(&target);

        let mut ctx = services.context();
        gui.handle_pointer_motion(&mut ctx, IVec2::new(5, 5));
        gui.handle_pointer_button(&mut ctx, true);
        gui.handle_pointer_motion(&mut ctx, IVec2::new(100, 5));
        gui.handle_pointer_button(&mut ctx, false);
        assert_eq!(clicks.get(), 0);
    }

    #[test]
    fn disabled_and_hidden_controls_are_skipped() {
        let mut services = Services::default();
        let disabled = button(&mut services, "disabled", 0);
        disabled.get_mut().base_mut().set_enabled(false);
        let hidden = button(&mut services, "hidden", 0);
        hidden.get_mut().base_mut().set_visible(false);

        let mut gui = Gui::new();
        gui.add_control(&disabled);
        gui.add_control(&hidden);
        gui.handle_pointer_motion(&mut services.context(), IVec2::new(5, 5));

        assert!(!disabled.get().base().is_hovered());
        assert!(!hidden.get().base().is_hovered());
    }

    #[test]
    fn inactive_gui_suppresses_hotkeys() {
        let mut services = Services::default();
        let target = button(&mut services, "hotkey", 0);
        target.get_mut().set_hotkey(Some(KeyCode::Enter));
        let clicks = count_clicks(&target);
        services.keyboard.handle_key(KeyCode::Enter, true);

        let mut gui = Gui::new();
        gui.add_control(&target);
        gui.set_active(false);
        gui.update(&mut services.context(), Duration::from_millis(16));
        assert_eq!(clicks.get(), 0);

        gui.set_active(true);
        gui.update(&mut services.context(), Duration::from_millis(16));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn remove_and_teardown() {
        let mut services = Services::default();
        let first = button(&mut services, "first", 0);
        let second = button(&mut services, "second", 50);
        let mut gui = Gui::new();
        gui.add_control(&first);
        gui.add_control(&second);

        gui.remove_control(&first);
        assert_eq!(gui.control_count(), 1);

        gui.teardown();
        assert_eq!(gui.control_count(), 0);
        assert!(second.get().idle_texture().is_none());
        assert!(first.get().idle_texture().is_some());
    }
}
