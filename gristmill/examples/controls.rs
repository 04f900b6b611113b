use gristmill::{
    asset,
    audio::AudioMaster,
    input::{InputEvent, InputSystem},
    silica::{
        AttributeContext, Button, Checkbox, Control, ControlDefinitions, Gui, UiContext, UiSettings,
    },
    two::QuadRenderer,
    ui::{self, ContextAssets, UiConfig},
    window, Game, GameLoader, Obj, RenderingContext, ResultExt, Texture,
};
use std::{cell::Cell, rc::Rc, time::Duration};

const DEFINITIONS: &str = "controls.yaml";
const DEFAULT_DEFINITIONS: &str = "\
PlayButton:
  Location: 64,64
  Text: Play
  TextColorHover: 255,220,120
  AlphaRate: 0.05
QuitButton:
  Location: 64,112
  Text: Quit
  HotKey: Escape
FullscreenCheckbox:
  Location: 64,176
  Text: Fullscreen
MusicCheckbox:
  Location: 64,208
  Text: Music
  Checked: true
";

struct LoadedUi {
    settings: UiSettings,
    gui: Gui,
}

struct ControlsGame {
    input_system: InputSystem,
    renderer: QuadRenderer,
    audio: AudioMaster,
    settings: UiSettings,
    gui: Gui,
}

impl ControlsGame {
    fn new(renderer: QuadRenderer, loaded: LoadedUi) -> Self {
        let mut game = ControlsGame {
            input_system: InputSystem::new(),
            renderer,
            audio: AudioMaster::new(),
            settings: loaded.settings,
            gui: loaded.gui,
        };
        let mut ctx = UiContext::new(
            &mut game.audio,
            &mut game.renderer,
            game.input_system.keyboard(),
            &game.settings,
        );
        game.gui.initialize(&mut ctx).unwrap_nonfatal();
        game
    }
}

impl Game for ControlsGame {
    fn set_screen_size(&mut self, width: f32, height: f32) {
        self.renderer.set_screen_size(width, height);
    }

    fn handle_event(&mut self, event: InputEvent) {
        self.input_system.handle_event(event);
    }

    fn update(&mut self, frame_time: Duration) {
        let pointer = *self.input_system.pointer();
        let mut ctx = UiContext::new(
            &mut self.audio,
            &mut self.renderer,
            self.input_system.keyboard(),
            &self.settings,
        );
        self.gui
            .handle_pointer_motion(&mut ctx, pointer.position.as_ivec2());
        self.gui.handle_pointer_button(&mut ctx, pointer.primary);
        self.gui.update(&mut ctx, frame_time);
    }

    fn render(&mut self, context: &mut RenderingContext) {
        self.gui.draw(&mut self.renderer);
        self.renderer.render_pass(context);
    }
}

fn default_checkbox_visuals(context: &mut RenderingContext, settings: &mut UiSettings) {
    let visuals = &mut settings.checkbox;
    if visuals.checked.is_none() {
        visuals.checked = Some(Texture::new_solid(context, 16, 16, [230, 230, 230, 255]).into_image());
    }
    if visuals.clear.is_none() {
        visuals.clear = Some(Texture::new_solid(context, 16, 16, [60, 60, 60, 255]).into_image());
    }
    if visuals.disabled_checked.is_none() {
        visuals.disabled_checked =
            Some(Texture::new_solid(context, 16, 16, [140, 140, 140, 255]).into_image());
    }
    if visuals.disabled_clear.is_none() {
        visuals.disabled_clear = Some(Texture::new_solid(context, 16, 16, [40, 40, 40, 255]).into_image());
    }
}

fn create_button(
    context: &mut RenderingContext,
    renderer: &mut QuadRenderer,
    settings: &UiSettings,
    definitions: &ControlDefinitions,
    name: &str,
) -> Obj<Button> {
    let mut button = Button::new(name, settings);
    button.set_idle_texture(
        Texture::new_solid(context, 128, 32, [70, 70, 70, 255]).into_image(),
        renderer,
    );
    button.set_hover_texture(Some(
        Texture::new_solid(context, 128, 32, [110, 110, 110, 255]).into_image(),
    ));
    let mut assets = ContextAssets::new(context);
    let mut ctx = AttributeContext::new(&mut assets, renderer);
    definitions
        .apply_to(name, &mut button, &mut ctx)
        .unwrap_nonfatal();
    Obj::new(button)
}

fn create_checkbox(
    context: &mut RenderingContext,
    renderer: &mut QuadRenderer,
    settings: &UiSettings,
    definitions: &ControlDefinitions,
    name: &str,
) -> Obj<Checkbox> {
    let mut checkbox = Checkbox::new(name, settings);
    let mut assets = ContextAssets::new(context);
    let mut ctx = AttributeContext::new(&mut assets, renderer);
    definitions
        .apply_to(name, &mut checkbox, &mut ctx)
        .unwrap_nonfatal();
    Obj::new(checkbox)
}

impl GameLoader for ControlsGame {
    type Assets = LoadedUi;
    type Game = Self;

    fn fonts() -> Vec<&'static str> {
        vec!["OpenSans-Regular.ttf"]
    }

    fn create_default_files() -> asset::Result<()> {
        if asset::get_path("ui", DEFINITIONS).exists() {
            return Ok(());
        }
        asset::save_text_file("ui", DEFINITIONS, DEFAULT_DEFINITIONS)
    }

    fn load(context: &mut RenderingContext, renderer: &mut QuadRenderer) -> asset::Result<Self::Assets> {
        let config = UiConfig::load_config()?;
        let mut settings = config.to_settings(&mut ContextAssets::new(context));
        default_checkbox_visuals(context, &mut settings);
        let definitions = ui::load_definitions(DEFINITIONS)?;

        let play = create_button(context, renderer, &settings, &definitions, "PlayButton");
        let quit = create_button(context, renderer, &settings, &definitions, "QuitButton");
        let fullscreen = create_checkbox(context, renderer, &settings, &definitions, "FullscreenCheckbox");
        let music = create_checkbox(context, renderer, &settings, &definitions, "MusicCheckbox");

        let plays = Rc::new(Cell::new(0));
        play.get_mut().base_mut().add_left_click_listener(move |_| {
            plays.set(plays.get() + 1);
            log::info!("play pressed {} times", plays.get());
        });
        quit.get_mut()
            .base_mut()
            .add_left_click_listener(|_| window::request_quit());
        fullscreen
            .get_mut()
            .add_checked_changed_listener(|checked| log::info!("fullscreen: {checked}"));
        music
            .get_mut()
            .add_checked_changed_listener(|checked| log::info!("music: {checked}"));

        let mut gui = Gui::new();
        gui.add_control(&play);
        gui.add_control(&quit);
        gui.add_control(&fullscreen);
        gui.add_control(&music);
        Ok(LoadedUi { settings, gui })
    }

    fn create_game(renderer: QuadRenderer, loaded: Self::Assets) -> Self::Game {
        ControlsGame::new(renderer, loaded)
    }
}

fn main() {
    gristmill::run_game::<ControlsGame>("Controls Example");
}
