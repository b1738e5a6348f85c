//! Control loop orchestration
//!
//! One `App::step` per loop iteration. Inputs are sampled first (button,
//! encoder, accelerometer), then exactly one state machine advances, then the
//! frame's scene is built. Light ownership moves between the pickup logic and
//! the game through the override on `AmbientLight`.

use crate::Timestamp;
use crate::input::{Button, QuadratureDecoder};
use crate::levels::{Difficulty, LevelCatalog};
use crate::menu::MenuController;
use crate::motion::{Accelerometer, AmbientLight, LightCommand, MotionClassifier};
use crate::render::{Scene, wrap_text};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameSession, TickInput, tick};

/// Story shown before the menu, one line per press
pub const INTRO_LINES: [&str; 5] = [
    "Hello",
    "You awake?",
    "It's year of 3035",
    "Remember?",
    "Time changed.",
];

pub const ENDING_TEXT: &str = "Thanks for playing! Press to restart";

/// Characters per line for the intro story
const INTRO_WRAP: usize = 20;
/// The ending text is indented, so lines are shorter
const ENDING_WRAP: usize = 10;
const LINE_HEIGHT: i32 = 12;

/// Raw pin levels and sensor reading for one loop iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Button pin level (`false` = pressed)
    pub button_level: bool,
    pub phase_a: bool,
    pub phase_b: bool,
    /// Acceleration sample, `None` if nothing was read this frame
    pub accel: Option<[f32; 3]>,
}

impl Default for FrameInput {
    /// Button released, encoder resting on a detent, no sample
    fn default() -> Self {
        Self {
            button_level: true,
            phase_a: true,
            phase_b: true,
            accel: None,
        }
    }
}

/// Output of one loop iteration
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub scene: Scene,
    /// Strip writes in the order they were decided
    pub lights: Vec<LightCommand>,
}

#[derive(Debug, Clone)]
pub enum AppPhase {
    Intro { line: usize },
    Menu,
    Playing(Box<GameSession>),
    Ending,
}

pub struct App {
    settings: Settings,
    button: Button,
    decoder: QuadratureDecoder,
    classifier: MotionClassifier,
    light: AmbientLight,
    menu: MenuController,
    phase: AppPhase,
    auto_jump: bool,
}

impl App {
    /// Boot: seed the decoder from the current pin levels and probe the sensor once
    pub fn new(
        settings: Settings,
        initial: &FrameInput,
        sensor: &mut dyn Accelerometer,
        now: Timestamp,
    ) -> Self {
        let mut classifier = MotionClassifier::new(settings.pickup_threshold, true);
        classifier.probe(sensor);

        Self {
            button: Button::new(settings.button_debounce()),
            decoder: QuadratureDecoder::new(
                initial.phase_a,
                initial.phase_b,
                now,
                settings.encoder_debounce(),
            ),
            classifier,
            light: AmbientLight::new(settings.hold_duration()),
            menu: MenuController::new(),
            phase: AppPhase::Intro { line: 0 },
            auto_jump: false,
            settings,
        }
    }

    /// Let the game jump on its own (demo mode)
    pub fn set_auto_jump(&mut self, enabled: bool) {
        self.auto_jump = enabled;
    }

    pub fn phase(&self) -> &AppPhase {
        &self.phase
    }

    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    pub fn session(&self) -> Option<&GameSession> {
        match &self.phase {
            AppPhase::Playing(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    pub fn light(&self) -> &AmbientLight {
        &self.light
    }

    pub fn classifier(&self) -> &MotionClassifier {
        &self.classifier
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one loop iteration
    pub fn step(&mut self, input: &FrameInput, now: Timestamp) -> Frame {
        let mut lights = Vec::new();

        // Inputs
        self.button.sample(input.button_level, now);
        self.decoder.update(input.phase_a, input.phase_b, now);
        let step = self.decoder.poll_step();
        let pressed = self.button.just_pressed();

        let moving = self.classifier.classify_sample(input.accel);
        if let Some(command) = self.light.tick(moving, now) {
            lights.push(command);
        }

        // State machine
        let mut start = None;
        let next = match &mut self.phase {
            AppPhase::Intro { line } => {
                if pressed {
                    *line += 1;
                }
                if *line >= INTRO_LINES.len() {
                    self.menu.reset();
                    Some(AppPhase::Menu)
                } else {
                    None
                }
            }

            AppPhase::Menu => {
                start = self.menu.update(step, pressed);
                None
            }

            AppPhase::Playing(session) => {
                let tick_input = TickInput {
                    jump: pressed,
                    auto_jump: self.auto_jump,
                };
                for event in tick(session, &tick_input, now) {
                    match event {
                        GameEvent::Collision { .. } => lights.push(self.light.set_alert()),
                        GameEvent::Restarted { .. } | GameEvent::Finished => {
                            lights.push(self.light.clear_override())
                        }
                        _ => {}
                    }
                }
                session.is_finished().then_some(AppPhase::Ending)
            }

            AppPhase::Ending => pressed.then_some(AppPhase::Intro { line: 0 }),
        };

        if let Some(difficulty) = start {
            lights.push(self.start_game(difficulty));
        } else if let Some(next) = next {
            self.enter(next);
        }

        Frame {
            scene: self.scene(now),
            lights,
        }
    }

    /// Power down the strip before the loop exits
    pub fn lights_off(&mut self) -> LightCommand {
        log::info!("Lights off");
        self.light.off()
    }

    fn start_game(&mut self, difficulty: Difficulty) -> LightCommand {
        let catalog = LevelCatalog::load(difficulty, &self.settings.level_dir);
        log::info!(
            "Starting {} game ({} levels from {})",
            difficulty.as_str(),
            catalog.len(),
            catalog.origin()
        );
        self.phase = AppPhase::Playing(Box::new(GameSession::new(catalog)));
        self.light.clear_override()
    }

    fn enter(&mut self, next: AppPhase) {
        match &next {
            AppPhase::Intro { .. } => log::info!("Back to intro"),
            AppPhase::Menu => log::info!("Intro done, showing menu"),
            AppPhase::Ending => log::info!("Game finished"),
            AppPhase::Playing(_) => {}
        }
        self.phase = next;
    }

    /// Render primitives for the current phase
    pub fn scene(&self, now: Timestamp) -> Scene {
        match &self.phase {
            AppPhase::Intro { line } => {
                let text = INTRO_LINES[(*line).min(INTRO_LINES.len() - 1)];
                text_block(text, INTRO_WRAP, 10, 20)
            }
            AppPhase::Menu => self.menu.scene(),
            AppPhase::Playing(session) => session.scene(now),
            AppPhase::Ending => text_block(ENDING_TEXT, ENDING_WRAP, 20, 15),
        }
    }
}

/// Word-wrapped text starting at (`x`, `y`)
fn text_block(text: &str, max_chars: usize, x: i32, y: i32) -> Scene {
    let mut scene = Scene::new();
    for (i, line) in wrap_text(text, max_chars).into_iter().enumerate() {
        scene.text(line, x, y + i as i32 * LINE_HEIGHT);
    }
    scene
}
