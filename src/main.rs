//! Star Jump headless host
//!
//! Drives the game core the way the handheld's control loop does, against a
//! virtual clock: scripted button presses through the intro, encoder turns to
//! pick a difficulty, autopilot gameplay, and a seeded simulated
//! accelerometer. Light strip writes go to the log.
//!
//! Usage: `star-jump [easy|medium|hard] [seed]` (set `RUST_LOG=debug` for
//! every screen change).

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::path::Path;
    use std::time::Duration;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use star_jump::app::AppPhase;
    use star_jump::error::SensorError;
    use star_jump::input::Rotation;
    use star_jump::motion::{Accelerometer, LightStrip, Rgb};
    use star_jump::{App, Difficulty, FrameInput, Settings};

    const SETTINGS_PATH: &str = "star_jump.json";
    const DEFAULT_SEED: u64 = 3035;
    /// Give up after this many loop iterations (about 50 minutes of device time)
    const MAX_FRAMES: u64 = 100_000;

    /// Quadrature phases in clockwise order
    const CLOCKWISE: [(bool, bool); 4] = [(true, true), (true, false), (false, false), (false, true)];

    /// Resting device with the occasional pickup
    struct SimulatedAccelerometer {
        rng: Pcg32,
        pickup_frames: u32,
    }

    impl SimulatedAccelerometer {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                pickup_frames: 0,
            }
        }
    }

    impl Accelerometer for SimulatedAccelerometer {
        fn acceleration(&mut self) -> Result<[f32; 3], SensorError> {
            if self.rng.random_bool(0.001) {
                return Err(SensorError::ReadFailed("simulated bus NACK".to_string()));
            }

            if self.pickup_frames == 0 && self.rng.random_bool(0.004) {
                self.pickup_frames = self.rng.random_range(10..60);
                log::debug!("Simulated pickup for {} frames", self.pickup_frames);
            }

            let noise = |rng: &mut Pcg32| rng.random_range(-0.4f32..0.4);
            if self.pickup_frames > 0 {
                self.pickup_frames -= 1;
                Ok([
                    self.rng.random_range(-6.0f32..6.0),
                    self.rng.random_range(-6.0f32..6.0),
                    self.rng.random_range(8.5f32..12.0),
                ])
            } else {
                Ok([noise(&mut self.rng), noise(&mut self.rng), 1.0 + noise(&mut self.rng)])
            }
        }
    }

    /// Light strip that logs every latched colour
    struct LogStrip {
        pixels: Vec<Rgb>,
    }

    impl LogStrip {
        fn new(pixel_count: usize) -> Self {
            Self {
                pixels: vec![Rgb::OFF; pixel_count],
            }
        }
    }

    impl LightStrip for LogStrip {
        fn fill(&mut self, color: Rgb) {
            self.pixels.fill(color);
        }

        fn show(&mut self) {
            if let Some(Rgb { r, g, b }) = self.pixels.first() {
                log::info!("Strip: {} px ({r}, {g}, {b})", self.pixels.len());
            }
        }
    }

    /// Scripted hands on the controls
    struct Driver {
        target: usize,
        input: FrameInput,
    }

    impl Driver {
        fn new(target: Difficulty) -> Self {
            Self {
                target: Difficulty::ALL.iter().position(|d| *d == target).unwrap_or(0),
                input: FrameInput::default(),
            }
        }

        fn toggle_button(&mut self) {
            self.input.button_level = !self.input.button_level;
        }

        fn release_button(&mut self) {
            self.input.button_level = true;
        }

        fn turn(&mut self, rotation: Rotation) {
            let current = (self.input.phase_a, self.input.phase_b);
            let index = CLOCKWISE.iter().position(|p| *p == current).unwrap_or(0);
            let next = match rotation {
                Rotation::Clockwise => (index + 1) % CLOCKWISE.len(),
                Rotation::CounterClockwise => (index + CLOCKWISE.len() - 1) % CLOCKWISE.len(),
            };
            (self.input.phase_a, self.input.phase_b) = CLOCKWISE[next];
        }

        /// Pin levels for the next frame given what is on screen
        fn next(&mut self, app: &App) -> FrameInput {
            match app.phase() {
                AppPhase::Intro { .. } | AppPhase::Ending => self.toggle_button(),
                AppPhase::Menu => {
                    let selected = app.menu().selected_index();
                    if !self.input.button_level {
                        self.release_button();
                    } else if selected < self.target {
                        self.turn(Rotation::Clockwise);
                    } else if selected > self.target {
                        self.turn(Rotation::CounterClockwise);
                    } else {
                        self.toggle_button();
                    }
                }
                AppPhase::Playing(session) => {
                    if session.is_game_over() {
                        self.toggle_button();
                    } else {
                        self.release_button();
                    }
                }
            }
            self.input
        }
    }

    fn parse_args() -> (Difficulty, u64) {
        let mut args = std::env::args().skip(1);

        let difficulty = match args.next() {
            Some(name) => Difficulty::from_name(&name).unwrap_or_else(|| {
                log::warn!("Unknown difficulty {name:?}, using Easy");
                Difficulty::Easy
            }),
            None => Difficulty::Easy,
        };

        let seed = match args.next() {
            Some(s) => s.parse().unwrap_or_else(|_| {
                log::warn!("Invalid seed {s:?}, using {DEFAULT_SEED}");
                DEFAULT_SEED
            }),
            None => DEFAULT_SEED,
        };

        (difficulty, seed)
    }

    pub fn run() {
        env_logger::init();
        log::info!("Star Jump (headless) starting...");

        let (difficulty, seed) = parse_args();
        let settings = Settings::load(Path::new(SETTINGS_PATH));
        let frame_interval = settings.frame_interval();
        log::info!(
            "Difficulty {}, sensor seed {seed}, frame interval {frame_interval:?}",
            difficulty.as_str()
        );

        let mut sensor = SimulatedAccelerometer::new(seed);
        let mut strip = LogStrip::new(settings.pixel_count);
        let mut driver = Driver::new(difficulty);

        let mut now = Duration::ZERO;
        let mut app = App::new(settings.clone(), &driver.input, &mut sensor, now);
        app.set_auto_jump(true);

        let mut last_text = Vec::new();
        let mut levels_won = 0u32;
        let mut game_overs = 0u32;

        for frame_index in 0..MAX_FRAMES {
            now += frame_interval;

            let mut input = driver.next(&app);
            input.accel = match sensor.acceleration() {
                Ok(sample) => Some(sample),
                Err(e) => {
                    log::debug!("{e}");
                    None
                }
            };

            let was_running = app.session().is_some_and(|s| s.is_running());
            let frame = app.step(&input, now);

            for command in &frame.lights {
                strip.fill(settings.color_for(*command));
                strip.show();
            }

            if let Some(session) = app.session() {
                if was_running && session.is_game_over() {
                    game_overs += 1;
                } else if was_running && !session.is_running() {
                    levels_won += 1;
                }
            }

            let text: Vec<String> = frame.scene.text.iter().map(|l| l.text.clone()).collect();
            if text != last_text {
                log::debug!("[{:>8.2}s] {}", now.as_secs_f32(), text.join(" | "));
                last_text = text;
            }

            if matches!(app.phase(), AppPhase::Ending) {
                log::info!("Reached the ending after {} frames", frame_index + 1);
                break;
            }
        }

        strip.fill(settings.color_for(app.lights_off()));
        strip.show();

        println!(
            "{}: {levels_won} levels cleared, {game_overs} game overs, {:.1}s of device time",
            difficulty.as_str(),
            now.as_secs_f32()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    host::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core has no browser front end; nothing to run here
}
