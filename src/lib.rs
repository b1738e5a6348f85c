//! Star Jump - handheld obstacle-jump game core
//!
//! Core modules:
//! - `sim`: Deterministic side-scroller (jump physics, obstacles, collisions, level flow)
//! - `input`: Quadrature encoder decoding and debounced button edges
//! - `motion`: Pickup detection and the ambient/alert light state machine
//! - `levels`: Level catalog with fallback loading and difficulty scaling
//! - `menu`: Difficulty selection
//! - `app`: Intro → menu → game → ending orchestration
//! - `render`: Display-agnostic render primitives
//! - `settings`: Device configuration

pub mod app;
pub mod error;
pub mod input;
pub mod levels;
pub mod menu;
pub mod motion;
pub mod render;
pub mod settings;
pub mod sim;

pub use app::{App, Frame, FrameInput};
pub use error::{CatalogError, SensorError, SettingsError};
pub use levels::{Difficulty, LevelCatalog};
pub use settings::Settings;

use std::time::Duration;

/// Monotonic time since boot. Every time-sensitive operation takes one explicitly.
pub type Timestamp = Duration;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Display dimensions (SSD1306, 128x64)
    pub const SCREEN_WIDTH: i32 = 128;
    pub const SCREEN_HEIGHT: i32 = 64;

    /// Player star sprite footprint
    pub const PLAYER_SIZE: f32 = 11.0;
    /// Player hitbox inset (horizontal, vertical)
    pub const PLAYER_INSET_X: f32 = 3.0;
    pub const PLAYER_INSET_Y: f32 = 2.0;

    /// Spaceship obstacle sprite footprint
    pub const OBSTACLE_WIDTH: f32 = 12.0;
    pub const OBSTACLE_HEIGHT: f32 = 8.0;
    /// Obstacle hitbox inset (horizontal, vertical)
    pub const OBSTACLE_INSET_X: f32 = 2.0;
    pub const OBSTACLE_INSET_Y: f32 = 1.0;

    /// Jump-capable obstacles take off while strictly inside this x range
    pub const OBSTACLE_JUMP_MIN_X: f32 = 60.0;
    pub const OBSTACLE_JUMP_MAX_X: f32 = 90.0;
    pub const OBSTACLE_JUMP_HEIGHT: f32 = 15.0;
    pub const OBSTACLE_JUMP_DURATION: u32 = 20;

    /// Cleared obstacles re-enter at `RECYCLE_BASE_X + active * RECYCLE_SPACING`
    pub const RECYCLE_BASE_X: f32 = 128.0;
    pub const RECYCLE_SPACING: f32 = 70.0;

    /// Index of the designed last level (the 10th)
    pub const FINAL_LEVEL_INDEX: usize = 9;

    /// Default obstacle speed when a level record omits it
    pub const DEFAULT_OBSTACLE_SPEED: f32 = 1.5;

    /// Demo autopilot jumps this many ticks before an obstacle reaches the player
    pub const AUTO_JUMP_LEAD_TICKS: f32 = 4.0;

    /// "GAME OVER" is held this long before the restart prompt appears
    pub const GAME_OVER_HOLD: Duration = Duration::from_millis(1800);
    /// "GOOD JOB!" hold, then a short pause before the next level starts
    pub const LEVEL_WON_HOLD: Duration = Duration::from_millis(2000);
    pub const LEVEL_WON_PAUSE: Duration = Duration::from_millis(500);
}

/// Progress through a countdown timer: 0.0 when `timer == duration`, 1.0 when `timer == 0`.
#[inline]
pub fn countdown_progress(timer: u32, duration: u32) -> f32 {
    if duration == 0 {
        return 1.0;
    }
    1.0 - timer as f32 / duration as f32
}
