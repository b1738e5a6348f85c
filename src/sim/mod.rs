//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Time comes in as an argument, never read from a clock
//! - Stable iteration order (by obstacle slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod jump;
pub mod state;
pub mod tick;

pub use collision::{Hitbox, first_collision, obstacle_hitbox, player_hitbox};
pub use jump::{JumpArc, jump_height_at};
pub use state::{
    FINALE, GameEvent, GamePhase, GameSession, Obstacle, Player, finale_duration, finale_line,
};
pub use tick::{TickInput, tick};
