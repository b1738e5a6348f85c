//! Parabolic jump profile
//!
//! A jump is a countdown of `duration` ticks. Height follows
//! `h(p) = height * (1 - (2p - 1)^2)` where `p` runs 0 → 1 over the jump:
//! zero at take-off and landing, `height` at the midpoint.

use crate::countdown_progress;

/// Height of a jump at `progress` (0.0 - 1.0)
#[inline]
pub fn jump_height_at(progress: f32, height: f32) -> f32 {
    let centered = 2.0 * progress - 1.0;
    height * (1.0 - centered * centered)
}

/// A running or idle jump shared by the player and jump-capable obstacles
#[derive(Debug, Clone, PartialEq)]
pub struct JumpArc {
    pub height: f32,
    /// Ticks from take-off to landing
    pub duration: u32,
    timer: u32,
    active: bool,
}

impl JumpArc {
    pub fn new(height: f32, duration: u32) -> Self {
        Self {
            height,
            duration,
            timer: 0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Remaining ticks
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Take off (no-op for a zero-length jump)
    pub fn start(&mut self) {
        if self.duration == 0 {
            return;
        }
        self.active = true;
        self.timer = self.duration;
    }

    /// Back on the ground
    pub fn reset(&mut self) {
        self.active = false;
        self.timer = 0;
    }

    /// Advance one tick and return the height to draw this tick
    pub fn advance(&mut self) -> f32 {
        if !self.active {
            return 0.0;
        }

        let height = jump_height_at(countdown_progress(self.timer, self.duration), self.height);
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.active = false;
            return 0.0;
        }
        height
    }
}
