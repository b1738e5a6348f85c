//! Debounced push button with a single press edge per frame
//!
//! The switch is wired active-low with a pull-up: a low level means pressed.
//! One `Button` is sampled once per loop iteration and then read by whoever
//! needs the edge (menu, game, orchestrator), so a press can never be seen
//! twice or missed between two separate edge checks.

use std::time::Duration;

use crate::Timestamp;

#[derive(Debug, Clone)]
pub struct Button {
    pressed: bool,
    just_pressed: bool,
    last_change: Option<Timestamp>,
    debounce: Duration,
}

impl Button {
    /// A released button
    pub fn new(debounce: Duration) -> Self {
        Self {
            pressed: false,
            just_pressed: false,
            last_change: None,
            debounce,
        }
    }

    /// Feed the raw pin level for this frame (`false` = pulled low = pressed)
    pub fn sample(&mut self, raw_level: bool, now: Timestamp) {
        self.just_pressed = false;

        let pressed = !raw_level;
        if pressed == self.pressed {
            return;
        }

        if let Some(last) = self.last_change
            && now.saturating_sub(last) < self.debounce
        {
            return;
        }

        self.pressed = pressed;
        self.last_change = Some(now);
        self.just_pressed = pressed;
    }

    /// Released → pressed edge accepted in the latest sample
    pub fn just_pressed(&self) -> bool {
        self.just_pressed
    }

    /// Debounced level
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
