//! Quadrature rotary encoder decoding
//!
//! The two phases walk a Gray-code cycle, one bit changing per detent edge:
//!
//! ```text
//! CW:  11 → 10 → 00 → 01 → 11
//! CCW: 11 → 01 → 00 → 10 → 11
//! ```
//!
//! A pair that changes both bits at once cannot be attributed to a direction
//! and is dropped as noise.

use std::time::Duration;

use crate::Timestamp;

/// Direction of a single valid phase transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Signed unit step for this direction
    pub fn step(self) -> i32 {
        match self {
            Rotation::Clockwise => 1,
            Rotation::CounterClockwise => -1,
        }
    }
}

/// Packed phase pair, A in bit 1 and B in bit 0
#[inline]
fn pack(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | b as u8
}

/// Classify a previous → current phase pair
///
/// Returns `None` for "no change" and for every pair outside the two tables.
pub fn classify_transition(prev: (bool, bool), now: (bool, bool)) -> Option<Rotation> {
    match (pack(prev.0, prev.1), pack(now.0, now.1)) {
        (0b11, 0b10) | (0b10, 0b00) | (0b00, 0b01) | (0b01, 0b11) => Some(Rotation::Clockwise),
        (0b11, 0b01) | (0b01, 0b00) | (0b00, 0b10) | (0b10, 0b11) => {
            Some(Rotation::CounterClockwise)
        }
        _ => None,
    }
}

/// Debounced quadrature decoder with a step accumulator
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    phase_a: bool,
    phase_b: bool,
    last_transition_time: Timestamp,
    debounce: Duration,
    /// Signed steps since the last poll
    pending: i32,
}

impl QuadratureDecoder {
    /// Seed the decoder with the phase levels read at startup
    pub fn new(phase_a: bool, phase_b: bool, now: Timestamp, debounce: Duration) -> Self {
        Self {
            phase_a,
            phase_b,
            last_transition_time: now,
            debounce,
            pending: 0,
        }
    }

    /// Feed the current phase levels (call every loop iteration)
    pub fn update(&mut self, raw_a: bool, raw_b: bool, now: Timestamp) {
        if (raw_a, raw_b) == (self.phase_a, self.phase_b) {
            return;
        }

        // Too soon after the last accepted edge: drop it entirely, the next
        // sample is compared against the same previous pair.
        if now.saturating_sub(self.last_transition_time) < self.debounce {
            return;
        }

        let prev = (self.phase_a, self.phase_b);
        self.phase_a = raw_a;
        self.phase_b = raw_b;
        self.last_transition_time = now;

        if let Some(rotation) = classify_transition(prev, (raw_a, raw_b)) {
            self.pending = self.pending.saturating_add(rotation.step());
        }
    }

    /// Drain the accumulated steps since the last poll
    ///
    /// Polled once per frame this is almost always -1, 0 or +1; larger sums
    /// are returned as-is, saturated to the `i8` range.
    pub fn poll_step(&mut self) -> i8 {
        let steps = self.pending.clamp(i8::MIN as i32, i8::MAX as i32) as i8;
        self.pending = 0;
        steps
    }

    /// Last accepted phase pair
    pub fn phases(&self) -> (bool, bool) {
        (self.phase_a, self.phase_b)
    }
}
