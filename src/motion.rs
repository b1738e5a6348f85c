//! Pickup detection and the ambient light state machine
//!
//! The accelerometer is classified every frame; a positive reading keeps the
//! strip lit for a hold window after the last one. The game can force the
//! strip to the alert colour with a manual override, during which the ambient
//! logic stays out of the way entirely.
//!
//! ```text
//!          moving             (now - last_pickup) >= hold
//!   Idle ──────────▶ Held ────────────────────────────────▶ Idle
//!
//!   set_alert(): override on, strip → alert, tick() is a no-op
//!   clear_override(): override off, strip → off, back to Idle
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Timestamp;
use crate::error::SensorError;

/// An RGB colour for the light strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `factor` (0.0 - 1.0)
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * f).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// What the strip should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    Off,
    /// Device is being held
    Ambient,
    /// Game over
    Alert,
}

/// Addressable LED strip sink (fill the whole strip, then latch)
pub trait LightStrip {
    fn fill(&mut self, color: Rgb);
    fn show(&mut self);
}

/// 3-axis accelerometer
pub trait Accelerometer {
    fn acceleration(&mut self) -> Result<[f32; 3], SensorError>;
}

/// Classifies acceleration samples as "picked up" or "at rest"
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    threshold: f32,
    available: bool,
}

impl MotionClassifier {
    pub fn new(threshold: f32, available: bool) -> Self {
        Self {
            threshold,
            available,
        }
    }

    /// A classifier for a device with no accelerometer: never moving
    pub fn unavailable(threshold: f32) -> Self {
        Self::new(threshold, false)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// True if the total magnitude or the z component alone exceeds the threshold
    pub fn classify(&self, ax: f32, ay: f32, az: f32) -> bool {
        if !self.available {
            return false;
        }
        let magnitude = (ax * ax + ay * ay + az * az).sqrt();
        magnitude > self.threshold || az > self.threshold
    }

    /// Classify an optional sample (`None` = no reading this frame)
    pub fn classify_sample(&self, sample: Option<[f32; 3]>) -> bool {
        sample.is_some_and(|[x, y, z]| self.classify(x, y, z))
    }

    /// Read the sensor and classify
    ///
    /// `Unavailable` disables the classifier for the rest of the session;
    /// a failed read just counts as "not moving".
    pub fn probe(&mut self, sensor: &mut dyn Accelerometer) -> bool {
        if !self.available {
            return false;
        }
        match sensor.acceleration() {
            Ok([x, y, z]) => self.classify(x, y, z),
            Err(SensorError::Unavailable) => {
                log::warn!("No accelerometer found, pickup light disabled");
                self.available = false;
                false
            }
            Err(e) => {
                log::debug!("{e}");
                false
            }
        }
    }
}

/// Edge-triggered ambient light with a manual override
#[derive(Debug, Clone)]
pub struct AmbientLight {
    is_picked_up: bool,
    manual_override: bool,
    last_pickup_time: Option<Timestamp>,
    hold_duration: Duration,
}

impl AmbientLight {
    pub fn new(hold_duration: Duration) -> Self {
        Self {
            is_picked_up: false,
            manual_override: false,
            last_pickup_time: None,
            hold_duration,
        }
    }

    /// Advance the hold window; returns a command only when the state flips
    pub fn tick(&mut self, is_moving: bool, now: Timestamp) -> Option<LightCommand> {
        if self.manual_override {
            return None;
        }

        if is_moving {
            self.last_pickup_time = Some(now);
        }

        let should_be_on = self
            .last_pickup_time
            .is_some_and(|last| now.saturating_sub(last) < self.hold_duration);

        if should_be_on == self.is_picked_up {
            return None;
        }

        self.is_picked_up = should_be_on;
        if should_be_on {
            log::debug!("Picked up");
            Some(LightCommand::Ambient)
        } else {
            log::debug!("At rest");
            Some(LightCommand::Off)
        }
    }

    /// Force the alert colour and freeze the ambient logic
    pub fn set_alert(&mut self) -> LightCommand {
        self.manual_override = true;
        LightCommand::Alert
    }

    /// Release the override; the strip goes dark and the next `tick` decides
    pub fn clear_override(&mut self) -> LightCommand {
        self.manual_override = false;
        self.is_picked_up = false;
        LightCommand::Off
    }

    /// Shutdown: strip dark and the last pickup forgotten; the override is untouched
    pub fn off(&mut self) -> LightCommand {
        self.is_picked_up = false;
        self.last_pickup_time = None;
        LightCommand::Off
    }

    pub fn is_picked_up(&self) -> bool {
        self.is_picked_up
    }

    pub fn is_overridden(&self) -> bool {
        self.manual_override
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HOLD: Duration = Duration::from_secs(2);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct FakeSensor(Result<[f32; 3], SensorError>);

    impl Accelerometer for FakeSensor {
        fn acceleration(&mut self) -> Result<[f32; 3], SensorError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_classify_thresholds() {
        let classifier = MotionClassifier::new(8.0, true);
        assert!(!classifier.classify(0.0, 0.0, 8.0));
        assert!(classifier.classify(0.0, 0.0, 8.01));
        assert!(classifier.classify(6.0, 6.0, 0.0)); // |v| ≈ 8.49
        assert!(!classifier.classify(4.0, 4.0, 4.0)); // |v| ≈ 6.93
        assert!(classifier.classify(0.0, 0.0, -9.0)); // magnitude still counts
    }

    #[test]
    fn test_unavailable_never_moves() {
        let classifier = MotionClassifier::unavailable(8.0);
        assert!(!classifier.classify(100.0, 100.0, 100.0));
        assert!(!classifier.classify_sample(Some([0.0, 0.0, 50.0])));
    }

    #[test]
    fn test_probe_degrades_permanently() {
        let mut classifier = MotionClassifier::new(8.0, true);
        let mut missing = FakeSensor(Err(SensorError::Unavailable));
        assert!(!classifier.probe(&mut missing));
        assert!(!classifier.is_available());

        let mut present = FakeSensor(Ok([0.0, 0.0, 20.0]));
        assert!(!classifier.probe(&mut present));
    }

    #[test]
    fn test_probe_transient_failure() {
        let mut classifier = MotionClassifier::new(8.0, true);
        let mut flaky = FakeSensor(Err(SensorError::ReadFailed("nack".into())));
        assert!(!classifier.probe(&mut flaky));
        assert!(classifier.is_available());

        let mut ok = FakeSensor(Ok([0.0, 0.0, 20.0]));
        assert!(classifier.probe(&mut ok));
    }

    #[test]
    fn test_light_starts_off() {
        let mut light = AmbientLight::new(HOLD);
        assert_eq!(light.tick(false, ms(0)), None);
        assert_eq!(light.tick(false, ms(500)), None);
        assert!(!light.is_picked_up());
    }

    #[test]
    fn test_hold_window() {
        let mut light = AmbientLight::new(HOLD);
        assert_eq!(light.tick(true, ms(1000)), Some(LightCommand::Ambient));
        // Edge-triggered: no repeat while held
        assert_eq!(light.tick(true, ms(1050)), None);
        assert_eq!(light.tick(false, ms(2000)), None);
        assert_eq!(light.tick(false, ms(3049)), None);
        assert!(light.is_picked_up());
        // Exactly last_pickup + hold turns it off
        assert_eq!(light.tick(false, ms(3050)), Some(LightCommand::Off));
        assert!(!light.is_picked_up());
    }

    #[test]
    fn test_override_freezes_light() {
        let mut light = AmbientLight::new(HOLD);
        assert_eq!(light.set_alert(), LightCommand::Alert);
        assert_eq!(light.tick(true, ms(100)), None);
        assert!(!light.is_picked_up());

        assert_eq!(light.clear_override(), LightCommand::Off);
        assert!(!light.is_overridden());
        // Pickups during the override were not recorded
        assert_eq!(light.tick(false, ms(200)), None);
        assert_eq!(light.tick(true, ms(300)), Some(LightCommand::Ambient));
    }

    #[test]
    fn test_clear_override_while_held_rearms() {
        let mut light = AmbientLight::new(HOLD);
        light.tick(true, ms(0));
        light.set_alert();
        light.clear_override();
        // Still inside the hold window of the earlier pickup: back on
        assert_eq!(light.tick(false, ms(100)), Some(LightCommand::Ambient));
    }

    #[test]
    fn test_off_stays_dark() {
        let mut light = AmbientLight::new(HOLD);
        light.tick(true, ms(0));
        assert_eq!(light.off(), LightCommand::Off);
        assert!(!light.is_picked_up());
        // The earlier pickup no longer holds the light on
        assert_eq!(light.tick(false, ms(100)), None);

        light.set_alert();
        assert_eq!(light.off(), LightCommand::Off);
        assert!(light.is_overridden());
    }

    #[test]
    fn test_rgb_scaled() {
        assert_eq!(Rgb::new(255, 0, 100).scaled(0.3), Rgb::new(77, 0, 30));
        assert_eq!(Rgb::new(10, 20, 30).scaled(-1.0), Rgb::OFF);
    }

    proptest! {
        #[test]
        fn prop_below_threshold_is_at_rest(x in -4.6f32..4.6, y in -4.6f32..4.6, z in -4.6f32..4.6) {
            // |v| <= sqrt(3) * 4.6 < 8
            let classifier = MotionClassifier::new(8.0, true);
            prop_assert!(!classifier.classify(x, y, z));
        }

        #[test]
        fn prop_override_blocks_every_tick(
            moves in proptest::collection::vec(any::<bool>(), 1..50),
        ) {
            let mut light = AmbientLight::new(HOLD);
            light.set_alert();
            for (i, moving) in moves.into_iter().enumerate() {
                prop_assert_eq!(light.tick(moving, ms(i as u64 * 30)), None);
                prop_assert!(!light.is_picked_up());
            }
        }
    }
}
