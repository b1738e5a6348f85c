//! Device settings
//!
//! Read once at boot from a JSON file next to the level data. Every field has
//! a default matching the reference hardware, so a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::motion::{LightCommand, Rgb};

/// Device tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Input ===
    /// Minimum spacing between accepted encoder transitions
    pub encoder_debounce_ms: u64,
    /// Minimum spacing between accepted button level changes
    pub button_debounce_ms: u64,

    // === Pickup light ===
    /// Acceleration threshold (sensor units) for "picked up"
    pub pickup_threshold: f32,
    /// How long the ambient light stays on after the last pickup
    pub hold_duration_secs: f32,
    /// Ambient colour while held
    pub ambient_color: Rgb,
    /// Game-over colour
    pub alert_color: Rgb,
    /// Strip brightness (0.0 - 1.0)
    pub brightness: f32,
    /// Number of pixels on the strip
    pub pixel_count: usize,

    // === Loop ===
    /// Sleep between control loop iterations
    pub frame_interval_ms: u64,

    // === Data ===
    /// Directory holding `levels.json` and the difficulty variants
    pub level_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            encoder_debounce_ms: 3,
            button_debounce_ms: 20,

            pickup_threshold: 8.0,
            hold_duration_secs: 2.0,
            ambient_color: Rgb::new(0, 0, 100),
            alert_color: Rgb::new(255, 0, 0),
            brightness: 0.3,
            pixel_count: 8,

            frame_interval_ms: 30,

            level_dir: PathBuf::from("levels"),
        }
    }
}

impl Settings {
    pub fn encoder_debounce(&self) -> Duration {
        Duration::from_millis(self.encoder_debounce_ms)
    }

    pub fn button_debounce(&self) -> Duration {
        Duration::from_millis(self.button_debounce_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Hold window for the pickup light (negative or NaN values collapse to zero)
    pub fn hold_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.hold_duration_secs).unwrap_or(Duration::ZERO)
    }

    /// Brightness clamped to the strip's valid range
    pub fn effective_brightness(&self) -> f32 {
        if self.brightness.is_nan() {
            return 0.0;
        }
        self.brightness.clamp(0.0, 1.0)
    }

    /// Colour to fill the strip with for a light command, brightness applied
    pub fn color_for(&self, command: LightCommand) -> Rgb {
        let base = match command {
            LightCommand::Off => Rgb::OFF,
            LightCommand::Ambient => self.ambient_color,
            LightCommand::Alert => self.alert_color,
        };
        base.scaled(self.effective_brightness())
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a file
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read settings from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "brightness": 0.5, "pixel_count": 1 }"#).unwrap();
        assert_eq!(settings.pixel_count, 1);
        assert!((settings.brightness - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.encoder_debounce(), Duration::from_millis(3));
        assert_eq!(settings.hold_duration(), Duration::from_secs(2));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{ brightness: }"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load(Path::new("definitely/not/here.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_color_for_applies_brightness() {
        let settings = Settings {
            brightness: 2.0,
            ..Settings::default()
        };
        // Clamped to full brightness
        assert_eq!(settings.color_for(LightCommand::Alert), Rgb::new(255, 0, 0));
        assert_eq!(settings.color_for(LightCommand::Off), Rgb::OFF);

        let dim = Settings {
            brightness: 0.5,
            ..Settings::default()
        };
        assert_eq!(dim.color_for(LightCommand::Ambient), Rgb::new(0, 0, 50));
    }

    #[test]
    fn test_negative_hold_is_zero() {
        let settings = Settings {
            hold_duration_secs: -1.0,
            ..Settings::default()
        };
        assert_eq!(settings.hold_duration(), Duration::ZERO);
    }
}
