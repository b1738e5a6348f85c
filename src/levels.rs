//! Level catalog
//!
//! Levels are read from JSON with an ordered fallback chain:
//! 1. `levels_<difficulty>.json` (medium/hard only)
//! 2. `levels.json`
//! 3. A built-in one-level tutorial
//!
//! The first source that parses and validates wins, so the game is always
//! playable. Difficulty scaling is applied once here, never per tick.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_OBSTACLE_SPEED, FINAL_LEVEL_INDEX};
use crate::error::CatalogError;

/// Menu difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Obstacle speed multiplier applied to sources not tuned for this difficulty
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.3,
            Difficulty::Hard => 1.6,
        }
    }

    /// Whether every obstacle in a multi-obstacle level learns to jump
    pub fn jumping_obstacles(&self) -> bool {
        matches!(self, Difficulty::Hard)
    }

    /// Dedicated level file name, if this difficulty has one
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            Difficulty::Easy => None,
            Difficulty::Medium => Some("levels_medium.json"),
            Difficulty::Hard => Some("levels_hard.json"),
        }
    }
}

fn default_speed() -> f32 {
    DEFAULT_OBSTACLE_SPEED
}

/// Integer fields that accept any JSON number (`20` and `20.0` alike)
///
/// Fractional values round to the nearest integer; out-of-range values are
/// a parse error.
mod whole {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    fn rounded<E: Error>(value: f64, min: f64, max: f64) -> Result<f64, E> {
        let v = value.round();
        if !v.is_finite() || v < min || v > max {
            return Err(E::custom(format!("{value} is out of range {min}..={max}")));
        }
        Ok(v)
    }

    pub fn to_i32<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
        let v = rounded::<D::Error>(f64::deserialize(d)?, i32::MIN as f64, i32::MAX as f64)?;
        Ok(v as i32)
    }

    pub fn to_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let v = rounded::<D::Error>(f64::deserialize(d)?, 0.0, u32::MAX as f64)?;
        Ok(v as u32)
    }

    pub fn to_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Option::<f64>::deserialize(d)?
            .map(|value| rounded(value, 0.0, u32::MAX as f64).map(|v| v as u32))
            .transpose()
    }
}

/// One obstacle as written in a level file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// Starting x (device pixels, usually at or past the right edge)
    pub x: f32,
    /// Pixels per tick
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Hops when it gets close to the player
    #[serde(default)]
    pub jumping: bool,
    /// Vertical offset from the ground lane (negative is higher)
    #[serde(default, deserialize_with = "whole::to_i32")]
    pub y_offset: i32,
}

/// A level as written in a level file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// 1-based level number shown on screen
    #[serde(deserialize_with = "whole::to_u32")]
    pub level: u32,
    pub name: String,
    pub obstacles: Vec<ObstacleSpec>,
    /// Overrides the player's jump height for this level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_height: Option<f32>,
    /// Overrides the player's jump duration (ticks) for this level
    #[serde(
        default,
        deserialize_with = "whole::to_opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub jump_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Player/world parameters shared by every level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub jump_height: f32,
    /// Ticks from take-off to landing
    #[serde(deserialize_with = "whole::to_u32")]
    pub jump_duration: u32,
    /// Player's resting top edge
    #[serde(deserialize_with = "whole::to_i32")]
    pub ground_y: i32,
    #[serde(deserialize_with = "whole::to_i32")]
    pub player_x: i32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            jump_height: 28.0,
            jump_duration: 40,
            ground_y: 50,
            player_x: 10,
        }
    }
}

/// Top-level level file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub levels: Vec<LevelDefinition>,
    #[serde(default)]
    pub game_settings: GameSettings,
}

impl LevelFile {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: LevelFile = serde_json::from_str(json)?;
        file.validate()?;
        Ok(file)
    }

    /// The always-available single tutorial level
    pub fn tutorial() -> Self {
        Self {
            levels: vec![LevelDefinition {
                level: 1,
                name: "Tutorial".to_string(),
                obstacles: vec![ObstacleSpec {
                    x: 128.0,
                    speed: DEFAULT_OBSTACLE_SPEED,
                    jumping: false,
                    y_offset: 0,
                }],
                jump_height: None,
                jump_duration: None,
                message: Some("Jump over 1 spaceship!".to_string()),
            }],
            game_settings: GameSettings {
                jump_height: 28.0,
                jump_duration: 20,
                ground_y: 50,
                player_x: 10,
            },
        }
    }

    /// Reject data the engine cannot play
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |msg: String| Err(CatalogError::Invalid(msg));

        if self.levels.is_empty() {
            return invalid("no levels".into());
        }
        check_jump(
            "game_settings",
            Some(self.game_settings.jump_height),
            Some(self.game_settings.jump_duration),
        )?;

        for level in &self.levels {
            let label = format!("level {} ({})", level.level, level.name);
            if level.obstacles.is_empty() {
                return invalid(format!("{label} has no obstacles"));
            }
            check_jump(&label, level.jump_height, level.jump_duration)?;
            for (i, obs) in level.obstacles.iter().enumerate() {
                if !obs.x.is_finite() {
                    return invalid(format!("{label} obstacle {i} has a non-finite x"));
                }
                if !obs.speed.is_finite() || obs.speed <= 0.0 {
                    return invalid(format!("{label} obstacle {i} speed {} must be > 0", obs.speed));
                }
            }
        }
        Ok(())
    }
}

fn check_jump(label: &str, height: Option<f32>, duration: Option<u32>) -> Result<(), CatalogError> {
    if let Some(h) = height
        && (!h.is_finite() || h < 0.0)
    {
        return Err(CatalogError::Invalid(format!("{label} jump_height {h} must be >= 0")));
    }
    if duration == Some(0) {
        return Err(CatalogError::Invalid(format!("{label} jump_duration must be > 0")));
    }
    Ok(())
}

/// One tier of the loading chain
pub trait LevelSource {
    /// Human-readable name for logs
    fn describe(&self) -> String;

    fn load(&self) -> Result<LevelFile, CatalogError>;

    /// Difficulty this source was authored for (skips runtime scaling)
    fn tuned_for(&self) -> Option<Difficulty> {
        None
    }
}

/// A level file on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
    pub tuned_for: Option<Difficulty>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tuned_for: None,
        }
    }

    pub fn tuned(path: impl Into<PathBuf>, difficulty: Difficulty) -> Self {
        Self {
            path: path.into(),
            tuned_for: Some(difficulty),
        }
    }
}

impl LevelSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<LevelFile, CatalogError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.describe(),
            source,
        })?;
        LevelFile::from_json(&json)
    }

    fn tuned_for(&self) -> Option<Difficulty> {
        self.tuned_for
    }
}

/// Level JSON already in memory
#[derive(Debug, Clone)]
pub struct JsonSource {
    pub name: String,
    pub json: String,
    pub tuned_for: Option<Difficulty>,
}

impl JsonSource {
    pub fn new(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json: json.into(),
            tuned_for: None,
        }
    }
}

impl LevelSource for JsonSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<LevelFile, CatalogError> {
        LevelFile::from_json(&self.json)
    }

    fn tuned_for(&self) -> Option<Difficulty> {
        self.tuned_for
    }
}

/// The built-in tutorial; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTutorial;

impl LevelSource for BuiltinTutorial {
    fn describe(&self) -> String {
        "built-in tutorial".to_string()
    }

    fn load(&self) -> Result<LevelFile, CatalogError> {
        Ok(LevelFile::tutorial())
    }
}

/// Ordered, immutable levels for one game at one difficulty
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
    settings: GameSettings,
    difficulty: Difficulty,
    origin: String,
}

impl LevelCatalog {
    /// Load with the standard chain rooted at `dir`
    pub fn load(difficulty: Difficulty, dir: &Path) -> Self {
        let mut sources: Vec<Box<dyn LevelSource>> = Vec::with_capacity(3);
        if let Some(name) = difficulty.file_name() {
            sources.push(Box::new(FileSource::tuned(dir.join(name), difficulty)));
        }
        sources.push(Box::new(FileSource::new(dir.join("levels.json"))));
        sources.push(Box::new(BuiltinTutorial));
        Self::load_chain(difficulty, &sources)
    }

    /// Try each source in order; the first success wins
    pub fn load_chain(difficulty: Difficulty, sources: &[Box<dyn LevelSource>]) -> Self {
        for (tier, source) in sources.iter().enumerate() {
            match source.load() {
                Ok(file) => {
                    let tuned = source.tuned_for() == Some(difficulty);
                    let catalog = Self::from_file(difficulty, file, tuned, source.describe());
                    log::info!(
                        "Loaded {} levels from {} ({} mode)",
                        catalog.len(),
                        catalog.origin,
                        difficulty.as_str()
                    );
                    return catalog;
                }
                Err(e) => {
                    log::warn!("Level source {} ({}) unusable: {e}", tier + 1, source.describe());
                }
            }
        }

        log::warn!("All level sources failed, using built-in tutorial");
        Self::from_file(
            difficulty,
            LevelFile::tutorial(),
            false,
            BuiltinTutorial.describe(),
        )
    }

    /// Build a catalog, applying difficulty scaling unless the data was authored for it
    pub fn from_file(difficulty: Difficulty, file: LevelFile, tuned: bool, origin: String) -> Self {
        let LevelFile {
            mut levels,
            game_settings,
        } = file;

        if !tuned {
            let multiplier = difficulty.speed_multiplier();
            for level in &mut levels {
                let multi = level.obstacles.len() > 1;
                for obs in &mut level.obstacles {
                    obs.speed *= multiplier;
                    if difficulty.jumping_obstacles() && multi {
                        obs.jumping = true;
                    }
                }
            }
        }

        Self {
            levels,
            settings: game_settings,
            difficulty,
            origin,
        }
    }

    /// Level at `index`; past the end clamps to the last level
    pub fn level(&self, index: usize) -> &LevelDefinition {
        let last = self.levels.len().saturating_sub(1);
        &self.levels[index.min(last)]
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Where the levels came from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Largest obstacle count of any level (sizes the engine's slot pool)
    pub fn max_obstacles(&self) -> usize {
        self.levels
            .iter()
            .map(|l| l.obstacles.len())
            .max()
            .unwrap_or(0)
    }

    /// Index of the level whose completion ends the game
    ///
    /// Fixed regardless of catalog length: a shorter catalog keeps replaying
    /// its last level (see `level`) until this index is cleared.
    pub fn final_index(&self) -> usize {
        FINAL_LEVEL_INDEX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LEVELS: &str = r#"{
        "levels": [
            { "level": 1, "name": "One", "obstacles": [{ "x": 128, "speed": 1.5 }] },
            { "level": 2, "name": "Two", "obstacles": [{ "x": 128, "speed": 2.0 }, { "x": 200 }],
              "jump_height": 30, "jump_duration": 18, "message": "go" }
        ],
        "game_settings": { "jump_height": 26, "jump_duration": 22, "ground_y": 48, "player_x": 12 }
    }"#;

    struct Failing;

    impl LevelSource for Failing {
        fn describe(&self) -> String {
            "failing".into()
        }

        fn load(&self) -> Result<LevelFile, CatalogError> {
            Err(CatalogError::Invalid("nope".into()))
        }
    }

    fn chain(sources: Vec<Box<dyn LevelSource>>, difficulty: Difficulty) -> LevelCatalog {
        LevelCatalog::load_chain(difficulty, &sources)
    }

    #[test]
    fn test_parse_defaults() {
        let file = LevelFile::from_json(TWO_LEVELS).unwrap();
        let second = &file.levels[1];
        assert!((second.obstacles[1].speed - 1.5).abs() < f32::EPSILON);
        assert!(!second.obstacles[1].jumping);
        assert_eq!(second.obstacles[1].y_offset, 0);
        assert_eq!(second.jump_duration, Some(18));
        assert_eq!(file.game_settings.ground_y, 48);
    }

    #[test]
    fn test_integer_fields_accept_json_floats() {
        let file = LevelFile::from_json(
            r#"{ "levels": [{ "level": 1.0, "name": "a", "jump_duration": 20.0,
                              "obstacles": [{ "x": 128, "y_offset": -2.0 }, { "x": 200, "y_offset": 2.6 }] }],
                 "game_settings": { "jump_duration": 18.0, "ground_y": 50.0, "player_x": 10 } }"#,
        )
        .unwrap();
        let level = &file.levels[0];
        assert_eq!(level.level, 1);
        assert_eq!(level.jump_duration, Some(20));
        assert_eq!(level.obstacles[0].y_offset, -2);
        assert_eq!(level.obstacles[1].y_offset, 3);
        assert_eq!(file.game_settings.jump_duration, 18);
        assert_eq!(file.game_settings.ground_y, 50);
    }

    #[test]
    fn test_negative_duration_falls_through_chain() {
        let json = r#"{ "levels": [{ "level": 1, "name": "a", "jump_duration": -4, "obstacles": [{ "x": 1 }] }] }"#;
        assert!(matches!(LevelFile::from_json(json), Err(CatalogError::Parse(_))));

        let catalog = chain(
            vec![Box::new(JsonSource::new("bad", json)), Box::new(BuiltinTutorial)],
            Difficulty::Easy,
        );
        assert_eq!(catalog.origin(), "built-in tutorial");
    }

    #[test]
    fn test_missing_game_settings_use_defaults() {
        let file =
            LevelFile::from_json(r#"{ "levels": [{ "level": 1, "name": "a", "obstacles": [{ "x": 1 }] }] }"#)
                .unwrap();
        assert_eq!(file.game_settings, GameSettings::default());
    }

    #[test]
    fn test_validation_rejects_unplayable_data() {
        let cases = [
            r#"{ "levels": [] }"#,
            r#"{ "levels": [{ "level": 1, "name": "a", "obstacles": [] }] }"#,
            r#"{ "levels": [{ "level": 1, "name": "a", "obstacles": [{ "x": 1, "speed": 0 }] }] }"#,
            r#"{ "levels": [{ "level": 1, "name": "a", "obstacles": [{ "x": 1, "speed": -2 }] }] }"#,
            r#"{ "levels": [{ "level": 1, "name": "a", "jump_duration": 0, "obstacles": [{ "x": 1 }] }] }"#,
            r#"{ "levels": [{ "level": 1, "name": "a", "obstacles": [{ "x": 1 }] }],
                "game_settings": { "jump_height": -5 } }"#,
        ];
        for json in cases {
            assert!(
                matches!(LevelFile::from_json(json), Err(CatalogError::Invalid(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn test_malformed_is_parse_error() {
        assert!(matches!(
            LevelFile::from_json("{ \"levels\": [ { \"level\": "),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_first_success_wins() {
        let catalog = chain(
            vec![
                Box::new(Failing),
                Box::new(JsonSource::new("two", TWO_LEVELS)),
                Box::new(BuiltinTutorial),
            ],
            Difficulty::Easy,
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.origin(), "two");
        assert_eq!(catalog.settings().player_x, 12);
    }

    #[test]
    fn test_total_failure_falls_back_to_tutorial() {
        let catalog = chain(
            vec![Box::new(Failing), Box::new(JsonSource::new("bad", "not json"))],
            Difficulty::Easy,
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.level(0).name, "Tutorial");
        assert_eq!(catalog.settings().jump_duration, 20);
    }

    #[test]
    fn test_missing_directory_falls_back_to_tutorial() {
        let catalog = LevelCatalog::load(Difficulty::Medium, Path::new("no/such/dir"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.origin(), "built-in tutorial");
        // Fallback data is still scaled for medium
        assert!((catalog.level(0).obstacles[0].speed - 1.5 * 1.3).abs() < 1e-5);
    }

    #[test]
    fn test_hard_scales_and_adds_jumpers() {
        let catalog = chain(vec![Box::new(JsonSource::new("two", TWO_LEVELS))], Difficulty::Hard);
        let one = catalog.level(0);
        assert!((one.obstacles[0].speed - 1.5 * 1.6).abs() < 1e-5);
        // Single-obstacle levels stay grounded
        assert!(!one.obstacles[0].jumping);

        let two = catalog.level(1);
        assert!((two.obstacles[0].speed - 2.0 * 1.6).abs() < 1e-5);
        assert!((two.obstacles[1].speed - 1.5 * 1.6).abs() < 1e-5);
        assert!(two.obstacles.iter().all(|o| o.jumping));
    }

    #[test]
    fn test_tuned_source_is_not_scaled() {
        let tuned = JsonSource {
            tuned_for: Some(Difficulty::Hard),
            ..JsonSource::new("hard", TWO_LEVELS)
        };
        let catalog = chain(vec![Box::new(tuned)], Difficulty::Hard);
        assert!((catalog.level(1).obstacles[0].speed - 2.0).abs() < f32::EPSILON);
        assert!(!catalog.level(1).obstacles[1].jumping);
    }

    #[test]
    fn test_level_index_clamps() {
        let catalog = chain(vec![Box::new(JsonSource::new("two", TWO_LEVELS))], Difficulty::Easy);
        assert_eq!(catalog.level(1).name, "Two");
        assert_eq!(catalog.level(99).name, "Two");
        assert_eq!(catalog.max_obstacles(), 2);
        // Short catalogs still end on the tenth level
        assert_eq!(catalog.final_index(), 9);
    }

    #[test]
    fn test_difficulty_names() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_name(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_name("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_name("nightmare"), None);
    }
}
