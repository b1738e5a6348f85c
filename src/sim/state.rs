//! Game state and core simulation types

use std::time::Duration;

use glam::Vec2;

use super::collision::{Hitbox, obstacle_hitbox, player_hitbox};
use super::jump::JumpArc;
use crate::Timestamp;
use crate::consts::*;
use crate::levels::{LevelCatalog, LevelDefinition, ObstacleSpec};
use crate::render::{Scene, Sprite, SpriteKind};

/// Top-level game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Obstacles moving, player can jump
    Running,
    /// Hit an obstacle; waiting for a press to retry the same level
    GameOver { since: Timestamp },
    /// Every obstacle cleared; showing the result before moving on
    LevelWon { since: Timestamp, final_level: bool },
    /// Finale done, control goes back to the menu
    Finished,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    ObstacleCleared { slot: usize },
    Collision { slot: usize },
    LevelWon { level_index: usize },
    LevelStarted { level_index: usize },
    Restarted { level_index: usize },
    Finished,
}

/// Lines shown after the final level, each held for its duration
pub const FINALE: [(&str, Duration); 4] = [
    ("CONGRATS!", Duration::from_secs(2)),
    ("It's the time", Duration::from_secs(3)),
    ("Now, back to your world", Duration::from_secs(3)),
    ("life still goes on", Duration::from_secs(3)),
];

/// Total finale length
pub fn finale_duration() -> Duration {
    FINALE.iter().map(|(_, hold)| *hold).sum()
}

/// Finale line for a time since the last level was won
pub fn finale_line(elapsed: Duration) -> Option<&'static str> {
    let mut end = Duration::ZERO;
    for (line, hold) in FINALE {
        end += hold;
        if elapsed < end {
            return Some(line);
        }
    }
    None
}

/// The player's star
#[derive(Debug, Clone)]
pub struct Player {
    pub x: f32,
    /// Top edge when standing
    pub ground_y: f32,
    /// Current height above the ground
    pub lift: f32,
    pub jump: JumpArc,
}

impl Player {
    pub fn new(x: f32, ground_y: f32, jump: JumpArc) -> Self {
        Self {
            x,
            ground_y,
            lift: 0.0,
            jump,
        }
    }

    pub fn y(&self) -> f32 {
        self.ground_y - self.lift
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_active()
    }

    pub fn hitbox(&self) -> Hitbox {
        player_hitbox(Vec2::new(self.x, self.y()))
    }
}

/// One slot of the obstacle pool
///
/// Slots are allocated once per game (sized to the busiest level) and
/// rewritten on every level load; inactive slots are skipped entirely.
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub active: bool,
    pub x: f32,
    /// Pixels per tick
    pub speed: f32,
    pub can_jump: bool,
    pub jump: JumpArc,
    /// Current height above the lane
    pub lift: f32,
    /// Lane top edge
    pub base_y: i32,
}

impl Obstacle {
    pub fn idle(base_y: i32) -> Self {
        Self {
            active: false,
            x: 0.0,
            speed: DEFAULT_OBSTACLE_SPEED,
            can_jump: false,
            jump: JumpArc::new(OBSTACLE_JUMP_HEIGHT, OBSTACLE_JUMP_DURATION),
            lift: 0.0,
            base_y,
        }
    }

    /// Load a level's obstacle into this slot
    pub fn activate(&mut self, spec: &ObstacleSpec, lane_y: i32) {
        self.active = true;
        self.x = spec.x;
        self.speed = spec.speed;
        self.can_jump = spec.jumping;
        self.base_y = lane_y + spec.y_offset;
        self.land();
    }

    /// Take this slot out of play
    pub fn deactivate(&mut self) {
        self.active = false;
        self.can_jump = false;
        self.land();
    }

    /// Send a cleared obstacle back around from the right
    pub fn recycle(&mut self, x: f32) {
        self.x = x;
        self.land();
    }

    fn land(&mut self) {
        self.jump.reset();
        self.lift = 0.0;
    }

    /// Take off if jump-capable, grounded and inside the trigger band
    pub fn should_take_off(&self) -> bool {
        self.can_jump
            && !self.jump.is_active()
            && self.x > OBSTACLE_JUMP_MIN_X
            && self.x < OBSTACLE_JUMP_MAX_X
    }

    pub fn y(&self) -> f32 {
        self.base_y as f32 - self.lift
    }

    pub fn hitbox(&self) -> Hitbox {
        obstacle_hitbox(Vec2::new(self.x, self.y()))
    }

    /// Fully off the left edge
    pub fn is_past_screen(&self) -> bool {
        self.x < -OBSTACLE_WIDTH
    }
}

/// One game at one difficulty, from level 0 to the finale
#[derive(Debug, Clone)]
pub struct GameSession {
    catalog: LevelCatalog,
    pub level_index: usize,
    pub obstacles_cleared: u32,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub phase: GamePhase,
    /// Running ticks since the session started
    pub time_ticks: u64,
}

impl GameSession {
    /// Start a new game at the first level
    pub fn new(catalog: LevelCatalog) -> Self {
        let settings = catalog.settings().clone();
        let lane_y = lane_y(settings.ground_y);
        let pool = (0..catalog.max_obstacles())
            .map(|_| Obstacle::idle(lane_y))
            .collect();

        let mut session = Self {
            player: Player::new(
                settings.player_x as f32,
                settings.ground_y as f32,
                JumpArc::new(settings.jump_height, settings.jump_duration),
            ),
            catalog,
            level_index: 0,
            obstacles_cleared: 0,
            obstacles: pool,
            phase: GamePhase::Running,
            time_ticks: 0,
        };
        session.load_level(0);
        session
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Definition of the level being played
    pub fn level(&self) -> &LevelDefinition {
        self.catalog.level(self.level_index)
    }

    /// Obstacles in play this level
    pub fn active_count(&self) -> usize {
        self.obstacles.iter().filter(|o| o.active).count()
    }

    pub fn active_obstacles(&self) -> impl Iterator<Item = (usize, &Obstacle)> {
        self.obstacles.iter().enumerate().filter(|(_, o)| o.active)
    }

    /// Put the level's obstacles and jump parameters in place
    pub fn load_level(&mut self, index: usize) {
        self.level_index = index;
        self.obstacles_cleared = 0;
        self.phase = GamePhase::Running;

        let settings = self.catalog.settings();
        let level = self.catalog.level(index);
        let lane_y = lane_y(settings.ground_y);

        self.player.jump = JumpArc::new(
            level.jump_height.unwrap_or(settings.jump_height),
            level.jump_duration.unwrap_or(settings.jump_duration),
        );
        self.player.lift = 0.0;

        for (slot, obstacle) in self.obstacles.iter_mut().enumerate() {
            match level.obstacles.get(slot) {
                Some(spec) => obstacle.activate(spec, lane_y),
                None => obstacle.deactivate(),
            }
        }

        log::info!("Level {}: {}", level.level, level.name);
        if let Some(message) = &level.message {
            log::info!("{message}");
        }
    }

    /// Retry the current level from scratch
    pub fn restart_level(&mut self) {
        self.load_level(self.level_index);
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Centre message for the current phase
    pub fn message(&self, now: Timestamp) -> Option<&'static str> {
        match self.phase {
            GamePhase::Running | GamePhase::Finished => None,
            GamePhase::GameOver { since } => {
                if now.saturating_sub(since) < GAME_OVER_HOLD {
                    Some("GAME OVER")
                } else {
                    Some("click to restart")
                }
            }
            GamePhase::LevelWon {
                since,
                final_level: true,
            } => finale_line(now.saturating_sub(since)),
            GamePhase::LevelWon { since, .. } => {
                (now.saturating_sub(since) < LEVEL_WON_HOLD).then_some("GOOD JOB!")
            }
        }
    }

    /// Status line, e.g. `Lv3:Quick`
    pub fn status(&self) -> String {
        let level = self.level();
        format!("Lv{}:{}", level.level, level.name)
    }

    /// Render primitives for this frame
    pub fn scene(&self, now: Timestamp) -> Scene {
        let mut scene = Scene::new();
        scene.text(self.status(), 0, 5);
        scene.sprite(Sprite::at(SpriteKind::Player, self.player.x, self.player.y()));
        for (_, obstacle) in self.active_obstacles() {
            scene.sprite(Sprite::at(SpriteKind::Obstacle, obstacle.x, obstacle.y()));
        }
        if let Some(message) = self.message(now) {
            scene.centered(message, 32);
        }
        scene
    }
}

/// Obstacle lane top edge: ships sit on the same floor as the star
fn lane_y(ground_y: i32) -> i32 {
    ground_y + PLAYER_SIZE as i32 - OBSTACLE_HEIGHT as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{Difficulty, JsonSource, LevelSource};

    const LEVELS: &str = r#"{
        "levels": [
            { "level": 1, "name": "One", "obstacles": [{ "x": 128 }] },
            { "level": 2, "name": "Two", "jump_height": 30,
              "obstacles": [{ "x": 140, "speed": 2.0, "jumping": true }, { "x": 220, "y_offset": -4 }] }
        ],
        "game_settings": { "jump_height": 28, "jump_duration": 20, "ground_y": 50, "player_x": 10 }
    }"#;

    fn session() -> GameSession {
        let sources: Vec<Box<dyn LevelSource>> = vec![Box::new(JsonSource::new("test", LEVELS))];
        GameSession::new(LevelCatalog::load_chain(Difficulty::Easy, &sources))
    }

    #[test]
    fn test_pool_sized_to_busiest_level() {
        let s = session();
        assert_eq!(s.obstacles.len(), 2);
        assert_eq!(s.active_count(), 1);
        assert!(!s.obstacles[1].active);
        assert_eq!(s.obstacles[0].base_y, 53);
        assert_eq!(s.phase, GamePhase::Running);
    }

    #[test]
    fn test_load_level_applies_overrides() {
        let mut s = session();
        s.load_level(1);
        assert_eq!(s.active_count(), 2);
        assert!((s.player.jump.height - 30.0).abs() < f32::EPSILON);
        // Duration falls back to game settings
        assert_eq!(s.player.jump.duration, 20);
        assert!(s.obstacles[0].can_jump);
        assert_eq!(s.obstacles[1].base_y, 49);

        // Back to level 0: override does not leak
        s.load_level(0);
        assert!((s.player.jump.height - 28.0).abs() < f32::EPSILON);
        assert!(!s.obstacles[1].active);
        assert!(!s.obstacles[0].can_jump);
    }

    #[test]
    fn test_messages_follow_phase_timing() {
        let mut s = session();
        let t = Duration::from_secs(10);

        s.phase = GamePhase::GameOver { since: t };
        assert_eq!(s.message(t), Some("GAME OVER"));
        assert_eq!(s.message(t + Duration::from_millis(1799)), Some("GAME OVER"));
        assert_eq!(s.message(t + GAME_OVER_HOLD), Some("click to restart"));

        s.phase = GamePhase::LevelWon {
            since: t,
            final_level: false,
        };
        assert_eq!(s.message(t + Duration::from_secs(1)), Some("GOOD JOB!"));
        assert_eq!(s.message(t + Duration::from_millis(2100)), None);

        s.phase = GamePhase::LevelWon {
            since: t,
            final_level: true,
        };
        assert_eq!(s.message(t), Some("CONGRATS!"));
        assert_eq!(s.message(t + Duration::from_secs(4)), Some("It's the time"));
        assert_eq!(s.message(t + Duration::from_secs(10)), Some("life still goes on"));
        assert_eq!(s.message(t + Duration::from_secs(11)), None);
    }

    #[test]
    fn test_finale_duration() {
        assert_eq!(finale_duration(), Duration::from_secs(11));
        assert_eq!(finale_line(Duration::from_millis(1999)), Some("CONGRATS!"));
        assert_eq!(finale_line(Duration::from_secs(2)), Some("It's the time"));
    }

    #[test]
    fn test_scene_contents() {
        let s = session();
        let scene = s.scene(Duration::ZERO);
        assert!(scene.shows("Lv1:One"));
        // Player plus one active ship
        assert_eq!(scene.sprites.len(), 2);
        assert_eq!(scene.sprites[0].kind, SpriteKind::Player);
        assert_eq!((scene.sprites[0].x, scene.sprites[0].y), (10, 50));
        assert_eq!((scene.sprites[1].x, scene.sprites[1].y), (128, 53));
    }

    #[test]
    fn test_obstacle_take_off_band_is_exclusive() {
        let mut obstacle = Obstacle::idle(53);
        obstacle.can_jump = true;
        obstacle.x = 90.0;
        assert!(!obstacle.should_take_off());
        obstacle.x = 89.9;
        assert!(obstacle.should_take_off());
        obstacle.x = 60.0;
        assert!(!obstacle.should_take_off());
    }
}
