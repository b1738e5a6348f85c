//! Fixed timestep simulation tick
//!
//! One call per frame. Physics advances in whole ticks (jump timers count
//! ticks); the timed messages between phases use the frame timestamp.

use super::collision::first_collision;
use super::state::{GameEvent, GamePhase, GameSession, finale_duration};
use crate::Timestamp;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Button pressed this frame (edge, not level)
    pub jump: bool,
    /// Demo mode - jump automatically when a ship gets close
    pub auto_jump: bool,
}

/// Advance the game by one tick
pub fn tick(session: &mut GameSession, input: &TickInput, now: Timestamp) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match session.phase {
        GamePhase::Finished => {}

        GamePhase::GameOver { since } => {
            // The retry press only counts once the prompt is up
            if input.jump && now.saturating_sub(since) >= GAME_OVER_HOLD {
                log::info!("Restarting current level");
                session.restart_level();
                events.push(GameEvent::Restarted {
                    level_index: session.level_index,
                });
            }
        }

        GamePhase::LevelWon {
            since,
            final_level: true,
        } => {
            if now.saturating_sub(since) >= finale_duration() {
                log::info!("All levels finished");
                session.phase = GamePhase::Finished;
                events.push(GameEvent::Finished);
            }
        }

        GamePhase::LevelWon { since, .. } => {
            if now.saturating_sub(since) >= LEVEL_WON_HOLD + LEVEL_WON_PAUSE {
                let next = session.level_index + 1;
                session.load_level(next);
                events.push(GameEvent::LevelStarted { level_index: next });
            }
        }

        GamePhase::Running => run(session, input, now, &mut events),
    }

    events
}

fn run(session: &mut GameSession, input: &TickInput, now: Timestamp, events: &mut Vec<GameEvent>) {
    session.time_ticks += 1;

    // Player
    let wants_jump = input.jump || (input.auto_jump && autopilot_should_jump(session));
    if wants_jump && !session.player.is_jumping() {
        session.player.jump.start();
        events.push(GameEvent::Jumped);
    }
    session.player.lift = session.player.jump.advance();

    // Obstacles
    let active = session.active_count();
    let recycle_x = RECYCLE_BASE_X + active as f32 * RECYCLE_SPACING;
    for (slot, obstacle) in session.obstacles.iter_mut().enumerate() {
        if !obstacle.active {
            continue;
        }

        obstacle.x -= obstacle.speed;

        if obstacle.can_jump {
            if obstacle.should_take_off() {
                obstacle.jump.start();
            }
            obstacle.lift = obstacle.jump.advance();
        }

        if obstacle.is_past_screen() {
            session.obstacles_cleared += 1;
            obstacle.recycle(recycle_x);
            events.push(GameEvent::ObstacleCleared { slot });
        }
    }

    // Collision wins over a clear on the same tick
    let player = session.player.hitbox();
    let hit = first_collision(
        &player,
        session.active_obstacles().map(|(slot, o)| (slot, o.hitbox())),
    );

    if let Some(slot) = hit {
        log::info!("Game over at {}", session.status());
        session.phase = GamePhase::GameOver { since: now };
        events.push(GameEvent::Collision { slot });
    } else if session.obstacles_cleared as usize >= active {
        let final_level = session.level_index >= session.catalog().final_index();
        log::info!(
            "{} cleared{}",
            session.status(),
            if final_level { ", final level" } else { "" }
        );
        session.phase = GamePhase::LevelWon {
            since: now,
            final_level,
        };
        events.push(GameEvent::LevelWon {
            level_index: session.level_index,
        });
    }
}

/// Jump when a ship is a few ticks away from reaching the player's hitbox
fn autopilot_should_jump(session: &GameSession) -> bool {
    let player_right = session.player.x + PLAYER_SIZE - PLAYER_INSET_X;
    session.active_obstacles().any(|(_, o)| {
        let gap = (o.x + OBSTACLE_INSET_X) - player_right;
        gap >= 0.0 && gap <= o.speed * AUTO_JUMP_LEAD_TICKS
    })
}
