//! Inset bounding-box collision
//!
//! Sprites collide on hitboxes shrunk inward from their visual bounds, so a
//! star tip grazing a ship's fin is not a loss. Boxes that merely touch do
//! not overlap.

use glam::Vec2;

use crate::consts::*;

/// Axis-aligned rectangle in device coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Hitbox {
    /// Sprite footprint at `pos` (top-left) shrunk by `inset` on every side
    pub fn inset(pos: Vec2, size: Vec2, inset: Vec2) -> Self {
        Self {
            min: pos + inset,
            max: pos + size - inset,
        }
    }

    /// Strict overlap on both axes
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }
}

/// Hitbox of the 11x11 player star with its top-left at `pos`
pub fn player_hitbox(pos: Vec2) -> Hitbox {
    Hitbox::inset(
        pos,
        Vec2::splat(PLAYER_SIZE),
        Vec2::new(PLAYER_INSET_X, PLAYER_INSET_Y),
    )
}

/// Hitbox of a 12x8 spaceship with its top-left at `pos`
pub fn obstacle_hitbox(pos: Vec2) -> Hitbox {
    Hitbox::inset(
        pos,
        Vec2::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT),
        Vec2::new(OBSTACLE_INSET_X, OBSTACLE_INSET_Y),
    )
}

/// First obstacle (by slot) overlapping the player
pub fn first_collision(
    player: &Hitbox,
    obstacles: impl IntoIterator<Item = (usize, Hitbox)>,
) -> Option<usize> {
    obstacles
        .into_iter()
        .find(|(_, hitbox)| player.overlaps(hitbox))
        .map(|(slot, _)| slot)
}
