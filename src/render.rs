//! Render primitives
//!
//! The core never draws. Each frame it hands the display driver a `Scene`:
//! sprite positions in integer device coordinates plus a few text lines.

use crate::consts::SCREEN_WIDTH;

/// Width of one glyph in the built-in 6x12 terminal font
pub const GLYPH_WIDTH: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    /// 11x11 star
    Player,
    /// 12x8 spaceship
    Obstacle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub x: i32,
    pub y: i32,
}

impl Sprite {
    /// Float simulation position truncated to device pixels
    pub fn at(kind: SpriteKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x: x as i32,
            y: y as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub x: i32,
    /// Baseline
    pub y: i32,
}

/// Everything on screen for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub sprites: Vec<Sprite>,
    pub text: Vec<TextLine>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprite(&mut self, sprite: Sprite) -> &mut Self {
        self.sprites.push(sprite);
        self
    }

    pub fn text(&mut self, text: impl Into<String>, x: i32, y: i32) -> &mut Self {
        self.text.push(TextLine {
            text: text.into(),
            x,
            y,
        });
        self
    }

    /// Text horizontally centred on the display
    pub fn centered(&mut self, text: impl Into<String>, y: i32) -> &mut Self {
        let text = text.into();
        let x = centered_x(&text);
        self.text(text, x, y)
    }

    /// True if any line contains `needle`
    pub fn shows(&self, needle: &str) -> bool {
        self.text.iter().any(|line| line.text.contains(needle))
    }
}

/// Left edge that centres `text` on the display (never negative)
pub fn centered_x(text: &str) -> i32 {
    let width = text.chars().count() as i32 * GLYPH_WIDTH;
    ((SCREEN_WIDTH - width) / 2).max(0)
}

/// Greedy word wrap at `max_chars` per line
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    lines.push(current);
    lines
}
