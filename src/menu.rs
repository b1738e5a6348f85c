//! Difficulty selection menu
//!
//! Encoder steps move an arrow over the options (clamped, no wraparound);
//! a button edge confirms.

use crate::levels::Difficulty;
use crate::render::Scene;

pub const MENU_TITLE: &str = "Select Difficulty";

/// First option row baseline and spacing between rows
const FIRST_ROW_Y: i32 = 30;
const ROW_SPACING: i32 = 12;
const ARROW_X: i32 = 5;
const LABEL_X: i32 = 20;

#[derive(Debug, Clone)]
pub struct MenuController {
    options: &'static [Difficulty],
    selected: usize,
}

impl Default for MenuController {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuController {
    pub fn new() -> Self {
        Self {
            options: &Difficulty::ALL,
            selected: 0,
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Difficulty {
        self.options[self.selected]
    }

    pub fn options(&self) -> &[Difficulty] {
        self.options
    }

    /// Back to the first option
    pub fn reset(&mut self) {
        self.selected = 0;
    }

    /// Apply an encoder step, then confirm on a button edge
    pub fn update(&mut self, step: i8, button_edge: bool) -> Option<Difficulty> {
        if step != 0 {
            let last = self.options.len().saturating_sub(1) as i64;
            let index = (self.selected as i64 + step as i64).clamp(0, last);
            if index as usize != self.selected {
                self.selected = index as usize;
                log::debug!("Menu: {}", self.selected().as_str());
            }
        }

        if button_edge {
            let choice = self.selected();
            log::info!("Selected difficulty: {}", choice.as_str());
            return Some(choice);
        }
        None
    }

    /// Arrow row baseline for the current selection
    pub fn arrow_y(&self) -> i32 {
        FIRST_ROW_Y + self.selected as i32 * ROW_SPACING
    }

    pub fn scene(&self) -> Scene {
        let mut scene = Scene::new();
        scene.text(MENU_TITLE, ARROW_X, 10);
        scene.text(">", ARROW_X, self.arrow_y());
        for (i, option) in self.options.iter().enumerate() {
            scene.text(option.as_str(), LABEL_X, FIRST_ROW_Y + i as i32 * ROW_SPACING);
        }
        scene
    }
}
