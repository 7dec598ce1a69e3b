//! termtris: falling-block puzzle game in the terminal.
//!
//! `game` is the engine; `app`, `input` and `ui` are the terminal adapters around it.

pub mod app;
pub mod board;
pub mod game;
pub mod input;
pub mod piece;
pub mod theme;
pub mod timer;
pub mod ui;
pub mod vector;

use clap::ValueEnum;
use std::time::Duration;

/// Options derived from CLI that affect the engine (board size, fall intervals, seed).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    pub fall_interval: Duration,
    pub soft_drop_interval: Duration,
    pub hard_drop_interval: Duration,
    /// Fixed seed for the piece sequence; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: game::BOARD_WIDTH,
            height: game::BOARD_HEIGHT,
            fall_interval: Duration::from_millis(game::BASE_FALL_MS),
            soft_drop_interval: Duration::from_millis(game::SOFT_DROP_MS),
            hard_drop_interval: Duration::from_millis(game::HARD_DROP_MS),
            seed: None,
        }
    }
}

/// Block colour variants applied on top of the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Classic,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
