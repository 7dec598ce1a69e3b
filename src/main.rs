//! termtris binary: parse flags, load the theme, run the app.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use termtris::app::App;
use termtris::{GameConfig, Palette, game, theme};

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette)
        .with_context(|| format!("failed to load theme {:?}", args.theme))?;
    let config = args.game_config();
    let mut app = App::new(config, theme, Duration::from_millis(args.frame_ms));
    app.run()
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "termtris",
    version,
    about = "Falling-block puzzle in the terminal. Stack pieces, fill rows, don't reach the top.",
    long_about = "termtris is a terminal falling-block puzzle game.\n\n\
        Pieces fall from the top centre. Fill a row edge to edge to clear it; the game ends \
        when a new piece has no room to appear.\n\n\
        CONTROLS:\n  S           Start      Left/Right  Move       Up          Rotate\n  \
        Down        Soft drop  Space       Hard drop  R           New game (after game over)\n  \
        Q / Esc     Quit\n\n\
        Vim keys also work: h/l move, k rotate, u rotate back, j soft drop."
)]
pub struct Args {
    /// Board width in cells.
    #[arg(
        long,
        default_value_t = game::BOARD_WIDTH,
        value_name = "COLS",
        value_parser = clap::value_parser!(u16).range(i64::from(game::MIN_BOARD_WIDTH)..=64)
    )]
    pub width: u16,

    /// Board height in cells.
    #[arg(long, default_value_t = game::BOARD_HEIGHT, value_name = "ROWS",
          value_parser = clap::value_parser!(u16).range(4..=64))]
    pub height: u16,

    /// Gravity interval in ms between automatic one-row falls.
    #[arg(long, default_value_t = game::BASE_FALL_MS, value_name = "MS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub fall_interval_ms: u64,

    /// Fall interval in ms after a soft drop (Down).
    #[arg(long, default_value_t = game::SOFT_DROP_MS, value_name = "MS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub soft_drop_ms: u64,

    /// Redraw interval in ms.
    #[arg(long, default_value_t = 50, value_name = "MS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,

    /// Seed for the piece sequence (same seed, same pieces).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style `theme[key]="value"` lines).
    /// Keys: empty, block1..block7, div_line, main_fg, title, inactive_fg.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Block colours: classic (terminal colours), high-contrast, or colorblind.
    #[arg(long, default_value = "classic")]
    pub palette: Palette,
}

impl Args {
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            fall_interval: Duration::from_millis(self.fall_interval_ms),
            soft_drop_interval: Duration::from_millis(self.soft_drop_ms),
            seed: self.seed,
            ..GameConfig::default()
        }
    }
}
