//! App: terminal init, main loop, key dispatch.
//!
//! The loop is the only caller of `GameState` methods. Each iteration waits on
//! whichever comes first: a key event, the next frame, or the fall deadline.

use crate::GameConfig;
use crate::game::{GameState, Phase};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::DefaultTerminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Raw mode plus the alternate screen, undone when the guard goes away.
struct TerminalGuard {
    restored: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        // From here on, an early return drops the guard and restores.
        let guard = Self { restored: false };
        execute!(io::stdout(), EnterAlternateScreen)
            .context("failed to enter alternate screen")?;
        install_panic_hook();
        Ok(guard)
    }

    fn restore(mut self) -> Result<()> {
        self.restored = true;
        restore_terminal(&mut io::stdout())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if !self.restored {
            let _ = restore_terminal(&mut io::stdout());
        }
    }
}

/// Leave the alternate screen and drop raw mode. Both steps run even if the first fails.
fn restore_terminal<W: Write>(out: &mut W) -> Result<()> {
    let left = execute!(out, LeaveAlternateScreen).context("failed to leave alternate screen");
    let raw = disable_raw_mode().context("failed to disable raw mode");
    left.and(raw)
}

/// Release builds abort on panic, so `Drop` never runs there; restore from the hook instead.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal(&mut io::stdout());
        previous(info);
    }));
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    frame_interval: Duration,
    state: GameState,
    /// TachyonFX fade over the board once the game is over.
    game_over_effect: Option<Effect>,
    /// Last time we processed the fade (for delta).
    game_over_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, frame_interval: Duration) -> Self {
        let state = GameState::new(&config);
        Self {
            config,
            theme,
            frame_interval,
            state,
            game_over_effect: None,
            game_over_effect_process_time: None,
        }
    }

    /// Fresh engine in `Init`; the old one is dropped.
    fn reset_game(&mut self) {
        self.state = GameState::new(&self.config);
        self.game_over_effect = None;
        self.game_over_effect_process_time = None;
    }

    /// Returns false when the player asked to quit.
    fn apply_action(&mut self, action: Action, now: Instant) -> bool {
        match action {
            Action::Quit => return false,
            Action::Start => self.state.start(now),
            Action::Restart => {
                if self.state.phase() == Phase::Over {
                    self.reset_game();
                }
            }
            Action::MoveLeft => self.state.move_left(),
            Action::MoveRight => self.state.move_right(),
            Action::Rotate => self.state.rotate(),
            Action::RotateCcw => self.state.rotate_ccw(),
            Action::SpeedUp => self.state.speed_up(now),
            Action::Fall => self.state.fall(now),
            Action::None => {}
        }
        true
    }

    pub fn run(&mut self) -> Result<()> {
        let guard = TerminalGuard::enter()?;

        let result = DefaultTerminal::new(CrosstermBackend::new(io::stdout()))
            .context("failed to initialise terminal")
            .and_then(|mut terminal| self.run_loop(&mut terminal));

        // A loop error wins over a restore error.
        let restored = guard.restore();
        result.and(restored)
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut next_frame = Instant::now();
        loop {
            let now = Instant::now();
            if now >= next_frame {
                let snapshot = self.state.snapshot();
                terminal.draw(|f| {
                    ui::draw(
                        f,
                        &snapshot,
                        &self.theme,
                        &mut self.game_over_effect,
                        &mut self.game_over_effect_process_time,
                        now,
                    );
                })?;
                next_frame = now + self.frame_interval;
            }

            let wake = self
                .state
                .fall_deadline()
                .map_or(next_frame, |d| d.min(next_frame));
            let timeout = wake.saturating_duration_since(Instant::now());

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Ignore repeats and releases on terminals that report them.
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key), Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }

            self.state.advance(Instant::now());
        }
    }
}
