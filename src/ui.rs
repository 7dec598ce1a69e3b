//! Layout and drawing: playfield, sidebar, start and game-over overlays.

use crate::game::{Phase, Snapshot};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each board cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
/// Duration of the game-over fade (TachyonFX) in ms.
const GAME_OVER_FADE_MS: u32 = 600;

const CONTROLS: [(&str, &str); 7] = [
    ("S", "start"),
    ("←/→", "move"),
    ("↑", "rotate"),
    ("↓", "soft drop"),
    ("Space", "hard drop"),
    ("R", "new game"),
    ("Q", "quit"),
];

/// Playfield size in terminal cells (border included).
fn playfield_size(snapshot: &Snapshot) -> (u16, u16) {
    (
        snapshot.width() as u16 * CELL_WIDTH + 2,
        snapshot.height() as u16 + 2,
    )
}

/// Draw one frame. In `Over`, fades the board with TachyonFX and keeps
/// `game_over_effect` / `process_time` across frames.
pub fn draw(
    frame: &mut Frame,
    snapshot: &Snapshot,
    theme: &Theme,
    game_over_effect: &mut Option<Effect>,
    process_time: &mut Option<Instant>,
    now: Instant,
) {
    let (pw, ph) = playfield_size(snapshot);
    let total_w = pw + SIDEBAR_WIDTH;

    // Center horizontally
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(frame.area());

    // Center vertically
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let (playfield_area, sidebar_area) = (inner[0], inner[1]);

    let faded = game_over_effect.as_ref().is_some_and(Effect::done);
    let board_rect = draw_playfield(frame, snapshot, theme, playfield_area, faded);
    draw_sidebar(frame, snapshot, theme, sidebar_area);

    match snapshot.phase {
        Phase::Init => draw_message(frame, theme, board_rect, " Ready ", "Press S to start"),
        Phase::Playing => {}
        Phase::Over => {
            if !faded {
                apply_game_over_effect(
                    frame,
                    theme,
                    board_rect,
                    game_over_effect,
                    process_time,
                    now,
                );
            }
            draw_message(frame, theme, board_rect, " Game Over ", "R: new · Q: quit");
        }
    }
}

/// Draws border and cells; returns the inner board rect.
fn draw_playfield(
    frame: &mut Frame,
    snapshot: &Snapshot,
    theme: &Theme,
    area: Rect,
    faded: bool,
) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg()))
        .title(Span::styled(" termtris ", Style::default().fg(theme.title)));
    let board_rect = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for (row, cells) in snapshot.rows().enumerate() {
        let y = board_rect.y + row as u16;
        if y >= board_rect.bottom() {
            break;
        }
        for (col, &value) in cells.iter().enumerate() {
            let (symbol, style) = if value == 0 {
                (" ", Style::default().bg(theme.bg()))
            } else {
                let style = if faded {
                    // Same colours the fade ends on.
                    Style::default().fg(theme.inactive_fg).bg(theme.bg())
                } else {
                    let color = theme.color(value);
                    Style::default().fg(color).bg(color)
                };
                ("█", style)
            };
            let x0 = board_rect.x + col as u16 * CELL_WIDTH;
            for x in x0..(x0 + CELL_WIDTH).min(board_rect.right()) {
                buf[(x, y)].set_symbol(symbol).set_style(style);
            }
        }
    }
    board_rect
}

/// Fade the board to the inactive colours; once done, `draw_playfield` paints it faded directly.
fn apply_game_over_effect(
    frame: &mut Frame,
    theme: &Theme,
    board_rect: Rect,
    game_over_effect: &mut Option<Effect>,
    process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    *process_time = Some(now);

    let effect = game_over_effect.get_or_insert_with(|| {
        fx::fade_to(
            theme.inactive_fg,
            theme.bg(),
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board_rect)
    });
    frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
}

/// Small bordered box centred on the board.
fn draw_message(frame: &mut Frame, theme: &Theme, board_rect: Rect, title: &str, hint: &str) {
    let w = (hint.chars().count() as u16 + 4).min(board_rect.width);
    let h = 4u16.min(board_rect.height);
    let popup = Rect {
        x: board_rect.x + board_rect.width.saturating_sub(w) / 2,
        y: board_rect.y + board_rect.height.saturating_sub(h) / 2,
        width: w,
        height: h,
    };
    let lines = vec![
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme.bg())
                .bg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(hint, Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg())),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_sidebar(frame: &mut Frame, snapshot: &Snapshot, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Status (border + state, lines, pieces)
            Constraint::Length(3), // Colours (border + strip)
            Constraint::Length(CONTROLS.len() as u16 + 2),
        ])
        .split(area);

    // --- Status ---
    let status = match snapshot.phase {
        Phase::Init => "Ready",
        Phase::Playing => "Playing",
        Phase::Over => "Game over",
    };
    let stats = vec![
        Line::from(vec![
            Span::styled("State: ", title_style),
            Span::styled(status, fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(snapshot.lines_cleared.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Pieces: ", title_style),
            Span::styled(snapshot.pieces_locked.to_string(), fg_style),
        ]),
    ];
    Paragraph::new(Text::from(stats))
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[0], frame.buffer_mut());

    // --- Colours ---
    let colours_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let strip = colours_block.inner(chunks[1]);
    colours_block.render(chunks[1], frame.buffer_mut());
    draw_colour_strip(frame, theme, strip);

    // --- Controls ---
    let controls: Vec<Line> = CONTROLS
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<6}"), title_style),
                Span::styled(*what, fg_style),
            ])
        })
        .collect();
    Paragraph::new(Text::from(controls))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Controls ", title_style)),
        )
        .render(chunks[2], frame.buffer_mut());
}

/// Row of the seven block colours.
fn draw_colour_strip(frame: &mut Frame, theme: &Theme, area: Rect) {
    let block_w = (area.width / 7).max(1);
    for i in 1..=7u8 {
        let r = Rect {
            x: area.x + u16::from(i - 1) * block_w,
            y: area.y,
            width: block_w,
            height: area.height.min(1),
        }
        .intersection(area);
        let c = theme.color(i);
        Paragraph::new(" ".repeat(usize::from(block_w)))
            .style(Style::default().bg(c))
            .render(r, frame.buffer_mut());
    }
}
