//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Number of palette entries; index 0 is the empty cell.
pub const PALETTE_SIZE: usize = 8;

/// Block palette and UI colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Cell colours by board value. `blocks[0]` doubles as the playfield background.
    pub blocks: [Color; PALETTE_SIZE],
    /// Grid / border.
    pub div_line: Color,
    /// Text (counters, legend).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Faded board after game over.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("theme[{key}]: invalid colour {value:?}")]
    InvalidColor { key: String, value: String },
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Plain terminal colours, so the board looks the same on 16-colour terminals.
    pub fn classic() -> Self {
        Self {
            blocks: [
                Color::Black,
                Color::DarkGray,
                Color::LightRed,
                Color::Magenta,
                Color::LightGreen,
                Color::Blue,
                Color::Yellow,
                Color::Green,
            ],
            div_line: Color::Gray,
            main_fg: Color::White,
            title: Color::Yellow,
            inactive_fg: Color::DarkGray,
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// No path means the built-in colours. `palette` then overrides the block colours.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?))?,
            None => Self::classic(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override block colours for high-contrast or colorblind play. Index 0 is left alone.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        let blocks = match palette {
            crate::Palette::Classic => return,
            crate::Palette::HighContrast => [
                Color::Rgb(0x00, 0xFF, 0xFF), // cyan
                Color::Rgb(0xFF, 0xFF, 0x00), // yellow
                Color::Rgb(0xFF, 0x00, 0xFF), // magenta
                Color::Rgb(0x00, 0xFF, 0x00), // green
                Color::Rgb(0xFF, 0x00, 0x00), // red
                Color::Rgb(0x00, 0x88, 0xFF), // blue
                Color::Rgb(0xFF, 0x88, 0x00), // orange
            ],
            crate::Palette::Colorblind => [
                Color::Rgb(0x33, 0xBB, 0xEE), // cyan
                Color::Rgb(0xBB, 0xBB, 0x00), // yellow
                Color::Rgb(0xEE, 0x33, 0x77), // magenta
                Color::Rgb(0x00, 0x99, 0x88), // teal
                Color::Rgb(0xCC, 0x33, 0x11), // red
                Color::Rgb(0x00, 0x77, 0xBB), // blue
                Color::Rgb(0xEE, 0x77, 0x33), // orange
            ],
        };
        self.blocks[1..].copy_from_slice(&blocks);
    }

    /// Known keys override the classic colours; unknown keys are ignored.
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let get = |key: &str| -> Result<Option<Color>, ThemeError> {
            map.get(key)
                .map(|value| {
                    parse_hex(value).map_err(|_| ThemeError::InvalidColor {
                        key: key.to_string(),
                        value: value.clone(),
                    })
                })
                .transpose()
        };
        let base = Self::classic();
        let mut blocks = base.blocks;
        if let Some(c) = get("empty")? {
            blocks[0] = c;
        }
        for (i, slot) in blocks.iter_mut().enumerate().skip(1) {
            if let Some(c) = get(&format!("block{i}"))? {
                *slot = c;
            }
        }
        Ok(Self {
            blocks,
            div_line: get("div_line")?.unwrap_or(base.div_line),
            main_fg: get("main_fg")?.unwrap_or(base.main_fg),
            title: get("title")?.unwrap_or(base.title),
            inactive_fg: get("inactive_fg")?.unwrap_or(base.inactive_fg),
        })
    }

    /// Colour for a board cell value.
    #[inline]
    pub fn color(&self, index: u8) -> Color {
        self.blocks[usize::from(index) % PALETTE_SIZE]
    }

    #[inline]
    pub fn bg(&self) -> Color {
        self.blocks[0]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
