//! UI color roles, with an optional user override file
//!
//! Colors come from `theme.toml` next to the config file when present,
//! otherwise from the built-in palette.

use ratatui::style::Color;
use serde::Deserialize;
use std::fs;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active borders, highlights
    pub danger: Color,      // Failures
    pub success: Color,     // Delivered state
    pub warning: Color,     // Status messages, confirm prompts
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Dimmed text, hints
    pub bg_selected: Color, // Selection background
    pub inactive: Color,    // Inactive borders
    pub header: Color,      // Box header text
}

/// Raw `theme.toml` contents, every key optional
#[derive(Debug, Default, Deserialize)]
struct ThemeFile {
    accent: Option<String>,
    danger: Option<String>,
    success: Option<String>,
    warning: Option<String>,
    text: Option<String>,
    text_dim: Option<String>,
    bg_selected: Option<String>,
    inactive: Option<String>,
    header: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback palette
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(249, 226, 175),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Load the user theme, falling back to the built-in palette
    pub fn load() -> Self {
        Self::load_user_theme().unwrap_or_default()
    }

    fn load_user_theme() -> Option<Self> {
        let path = dirs::config_dir()?.join("newsbrief").join("theme.toml");
        let content = fs::read_to_string(&path).ok()?;

        let file: ThemeFile = match toml::from_str(&content) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Failed to parse theme.toml: {}", e);
                return None;
            }
        };

        let defaults = Theme::default();
        let pick = |raw: &Option<String>, fallback: Color| {
            raw.as_deref().and_then(parse_hex_color).unwrap_or(fallback)
        };

        Some(Self {
            accent: pick(&file.accent, defaults.accent),
            danger: pick(&file.danger, defaults.danger),
            success: pick(&file.success, defaults.success),
            warning: pick(&file.warning, defaults.warning),
            text: pick(&file.text, defaults.text),
            text_dim: pick(&file.text_dim, defaults.text_dim),
            bg_selected: pick(&file.bg_selected, defaults.bg_selected),
            inactive: pick(&file.inactive, defaults.inactive),
            header: pick(&file.header, defaults.header),
        })
    }
}

/// Parse a hex color string (#RRGGBB or #RGB)
fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
        let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
        let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
        Some(Color::Rgb(r, g, b))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffc107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("nope"), None);
    }

    #[test]
    fn test_theme_file_with_partial_keys() {
        let file: ThemeFile = toml::from_str("accent = \"#00ff00\"").unwrap();
        assert_eq!(file.accent.as_deref(), Some("#00ff00"));
        assert!(file.danger.is_none());
    }
}
