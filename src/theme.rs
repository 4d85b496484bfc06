use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Theme {
    pub log_bg: Color,
    pub composer_bg: Color,
    pub popup_bg: Color,
    pub status_bg: Color,
    pub text_fg: Color,
    pub muted_fg: Color,
    pub active_fg: Color,
    pub mention_bg: Color,
    pub mention_fg: Color,
    pub popup_selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            log_bg: Color::Rgb(44, 44, 44),
            composer_bg: Color::Rgb(62, 62, 62),
            popup_bg: Color::Rgb(54, 54, 54),
            status_bg: Color::Rgb(36, 36, 36),
            text_fg: Color::Rgb(225, 225, 225),
            muted_fg: Color::Rgb(185, 185, 185),
            active_fg: Color::Rgb(255, 255, 255),
            mention_bg: Color::Rgb(38, 79, 120),
            mention_fg: Color::Rgb(235, 240, 255),
            popup_selected_bg: Color::Rgb(90, 145, 200),
        }
    }
}

impl Theme {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Self::default();
        }
        match fs::read_to_string(path_ref) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(theme) => theme,
                Err(err) => {
                    eprintln!(
                        "Failed to parse theme file '{}': {err}. Using defaults.",
                        path_ref.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!(
                    "Failed to read theme file '{}': {err}. Using defaults.",
                    path_ref.display()
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let cfg: ThemeToml = toml::from_str(s)?;
        Ok(Self {
            log_bg: cfg.colors.log_bg.to_color(),
            composer_bg: cfg.colors.composer_bg.to_color(),
            popup_bg: cfg.colors.popup_bg.to_color(),
            status_bg: cfg.colors.status_bg.to_color(),
            text_fg: cfg.colors.text_fg.to_color(),
            muted_fg: cfg.colors.muted_fg.to_color(),
            active_fg: cfg.colors.active_fg.to_color(),
            mention_bg: cfg.colors.mention_bg.to_color(),
            mention_fg: cfg.colors.mention_fg.to_color(),
            popup_selected_bg: cfg.colors.popup_selected_bg.to_color(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeToml {
    colors: ThemeColorsToml,
}

#[derive(Debug, Deserialize)]
struct ThemeColorsToml {
    log_bg: RgbToml,
    composer_bg: RgbToml,
    popup_bg: RgbToml,
    status_bg: RgbToml,
    text_fg: RgbToml,
    muted_fg: RgbToml,
    active_fg: RgbToml,
    mention_bg: RgbToml,
    mention_fg: RgbToml,
    popup_selected_bg: RgbToml,
}

#[derive(Debug, Deserialize)]
struct RgbToml {
    r: u8,
    g: u8,
    b: u8,
}

impl RgbToml {
    fn to_color(&self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}
