use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::confetti::ConfettiSettings;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_speech_enabled")]
    pub speech_enabled: bool,
    #[serde(default = "default_speech_command")]
    pub speech_command: String,
    #[serde(default = "default_speech_voice")]
    pub speech_voice: String,
    /// Relative speaking speed, 1.0 is the synthesizer's normal rate.
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,
    #[serde(default = "default_keypress_sound")]
    pub keypress_sound: bool,
    #[serde(default = "default_show_original")]
    pub show_original: bool,
    #[serde(default = "default_confetti_pieces")]
    pub confetti_pieces: usize,
    #[serde(default = "default_confetti_duration_ms")]
    pub confetti_duration_ms: u64,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_speech_enabled() -> bool {
    true
}
fn default_speech_command() -> String {
    "espeak-ng".to_string()
}
fn default_speech_voice() -> String {
    "en-us".to_string()
}
fn default_speech_rate() -> f32 {
    0.8
}
fn default_keypress_sound() -> bool {
    false
}
fn default_show_original() -> bool {
    true
}
fn default_confetti_pieces() -> usize {
    80
}
fn default_confetti_duration_ms() -> u64 {
    2500
}
fn default_frame_interval_ms() -> u64 {
    16
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            speech_enabled: default_speech_enabled(),
            speech_command: default_speech_command(),
            speech_voice: default_speech_voice(),
            speech_rate: default_speech_rate(),
            keypress_sound: default_keypress_sound(),
            show_original: default_show_original(),
            confetti_pieces: default_confetti_pieces(),
            confetti_duration_ms: default_confetti_duration_ms(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dictr")
            .join("config.toml")
    }

    /// Clamp numeric settings into usable ranges and fall back to the
    /// default theme when `theme` is not one of `known_themes`.
    pub fn validate(&mut self, known_themes: &[String]) {
        self.speech_rate = self.speech_rate.clamp(0.25, 3.0);
        self.confetti_pieces = self.confetti_pieces.clamp(1, 500);
        self.confetti_duration_ms = self.confetti_duration_ms.clamp(100, 10_000);
        self.frame_interval_ms = self.frame_interval_ms.clamp(8, 100);
        if self.speech_command.trim().is_empty() {
            self.speech_command = default_speech_command();
        }
        if !known_themes.iter().any(|t| *t == self.theme) {
            self.theme = default_theme();
        }
    }

    pub fn confetti_settings(&self) -> ConfettiSettings {
        ConfettiSettings {
            piece_count: self.confetti_pieces,
            duration: Duration::from_millis(self.confetti_duration_ms),
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            ..ConfettiSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes() -> Vec<String> {
        vec!["catppuccin-mocha".to_string(), "gruvbox-dark".to_string()]
    }

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "catppuccin-mocha");
        assert!(config.speech_enabled);
        assert_eq!(config.speech_command, "espeak-ng");
        assert_eq!(config.confetti_pieces, 80);
        assert_eq!(config.confetti_duration_ms, 2500);
        assert!(!config.keypress_sound);
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
theme = "gruvbox-dark"
speech_rate = 1.2
confetti_pieces = 40
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "gruvbox-dark");
        assert!((config.speech_rate - 1.2).abs() < f32::EPSILON);
        assert_eq!(config.confetti_pieces, 40);
        assert_eq!(config.frame_interval_ms, 16);
        assert!(config.show_original);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.speech_voice, deserialized.speech_voice);
        assert_eq!(config.confetti_duration_ms, deserialized.confetti_duration_ms);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.confetti_pieces = 0;
        config.confetti_duration_ms = 999_999;
        config.frame_interval_ms = 1;
        config.speech_rate = 10.0;
        config.speech_command = "  ".to_string();
        config.validate(&themes());

        assert_eq!(config.confetti_pieces, 1);
        assert_eq!(config.confetti_duration_ms, 10_000);
        assert_eq!(config.frame_interval_ms, 8);
        assert!((config.speech_rate - 3.0).abs() < f32::EPSILON);
        assert_eq!(config.speech_command, "espeak-ng");
    }

    #[test]
    fn test_validate_unknown_theme_resets() {
        let mut config = Config::default();
        config.theme = "nonexistent".to_string();
        config.validate(&themes());
        assert_eq!(config.theme, "catppuccin-mocha");
    }

    #[test]
    fn test_confetti_settings_from_config() {
        let mut config = Config::default();
        config.confetti_pieces = 30;
        config.confetti_duration_ms = 1000;
        let settings = config.confetti_settings();
        assert_eq!(settings.piece_count, 30);
        assert_eq!(settings.duration, Duration::from_millis(1000));
        assert_eq!(settings.frame_interval, Duration::from_millis(16));
    }
}
