use std::path::PathBuf;

use serde::Deserialize;

use crate::audio::PlayMode;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/andante/config.toml` or `~/.config/andante/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ANDANTE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory listed on startup. Defaults to `$HOME/Music`.
    pub music_dir: Option<PathBuf>,
    /// File extensions to treat as playable (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to list dotfiles.
    pub include_hidden: bool,
    /// Whether symlinked entries are followed.
    pub follow_links: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            music_dir: None,
            extensions: vec!["mp3".into()],
            include_hidden: true,
            follow_links: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Play mode the service starts with.
    pub play_mode: PlayModeSetting,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayModeSetting {
    #[default]
    #[serde(alias = "once", alias = "no-loop", alias = "no_loop")]
    Single,
    #[serde(
        alias = "loop",
        alias = "loop-one",
        alias = "loop_one",
        alias = "repeat-one"
    )]
    Looping,
}

impl From<PlayModeSetting> for PlayMode {
    fn from(s: PlayModeSetting) -> Self {
        match s {
            PlayModeSetting::Single => PlayMode::Single,
            PlayModeSetting::Looping => PlayMode::Looping,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Progress units to skip when pressing `h` / `l`.
    pub step: u32,
    /// Resolution of the progress bar; `step` is expressed in these units.
    pub progress_max: u32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            step: 5,
            progress_max: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// How often the player screen polls the playback position (milliseconds).
    pub progress_interval_ms: u64,
    /// How long transient notices stay on screen (milliseconds).
    pub notice_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 500,
            notice_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `ANDANTE_LOG` overrides it.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/andante/andante.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
