//! Audio-related small types.
//!
//! Playback status, play mode, the broadcast payload and the snapshot a
//! binder uses to resynchronise with the engine.

use std::fmt;
use std::time::Duration;

use crate::library::Track;

/// Externally observable playback phase.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing loaded, or the loaded track finished.
    #[default]
    Idle,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
        };
        f.write_str(s)
    }
}

/// What happens when a track finishes on its own.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlayMode {
    /// Stop at the end of the track.
    #[default]
    Single,
    /// Start the same track again.
    Looping,
}

impl PlayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Single => Self::Looping,
            Self::Looping => Self::Single,
        }
    }
}

/// Payload published on every status transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub status: PlaybackStatus,
}

/// Everything a freshly bound client needs to rebuild its view.
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    pub status: PlaybackStatus,
    pub mode: PlayMode,
    pub track: Option<Track>,
    pub position: Duration,
    pub duration: Option<Duration>,
}
