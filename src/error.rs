//! Error types shared by the playback engine, the media backend and the
//! service binding.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a media backend (the native player handle).
#[derive(Debug, Error)]
pub enum MediaError {
    /// The file could not be opened.
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was opened but is not a decodable audio stream.
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    /// No audio output device could be opened.
    #[error("audio output unavailable: {0}")]
    Output(String),

    /// Error raised while media was playing.
    #[error("playback error: {0}")]
    Playback(String),
}

/// Errors surfaced to callers of the engine and of the service binding.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// `play` could not open the requested media. The engine has terminated.
    #[error("failed to play media: {0}")]
    MediaOpen(#[source] MediaError),

    /// The engine stopped after a fatal media error and accepts no commands.
    #[error("player engine has terminated")]
    Terminated,

    /// The engine was used before a backend was attached to it.
    #[error("player engine has no media backend")]
    NotActivated,

    /// The service thread is gone; the binder is stale.
    #[error("player service is not running")]
    ServiceStopped,
}

pub type Result<T> = std::result::Result<T, PlayerError>;
