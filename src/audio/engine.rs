//! The playback state machine.
//!
//! The engine owns the media backend and is the only place status changes.
//! Every transition that an observer can see is broadcast from `resume`,
//! `pause`, or the completion/error callbacks.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{MediaError, PlayerError, Result};
use crate::host::ForegroundHost;
use crate::library::Track;

use super::backend::{MediaBackend, MediaEvent, PlayerListener};
use super::broadcast::StatusBroadcaster;
use super::types::{EngineSnapshot, PlayMode, PlaybackStatus};

pub struct Engine<B: MediaBackend> {
    backend: Option<B>,
    broadcaster: StatusBroadcaster,
    foreground: Box<dyn ForegroundHost>,
    foreground_active: bool,
    current: Option<Track>,
    status: PlaybackStatus,
    mode: PlayMode,
    terminated: bool,
}

impl<B: MediaBackend> Engine<B> {
    pub fn new(broadcaster: StatusBroadcaster, foreground: Box<dyn ForegroundHost>) -> Self {
        Self {
            backend: None,
            broadcaster,
            foreground,
            foreground_active: false,
            current: None,
            status: PlaybackStatus::Idle,
            mode: PlayMode::Single,
            terminated: false,
        }
    }

    /// Create the backend on first activation. Later calls keep the existing one.
    pub fn activate<F>(&mut self, create: F) -> std::result::Result<(), MediaError>
    where
        F: FnOnce() -> std::result::Result<B, MediaError>,
    {
        if self.backend.is_none() && !self.terminated {
            info!("create media player");
            self.backend = Some(create()?);
        }
        Ok(())
    }

    fn backend_mut(&mut self) -> Result<&mut B> {
        if self.terminated {
            return Err(PlayerError::Terminated);
        }
        self.backend.as_mut().ok_or(PlayerError::NotActivated)
    }

    /// Load `track` and schedule it to start once prepared.
    ///
    /// A path the backend cannot open is fatal: the engine tears itself down
    /// and rejects every later command.
    pub fn play(&mut self, track: Track) -> Result<()> {
        let backend = self.backend_mut()?;
        backend.reset();
        info!(path = %track.path().display(), "schedule to play music");

        match backend.prepare(track.path()) {
            Ok(()) => {
                self.current = Some(track);
                Ok(())
            }
            Err(e) => {
                warn!(path = %track.path().display(), error = %e, "failed to play music, stopping");
                self.teardown();
                Err(PlayerError::MediaOpen(e))
            }
        }
    }

    /// Pause if playing; otherwise nothing happens.
    pub fn pause(&mut self) -> Result<()> {
        if self.terminated {
            return Err(PlayerError::Terminated);
        }
        if self.status != PlaybackStatus::Playing {
            info!(status = %self.status, "not playing, cannot pause");
            return Ok(());
        }

        info!("player pause");
        self.backend_mut()?.pause();
        self.update_and_broadcast(PlaybackStatus::Paused);
        Ok(())
    }

    /// Start or continue playback regardless of the current status.
    pub fn resume(&mut self) -> Result<()> {
        info!("player resume");
        self.backend_mut()?.start();
        self.update_and_broadcast(PlaybackStatus::Playing);
        Ok(())
    }

    /// Hand `position` to the backend as is. Callers keep it within
    /// `[0, duration]`.
    pub fn seek_to(&mut self, position: Duration) -> Result<()> {
        info!(?position, "player seek");
        self.backend_mut()?.seek_to(position);
        Ok(())
    }

    /// Start in `mode` instead of [`PlayMode::Single`].
    pub fn with_play_mode(mut self, mode: PlayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Takes effect the next time a track finishes on its own.
    pub fn set_play_mode(&mut self, mode: PlayMode) -> Result<()> {
        if self.terminated {
            return Err(PlayerError::Terminated);
        }
        info!(?mode, "set play mode");
        self.mode = mode;
        Ok(())
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn play_mode(&self) -> PlayMode {
        self.mode
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.backend.as_ref().and_then(|b| b.duration())
    }

    pub fn position(&self) -> Duration {
        self.backend
            .as_ref()
            .map_or(Duration::ZERO, |b| b.position())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            status: self.status,
            mode: self.mode,
            track: self.current.clone(),
            position: self.position(),
            duration: self.duration(),
        }
    }

    /// Dispatch every pending backend callback. Returns how many ran.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while !self.terminated {
            let Some(event) = self.backend.as_mut().and_then(|b| b.poll_event()) else {
                break;
            };
            handled += 1;
            match event {
                MediaEvent::Prepared => self.on_prepared(),
                MediaEvent::Completed => self.on_completion(),
                MediaEvent::Error(e) => self.on_error(e),
            }
        }
        handled
    }

    /// Stop and release the backend and clear the foreground indicator.
    ///
    /// Safe to call more than once; only the first call has effects. The
    /// engine accepts no commands afterwards.
    pub fn teardown(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            info!("stop and release media player");
            if backend.is_playing() {
                backend.stop();
            }
            drop(backend);
        }
        // Silent: observers are going away with the engine.
        self.update_status(PlaybackStatus::Idle);
        if self.foreground_active {
            debug!("stop foreground");
            self.foreground.stop_foreground();
            self.foreground_active = false;
        }
        self.terminated = true;
    }

    fn update_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            info!(from = %self.status, to = %status, "update status");
        }
        self.status = status;
    }

    fn update_and_broadcast(&mut self, status: PlaybackStatus) {
        self.update_status(status);
        self.broadcaster.publish(status);
    }
}

impl<B: MediaBackend> PlayerListener for Engine<B> {
    fn on_prepared(&mut self) {
        debug!("on_prepared called");
        let Some(title) = self.current.as_ref().map(|t| t.title().to_string()) else {
            warn!("media prepared without a current track");
            return;
        };
        info!(%title, "play music now");

        self.update_status(PlaybackStatus::Idle);
        if let Err(e) = self.resume() {
            warn!(error = %e, "failed to start prepared media");
            return;
        }

        self.foreground.start_foreground(&title);
        self.foreground_active = true;
    }

    fn on_error(&mut self, error: MediaError) {
        warn!(%error, "media error, stopping");
        self.update_and_broadcast(PlaybackStatus::Idle);
        self.teardown();
    }

    fn on_completion(&mut self) {
        debug!("on_completion called");
        self.update_and_broadcast(PlaybackStatus::Idle);
        debug!(mode = ?self.mode, "current play mode");
        if self.mode == PlayMode::Looping {
            if let Err(e) = self.resume() {
                warn!(error = %e, "failed to loop track");
            }
        }
    }
}

impl<B: MediaBackend> Drop for Engine<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
