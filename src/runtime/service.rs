use tracing::{info, warn};

use crate::audio::{PlayMode, PlaybackStatus, PlayerBinder, PlayerService, StatusSubscription};
use crate::error::Result;
use crate::host::ForegroundHost;
use crate::mpris::{ControlCmd, MprisHandle};

/// Owns the playback service for the lifetime of the terminal session.
///
/// The service is started on first use. After a fatal media error it exits,
/// and the next bind starts a fresh one in its place.
type StartFn = Box<dyn Fn(PlayMode, Box<dyn ForegroundHost>) -> PlayerService>;

pub struct ServiceHost {
    start: StartFn,
    initial_mode: PlayMode,
    mpris: MprisHandle,
    service: Option<PlayerService>,
    mirror: Option<StatusSubscription>,
}

impl ServiceHost {
    /// Services play on the default audio output.
    pub fn new(initial_mode: PlayMode, mpris: MprisHandle) -> Self {
        Self::with_starter(initial_mode, mpris, Box::new(PlayerService::start))
    }

    pub fn with_starter(initial_mode: PlayMode, mpris: MprisHandle, start: StartFn) -> Self {
        Self {
            start,
            initial_mode,
            mpris,
            service: None,
            mirror: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.service.as_ref().is_some_and(PlayerService::is_running)
    }

    /// Bind to the service, starting or restarting it when needed.
    pub fn bind(&mut self) -> PlayerBinder {
        if let Some(service) = self.service.as_ref().filter(|s| s.is_running()) {
            return service.bind();
        }
        self.restart().bind()
    }

    fn restart(&mut self) -> &PlayerService {
        if let Some(old) = self.service.take() {
            info!(
                stale_bindings = old.binding_count(),
                "player service stopped, starting a new one"
            );
            old.shutdown();
        }
        let service = (self.start)(self.initial_mode, Box::new(self.mpris.clone()));
        self.mirror = Some(service.subscribe());
        self.service.insert(service)
    }

    /// Copy pending status broadcasts onto the MPRIS presence.
    pub fn sync_mpris(&self) {
        if let Some(sub) = &self.mirror {
            for ev in sub.drain() {
                self.mpris.set_status(ev.status);
            }
        }
    }

    /// Apply a remote media-key command. `Quit` is handled by the caller.
    pub fn handle_remote(&mut self, cmd: &ControlCmd) -> Result<()> {
        if !self.is_running() {
            // Nothing loaded: remote play has no track to resume.
            return Ok(());
        }
        let binder = self.bind();
        let result = match cmd {
            ControlCmd::Play => binder.resume(),
            ControlCmd::Pause => binder.pause(),
            ControlCmd::PlayPause => match binder.status() {
                Ok(PlaybackStatus::Playing) => binder.pause(),
                Ok(_) => binder.resume(),
                Err(e) => Err(e),
            },
            ControlCmd::Quit => Ok(()),
        };
        binder.unbind();
        if let Err(e) = &result {
            warn!(?cmd, error = %e, "remote control failed");
        }
        result
    }

    pub fn shutdown(&mut self) {
        self.mirror = None;
        if let Some(service) = self.service.take() {
            service.shutdown();
        }
    }
}

impl Drop for ServiceHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests;
