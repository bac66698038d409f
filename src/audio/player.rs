use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{MediaError, PlayerError, Result};
use crate::host::ForegroundHost;
use crate::library::Track;

use super::backend::MediaBackend;
use super::broadcast::{StatusBroadcaster, StatusSubscription};
use super::sink::RodioBackend;
use super::thread::{ServiceCmd, spawn_service_thread};
use super::types::{EngineSnapshot, PlayMode, PlaybackStatus};

/// Long-lived playback service.
///
/// Owns the thread that runs the engine. Clients talk to it through
/// [`PlayerBinder`]s; unbinding leaves playback untouched.
pub struct PlayerService {
    tx: Sender<ServiceCmd>,
    broadcaster: StatusBroadcaster,
    running: Arc<AtomicBool>,
    bindings: Arc<AtomicUsize>,
    ever_bound: AtomicBool,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PlayerService {
    /// Start the service on the default audio output.
    pub fn start(initial_mode: PlayMode, foreground: Box<dyn ForegroundHost>) -> Self {
        Self::start_with(initial_mode, foreground, RodioBackend::open_default)
    }

    /// Start the service with a custom backend. `create_backend` runs on the
    /// service thread.
    pub fn start_with<B, F>(
        initial_mode: PlayMode,
        foreground: Box<dyn ForegroundHost>,
        create_backend: F,
    ) -> Self
    where
        B: MediaBackend + 'static,
        F: FnOnce() -> std::result::Result<B, MediaError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<ServiceCmd>();
        let broadcaster = StatusBroadcaster::new();
        let running = Arc::new(AtomicBool::new(true));

        let handle = spawn_service_thread(
            rx,
            broadcaster.clone(),
            foreground,
            initial_mode,
            create_backend,
            running.clone(),
        );
        info!("player service started");

        Self {
            tx,
            broadcaster,
            running,
            bindings: Arc::new(AtomicUsize::new(0)),
            ever_bound: AtomicBool::new(false),
            join: Mutex::new(Some(handle)),
        }
    }

    /// Hand out a client handle. The service keeps its state across
    /// unbind/bind cycles.
    pub fn bind(&self) -> PlayerBinder {
        let count = self.bindings.fetch_add(1, Ordering::SeqCst) + 1;
        if self.ever_bound.swap(true, Ordering::SeqCst) {
            debug!(bindings = count, "rebind");
        } else {
            debug!(bindings = count, "bind");
        }
        PlayerBinder {
            tx: self.tx.clone(),
            broadcaster: self.broadcaster.clone(),
            bindings: self.bindings.clone(),
        }
    }

    /// Number of binders currently handed out.
    pub fn binding_count(&self) -> usize {
        self.bindings.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Observe status transitions without binding.
    pub fn subscribe(&self) -> StatusSubscription {
        self.broadcaster.subscribe()
    }

    /// Stop the service thread and wait for it. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ServiceCmd::Shutdown);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for PlayerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Client handle to a running [`PlayerService`].
///
/// Every call fails with [`PlayerError::ServiceStopped`] once the service
/// thread is gone. Clones count as separate bindings; dropping one unbinds it.
#[derive(Debug)]
pub struct PlayerBinder {
    tx: Sender<ServiceCmd>,
    broadcaster: StatusBroadcaster,
    bindings: Arc<AtomicUsize>,
}

impl PlayerBinder {
    fn send(&self, cmd: ServiceCmd) -> Result<()> {
        self.tx.send(cmd).map_err(|_| PlayerError::ServiceStopped)
    }

    /// Load `track` and start it once prepared. Blocks only until the path
    /// has been opened; a failure here means the service has stopped.
    pub fn play(&self, track: Track) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(ServiceCmd::Play { track, reply })?;
        rx.recv().map_err(|_| PlayerError::ServiceStopped)?
    }

    pub fn pause(&self) -> Result<()> {
        self.send(ServiceCmd::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(ServiceCmd::Resume)
    }

    pub fn seek_to(&self, position: Duration) -> Result<()> {
        self.send(ServiceCmd::SeekTo(position))
    }

    pub fn set_play_mode(&self, mode: PlayMode) -> Result<()> {
        self.send(ServiceCmd::SetPlayMode(mode))
    }

    /// Current engine state in one round trip.
    pub fn snapshot(&self) -> Result<EngineSnapshot> {
        let (reply, rx) = mpsc::channel();
        self.send(ServiceCmd::Snapshot(reply))?;
        rx.recv().map_err(|_| PlayerError::ServiceStopped)
    }

    pub fn status(&self) -> Result<PlaybackStatus> {
        self.snapshot().map(|s| s.status)
    }

    pub fn play_mode(&self) -> Result<PlayMode> {
        self.snapshot().map(|s| s.mode)
    }

    pub fn current_track(&self) -> Result<Option<Track>> {
        self.snapshot().map(|s| s.track)
    }

    pub fn duration(&self) -> Result<Option<Duration>> {
        self.snapshot().map(|s| s.duration)
    }

    pub fn subscribe(&self) -> StatusSubscription {
        self.broadcaster.subscribe()
    }

    pub fn unsubscribe(&self, subscription: StatusSubscription) {
        self.broadcaster.unsubscribe(subscription.id());
    }

    /// Give the handle back. Playback continues.
    pub fn unbind(self) {
        drop(self);
    }
}

impl Clone for PlayerBinder {
    fn clone(&self) -> Self {
        let count = self.bindings.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(bindings = count, "bind (clone)");
        Self {
            tx: self.tx.clone(),
            broadcaster: self.broadcaster.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl Drop for PlayerBinder {
    fn drop(&mut self) {
        let left = self.bindings.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        debug!(bindings = left, "unbind");
    }
}
