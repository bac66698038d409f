use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{MediaError, Result};
use crate::host::ForegroundHost;
use crate::library::Track;

use super::backend::MediaBackend;
use super::broadcast::StatusBroadcaster;
use super::engine::Engine;
use super::types::{EngineSnapshot, PlayMode};

/// How long the service waits for a command before checking the backend for
/// callbacks.
const PUMP_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub(super) enum ServiceCmd {
    /// Load and start a track; the outcome of scheduling goes to `reply`.
    Play {
        track: Track,
        reply: Sender<Result<()>>,
    },
    Pause,
    Resume,
    SeekTo(Duration),
    SetPlayMode(PlayMode),
    Snapshot(Sender<EngineSnapshot>),
    Shutdown,
}

pub(super) fn spawn_service_thread<B, F>(
    rx: Receiver<ServiceCmd>,
    broadcaster: StatusBroadcaster,
    foreground: Box<dyn ForegroundHost>,
    initial_mode: PlayMode,
    create_backend: F,
    running: Arc<AtomicBool>,
) -> JoinHandle<()>
where
    B: MediaBackend + 'static,
    F: FnOnce() -> std::result::Result<B, MediaError> + Send + 'static,
{
    thread::spawn(move || {
        let mut engine: Engine<B> =
            Engine::new(broadcaster, foreground).with_play_mode(initial_mode);

        if let Err(e) = engine.activate(create_backend) {
            error!(error = %e, "could not create media player");
            running.store(false, Ordering::SeqCst);
            return;
        }

        run(&mut engine, &rx);

        engine.teardown();
        running.store(false, Ordering::SeqCst);
        info!("player service stopped");
    })
}

/// The service's sequential context: commands and backend callbacks are
/// handled here one at a time until shutdown or a fatal engine error.
fn run<B: MediaBackend>(engine: &mut Engine<B>, rx: &Receiver<ServiceCmd>) {
    loop {
        match rx.recv_timeout(PUMP_INTERVAL) {
            Ok(ServiceCmd::Shutdown) => {
                debug!("shutdown requested");
                break;
            }
            Ok(cmd) => handle(engine, cmd),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        engine.pump_events();

        if engine.is_terminated() {
            warn!("player engine terminated, stopping service");
            break;
        }
    }
}

fn handle<B: MediaBackend>(engine: &mut Engine<B>, cmd: ServiceCmd) {
    let result = match cmd {
        ServiceCmd::Play { track, reply } => {
            // The engine logs its own failure; the caller decides what to show.
            let _ = reply.send(engine.play(track));
            return;
        }
        ServiceCmd::Pause => engine.pause(),
        ServiceCmd::Resume => engine.resume(),
        ServiceCmd::SeekTo(position) => engine.seek_to(position),
        ServiceCmd::SetPlayMode(mode) => engine.set_play_mode(mode),
        ServiceCmd::Snapshot(reply) => {
            let _ = reply.send(engine.snapshot());
            Ok(())
        }
        ServiceCmd::Shutdown => Ok(()),
    };

    if let Err(e) = result {
        debug!(error = %e, "command failed");
    }
}
