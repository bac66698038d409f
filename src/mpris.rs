//! MPRIS presence on the session bus.
//!
//! This is the desktop form of the foreground playback indicator: while a
//! track is playing the process is listed as an active media player with the
//! track's title. Remote `Play`/`Pause`/`PlayPause`/`Quit` calls come back to
//! the runtime as [`ControlCmd`]s.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{OwnedValue, Value};

use crate::audio::PlaybackStatus;
use crate::host::ForegroundHost;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
}

#[derive(Debug, Default)]
struct SharedState {
    /// Whether the foreground indicator is raised.
    active: bool,
    status: PlaybackStatus,
    title: Option<String>,
}

/// Shared view of the MPRIS object. A default handle is not on the bus.
#[derive(Clone, Debug, Default)]
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    /// Mirror the latest broadcast status.
    pub fn set_status(&self, status: PlaybackStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
        }
    }
}

impl ForegroundHost for MprisHandle {
    fn start_foreground(&mut self, title: &str) {
        debug!(%title, "mpris: now playing");
        if let Ok(mut s) = self.state.lock() {
            s.active = true;
            s.title = Some(title.to_string());
        }
    }

    fn stop_foreground(&mut self) {
        debug!("mpris: cleared");
        if let Ok(mut s) = self.state.lock() {
            s.active = false;
            s.title = None;
            s.status = PlaybackStatus::Idle;
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "andante"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec!["audio/mpeg".to_string()]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        if !s.active {
            return "Stopped";
        }
        match s.status {
            PlaybackStatus::Idle => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.state.lock().map(|s| s.active).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.state.lock().map(|s| s.active).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let title = self.state.lock().ok().and_then(|s| s.title.clone());

        if let Some(title) = title {
            if let Ok(v) = OwnedValue::try_from(Value::from(title)) {
                map.insert("xesam:title".to_string(), v);
            }
        }
        map
    }
}

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.andante";

/// Register both interfaces and keep the connection open.
async fn serve(tx: Sender<ControlCmd>, state: Arc<Mutex<SharedState>>) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let server = connection.object_server();
    server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await?;
    server.at(OBJECT_PATH, PlayerIface { tx, state }).await?;
    debug!(name = BUS_NAME, "mpris: registered");

    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}

/// Publish the MPRIS object from a background thread and return the handle
/// used to update it. Bus failures are logged; the handle keeps working as a
/// plain state holder.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let handle = MprisHandle::default();

    let state = handle.state.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(tx, state)) {
            warn!(error = %e, "mpris: unavailable");
        }
    });

    handle
}
