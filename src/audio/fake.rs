//! In-memory backend and foreground host for tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::MediaError;
use crate::host::ForegroundHost;

use super::backend::{MediaBackend, MediaEvent};

#[derive(Debug, Default)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub loaded: Option<PathBuf>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub events: VecDeque<MediaEvent>,
    pub released: usize,
}

/// Handle tests keep to inspect the fake and inject callbacks.
#[derive(Debug, Clone, Default)]
pub struct FakeControl(Arc<Mutex<FakeState>>);

impl FakeControl {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.0.lock().unwrap()
    }

    pub fn backend(&self) -> FakeBackend {
        FakeBackend {
            control: self.clone(),
        }
    }

    pub fn finish(&self) {
        let mut s = self.state();
        s.playing = false;
        s.events.push_back(MediaEvent::Completed);
    }

    pub fn fail(&self, msg: &str) {
        self.state()
            .events
            .push_back(MediaEvent::Error(MediaError::Playback(msg.to_string())));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }
}

/// Files whose name contains `missing` fail to open; everything else
/// prepares with a 200 second duration.
#[derive(Debug)]
pub struct FakeBackend {
    control: FakeControl,
}

impl MediaBackend for FakeBackend {
    fn reset(&mut self) {
        let mut s = self.control.state();
        s.calls.push("reset".into());
        s.loaded = None;
        s.playing = false;
        s.position = Duration::ZERO;
        s.duration = None;
    }

    fn prepare(&mut self, path: &Path) -> Result<(), MediaError> {
        let mut s = self.control.state();
        s.calls.push(format!("prepare {}", path.display()));
        if path.to_string_lossy().contains("missing") {
            return Err(MediaError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        s.loaded = Some(path.to_path_buf());
        s.duration = Some(Duration::from_secs(200));
        s.events.push_back(MediaEvent::Prepared);
        Ok(())
    }

    fn start(&mut self) {
        let mut s = self.control.state();
        s.calls.push("start".into());
        s.playing = true;
    }

    fn pause(&mut self) {
        let mut s = self.control.state();
        s.calls.push("pause".into());
        s.playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.control.state();
        s.calls.push("stop".into());
        s.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.control.state().playing
    }

    fn seek_to(&mut self, position: Duration) {
        let mut s = self.control.state();
        s.calls.push(format!("seek {}", position.as_millis()));
        s.position = position;
    }

    fn position(&self) -> Duration {
        self.control.state().position
    }

    fn duration(&self) -> Option<Duration> {
        self.control.state().duration
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.control.state().events.pop_front()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        if let Ok(mut s) = self.control.0.lock() {
            s.released += 1;
        }
    }
}

/// Records foreground requests.
#[derive(Debug, Clone, Default)]
pub struct FakeForeground(pub Arc<Mutex<Vec<String>>>);

impl FakeForeground {
    pub fn log(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ForegroundHost for FakeForeground {
    fn start_foreground(&mut self, title: &str) {
        self.0.lock().unwrap().push(format!("start {title}"));
    }

    fn stop_foreground(&mut self) {
        self.0.lock().unwrap().push("stop".into());
    }
}
