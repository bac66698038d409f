//! `rodio` implementation of the media backend.
//!
//! Seeking rebuilds the sink and skips into the file, so elapsed time is
//! tracked here rather than asked from the sink.

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use crate::error::MediaError;

use super::backend::{MediaBackend, MediaEvent};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SinkState {
    Empty,
    Prepared,
    Started,
    Paused,
    Completed,
}

/// What `start` needs from the sink.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum StartAction {
    /// Nothing loaded, or already running.
    Ignore,
    /// Unpause the current sink.
    Play,
    /// The sink ran dry; rebuild it from the beginning, then play.
    Rewind,
}

/// Transport state and elapsed-time clock, kept apart from the device so the
/// transitions can be checked without audio output.
#[derive(Debug, Clone)]
struct Transport {
    state: SinkState,
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Transport {
    fn new() -> Self {
        Self {
            state: SinkState::Empty,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    fn clear(&mut self) {
        *self = Self::new();
    }

    fn loaded(&mut self) {
        *self = Self {
            state: SinkState::Prepared,
            ..Self::new()
        };
    }

    fn is_playing(&self) -> bool {
        self.state == SinkState::Started
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }

    fn start(&mut self, now: Instant) -> StartAction {
        let action = match self.state {
            SinkState::Empty | SinkState::Started => return StartAction::Ignore,
            SinkState::Completed => {
                self.accumulated = Duration::ZERO;
                StartAction::Rewind
            }
            SinkState::Prepared | SinkState::Paused => StartAction::Play,
        };
        self.started_at = Some(now);
        self.state = SinkState::Started;
        action
    }

    /// Returns whether the sink has to be paused.
    fn pause(&mut self, now: Instant) -> bool {
        if self.state != SinkState::Started {
            return false;
        }
        self.bank(now);
        self.state = SinkState::Paused;
        true
    }

    /// Move the clock to `position`. Returns `None` when nothing is loaded,
    /// otherwise whether playback continues after the sink is rebuilt.
    fn seek(&mut self, position: Duration, now: Instant) -> Option<bool> {
        let resume = match self.state {
            SinkState::Empty => return None,
            SinkState::Started => true,
            SinkState::Completed => {
                self.state = SinkState::Paused;
                false
            }
            SinkState::Prepared | SinkState::Paused => false,
        };
        self.accumulated = position;
        self.started_at = resume.then_some(now);
        Some(resume)
    }

    /// The sink drained while started. Returns whether this is news.
    fn complete(&mut self, now: Instant) -> bool {
        if self.state != SinkState::Started {
            return false;
        }
        self.bank(now);
        self.state = SinkState::Completed;
        true
    }

    fn bank(&mut self, now: Instant) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(st);
        }
    }
}

pub struct RodioBackend {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    transport: Transport,
    events: VecDeque<MediaEvent>,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped; that would land on
        // top of the terminal UI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            path: None,
            duration: None,
            transport: Transport::new(),
            events: VecDeque::new(),
        })
    }

    fn play_sink(&self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
    }

    /// Replace the sink with a paused one reading `path` from `start_at`.
    fn rebuild_at(&mut self, start_at: Duration) -> Result<(), MediaError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let (sink, _) = create_sink_at(&self.stream, &path, start_at)?;
        self.sink = Some(sink);
        Ok(())
    }

    fn fail(&mut self, error: MediaError) {
        self.transport.clear();
        self.events.push_back(MediaEvent::Error(error));
    }
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the decoder's own idea of the total length.
fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let file = File::open(path).map_err(|source| MediaError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| MediaError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let total = decoder.total_duration();

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

/// Read the track length from its tags/stream properties.
fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

impl MediaBackend for RodioBackend {
    fn reset(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.path = None;
        self.duration = None;
        self.transport.clear();
        self.events.clear();
    }

    fn prepare(&mut self, path: &Path) -> Result<(), MediaError> {
        self.reset();

        let (sink, decoder_total) = create_sink_at(&self.stream, path, Duration::ZERO)?;
        self.duration = probe_duration(path).or(decoder_total);
        self.sink = Some(sink);
        self.path = Some(path.to_path_buf());
        self.transport.loaded();
        debug!(path = %path.display(), duration = ?self.duration, "media prepared");

        self.events.push_back(MediaEvent::Prepared);
        Ok(())
    }

    fn start(&mut self) {
        match self.transport.start(Instant::now()) {
            StartAction::Ignore => debug!("start ignored"),
            StartAction::Play => self.play_sink(),
            StartAction::Rewind => match self.rebuild_at(Duration::ZERO) {
                Ok(()) => self.play_sink(),
                Err(e) => self.fail(e),
            },
        }
    }

    fn pause(&mut self) {
        if self.transport.pause(Instant::now()) {
            if let Some(sink) = self.sink.as_ref() {
                sink.pause();
            }
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.stop();
        }
        self.transport.clear();
    }

    fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    fn seek_to(&mut self, position: Duration) {
        let Some(resume) = self.transport.seek(position, Instant::now()) else {
            return;
        };
        if let Err(e) = self.rebuild_at(position) {
            warn!(error = %e, "seek failed");
            self.fail(e);
            return;
        }
        if resume {
            self.play_sink();
        }
    }

    fn position(&self) -> Duration {
        let elapsed = self.transport.elapsed(Instant::now());
        match self.duration {
            Some(total) => elapsed.min(total),
            None => elapsed,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        if let Some(ev) = self.events.pop_front() {
            return Some(ev);
        }
        let drained = self.sink.as_ref().map(|s| s.empty()).unwrap_or(true);
        if drained && self.transport.complete(Instant::now()) {
            return Some(MediaEvent::Completed);
        }
        None
    }
}
