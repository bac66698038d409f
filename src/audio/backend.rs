//! The seam between the engine and whatever actually decodes audio.

use std::path::Path;
use std::time::Duration;

use crate::error::MediaError;

/// Callbacks a backend raises. They are queued by the backend and handed to
/// the engine on its own thread through [`MediaBackend::poll_event`].
#[derive(Debug)]
pub enum MediaEvent {
    /// The media passed to `prepare` is ready to start.
    Prepared,
    /// The started media reached its end.
    Completed,
    /// Playback failed; the backend is unusable until reset.
    Error(MediaError),
}

/// A native player handle.
///
/// Implementations are driven from a single thread and never called
/// concurrently. Releasing the handle is dropping it.
pub trait MediaBackend {
    /// Drop any loaded media and return to the empty state.
    fn reset(&mut self);

    /// Open `path` and schedule preparation. Failures to open or recognise the
    /// file are returned here; success is confirmed later by
    /// [`MediaEvent::Prepared`].
    fn prepare(&mut self, path: &Path) -> Result<(), MediaError>;

    /// Start or continue playback. After completion this starts over.
    fn start(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    fn seek_to(&mut self, position: Duration);

    fn position(&self) -> Duration;

    /// Length of the loaded media, when known.
    fn duration(&self) -> Option<Duration>;

    /// Next pending callback, if any.
    fn poll_event(&mut self) -> Option<MediaEvent>;
}

/// The three callbacks a player handle can deliver.
pub trait PlayerListener {
    fn on_prepared(&mut self);
    fn on_error(&mut self, error: MediaError);
    fn on_completion(&mut self);
}
