use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{PlayMode, PlaybackStatus, PlayerBinder, StatusSubscription};
use crate::config::Settings;
use crate::error::{PlayerError, Result};
use crate::library::Track;

use super::poll::ProgressPoll;

/// What the player screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerView {
    pub title: String,
    pub status: PlaybackStatus,
    pub looping: bool,
    /// Position in `0..=progress_max` units.
    pub progress: u32,
    pub position: Duration,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The requested track was handed to the engine.
    Started,
    /// Nothing new was requested; the view was rebuilt from the engine.
    Resynced,
    /// The requested track could not be played. Carries the user notice.
    Failed(String),
}

pub struct PlayerController {
    binder: Option<PlayerBinder>,
    subscription: Option<StatusSubscription>,
    poll: ProgressPoll,
    step: u32,
    progress_max: u32,
    view: PlayerView,
}

impl PlayerController {
    pub fn new(step: u32, progress_max: u32, poll_interval: Duration) -> Self {
        Self {
            binder: None,
            subscription: None,
            poll: ProgressPoll::new(poll_interval),
            step,
            progress_max: progress_max.max(1),
            view: PlayerView::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.controls.step,
            settings.controls.progress_max,
            Duration::from_millis(settings.ui.progress_interval_ms),
        )
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn poll(&self) -> &ProgressPoll {
        &self.poll
    }

    pub fn progress_max(&self) -> u32 {
        self.progress_max
    }

    pub fn step_size(&self) -> u32 {
        self.step
    }

    pub fn is_attached(&self) -> bool {
        self.binder.is_some()
    }

    /// Bind the screen to the service.
    ///
    /// The status subscription is registered before anything is queried so
    /// no transition falls between the query and the first event. When
    /// `request` names a track the engine is not already on, it is played;
    /// otherwise the view is rebuilt from the engine's current state.
    pub fn attach(
        &mut self,
        binder: PlayerBinder,
        request: Option<Track>,
        now: Instant,
    ) -> AttachOutcome {
        self.detach();
        self.subscription = Some(binder.subscribe());
        self.binder = Some(binder);

        let current = match self.binder().and_then(|b| b.current_track()) {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "player service unavailable");
                self.detach();
                return AttachOutcome::Failed(format!("player unavailable: {e}"));
            }
        };

        match request {
            Some(track) if current.as_ref() != Some(&track) => self.play(track),
            _ => {
                if let Err(e) = self.resync(now) {
                    warn!(error = %e, "failed to resync player view");
                }
                AttachOutcome::Resynced
            }
        }
    }

    fn play(&mut self, track: Track) -> AttachOutcome {
        self.view = PlayerView {
            title: track.title().to_string(),
            ..PlayerView::default()
        };

        let title = track.title().to_string();
        let played = self.binder().and_then(|b| {
            b.play(track)?;
            b.play_mode()
        });
        match played {
            Ok(mode) => {
                info!(%title, ?mode, "playing");
                self.view.looping = mode == PlayMode::Looping;
                AttachOutcome::Started
            }
            Err(e) => {
                warn!(%title, error = %e, "failed to play music");
                self.detach();
                AttachOutcome::Failed(format!("failed to play music [{title}]"))
            }
        }
    }

    /// Rebuild the whole view from the engine.
    pub fn resync(&mut self, now: Instant) -> Result<()> {
        let snapshot = self.binder()?.snapshot()?;
        self.view.title = snapshot
            .track
            .as_ref()
            .map(|t| t.title().to_string())
            .unwrap_or_default();
        self.view.looping = snapshot.mode == PlayMode::Looping;
        self.on_status(snapshot.status, now);
        Ok(())
    }

    /// Stop polling, drop the subscription and give the binder back.
    pub fn detach(&mut self) {
        self.poll.cancel();
        let subscription = self.subscription.take();
        if let Some(binder) = self.binder.take() {
            if let Some(sub) = subscription {
                binder.unsubscribe(sub);
            }
            binder.unbind();
        }
    }

    /// Apply every status broadcast received since the last call.
    pub fn drain_status(&mut self, now: Instant) -> usize {
        let events = self
            .subscription
            .as_ref()
            .map(|s| s.drain())
            .unwrap_or_default();
        for ev in &events {
            debug!(status = %ev.status, "receive player status");
            self.on_status(ev.status, now);
        }
        events.len()
    }

    pub fn on_status(&mut self, status: PlaybackStatus, now: Instant) {
        self.view.status = status;
        self.poll.cancel();
        self.update_progress(now);
    }

    /// Run the progress poll if it is due.
    pub fn tick(&mut self, now: Instant) {
        if self.poll.is_due(now) {
            self.poll.cancel();
            self.update_progress(now);
        }
    }

    /// Resume when idle or paused, pause when playing.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        let binder = self.binder()?;
        match binder.status()? {
            PlaybackStatus::Idle | PlaybackStatus::Paused => binder.resume(),
            PlaybackStatus::Playing => binder.pause(),
        }
    }

    /// Flip the engine's play mode. The engine, not the view, is the source
    /// of the current mode.
    pub fn toggle_looping(&mut self) -> Result<()> {
        let binder = self.binder()?;
        let mode = binder.play_mode()?.toggled();
        binder.set_play_mode(mode)?;
        self.view.looping = mode == PlayMode::Looping;
        Ok(())
    }

    /// Skip `direction * step` progress units, clamped to the track.
    pub fn step(&mut self, direction: i32) -> Result<()> {
        let delta = i64::from(direction) * i64::from(self.step);
        let target = i64::from(self.view.progress) + delta;
        self.seek_to_units(target)?;
        self.refresh_progress()
    }

    /// Seek to an absolute progress value in `0..=progress_max`.
    pub fn seek_to_progress(&mut self, progress: u32, now: Instant) -> Result<()> {
        self.poll.cancel();
        self.seek_to_units(i64::from(progress))?;
        self.update_progress(now);
        Ok(())
    }

    fn seek_to_units(&mut self, units: i64) -> Result<()> {
        let binder = self.binder()?;
        let Some(duration) = binder.duration()? else {
            debug!("duration unknown, not seeking");
            return Ok(());
        };
        let position = units_to_position(units, duration, self.progress_max);
        binder.seek_to(position)
    }

    fn update_progress(&mut self, now: Instant) {
        match self.view.status {
            PlaybackStatus::Idle => {
                self.view.progress = 0;
                self.view.position = Duration::ZERO;
            }
            PlaybackStatus::Paused => {
                if let Err(e) = self.refresh_progress() {
                    warn!(error = %e, "failed to read position");
                }
            }
            PlaybackStatus::Playing => {
                if let Err(e) = self.refresh_progress() {
                    warn!(error = %e, "failed to read position");
                    return;
                }
                self.poll.schedule(now);
            }
        }
    }

    fn refresh_progress(&mut self) -> Result<()> {
        let snapshot = self.binder()?.snapshot()?;
        self.view.position = snapshot.position;
        self.view.duration = snapshot.duration;
        self.view.progress =
            position_to_units(snapshot.position, snapshot.duration, self.progress_max);
        Ok(())
    }

    fn binder(&self) -> Result<&PlayerBinder> {
        self.binder.as_ref().ok_or(PlayerError::ServiceStopped)
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.detach();
    }
}

/// `units * duration / max`, clamped to `[0, duration]`.
pub fn units_to_position(units: i64, duration: Duration, max: u32) -> Duration {
    let total = duration.as_millis() as i64;
    let ms = units.saturating_mul(total) / i64::from(max.max(1));
    Duration::from_millis(ms.clamp(0, total) as u64)
}

/// `position * max / duration`; zero when the duration is unknown.
pub fn position_to_units(position: Duration, duration: Option<Duration>, max: u32) -> u32 {
    let Some(total) = duration.map(|d| d.as_millis()).filter(|&t| t > 0) else {
        return 0;
    };
    let units = position.as_millis() * u128::from(max) / total;
    units.min(u128::from(max)) as u32
}
