//! Application model types: `App` and `Screen`.

use std::time::{Duration, Instant};

use crate::library::Track;

/// Which screen the terminal shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    List,
    Player,
}

/// A short message that disappears on its own.
#[derive(Clone, Debug)]
struct Notice {
    text: String,
    until: Instant,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub screen: Screen,
    pub current_dir: Option<String>,
    notice: Option<Notice>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            selected: 0,
            screen: Screen::List,
            current_dir: None,
            notice: None,
        }
    }

    /// Record the listed directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Move selection to the next track, stopping at the end.
    pub fn next(&mut self) {
        if self.selected + 1 < self.tracks.len() {
            self.selected += 1;
        }
    }

    /// Move selection to the previous track, stopping at the top.
    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    pub fn open_player(&mut self) {
        self.screen = Screen::Player;
    }

    pub fn back_to_list(&mut self) {
        self.screen = Screen::List;
    }

    /// Show `text` until `now + ttl`.
    pub fn show_notice(&mut self, text: impl Into<String>, now: Instant, ttl: Duration) {
        self.notice = Some(Notice {
            text: text.into(),
            until: now + ttl,
        });
    }

    /// The notice still visible at `now`, if any.
    pub fn notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| now < n.until)
            .map(|n| n.text.as_str())
    }
}
