//! Process-level "now playing" indicator.
//!
//! While a track plays the process marks itself as doing user-visible work.
//! On the desktop that is the MPRIS object (see `crate::mpris`).

/// Host capability the engine uses to raise and clear the indicator.
pub trait ForegroundHost: Send {
    /// Mark the process as actively playing `title`. Called again with a new
    /// title when another track is prepared.
    fn start_foreground(&mut self, title: &str);

    /// Remove the indicator.
    fn stop_foreground(&mut self);
}

/// Used when no indicator can be published (no session bus).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoForeground;

impl ForegroundHost for NoForeground {
    fn start_foreground(&mut self, _title: &str) {}

    fn stop_foreground(&mut self) {}
}
