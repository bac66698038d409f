//! Playback: the engine state machine, its media backend, the status
//! broadcaster and the service thread that owns all of them.

mod backend;
mod broadcast;
mod engine;
mod player;
mod sink;
mod thread;
mod types;

pub use backend::{MediaBackend, MediaEvent, PlayerListener};
pub use broadcast::{StatusBroadcaster, StatusSubscription, SubscriptionId};
pub use engine::Engine;
pub use player::{PlayerBinder, PlayerService};
pub use sink::RodioBackend;
pub use types::{EngineSnapshot, PlayMode, PlaybackStatus, StatusEvent};

#[cfg(test)]
pub(crate) mod fake;
