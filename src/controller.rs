//! Player screen logic, independent of how it is drawn.
//!
//! The controller binds to the player service, keeps a view of the engine
//! in sync through status broadcasts, and polls the playback position while
//! something is playing.

mod model;
mod poll;

pub use model::*;
pub use poll::ProgressPoll;
