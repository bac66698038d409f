//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the scanned tracks, the
//! list selection, the active screen and any transient notice.

mod model;

pub use model::*;
