//! Music library: the `Track` value type and the directory scanner.

mod model;
mod scan;

pub use model::Track;
pub use scan::scan;

#[cfg(test)]
mod tests;
