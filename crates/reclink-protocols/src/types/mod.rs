//! Data model shared by the coordinator and the extractor.

mod recording;
mod session;
mod tab;

pub use recording::*;
pub use session::*;
pub use tab::*;

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
