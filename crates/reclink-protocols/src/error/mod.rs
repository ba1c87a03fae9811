//! Error types shared across reclink components.

mod extract;
mod host;
mod messaging;

pub use extract::*;
pub use host::*;
pub use messaging::*;
