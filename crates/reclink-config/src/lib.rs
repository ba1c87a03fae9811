//! # reclink config
//!
//! TOML configuration for reclink: the schedule site, the recording provider,
//! capture timing, table layout, browser connection, export and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
