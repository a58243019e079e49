//! Shared types: the error enum and mode constants

mod errors;
pub mod mode;

pub use errors::{ConfigError, Result};
