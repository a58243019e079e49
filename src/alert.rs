//! User-facing alerts raised by the load pipeline

use tracing::warn;

/// Shown when a fetched configuration cannot be used
pub const LOAD_FAILURE_MESSAGE: &str =
    "The specified configuration could not be loaded! Reverting to previous configuration.";

/// Notifies the user; implementations may block until acknowledged
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

/// Routes alerts to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Prints alerts to stderr, for interactive use
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrAlert;

impl Alert for StderrAlert {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}
