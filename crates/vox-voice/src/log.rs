//! Log sink used by speech sessions.
//!
//! Sessions report through a `Logger` so an embedding application can route
//! session events wherever it wants. The default forwards to `tracing`.

use tracing::Level;

pub trait Logger: Send + Sync {
    /// Records one message. Must not fail observably.
    fn log(&self, level: Level, origin: &str, message: &str);
}

/// Forwards session messages to `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, origin: &str, message: &str) {
        match level {
            Level::ERROR => tracing::error!(origin, "{}", message),
            Level::WARN => tracing::warn!(origin, "{}", message),
            Level::INFO => tracing::info!(origin, "{}", message),
            Level::DEBUG => tracing::debug!(origin, "{}", message),
            _ => tracing::trace!(origin, "{}", message),
        }
    }
}
