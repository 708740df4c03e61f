//! Tracing setup for the embedding shell.
//!
//! Picto ships no binary of its own, so the shell that hosts the engine
//! calls [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise uses `default_level`
/// (e.g. `"info"`). Safe to call more than once: subsequent calls are
/// no-ops rather than panics.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging("debug");
        // A second call must not panic.
        init_logging("info");
    }
}
