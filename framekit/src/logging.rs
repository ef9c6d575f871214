//! Logging initialization

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `default_directive` (for example
/// `"info"` or `"framekit_media=debug"`). Returns false when a global
/// subscriber is already installed, so repeated calls are harmless.
///
/// ```bash
/// RUST_LOG=framekit_media=debug cargo run --example hybrid_playback
/// ```
pub fn init_logging(default_directive: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_names(true)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_logging("warn");
        assert!(!init_logging("debug"));
    }
}
