//! Tracing subscriber installation

use config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for the process.
///
/// `RUST_LOG` wins over the configured filter when it is set:
/// - `RUST_LOG=info` - workflow start/success, business-rule rejections
/// - `RUST_LOG=shopkeep=debug,store_object=trace` - per-step detail
///
/// Returns `false` when a global subscriber was already installed.
pub fn setup_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_twice_is_harmless() {
        let config = LoggingConfig::default();
        let _ = setup_tracing(&config);
        assert!(!setup_tracing(&config));
    }
}
