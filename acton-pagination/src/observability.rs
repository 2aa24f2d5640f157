//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a global fmt subscriber filtered at the configured level
///
/// An unparsable level falls back to `info`. Calling this again once a
/// global subscriber is installed leaves the existing one in place and
/// returns `false`.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::info!(level = %config.level, json = config.json, "Tracing initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = LoggingConfig {
            level: "not a level ((".to_string(),
            json: true,
        };
        // This should not panic
        let first = init_tracing(&config);
        let second = init_tracing(&LoggingConfig::default());
        assert!(!second || !first);
    }
}
