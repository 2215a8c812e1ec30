use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, LoggingConfig, MarketDataConfig, QueryConfig, SignalSettings, WatchlistEntry,
};

/// Loads the application configuration.
///
/// `config.toml` in the working directory is optional; every field has a default.
/// Environment variables prefixed with `CLON` override file values, using `__` to
/// separate nesting levels (e.g. `CLON__SIGNALS__DISCLAIMER`).
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config")
}

/// Same as [`load_config`] but with an explicit file stem or path.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("CLON").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{MIN_CANDLES, Timeframe};

    // The only test in the crate that touches the process environment.
    #[test]
    fn environment_overrides_defaults() {
        let missing_file = "no-such-clon-config";

        // SAFETY: no other test in this crate reads or writes these variables.
        unsafe {
            std::env::set_var("CLON__SIGNALS__CANDLE_COUNT", "500");
            std::env::set_var("CLON__QUERY__PRIMARY_TIMEFRAME", "1D");
        }
        let config = load_config_from(missing_file);

        unsafe {
            std::env::set_var("CLON__SIGNALS__CANDLE_COUNT", (MIN_CANDLES - 1).to_string());
        }
        let too_short = load_config_from(missing_file);

        unsafe {
            std::env::remove_var("CLON__SIGNALS__CANDLE_COUNT");
            std::env::remove_var("CLON__QUERY__PRIMARY_TIMEFRAME");
        }

        let config = config.unwrap();
        assert_eq!(config.signals.candle_count, 500);
        assert_eq!(config.query.primary_timeframe, Timeframe::D1);
        assert_eq!(config.query.confirmation_timeframe, Timeframe::H1);
        assert!(matches!(too_short, Err(ConfigError::ValidationError(_))));
    }
}
