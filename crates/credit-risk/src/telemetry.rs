//! Tracing setup for the scoring service. `RUST_LOG` wins when set;
//! otherwise the filter comes from [`TelemetryConfig`].

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

fn configured_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
        value: config.log_level.clone(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(config)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(config.ansi)
        .try_init()
        .map_err(TelemetryError::Subscriber)?;

    tracing::debug!(filter = %config.log_level, ansi = config.ansi, "telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_level_and_directive_filters() {
        let config = TelemetryConfig {
            log_level: "info".to_string(),
            ansi: false,
        };
        assert!(configured_filter(&config).is_ok());

        let config = TelemetryConfig {
            log_level: "warn,credit_risk=debug".to_string(),
            ansi: false,
        };
        assert!(configured_filter(&config).is_ok());
    }

    #[test]
    fn rejects_malformed_filter_with_typed_error() {
        let config = TelemetryConfig {
            log_level: "credit_risk=debug=extra".to_string(),
            ansi: false,
        };
        let err = configured_filter(&config).err().expect("filter rejected");
        assert!(matches!(err, TelemetryError::EnvFilter { ref value, .. }
            if value == "credit_risk=debug=extra"));
    }
}
