//! Tracing subscriber setup for the routine service.

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter directives applied when the caller sets a bare level rather than a
/// full filter string. Per-request chatter from the HTTP stack stays at warn
/// so quiz and billing events remain readable at info.
fn default_directives(level: &str) -> String {
    format!("{level},hyper=warn,tower=warn,mio=warn")
}

/// A full filter string (anything with a `=` directive) is taken verbatim;
/// a bare level gets the service defaults appended.
fn directives_for(log_level: &str) -> String {
    if log_level.contains('=') {
        log_level.to_string()
    } else {
        default_directives(log_level)
    }
}

/// Install the global subscriber. `RUST_LOG` wins outright; otherwise the
/// configured level seeds the service defaults.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = directives_for(&config.log_level);
            EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
                value: config.log_level.clone(),
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
