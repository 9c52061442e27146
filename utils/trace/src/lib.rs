use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for TraceFormat {
    type Err = TracingInitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(TracingInitError::UnknownFormat {
                format: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TraceSettings {
    /// Filter used when `RUST_LOG` is not set, e.g. `info` or `projects_gitlinkr=debug`.
    pub level: String,
    pub format: TraceFormat,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TraceFormat::Compact,
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `settings.level`.
pub fn init(settings: &TraceSettings) -> Result<(), TracingInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|source| TracingInitError::InvalidFilter { source })?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match settings.format {
        TraceFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().compact().with_target(true)),
        ),
        TraceFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().flatten_event(true)),
        ),
    };

    result.map_err(|source| TracingInitError::SetGlobalDefault { source })
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid filter config")]
    InvalidFilter {
        #[from]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to set global default subscriber")]
    SetGlobalDefault {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },

    #[error("Unknown log format: {format}")]
    UnknownFormat { format: String },
}
