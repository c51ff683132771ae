use std::io;

use covenant_protocol::TimelineError;
use thiserror::Error;
use uuid::Uuid;

/// Result type used across the Covenant workspace.
pub type Result<T> = std::result::Result<T, CovenantError>;

/// Canonical error representation shared by all crates.
#[derive(Debug, Error)]
pub enum CovenantError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("timeline {0} is already initialized")]
    AlreadyInitialized(Uuid),

    #[error("timeline not found: {0}")]
    TimelineNotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("error: {0}")]
    General(String),
}

impl From<serde_json::Error> for CovenantError {
    fn from(err: serde_json::Error) -> Self {
        CovenantError::Deserialization(err.to_string())
    }
}

impl From<sqlx::Error> for CovenantError {
    fn from(err: sqlx::Error) -> Self {
        CovenantError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for CovenantError {
    fn from(err: anyhow::Error) -> Self {
        CovenantError::General(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {source}")]
    InvalidEnvVar {
        key: &'static str,
        #[source]
        source: std::env::VarError,
    },
}

impl From<ConfigError> for CovenantError {
    fn from(value: ConfigError) -> Self {
        CovenantError::Config(value.to_string())
    }
}
