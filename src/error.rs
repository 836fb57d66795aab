use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ggus(#[from] GgusError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum GgusError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("authentication failed: {message}")]
    Auth { message: String },
    #[error("could not parse ticket XML: {message}")]
    Parse {
        message: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open seen-ticket store {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("seen-ticket store query failed")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address {value:?}: {message}")]
    Address { value: String, message: String },
    #[error("failed to build mail message")]
    Message(#[from] lettre::error::Error),
    #[error("mail delivery failed")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<reqwest::Error> for GgusError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}

impl Error {
    /// Short machine-friendly label used in logs and the process exit report.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Ggus(GgusError::Auth { .. }) => "auth",
            Self::Ggus(GgusError::Parse { .. }) => "parse",
            Self::Ggus(_) => "transport",
            Self::Store(_) => "store",
            Self::Notify(_) => "notify",
            Self::Telemetry(_) => "telemetry",
        }
    }
}
