// src/error.rs

//! Unified error handling for the flight search engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for skysniper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Request exceeded the configured timeout
    #[error("Request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// Connection could not be established or was dropped
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Backend answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Backend response is missing a field the protocol depends on
    #[error("Protocol error from {adapter}: {message}")]
    Protocol { adapter: String, message: String },

    /// A single flight or price-option record could not be decoded
    #[error("Malformed {record} record: {message}")]
    Record { record: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a transport error for a URL.
    pub fn transport(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a protocol error attributed to an adapter.
    pub fn protocol(adapter: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Protocol {
            adapter: adapter.into(),
            message: message.to_string(),
        }
    }

    /// Create a record parse error.
    pub fn record(record: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Record {
            record: record.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error came from talking to a backend (network or status).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout { .. } | Self::Transport { .. } | Self::Status { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(AppError::transport("https://x", "refused").is_transport());
        assert!(
            AppError::Status {
                status: 503,
                url: "https://x".into()
            }
            .is_transport()
        );
        assert!(!AppError::protocol("alibaba", "no requestId").is_transport());
        assert!(!AppError::config("bad").is_transport());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = AppError::protocol("alibaba", "No requestId in response");
        assert_eq!(
            err.to_string(),
            "Protocol error from alibaba: No requestId in response"
        );

        let err = AppError::record("proposal", "missing leavingFlightGroup");
        assert_eq!(
            err.to_string(),
            "Malformed proposal record: missing leavingFlightGroup"
        );
    }
}
