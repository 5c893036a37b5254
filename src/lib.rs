//! Aviation Sync Library
//!
//! A Rust library for keeping a local airport registry consistent with an
//! authoritative aviation data source, and for serving airport and weather
//! lookups through a cache-aside read path.
//!
//! This library provides tools for:
//! - Reconciling pending airport records in bounded concurrent batches
//! - Resolving airport searches through cache, local store and external source
//! - Resolving current weather with staleness bounded to quarter-hour marks
//! - Enriching airport result sets with weather through a bounded worker pool
//! - In-memory and PostgreSQL record stores behind a single repository trait
//! - Comprehensive error handling with per-batch failure accounting

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services;
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Airport, AirportQuery, AirportWeather, SyncStatus, Weather, WeatherReport};
pub use config::Config;

/// Result type alias for the aviation sync service
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for aviation sync operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Airport record failed validation
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Record store operation failed
    #[error("Record store error: {message}")]
    RecordStore { message: String },

    /// Database driver error
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// No airport exists for the natural key
    #[error("Airport not found: icao = {icao}")]
    AirportNotFound { icao: String },

    /// External source answered with an unusable response
    #[error("External source error: {message}")]
    ExternalSource { message: String },

    /// HTTP transport to the external source failed
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// Payload could not be decoded
    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cache store operation failed
    #[error("Cache store error: {message}")]
    CacheStore { message: String },

    /// Job scheduler error
    #[error("Scheduler error: {message}")]
    Scheduler { message: String },

    /// Operation cancelled before completion
    #[error("Operation cancelled: {reason}")]
    Cancelled { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a record store error
    pub fn record_store(message: impl Into<String>) -> Self {
        Self::RecordStore {
            message: message.into(),
        }
    }

    /// Create a database error with context
    pub fn database(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }

    /// Create an airport not found error
    pub fn airport_not_found(icao: impl Into<String>) -> Self {
        Self::AirportNotFound { icao: icao.into() }
    }

    /// Create an external source error
    pub fn external_source(message: impl Into<String>) -> Self {
        Self::ExternalSource {
            message: message.into(),
        }
    }

    /// Create a transport error with context
    pub fn transport(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            message: message.into(),
            source,
        }
    }

    /// Create a decode error with context
    pub fn decode(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            message: message.into(),
            source,
        }
    }

    /// Create a cache store error
    pub fn cache_store(message: impl Into<String>) -> Self {
        Self::CacheStore {
            message: message.into(),
        }
    }

    /// Create a scheduler error
    pub fn scheduler(message: impl Into<String>) -> Self {
        Self::Scheduler {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// Whether the error came from talking to the external source
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Error::ExternalSource { .. } | Error::Transport { .. } | Error::Decode { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode {
            message: "JSON decoding failed".to_string(),
            source: error,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport {
            message: "HTTP request failed".to_string(),
            source: error,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database {
            message: "Database operation failed".to_string(),
            source: error,
        }
    }
}
