//! Common error types for the guesser core
//!
//! These errors never leave the public core operations: fetchers and
//! storage backends return them, and the loader / stores log and degrade.

use thiserror::Error;

/// Common result type for guesser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised inside the core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network communication error (wraps reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog source answered with a non-success status
    #[error("Fetch of {location} failed with status {status}")]
    HttpStatus { location: String, status: u16 },

    /// Catalog body could not be decoded as text
    #[error("Could not decode {location}: {reason}")]
    Decode { location: String, reason: String },

    /// Storage backend refused or failed an operation
    #[error("Storage error for '{key}': {reason}")]
    Storage { key: String, reason: String },

    /// JSON (de)serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
