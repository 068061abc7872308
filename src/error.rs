//! Error types for the Phalanx library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`PhalanxError`] enum. Errors raised by a posting-list reader travel
//! unchanged through every searcher above it.
//!
//! # Examples
//!
//! ```
//! use phalanx::error::{PhalanxError, Result};
//!
//! fn open_reader() -> Result<()> {
//!     Err(PhalanxError::index("segment missing"))
//! }
//!
//! match open_reader() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Phalanx operations.
#[derive(Error, Debug)]
pub enum PhalanxError {
    /// I/O errors raised by an underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors (posting lists, doc values, id lookups).
    #[error("Index error: {0}")]
    Index(String),

    /// Query construction errors.
    #[error("Query error: {0}")]
    Query(String),

    /// A disjunction was asked to combine more clauses than allowed.
    #[error("TooManyClauses over field: `{field}` [{count} > maxClauseCount, which is set to {max}]")]
    TooManyClauses {
        /// Field the clauses were built over, empty when unknown.
        field: String,
        /// Number of clauses requested.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PhalanxError.
pub type Result<T> = std::result::Result<T, PhalanxError>;

impl PhalanxError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Query(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PhalanxError::InvalidConfig(msg.into())
    }

    /// Create a new too-many-clauses error.
    pub fn too_many_clauses<S: Into<String>>(field: S, count: usize, max: usize) -> Self {
        PhalanxError::TooManyClauses {
            field: field.into(),
            count,
            max,
        }
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PhalanxError::Other(msg.into())
    }
}
