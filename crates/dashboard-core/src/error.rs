//! Error types for the dashboard data contract
//!
//! Validation violations are not errors: they are collected as messages in a
//! [`crate::validation::ValidationReport`]. The enums here cover the fatal
//! cases: malformed construction input, bad synthesizer configuration,
//! unreadable import files and failed artifact writes.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected input to an entity constructor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Amount or count below zero
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// Percentage outside 0-100
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },

    /// NaN or infinity
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    /// Required text field is blank
    #[error("{field} is required")]
    Empty { field: &'static str },

    /// Month label that is not an English calendar month
    #[error("unknown month name '{0}'")]
    UnknownMonth(String),

    /// Label that does not belong to a closed label set
    #[error("'{value}' is not a valid {kind}")]
    UnknownLabel { kind: &'static str, value: String },

    /// Date that does not parse as YYYY-MM-DD
    #[error("{field} is not a valid YYYY-MM-DD date: '{value}'")]
    InvalidDate { field: &'static str, value: String },

    /// Plan period whose end precedes its start
    #[error("plan end date {end} is before plan start date {start}")]
    InvertedPeriod { start: String, end: String },
}

/// Rejected synthesizer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field}: lower bound {low} exceeds upper bound {high}")]
    InvertedRange {
        field: &'static str,
        low: f64,
        high: f64,
    },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to synthesize a dataset
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid synthesizer config: {0}")]
    Config(#[from] ConfigError),

    #[error("generated record rejected: {0}")]
    Model(#[from] ModelError),
}

/// Failure while reading a populated CSV template
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no header row found")]
    MissingHeader,

    #[error("header is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: column '{column}': {message}")]
    Field {
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("row {row}: {source}")]
    Model {
        row: usize,
        #[source]
        source: ModelError,
    },

    #[error("row {row}: unterminated quoted field")]
    UnterminatedQuote { row: usize },
}

/// Failure to write one output artifact
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
