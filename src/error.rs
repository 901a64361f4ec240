//! Error types for the Supplyflow ETL pipeline.
//!
//! This module defines a hierarchy of error types, one per pipeline stage:
//!
//! - [`ExtractError`] - source file reading and parsing errors
//! - [`ValidationError`] - schema and value-range contract failures
//! - [`TransformError`] - derived-column and aggregation errors
//! - [`ExportError`] - delimited-file export errors
//! - [`LoadError`] - relational sink errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use thiserror::Error;

use crate::dates::DateParseError;

// =============================================================================
// Extraction Errors
// =============================================================================

/// Errors while reading the source file into a dataset.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Failed to read the source file.
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Source file contains no data at all.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Header row could not be derived.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Malformed CSV content.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Contract failures detected by the validator.
///
/// Each variant corresponds to one validation rule, so callers (and log
/// readers) can tell exactly which contract was broken.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more required columns are absent from the dataset.
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A required column contains at least one null value.
    #[error("Missing values in column: {0}")]
    MissingValues(String),

    /// A numeric column holds a value that is not a number.
    #[error("Column '{column}' contains non-numeric value '{value}' at row {row}")]
    NotNumeric {
        column: String,
        value: String,
        row: usize,
    },

    /// A column constrained to be non-negative holds a negative value.
    #[error("{0} contains negative values")]
    NegativeValues(String),

    /// A column constrained to be strictly positive holds zero or less.
    #[error("{0} contains zero or negative values")]
    NonPositiveValues(String),

    /// A date column holds an unparseable value.
    #[error("Invalid date format in column {column}: {source}")]
    InvalidDate {
        column: String,
        #[source]
        source: DateParseError,
    },
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while computing derived columns or aggregates.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column the transformation depends on is absent.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A computation step hit a value it cannot work with.
    #[error("Computation failed for '{column}' at row {row}: {message}")]
    Computation {
        column: String,
        row: usize,
        message: String,
    },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing delimited output files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem error.
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("Export CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors from the relational sink.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Sink configuration is missing or unusable.
    #[error("Sink configuration error: {0}")]
    Config(String),

    /// Database-level failure.
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::run`].
/// It wraps all stage-level errors; no stage swallows or retries.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extraction stage failed.
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Validation stage failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transformation stage failed.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Export stage failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Load stage failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
