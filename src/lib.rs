//! # Supplyflow - supply-chain order ETL pipeline
//!
//! Supplyflow reads a delimited order export, validates its schema and value
//! ranges, derives delivery and profitability metrics plus two grouped
//! aggregates, and persists the result into an embedded relational store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌───────────┐    ┌─────────────┐    ┌────────────┐
//! │  CSV File   │───▶│ Validator │───▶│ Transformer │───▶│    Sink    │
//! │ (auto-enc)  │    │ (strict)  │    │ (coercive)  │    │ (replace)  │
//! └─────────────┘    └───────────┘    └─────────────┘    └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use supplyflow::{run, RunOptions, RunLogger};
//!
//! let logger = RunLogger::to_file("etl.log")?;
//! let report = run("orders.csv".as_ref(), &RunOptions::default(), &logger)?;
//! println!("loaded {} rows", report.rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - hierarchical error types
//! - [`models`] - dataset, cells, column schema, aggregate rows
//! - [`dates`] - strict and coercive date parsing strategies
//! - [`extract`] - CSV extraction with encoding auto-detection
//! - [`validation`] - schema and value-range contracts
//! - [`transform`] - derived columns and grouped aggregates
//! - [`export`] - delimited-file output
//! - [`load`] - relational sink with replace semantics
//! - [`pipeline`] - run orchestration
//! - [`logging`] - injected run logger

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod dates;
pub mod extract;

// Stages
pub mod validation;
pub mod transform;
pub mod export;
pub mod load;
pub mod pipeline;

// Observability
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ExtractError, ExportError, LoadError, PipelineError, TransformError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    columns, Cell, ColumnKind, Dataset, MonthlySales, RegionDelayAverage, YearMonth,
};

// =============================================================================
// Re-exports - Dates
// =============================================================================

pub use dates::{parse_date, DateParseError, DateStrategy};

// =============================================================================
// Re-exports - Extraction
// =============================================================================

pub use extract::{
    decode_content, detect_delimiter, detect_encoding, extract_bytes, extract_file, parse_content,
    Extraction,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{require_columns, validate};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    coerce_dates, fill_missing, monthly_sales_totals, region_delay_averages, transform, Aggregates,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{export_all, write_dataset, ExportPaths};

// =============================================================================
// Re-exports - Load
// =============================================================================

pub use load::{OrderSink, SinkConfig, DEFAULT_TABLE};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{load_csv, run, LoadedTable, RunOptions, RunReport};

// =============================================================================
// Re-exports - Logging
// =============================================================================

pub use logging::{LogLevel, RunLogger};
