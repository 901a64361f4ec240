//! Pipeline orchestration: extract -> validate -> transform -> export -> load.
//!
//! One call to [`run`] is one batch job. Stages execute in order, each
//! failure is logged with its stage context and propagated, and no stage is
//! ever retried. The whole run is synchronous and single-pass over an
//! in-memory dataset; inputs are assumed to fit in memory in full.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::error::{LoadError, PipelineResult};
use crate::export::{export_all, ExportPaths};
use crate::extract::extract_file;
use crate::load::{OrderSink, SinkConfig};
use crate::logging::RunLogger;
use crate::transform::transform;
use crate::validation::validate;

/// Options for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Directory for the delimited exports; `None` skips the export stage.
    pub export_dir: Option<PathBuf>,

    /// Sink database path; overrides `DB_PATH` from the environment.
    pub db_path: Option<String>,

    /// Target table name; overrides `DB_TABLE` from the environment.
    pub table: Option<String>,

    /// Skip the load stage entirely.
    pub skip_load: bool,
}

/// Summary of a completed run, printed by the CLI as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub input: PathBuf,
    pub encoding: String,
    pub delimiter: char,
    pub rows: usize,
    pub columns: usize,
    pub regions: usize,
    pub months: usize,
    pub exported: Option<ExportPaths>,
    pub loaded: Option<LoadedTable>,
}

/// What the load stage wrote, and where.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTable {
    pub table: String,
    pub rows: usize,
}

/// Execute the full ETL run over one source file.
pub fn run(input: &Path, options: &RunOptions, log: &RunLogger) -> PipelineResult<RunReport> {
    let run_id = Uuid::new_v4();
    log.info(format!("Starting ETL run {} for {}", run_id, input.display()));

    // Extract
    let extraction = match extract_file(input) {
        Ok(extraction) => extraction,
        Err(e) => {
            log.error(format!("Error extracting data: {}", e));
            return Err(e.into());
        }
    };
    log.info(format!(
        "Successfully extracted data from {}.",
        input.display()
    ));
    log.info(format!(
        "Detected encoding {}, delimiter '{}', {} rows",
        extraction.encoding,
        format_delimiter(extraction.delimiter),
        extraction.dataset.len()
    ));

    let mut dataset = extraction.dataset;

    // Validate (logs its own outcome)
    validate(&dataset, log)?;

    // Transform
    let aggregates = match transform(&mut dataset, log) {
        Ok(aggregates) => aggregates,
        Err(e) => {
            log.error(format!("Error during data transformation: {}", e));
            return Err(e.into());
        }
    };

    // Export
    let exported = match &options.export_dir {
        Some(dir) => match export_all(&dataset, &aggregates, dir) {
            Ok(paths) => {
                log.info(format!("Exported transformed data to {}", dir.display()));
                Some(paths)
            }
            Err(e) => {
                log.error(format!("Error exporting transformed data: {}", e));
                return Err(e.into());
            }
        },
        None => None,
    };

    // Load
    let loaded = if options.skip_load {
        None
    } else {
        let config = resolve_sink_config(options)?;
        match load_dataset(&dataset, &config, log) {
            Ok(rows) => Some(LoadedTable {
                table: config.table,
                rows,
            }),
            Err(e) => {
                log.error(format!("Error loading data into SQL: {}", e));
                return Err(e.into());
            }
        }
    };

    log.success(format!("ETL run {} completed", run_id));

    Ok(RunReport {
        run_id,
        input: input.to_path_buf(),
        encoding: extraction.encoding,
        delimiter: extraction.delimiter,
        rows: dataset.len(),
        columns: dataset.columns().len(),
        regions: aggregates.region_shipping_avg.len(),
        months: aggregates.monthly_sales.len(),
        exported,
        loaded,
    })
}

/// Load an already-transformed delimited file straight into the sink.
///
/// The standalone counterpart to the load stage, for re-loading a previous
/// run's `transformed_data.csv`.
pub fn load_csv(input: &Path, config: &SinkConfig, log: &RunLogger) -> PipelineResult<usize> {
    let extraction = match extract_file(input) {
        Ok(extraction) => extraction,
        Err(e) => {
            log.error(format!("Error extracting data: {}", e));
            return Err(e.into());
        }
    };

    match load_dataset(&extraction.dataset, config, log) {
        Ok(rows) => Ok(rows),
        Err(e) => {
            log.error(format!("Error loading data into SQL: {}", e));
            Err(e.into())
        }
    }
}

/// Open the sink, perform the one bulk write, and release the connection.
fn load_dataset(
    dataset: &crate::models::Dataset,
    config: &SinkConfig,
    log: &RunLogger,
) -> Result<usize, LoadError> {
    // Connection lives exactly as long as this scope, error or not.
    let sink = OrderSink::open(&config.db_path)?;
    let rows = sink.replace(&config.table, dataset)?;
    log.info(format!(
        "Data loaded successfully into the {} table.",
        config.table
    ));
    Ok(rows)
}

/// CLI flags win over environment variables for the sink settings.
fn resolve_sink_config(options: &RunOptions) -> Result<SinkConfig, LoadError> {
    let mut config = match &options.db_path {
        Some(path) => SinkConfig {
            db_path: path.clone(),
            table: crate::load::DEFAULT_TABLE.to_string(),
        },
        None => SinkConfig::from_env()?,
    };
    if let Some(table) = &options.table {
        config.table = table.clone();
    }
    Ok(config)
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
