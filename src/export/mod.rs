//! Delimited-file export of the enriched dataset and its aggregates.
//!
//! Three files per run, each with a header row and no index column:
//! `transformed_data.csv`, `region_shipping_avg.csv`, `monthly_sales.csv`.
//! Null cells export as empty fields, dates as ISO `YYYY-MM-DD`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExportResult;
use crate::models::Dataset;
use crate::transform::Aggregates;

pub const TRANSFORMED_FILE: &str = "transformed_data.csv";
pub const REGION_AVG_FILE: &str = "region_shipping_avg.csv";
pub const MONTHLY_SALES_FILE: &str = "monthly_sales.csv";

/// Paths of the files written by [`export_all`].
#[derive(Debug, Clone, Serialize)]
pub struct ExportPaths {
    pub transformed: PathBuf,
    pub region_shipping_avg: PathBuf,
    pub monthly_sales: PathBuf,
}

/// Write the enriched dataset and both aggregates into `dir`.
pub fn export_all(
    dataset: &Dataset,
    aggregates: &Aggregates,
    dir: &Path,
) -> ExportResult<ExportPaths> {
    std::fs::create_dir_all(dir)?;

    let paths = ExportPaths {
        transformed: dir.join(TRANSFORMED_FILE),
        region_shipping_avg: dir.join(REGION_AVG_FILE),
        monthly_sales: dir.join(MONTHLY_SALES_FILE),
    };

    write_dataset(dataset, &paths.transformed)?;
    write_rows(&aggregates.region_shipping_avg, &paths.region_shipping_avg)?;
    write_rows(&aggregates.monthly_sales, &paths.monthly_sales)?;

    Ok(paths)
}

/// Write a dataset as CSV: header row first, then one record per row.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> ExportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write serializable rows (the aggregate tables) as CSV with headers.
pub fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> ExportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
