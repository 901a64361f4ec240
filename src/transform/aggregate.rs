//! Grouped aggregates over the enriched dataset.
//!
//! Two summaries are derived once per run, after enrichment:
//!
//! - mean `Delivery Delay` per distinct `Order Region`
//! - summed `Sales` per distinct `Order Month`
//!
//! Both group into ordered maps, so output rows come back sorted by key and
//! two runs over the same data produce identical files. The two group keys
//! treat missing values differently, following the null-fill step: a region
//! null has already been filled to the empty string by the time grouping
//! runs, so those rows pool under the `""` region; order dates are never
//! filled, so rows without a derivable month are skipped.

use std::collections::BTreeMap;

use crate::error::{TransformError, TransformResult};
use crate::models::{columns, Cell, Dataset, MonthlySales, RegionDelayAverage, YearMonth};
use crate::validation::require_columns;

/// The two aggregate tables produced by a transformation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub region_shipping_avg: Vec<RegionDelayAverage>,
    pub monthly_sales: Vec<MonthlySales>,
}

/// Compute both aggregates, checking the aggregation-tier schema first.
pub fn compute(dataset: &Dataset) -> TransformResult<Aggregates> {
    require_columns(dataset, columns::AGGREGATION)?;

    Ok(Aggregates {
        region_shipping_avg: region_delay_averages(dataset)?,
        monthly_sales: monthly_sales_totals(dataset)?,
    })
}

/// Mean `Delivery Delay` per distinct `Order Region`.
///
/// Null delays are excluded from the mean; a region where every delay is
/// null reports `None` rather than pretending to a zero-day average. A null
/// region cell groups under the empty string, the same bucket the null-fill
/// step puts it in, so calling this directly or via [`super::transform`]
/// gives one answer.
pub fn region_delay_averages(dataset: &Dataset) -> TransformResult<Vec<RegionDelayAverage>> {
    let region_idx = dataset
        .column_index(columns::ORDER_REGION)
        .ok_or_else(|| TransformError::MissingColumn(columns::ORDER_REGION.to_string()))?;
    let delay_idx = dataset
        .column_index(columns::DELIVERY_DELAY)
        .ok_or_else(|| TransformError::MissingColumn(columns::DELIVERY_DELAY.to_string()))?;

    // region -> (sum of delays, rows with a delay)
    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for row in dataset.rows() {
        // Null renders as "", matching the text-column fill default.
        let key = row[region_idx].to_string();
        let entry = groups.entry(key).or_insert((0.0, 0));
        if let Some(delay) = row[delay_idx].as_number() {
            entry.0 += delay;
            entry.1 += 1;
        }
    }

    Ok(groups
        .into_iter()
        .map(|(region, (sum, count))| RegionDelayAverage {
            region,
            average_delay: (count > 0).then(|| sum / count as f64),
        })
        .collect())
}

/// Summed `Sales` per distinct `Order Month` of the coerced order date.
///
/// Rows without a derivable month are skipped. A non-numeric sales value is
/// a computation error naming the row, not a silent zero.
pub fn monthly_sales_totals(dataset: &Dataset) -> TransformResult<Vec<MonthlySales>> {
    let order_idx = dataset
        .column_index(columns::ORDER_DATE)
        .ok_or_else(|| TransformError::MissingColumn(columns::ORDER_DATE.to_string()))?;
    let sales_idx = dataset
        .column_index(columns::SALES)
        .ok_or_else(|| TransformError::MissingColumn(columns::SALES.to_string()))?;

    let mut groups: BTreeMap<YearMonth, f64> = BTreeMap::new();

    for (row_idx, row) in dataset.rows().iter().enumerate() {
        let Some(date) = row[order_idx].as_date() else {
            continue;
        };
        let sales = match &row[sales_idx] {
            Cell::Null => 0.0,
            cell => cell.as_number().ok_or_else(|| TransformError::Computation {
                column: columns::SALES.to_string(),
                row: row_idx,
                message: format!("expected a number, found {} '{}'", cell.kind_name(), cell),
            })?,
        };
        *groups.entry(YearMonth::from(date)).or_insert(0.0) += sales;
    }

    Ok(groups
        .into_iter()
        .map(|(month, total_sales)| MonthlySales { month, total_sales })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Cell {
        Cell::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn enriched_dataset() -> Dataset {
        let mut ds = Dataset::new(vec![
            columns::ORDER_DATE.to_string(),
            columns::ORDER_REGION.to_string(),
            columns::SALES.to_string(),
            columns::DELIVERY_DELAY.to_string(),
        ]);
        ds.push_row(vec![
            date(2023, 1, 1),
            Cell::Text("East".into()),
            Cell::Number(100.0),
            Cell::Number(4.0),
        ]);
        ds.push_row(vec![
            date(2023, 1, 20),
            Cell::Text("East".into()),
            Cell::Number(50.0),
            Cell::Number(2.0),
        ]);
        ds.push_row(vec![
            date(2023, 2, 1),
            Cell::Text("West".into()),
            Cell::Number(300.0),
            Cell::Number(5.0),
        ]);
        ds
    }

    #[test]
    fn test_one_row_per_distinct_region() {
        let ds = enriched_dataset();
        let rows = region_delay_averages(&ds).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "East");
        assert_eq!(rows[0].average_delay, Some(3.0));
        assert_eq!(rows[1].region, "West");
        assert_eq!(rows[1].average_delay, Some(5.0));
    }

    #[test]
    fn test_one_row_per_distinct_month() {
        let ds = enriched_dataset();
        let rows = monthly_sales_totals(&ds).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month.to_string(), "2023-01");
        assert_eq!(rows[0].total_sales, 150.0);
        assert_eq!(rows[1].month.to_string(), "2023-02");
        assert_eq!(rows[1].total_sales, 300.0);
    }

    #[test]
    fn test_null_delay_excluded_from_mean() {
        let mut ds = enriched_dataset();
        ds.set_cell(1, columns::DELIVERY_DELAY, Cell::Null);

        let rows = region_delay_averages(&ds).unwrap();
        assert_eq!(rows[0].average_delay, Some(4.0));
    }

    #[test]
    fn test_region_with_no_delays_reports_none() {
        let mut ds = enriched_dataset();
        ds.set_cell(2, columns::DELIVERY_DELAY, Cell::Null);

        let rows = region_delay_averages(&ds).unwrap();
        assert_eq!(rows[1].region, "West");
        assert_eq!(rows[1].average_delay, None);
    }

    #[test]
    fn test_null_region_buckets_under_fill_default() {
        let mut ds = enriched_dataset();
        ds.set_cell(0, columns::ORDER_REGION, Cell::Null);

        // The pipeline fills text nulls before grouping; the row lands in
        // the empty-string region either way.
        crate::transform::fill_missing(&mut ds);

        let rows = region_delay_averages(&ds).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].region, "");
        assert_eq!(rows[0].average_delay, Some(4.0));
        assert_eq!(rows[1].region, "East");
        assert_eq!(rows[1].average_delay, Some(2.0));
        assert_eq!(rows[2].region, "West");
        assert_eq!(rows[2].average_delay, Some(5.0));
    }

    #[test]
    fn test_null_order_date_rows_skipped_in_monthly() {
        let mut ds = enriched_dataset();
        ds.set_cell(2, columns::ORDER_DATE, Cell::Null);

        let rows = monthly_sales_totals(&ds).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month.to_string(), "2023-01");
    }

    #[test]
    fn test_missing_aggregation_column_fails_clearly() {
        let ds = Dataset::new(vec![columns::ORDER_DATE.to_string()]);
        let err = compute(&ds).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn(_)));
    }

    #[test]
    fn test_text_sales_is_a_computation_error() {
        let mut ds = enriched_dataset();
        ds.set_cell(1, columns::SALES, Cell::Text("lots".into()));

        let err = monthly_sales_totals(&ds).unwrap_err();
        match err {
            TransformError::Computation { column, row, .. } => {
                assert_eq!(column, columns::SALES);
                assert_eq!(row, 1);
            }
            other => panic!("expected Computation, got {other:?}"),
        }
    }
}
