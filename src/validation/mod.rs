//! Schema and value-range validation for extracted order data.
//!
//! The validator enforces the contracts a dataset must satisfy before
//! transformation: required columns exist, none of them holds a null, the
//! numeric columns obey their domain ranges, and both date columns parse
//! strictly. Checks run in a fixed order and the first broken contract wins,
//! so every failure identifies exactly one rule.
//!
//! The schema has two tiers. The eight [`columns::REQUIRED`] columns are
//! enforced here for every dataset; the aggregation-tier columns
//! (`Order Region`, `Sales`) are only needed for grouping and are checked by
//! [`require_columns`] immediately before the aggregates are computed.

use crate::dates::DateStrategy;
use crate::error::{TransformError, TransformResult, ValidationError, ValidationResult};
use crate::logging::RunLogger;
use crate::models::{columns, Cell, Dataset};

/// Validate an extracted dataset against the base schema contracts.
///
/// Checks, in order, each short-circuiting with its own failure reason:
/// 1. every required column exists (all missing names reported at once)
/// 2. no required column holds a null value
/// 3. `Product Price` is non-negative for every row
/// 4. `Order Item Quantity` is strictly positive for every row
/// 5. both date columns parse strictly for every row
///
/// The dataset is not mutated; any failure is fatal for the run.
pub fn validate(dataset: &Dataset, log: &RunLogger) -> ValidationResult<()> {
    let result = run_checks(dataset);
    match &result {
        Ok(()) => log.info("Data validation successful"),
        Err(e) => log.error(e.to_string()),
    }
    result
}

fn run_checks(dataset: &Dataset) -> ValidationResult<()> {
    // 1. Schema completeness
    let missing: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|c| !dataset.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }

    // 2. Null completeness
    for column in columns::REQUIRED {
        let mut cells = dataset.column_cells(column).expect("checked above");
        if cells.any(|c| c.is_null()) {
            return Err(ValidationError::MissingValues(column.to_string()));
        }
    }

    // 3. Non-negativity
    check_numeric(dataset, columns::PRODUCT_PRICE, |v| v >= 0.0, |c| {
        ValidationError::NegativeValues(c)
    })?;

    // 4. Positivity
    check_numeric(dataset, columns::ORDER_ITEM_QUANTITY, |v| v > 0.0, |c| {
        ValidationError::NonPositiveValues(c)
    })?;

    // 5. Strict date parseability
    for column in [columns::ORDER_DATE, columns::SHIPPING_DATE] {
        let cells = dataset.column_cells(column).expect("checked above");
        for cell in cells {
            if let Err(source) = DateStrategy::Strict.apply(cell) {
                return Err(ValidationError::InvalidDate {
                    column: column.to_string(),
                    source,
                });
            }
        }
    }

    Ok(())
}

/// Range-check a numeric column; a non-numeric cell is its own failure.
fn check_numeric(
    dataset: &Dataset,
    column: &str,
    in_range: impl Fn(f64) -> bool,
    out_of_range: impl Fn(String) -> ValidationError,
) -> ValidationResult<()> {
    let cells = dataset.column_cells(column).expect("checked above");
    for (row, cell) in cells.enumerate() {
        match cell.as_number() {
            Some(v) if in_range(v) => {}
            Some(_) => return Err(out_of_range(column.to_string())),
            None => {
                return Err(ValidationError::NotNumeric {
                    column: column.to_string(),
                    value: cell.to_string(),
                    row,
                })
            }
        }
    }
    Ok(())
}

/// Require the named columns to exist before an aggregation step.
///
/// This is the second schema tier: `Order Region` and `Sales` are not part
/// of base validation but grouping cannot proceed without them, and a clear
/// error beats an empty aggregate.
pub fn require_columns(dataset: &Dataset, names: &[&str]) -> TransformResult<()> {
    for name in names {
        if !dataset.has_column(name) {
            return Err(TransformError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns;

    fn sample_dataset() -> Dataset {
        let mut ds = Dataset::new(
            [
                columns::ORDER_DATE,
                columns::SHIPPING_DATE,
                columns::PRODUCT_PRICE,
                columns::ORDER_ITEM_QUANTITY,
                columns::ORDER_ITEM_TOTAL,
                columns::CUSTOMER_ID,
                columns::ORDER_ID,
                columns::SHIPPING_MODE,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        ds.push_row(vec![
            Cell::Text("2023-01-01".into()),
            Cell::Text("2023-01-05".into()),
            Cell::Number(100.0),
            Cell::Number(1.0),
            Cell::Number(100.0),
            Cell::Number(1.0),
            Cell::Number(101.0),
            Cell::Text("Standard".into()),
        ]);
        ds.push_row(vec![
            Cell::Text("2023-02-01".into()),
            Cell::Text("2023-02-06".into()),
            Cell::Number(150.0),
            Cell::Number(2.0),
            Cell::Number(300.0),
            Cell::Number(2.0),
            Cell::Number(102.0),
            Cell::Text("Express".into()),
        ]);
        ds
    }

    #[test]
    fn test_sample_data_passes() {
        let ds = sample_dataset();
        assert!(validate(&ds, &RunLogger::disabled()).is_ok());
    }

    #[test]
    fn test_missing_columns_named_exactly() {
        let mut ds = Dataset::new(vec!["Order Id".into()]);
        ds.push_row(vec![Cell::Number(1.0)]);

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        match err {
            ValidationError::MissingColumns(cols) => {
                assert_eq!(cols.len(), columns::REQUIRED.len() - 1);
                assert!(cols.contains(&columns::PRODUCT_PRICE.to_string()));
                assert!(!cols.contains(&columns::ORDER_ID.to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_null_in_required_column_named() {
        let mut ds = sample_dataset();
        ds.set_cell(1, columns::SHIPPING_MODE, Cell::Null);

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        match err {
            ValidationError::MissingValues(col) => assert_eq!(col, columns::SHIPPING_MODE),
            other => panic!("expected MissingValues, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut ds = sample_dataset();
        ds.set_cell(0, columns::PRODUCT_PRICE, Cell::Number(-1.0));

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeValues(_)));
    }

    #[test]
    fn test_zero_price_allowed() {
        let mut ds = sample_dataset();
        ds.set_cell(0, columns::PRODUCT_PRICE, Cell::Number(0.0));
        assert!(validate(&ds, &RunLogger::disabled()).is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut ds = sample_dataset();
        ds.set_cell(0, columns::ORDER_ITEM_QUANTITY, Cell::Number(0.0));

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        assert!(matches!(err, ValidationError::NonPositiveValues(_)));
    }

    #[test]
    fn test_non_numeric_price_names_row() {
        let mut ds = sample_dataset();
        ds.set_cell(1, columns::PRODUCT_PRICE, Cell::Text("n/a".into()));

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        match err {
            ValidationError::NotNumeric { column, row, .. } => {
                assert_eq!(column, columns::PRODUCT_PRICE);
                assert_eq!(row, 1);
            }
            other => panic!("expected NotNumeric, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_order_date_names_column() {
        let mut ds = sample_dataset();
        ds.set_cell(0, columns::ORDER_DATE, Cell::Text("not-a-date".into()));

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        match err {
            ValidationError::InvalidDate { column, .. } => assert_eq!(column, columns::ORDER_DATE),
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_shipping_date_names_column() {
        let mut ds = sample_dataset();
        ds.set_cell(1, columns::SHIPPING_DATE, Cell::Text("05-13-2023x".into()));

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        match err {
            ValidationError::InvalidDate { column, .. } => {
                assert_eq!(column, columns::SHIPPING_DATE)
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_order_missing_columns_first() {
        // A dataset that breaks several rules still reports the earliest one.
        let mut ds = Dataset::new(vec![columns::PRODUCT_PRICE.to_string()]);
        ds.push_row(vec![Cell::Number(-5.0)]);

        let err = validate(&ds, &RunLogger::disabled()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingColumns(_)));
    }

    #[test]
    fn test_require_columns_for_aggregation() {
        let ds = sample_dataset();
        let err = require_columns(&ds, columns::AGGREGATION).unwrap_err();
        match err {
            TransformError::MissingColumn(col) => assert_eq!(col, columns::ORDER_REGION),
            other => panic!("expected MissingColumn, got {other:?}"),
        }

        let mut ds = sample_dataset();
        ds.add_column(columns::ORDER_REGION, vec![Cell::Text("East".into()); 2]);
        ds.add_column(columns::SALES, vec![Cell::Number(100.0); 2]);
        assert!(require_columns(&ds, columns::AGGREGATION).is_ok());
    }
}
