//! Dataset enrichment: null fill, date coercion, derived columns.
//!
//! The transformer assumes its input already passed validation; behavior on
//! an unvalidated dataset is whatever the individual steps make of it. It
//! mutates the dataset in place, adding (or overwriting) the five derived
//! columns, then computes the two aggregates. Re-running the transform on an
//! already-enriched dataset recomputes the same derived values.

use crate::dates::DateStrategy;
use crate::error::{TransformError, TransformResult};
use crate::logging::RunLogger;
use crate::models::{columns, Cell, ColumnKind, Dataset, YearMonth};
use crate::transform::aggregate::{self, Aggregates};

/// Run the full transformation: clean, derive, aggregate.
///
/// Derived columns added in place: `Delivery Delay`, `Late_delivery_risk`,
/// `Benefit per Order`, `Profit Margin`, `Order Month`. Returns the two
/// aggregate tables; any computation error aborts the run with no partial
/// result returned.
pub fn transform(dataset: &mut Dataset, log: &RunLogger) -> TransformResult<Aggregates> {
    fill_missing(dataset);
    coerce_dates(dataset)?;

    derive_delivery_delay(dataset)?;
    derive_late_delivery_risk(dataset);
    derive_benefit_and_margin(dataset)?;
    derive_order_month(dataset);

    log.info("Data cleaned, and new features added successfully.");

    let aggregates = aggregate::compute(dataset)?;
    log.info("Aggregations completed successfully.");

    Ok(aggregates)
}

/// Replace null cells with a per-column-kind default.
///
/// Numeric columns fill with 0, text columns with the empty string. Date and
/// all-null columns keep their null markers, which the delay computation
/// then propagates.
pub fn fill_missing(dataset: &mut Dataset) {
    let fills: Vec<Option<Cell>> = dataset
        .columns()
        .iter()
        .map(|name| match dataset.column_kind(name) {
            Some(ColumnKind::Number) => Some(Cell::Number(0.0)),
            Some(ColumnKind::Text) => Some(Cell::Text(String::new())),
            _ => None,
        })
        .collect();

    let names: Vec<String> = dataset.columns().to_vec();
    for (name, fill) in names.iter().zip(fills) {
        let Some(fill) = fill else { continue };
        let filled: Vec<Cell> = dataset
            .column_cells(name)
            .expect("iterating own columns")
            .map(|c| if c.is_null() { fill.clone() } else { c.clone() })
            .collect();
        dataset.add_column(name, filled);
    }
}

/// Coercively parse both date columns into date cells.
///
/// Unparseable values become null markers instead of failing; this is the
/// deliberate counterpart to the validator's strict parse.
pub fn coerce_dates(dataset: &mut Dataset) -> TransformResult<()> {
    for column in [columns::ORDER_DATE, columns::SHIPPING_DATE] {
        let cells: Vec<Cell> = dataset
            .column_cells(column)
            .ok_or_else(|| TransformError::MissingColumn(column.to_string()))?
            .map(|c| DateStrategy::Coercive.apply(c).unwrap_or(Cell::Null))
            .collect();
        dataset.add_column(column, cells);
    }
    Ok(())
}

/// `Delivery Delay` = shipping date - order date, in signed whole days.
/// Null if either date is a null marker.
fn derive_delivery_delay(dataset: &mut Dataset) -> TransformResult<()> {
    let order_idx = dataset
        .column_index(columns::ORDER_DATE)
        .ok_or_else(|| TransformError::MissingColumn(columns::ORDER_DATE.to_string()))?;
    let ship_idx = dataset
        .column_index(columns::SHIPPING_DATE)
        .ok_or_else(|| TransformError::MissingColumn(columns::SHIPPING_DATE.to_string()))?;

    let delays: Vec<Cell> = dataset
        .rows()
        .iter()
        .map(|row| match (row[order_idx].as_date(), row[ship_idx].as_date()) {
            (Some(order), Some(ship)) => {
                Cell::Number(ship.signed_duration_since(order).num_days() as f64)
            }
            _ => Cell::Null,
        })
        .collect();

    dataset.add_column(columns::DELIVERY_DELAY, delays);
    Ok(())
}

/// `Late_delivery_risk` = 1 when the delay is positive, else 0.
///
/// An unknown (null) delay counts as 0: risk is only asserted on positive
/// evidence of lateness.
fn derive_late_delivery_risk(dataset: &mut Dataset) {
    let risks: Vec<Cell> = dataset
        .column_cells(columns::DELIVERY_DELAY)
        .expect("added by derive_delivery_delay")
        .map(|c| match c.as_number() {
            Some(delay) if delay > 0.0 => Cell::Number(1.0),
            _ => Cell::Number(0.0),
        })
        .collect();

    dataset.add_column(columns::LATE_DELIVERY_RISK, risks);
}

/// `Benefit per Order` = `Product Price` - `Order Item Total` (the source
/// dataset's own definition, preserved literally), and
/// `Profit Margin` = benefit / price * 100.
///
/// A zero price makes the margin a null marker; the division is never
/// allowed to produce an infinity.
fn derive_benefit_and_margin(dataset: &mut Dataset) -> TransformResult<()> {
    let price_idx = dataset
        .column_index(columns::PRODUCT_PRICE)
        .ok_or_else(|| TransformError::MissingColumn(columns::PRODUCT_PRICE.to_string()))?;
    let total_idx = dataset
        .column_index(columns::ORDER_ITEM_TOTAL)
        .ok_or_else(|| TransformError::MissingColumn(columns::ORDER_ITEM_TOTAL.to_string()))?;

    let mut benefits = Vec::with_capacity(dataset.len());
    let mut margins = Vec::with_capacity(dataset.len());

    for (row_idx, row) in dataset.rows().iter().enumerate() {
        let price = numeric_input(&row[price_idx], columns::PRODUCT_PRICE, row_idx)?;
        let total = numeric_input(&row[total_idx], columns::ORDER_ITEM_TOTAL, row_idx)?;

        let benefit = price - total;
        benefits.push(Cell::Number(benefit));

        if price == 0.0 {
            margins.push(Cell::Null);
        } else {
            margins.push(Cell::Number(benefit / price * 100.0));
        }
    }

    dataset.add_column(columns::BENEFIT_PER_ORDER, benefits);
    dataset.add_column(columns::PROFIT_MARGIN, margins);
    Ok(())
}

/// `Order Month` = year-month of the coerced order date, as `YYYY-MM` text.
fn derive_order_month(dataset: &mut Dataset) {
    let months: Vec<Cell> = dataset
        .column_cells(columns::ORDER_DATE)
        .expect("checked by coerce_dates")
        .map(|c| match c.as_date() {
            Some(date) => Cell::Text(YearMonth::from(date).to_string()),
            None => Cell::Null,
        })
        .collect();

    dataset.add_column(columns::ORDER_MONTH, months);
}

/// Read a numeric computation input, failing with row context otherwise.
fn numeric_input(cell: &Cell, column: &str, row: usize) -> TransformResult<f64> {
    cell.as_number().ok_or_else(|| TransformError::Computation {
        column: column.to_string(),
        row,
        message: format!("expected a number, found {} '{}'", cell.kind_name(), cell),
    })
}
