//! Domain models for the Supplyflow ETL pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Cell`] - a single scalar value (null, number, text, or date)
//! - [`Dataset`] - an ordered in-memory table of named columns
//! - [`ColumnKind`] - the inferred value kind of a column
//! - [`YearMonth`] - calendar year-month grouping key
//! - [`RegionDelayAverage`] / [`MonthlySales`] - aggregate output rows
//! - [`columns`] - the canonical column names of the order schema

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

// =============================================================================
// Canonical Column Names
// =============================================================================

/// Column names of the supply-chain order schema.
///
/// Names are exact, including case and spacing, because the source files use
/// them verbatim in their header row.
pub mod columns {
    pub const ORDER_DATE: &str = "order date (DateOrders)";
    pub const SHIPPING_DATE: &str = "shipping date (DateOrders)";
    pub const PRODUCT_PRICE: &str = "Product Price";
    pub const ORDER_ITEM_QUANTITY: &str = "Order Item Quantity";
    pub const ORDER_ITEM_TOTAL: &str = "Order Item Total";
    pub const CUSTOMER_ID: &str = "Customer Id";
    pub const ORDER_ID: &str = "Order Id";
    pub const SHIPPING_MODE: &str = "Shipping Mode";

    pub const ORDER_REGION: &str = "Order Region";
    pub const SALES: &str = "Sales";

    pub const DELIVERY_DELAY: &str = "Delivery Delay";
    pub const LATE_DELIVERY_RISK: &str = "Late_delivery_risk";
    pub const BENEFIT_PER_ORDER: &str = "Benefit per Order";
    pub const PROFIT_MARGIN: &str = "Profit Margin";
    pub const ORDER_MONTH: &str = "Order Month";

    /// Columns every input file must carry to pass validation.
    pub const REQUIRED: &[&str] = &[
        ORDER_DATE,
        SHIPPING_DATE,
        PRODUCT_PRICE,
        ORDER_ITEM_QUANTITY,
        ORDER_ITEM_TOTAL,
        CUSTOMER_ID,
        ORDER_ID,
        SHIPPING_MODE,
    ];

    /// Columns the aggregation steps additionally depend on.
    pub const AGGREGATION: &[&str] = &[ORDER_REGION, SALES];
}

// =============================================================================
// Cell
// =============================================================================

/// A single scalar value in a dataset.
///
/// Extraction produces `Null`, `Number`, and `Text` cells; `Date` cells are
/// introduced by date coercion during transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    /// Parse a raw field into a cell: empty becomes `Null`, anything that
    /// reads as a number becomes `Number`, the rest stays `Text`.
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Human-readable name of the cell's kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Number(_) => "number",
            Cell::Text(_) => "text",
            Cell::Date(_) => "date",
        }
    }
}

impl fmt::Display for Cell {
    /// Renders the cell the way it appears in a delimited export: null as an
    /// empty field, dates as ISO `YYYY-MM-DD`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

// =============================================================================
// Column Kind
// =============================================================================

/// The inferred value kind of a column, taken from its first non-null cell.
///
/// Drives the per-kind null-fill policy and the sink's column typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Text,
    Date,
    /// Column has no non-null cells to infer from.
    Empty,
}

// =============================================================================
// Dataset
// =============================================================================

/// An ordered in-memory table: named columns and rows of [`Cell`]s.
///
/// Row order is preserved from the source. Column names are matched exactly;
/// there is no normalization of case or spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Null` and dropping fields that
    /// overflow the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `row` in the named column, if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: Cell) {
        if let Some(idx) = self.column_index(column) {
            if let Some(r) = self.rows.get_mut(row) {
                r[idx] = value;
            }
        }
    }

    /// Iterate the cells of one column, in row order.
    pub fn column_cells<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Add a column, or overwrite it if it already exists.
    ///
    /// `cells` must have one entry per row; missing entries become `Null`.
    /// Overwriting keeps repeated transformation passes from duplicating
    /// derived columns.
    pub fn add_column(&mut self, name: &str, mut cells: Vec<Cell>) {
        cells.resize(self.rows.len(), Cell::Null);
        match self.column_index(name) {
            Some(idx) => {
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row[idx] = cell;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
            }
        }
    }

    /// Infer the kind of a column from its first non-null cell.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let idx = self.column_index(name)?;
        let kind = self
            .rows
            .iter()
            .map(|r| &r[idx])
            .find(|c| !c.is_null())
            .map(|c| match c {
                Cell::Number(_) => ColumnKind::Number,
                Cell::Text(_) => ColumnKind::Text,
                Cell::Date(_) => ColumnKind::Date,
                Cell::Null => unreachable!(),
            })
            .unwrap_or(ColumnKind::Empty);
        Some(kind)
    }
}

// =============================================================================
// Year-Month Grouping Key
// =============================================================================

/// A calendar year-month, used as the grouping key for monthly aggregates.
///
/// Day-level precision is intentionally dropped. Ordering is chronological so
/// aggregate output is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Aggregate Rows
// =============================================================================

/// One row of the region shipping aggregate: mean delivery delay per region.
///
/// `average_delay` is `None` when no row in the region had a computable
/// delay; it exports as an empty field and loads as SQL NULL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDelayAverage {
    #[serde(rename = "Order Region")]
    pub region: String,
    #[serde(rename = "Delivery Delay")]
    pub average_delay: Option<f64>,
}

/// One row of the monthly sales aggregate: summed sales per year-month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    #[serde(rename = "Order Month")]
    pub month: YearMonth,
    #[serde(rename = "Sales")]
    pub total_sales: f64,
}

// =============================================================================
// Tests
// =============================================================================
