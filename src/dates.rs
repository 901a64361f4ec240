//! Date parsing strategies for the two halves of the pipeline.
//!
//! The validator and the transformer deliberately disagree on what to do
//! with an unparseable date: validation refuses the dataset, transformation
//! degrades the value to a null marker and keeps going. Both behaviors share
//! one format cascade and are exposed as named strategies rather than two
//! copies of the parsing logic.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::models::Cell;

/// Date-only formats accepted by the cascade.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Datetime formats accepted by the cascade; the time part is discarded.
/// `%m/%d/%Y %H:%M` is the format the DataCo order exports use.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

/// A value that could not be read as a calendar date.
#[derive(Debug, Error)]
#[error("unrecognized date value '{value}'")]
pub struct DateParseError {
    pub value: String,
}

/// How to react when a cell cannot be read as a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStrategy {
    /// Fail with a [`DateParseError`]. Used by the validator.
    Strict,
    /// Degrade to `Cell::Null`. Used by the transformer.
    Coercive,
}

impl DateStrategy {
    /// Convert a cell into a `Date` cell (or `Null` under `Coercive`).
    ///
    /// Already-converted `Date` cells pass through unchanged, which keeps a
    /// second transformation pass from re-parsing its own output.
    pub fn apply(&self, cell: &Cell) -> Result<Cell, DateParseError> {
        match cell {
            Cell::Date(d) => Ok(Cell::Date(*d)),
            Cell::Text(s) => match parse_date(s) {
                Some(d) => Ok(Cell::Date(d)),
                None => self.degrade(s),
            },
            Cell::Null => self.degrade(""),
            Cell::Number(n) => self.degrade(&n.to_string()),
        }
    }

    fn degrade(&self, raw: &str) -> Result<Cell, DateParseError> {
        match self {
            DateStrategy::Strict => Err(DateParseError {
                value: raw.to_string(),
            }),
            DateStrategy::Coercive => Ok(Cell::Null),
        }
    }
}

/// Try every known format, date-only first, then datetime.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(parse_date("2023-01-05"), Some(expected));
        assert_eq!(parse_date("2023/01/05"), Some(expected));
        assert_eq!(parse_date("01/05/2023"), Some(expected));
        assert_eq!(parse_date("2023-01-05 22:56:01"), Some(expected));
        assert_eq!(parse_date("1/5/2023 22:56"), Some(expected));
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date("2023-13-40"), None);
    }

    #[test]
    fn test_strict_rejects_unparseable() {
        let err = DateStrategy::Strict
            .apply(&Cell::Text("garbage".into()))
            .unwrap_err();
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_strict_rejects_null() {
        assert!(DateStrategy::Strict.apply(&Cell::Null).is_err());
    }

    #[test]
    fn test_coercive_degrades_to_null() {
        let cell = DateStrategy::Coercive
            .apply(&Cell::Text("garbage".into()))
            .unwrap();
        assert_eq!(cell, Cell::Null);
    }

    #[test]
    fn test_both_accept_valid_text() {
        let expected = Cell::Date(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        for strategy in [DateStrategy::Strict, DateStrategy::Coercive] {
            assert_eq!(strategy.apply(&Cell::Text("2023-02-01".into())).unwrap(), expected);
        }
    }

    #[test]
    fn test_date_cell_passes_through() {
        let d = Cell::Date(NaiveDate::from_ymd_opt(2023, 3, 9).unwrap());
        assert_eq!(DateStrategy::Coercive.apply(&d).unwrap(), d);
    }
}
