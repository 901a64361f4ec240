//! Relational sink for the enriched dataset.
//!
//! The sink is an embedded DuckDB database. Write policy is replace: the
//! target table is dropped and recreated from the current dataset on every
//! load, never appended to. Column types follow the dataset's inferred
//! column kinds (numbers as DOUBLE, coerced dates as DATE, everything else
//! VARCHAR).
//!
//! Connection lifecycle is scoped: a sink is opened for exactly one bulk
//! write and the connection is released when the sink goes out of scope, on
//! success and failure alike. An embedded store needs no credentials; access
//! control is the invoking user's filesystem access.

use std::env;

use crate::error::{LoadError, LoadResult};
use crate::models::{Cell, ColumnKind, Dataset};

/// Default target table, matching the original deployment.
pub const DEFAULT_TABLE: &str = "supply_chain_data";

/// Sink settings resolved from the environment.
///
/// `DB_PATH` locates the database file (required); `DB_TABLE` names the
/// target table and defaults to [`DEFAULT_TABLE`].
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub db_path: String,
    pub table: String,
}

impl SinkConfig {
    pub fn from_env() -> LoadResult<Self> {
        let db_path = env::var("DB_PATH")
            .map_err(|_| LoadError::Config("DB_PATH environment variable not set".into()))?;
        let table = env::var("DB_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
        Ok(Self { db_path, table })
    }
}

/// An open connection to the order sink database.
pub struct OrderSink {
    conn: duckdb::Connection,
    path: Option<String>,
}

impl OrderSink {
    /// Open or create a sink database at the given path.
    pub fn open(path: &str) -> LoadResult<Self> {
        let conn = duckdb::Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory sink (for testing).
    pub fn memory() -> LoadResult<Self> {
        let conn = duckdb::Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// The database path (if not in-memory).
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Replace `table` with the dataset's rows; returns the row count.
    ///
    /// Drops any existing table of that name, recreates it from the
    /// dataset's schema, and bulk-inserts every row.
    pub fn replace(&self, table: &str, dataset: &Dataset) -> LoadResult<usize> {
        let table_ident = quote_ident(table);

        let column_defs: Vec<String> = dataset
            .columns()
            .iter()
            .map(|name| {
                let sql_type = match dataset.column_kind(name) {
                    Some(ColumnKind::Number) => "DOUBLE",
                    Some(ColumnKind::Date) => "DATE",
                    _ => "VARCHAR",
                };
                format!("{} {}", quote_ident(name), sql_type)
            })
            .collect();

        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table_ident};\n\
             CREATE TABLE {table_ident} ({});",
            column_defs.join(", ")
        ))?;

        let placeholders: Vec<String> = (1..=dataset.columns().len())
            .map(|i| format!("?{}", i))
            .collect();
        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO {table_ident} VALUES ({})",
            placeholders.join(", ")
        ))?;

        for row in dataset.rows() {
            let values: Vec<duckdb::types::Value> = row.iter().map(cell_to_sql).collect();
            let params: Vec<&dyn duckdb::ToSql> =
                values.iter().map(|v| v as &dyn duckdb::ToSql).collect();
            stmt.execute(params.as_slice())?;
        }

        Ok(dataset.len())
    }

    /// Number of rows currently in `table`.
    pub fn record_count(&self, table: &str) -> LoadResult<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// One scalar value, for verification queries in tests and tooling.
    pub fn query_scalar(&self, sql: &str) -> LoadResult<Option<String>> {
        let value: Option<String> = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(value)
    }
}

fn cell_to_sql(cell: &Cell) -> duckdb::types::Value {
    use duckdb::types::Value;
    match cell {
        Cell::Null => Value::Null,
        Cell::Number(n) => Value::Double(*n),
        Cell::Text(s) => Value::Text(s.clone()),
        // DuckDB's date_t is days since the Unix epoch.
        Cell::Date(d) => {
            let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
            Value::Date32(d.signed_duration_since(epoch).num_days() as i32)
        }
    }
}

/// Quote a SQL identifier; the order schema's column names carry spaces and
/// parentheses.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dataset(rows: &[(f64, &str)]) -> Dataset {
        let mut ds = Dataset::new(vec!["Order Id".into(), "Shipping Mode".into()]);
        for (id, mode) in rows {
            ds.push_row(vec![Cell::Number(*id), Cell::Text(mode.to_string())]);
        }
        ds
    }

    #[test]
    fn test_replace_writes_all_rows() {
        let sink = OrderSink::memory().unwrap();
        let ds = dataset(&[(101.0, "Standard"), (102.0, "Express")]);

        let written = sink.replace("orders", &ds).unwrap();
        assert_eq!(written, 2);
        assert_eq!(sink.record_count("orders").unwrap(), 2);
    }

    #[test]
    fn test_replace_drops_prior_contents() {
        let sink = OrderSink::memory().unwrap();

        let first = dataset(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]);
        sink.replace("orders", &first).unwrap();

        let second = dataset(&[(9.0, "z")]);
        sink.replace("orders", &second).unwrap();

        assert_eq!(sink.record_count("orders").unwrap(), 1);
        let mode = sink
            .query_scalar("SELECT \"Shipping Mode\" FROM \"orders\"")
            .unwrap();
        assert_eq!(mode.as_deref(), Some("z"));
    }

    #[test]
    fn test_null_and_date_cells_load() {
        let sink = OrderSink::memory().unwrap();

        let mut ds = Dataset::new(vec!["d".into(), "m".into()]);
        ds.push_row(vec![
            Cell::Date(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()),
            Cell::Null,
        ]);
        ds.push_row(vec![
            Cell::Date(NaiveDate::from_ymd_opt(2023, 2, 6).unwrap()),
            Cell::Number(3.0),
        ]);

        sink.replace("t", &ds).unwrap();

        let d = sink.query_scalar("SELECT CAST(MIN(\"d\") AS VARCHAR) FROM \"t\"").unwrap();
        assert_eq!(d.as_deref(), Some("2023-01-05"));
        let nulls = sink
            .query_scalar("SELECT CAST(COUNT(*) AS VARCHAR) FROM \"t\" WHERE \"m\" IS NULL")
            .unwrap();
        assert_eq!(nulls.as_deref(), Some("1"));
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            quote_ident("order date (DateOrders)"),
            "\"order date (DateOrders)\""
        );
    }

    #[test]
    fn test_sink_config_from_env() {
        env::set_var("DB_PATH", "/tmp/orders.duckdb");
        env::remove_var("DB_TABLE");
        let config = SinkConfig::from_env().unwrap();
        assert_eq!(config.db_path, "/tmp/orders.duckdb");
        assert_eq!(config.table, DEFAULT_TABLE);
    }
}
