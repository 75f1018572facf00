//! The embedded DuckDB session.

use chrono::DateTime;
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;

use svl_core::ast::{Datasets, Plot};
use svl_core::data::{shape_rows, PlotData, SqlValue};
use svl_core::error::{Result, SvlError};
use svl_core::sql::plot_query;

/// An in-memory relational session holding the materialized datasets.
pub struct Session {
    conn: Connection,
}

impl Session {
    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SvlError::DataLoad(e.to_string()))?;
        Ok(Session { conn })
    }

    /// Materialize every declared dataset.
    ///
    /// File datasets load first so the SQL datasets that follow can
    /// reference them (and each other, in declaration order).
    pub fn create_datasets(&self, datasets: &Datasets) -> Result<()> {
        for (name, path) in datasets.files() {
            self.load_file(name, path)?;
        }
        for (name, statement) in datasets.sqls() {
            self.create_sql_table(name, statement)?;
        }
        Ok(())
    }

    /// Load a CSV or Parquet file into a table, dispatching on extension.
    /// CSV delimiters are detected by the engine.
    fn load_file(&self, table_name: &str, path: &str) -> Result<()> {
        let reader = if path.to_ascii_lowercase().ends_with("parquet") {
            format!("read_parquet('{}')", escape_literal(path))
        } else {
            format!("read_csv_auto('{}')", escape_literal(path))
        };
        tracing::info!(table = table_name, path, "loading file dataset");
        self.conn
            .execute(
                &format!("CREATE TABLE {} AS SELECT * FROM {}", table_name, reader),
                [],
            )
            .map_err(|e| SvlError::DataLoad(e.to_string()))?;
        Ok(())
    }

    /// Materialize a SQL dataset over the tables loaded so far.
    fn create_sql_table(&self, table_name: &str, statement: &str) -> Result<()> {
        tracing::info!(table = table_name, "creating SQL dataset");
        self.conn
            .execute(
                &format!("CREATE TABLE {} AS {}", table_name, statement),
                [],
            )
            .map_err(|e| SvlError::DataLoad(e.to_string()))?;
        Ok(())
    }

    /// Synthesize, execute, and shape the query for one plot.
    pub fn plot_data(&self, plot: &Plot) -> Result<PlotData> {
        let query = plot_query(plot);
        let (columns, rows) = self.query(&query)?;
        shape_rows(plot, &columns, &rows)
    }

    /// Execute a query, returning its column names and rows.
    fn query(&self, sql: &str) -> Result<(Vec<String>, Vec<Vec<SqlValue>>)> {
        let mut statement = self
            .conn
            .prepare(sql)
            .map_err(|e| SvlError::DataProcessing(e.to_string()))?;
        let mut raw_rows = statement
            .query([])
            .map_err(|e| SvlError::DataProcessing(e.to_string()))?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        while let Some(row) = raw_rows
            .next()
            .map_err(|e| SvlError::DataProcessing(e.to_string()))?
        {
            if columns.is_empty() {
                columns = row
                    .as_ref()
                    .column_names()
                    .iter()
                    .map(|name| name.to_string())
                    .collect();
            }
            let mut cells = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let value: Value = row
                    .get(index)
                    .map_err(|e| SvlError::DataProcessing(e.to_string()))?;
                cells.push(convert_value(value));
            }
            rows.push(cells);
        }

        tracing::debug!(rows = rows.len(), "query executed");
        Ok((columns, rows))
    }
}

/// Double any single quotes so a path can sit inside a SQL string literal.
fn escape_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// Narrow a DuckDB cell to the value type the shaper understands.
fn convert_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(v) => SqlValue::Bool(v),
        Value::TinyInt(v) => SqlValue::Int(v as i64),
        Value::SmallInt(v) => SqlValue::Int(v as i64),
        Value::Int(v) => SqlValue::Int(v as i64),
        Value::BigInt(v) => SqlValue::Int(v),
        Value::HugeInt(v) => SqlValue::Int(v as i64),
        Value::UTinyInt(v) => SqlValue::Int(v as i64),
        Value::USmallInt(v) => SqlValue::Int(v as i64),
        Value::UInt(v) => SqlValue::Int(v as i64),
        Value::UBigInt(v) => SqlValue::Int(v as i64),
        Value::Float(v) => SqlValue::Real(v as f64),
        Value::Double(v) => SqlValue::Real(v),
        Value::Decimal(v) => SqlValue::Text(v.to_string()),
        Value::Text(v) => SqlValue::Text(v),
        Value::Date32(days) => match DateTime::from_timestamp(days as i64 * 86_400, 0) {
            Some(dt) => SqlValue::Text(dt.date_naive().to_string()),
            None => SqlValue::Null,
        },
        Value::Timestamp(unit, raw) => {
            let (seconds, nanos) = match unit {
                TimeUnit::Second => (raw, 0),
                TimeUnit::Millisecond => {
                    (raw.div_euclid(1_000), raw.rem_euclid(1_000) as u32 * 1_000_000)
                }
                TimeUnit::Microsecond => {
                    (raw.div_euclid(1_000_000), raw.rem_euclid(1_000_000) as u32 * 1_000)
                }
                TimeUnit::Nanosecond => {
                    (raw.div_euclid(1_000_000_000), raw.rem_euclid(1_000_000_000) as u32)
                }
            };
            match DateTime::from_timestamp(seconds, nanos) {
                Some(dt) => SqlValue::Text(dt.naive_utc().to_string()),
                None => SqlValue::Null,
            }
        }
        other => SqlValue::Text(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("plain.csv"), "plain.csv");
        assert_eq!(escape_literal("it's.csv"), "it''s.csv");
    }

    #[test]
    fn test_convert_value_numeric_widths() {
        assert_eq!(convert_value(Value::TinyInt(3)), SqlValue::Int(3));
        assert_eq!(convert_value(Value::BigInt(1 << 40)), SqlValue::Int(1 << 40));
        assert_eq!(convert_value(Value::Float(2.5)), SqlValue::Real(2.5));
        assert_eq!(convert_value(Value::Null), SqlValue::Null);
    }

    #[test]
    fn test_convert_value_date() {
        // 2020-01-01 is 18262 days after the epoch.
        assert_eq!(
            convert_value(Value::Date32(18262)),
            SqlValue::Text("2020-01-01".to_string())
        );
    }

    #[test]
    fn test_session_query_round_trip() {
        let session = Session::open_in_memory().unwrap();
        session
            .conn
            .execute("CREATE TABLE t (id INTEGER, name VARCHAR)", [])
            .unwrap();
        session
            .conn
            .execute("INSERT INTO t VALUES (1, 'one'), (2, 'two')", [])
            .unwrap();

        let (columns, rows) = session.query("SELECT id, name FROM t ORDER BY id").unwrap();
        assert_eq!(columns, vec!["id", "name"]);
        assert_eq!(
            rows,
            vec![
                vec![SqlValue::Int(1), SqlValue::Text("one".into())],
                vec![SqlValue::Int(2), SqlValue::Text("two".into())],
            ]
        );
    }
}
