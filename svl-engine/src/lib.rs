//! Dataset materialization and query execution for SVL.
//!
//! This crate owns the embedded DuckDB session: it loads the declared
//! datasets (CSV and Parquet files, then SQL views over them), executes the
//! one query synthesized per plot, and hands the shaped rows back to the
//! compiler. The session is a scoped resource: opened once at pipeline
//! start, used serially, closed when dropped.

#![warn(missing_docs)]

pub mod session;

pub use session::Session;
