//! Reshaping of query result rows into per-trace structures.
//!
//! The engine hands the shaper rows addressed by the SELECT aliases the
//! query synthesizer emitted; the shaper turns them into the column-parallel
//! sequences the renderer consumes. Split-by partitions are keyed by the
//! split value's text and held in a sorted map, so partition order is
//! deterministic (lexicographic).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::ast::{ChartType, Plot};
use crate::error::{Result, SvlError};

/// Message raised when a plot query returns no rows.
pub const EMPTY_RESULT_MESSAGE: &str =
    "Encountered empty result set. Check filters or source data.";

/// A single cell value crossing the engine boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// A boolean.
    Bool(bool),
    /// Any integer width.
    Int(i64),
    /// Any floating-point width.
    Real(f64),
    /// Text, including bucketed timestamps.
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => Ok(()),
            SqlValue::Bool(value) => write!(f, "{}", value),
            SqlValue::Int(value) => write!(f, "{}", value),
            SqlValue::Real(value) => write!(f, "{}", value),
            SqlValue::Text(value) => f.write_str(value),
        }
    }
}

/// One trace's coordinates within a split-by partition.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct XyTrace {
    /// Horizontal coordinates.
    pub x: Vec<SqlValue>,
    /// Vertical coordinates.
    pub y: Vec<SqlValue>,
}

/// Which of the two directions a histogram uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramAxis {
    /// Values on the horizontal axis.
    X,
    /// Values on the vertical axis.
    Y,
}

impl HistogramAxis {
    /// The axis key, as used in SELECT aliases and renderer specs.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistogramAxis::X => "x",
            HistogramAxis::Y => "y",
        }
    }
}

/// A plot's data, shaped for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlotData {
    /// XY data as parallel sequences, optionally with a color channel.
    Xy {
        /// Horizontal coordinates.
        x: Vec<SqlValue>,
        /// Vertical coordinates.
        y: Vec<SqlValue>,
        /// Per-point color values, when the plot declares COLOR BY.
        color_by: Option<Vec<SqlValue>>,
    },
    /// XY data partitioned by split value.
    XySplit(BTreeMap<String, XyTrace>),
    /// A single histogram axis.
    Histogram {
        /// Which direction holds the values.
        axis: HistogramAxis,
        /// The observed values.
        values: Vec<SqlValue>,
    },
    /// Histogram values partitioned by split value.
    HistogramSplit {
        /// Which direction holds the values.
        axis: HistogramAxis,
        /// Values per split value.
        groups: BTreeMap<String, Vec<SqlValue>>,
    },
    /// Pie labels and their counts, parallel.
    Pie {
        /// Wedge labels.
        labels: Vec<SqlValue>,
        /// Wedge values.
        values: Vec<SqlValue>,
    },
}

fn column_index(columns: &[String], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| {
            SvlError::DataProcessing(format!("result set is missing column {}", name))
        })
}

/// Shape a query's result rows into the structure the plot's chart type
/// needs. An empty result set is a hard error.
pub fn shape_rows(
    plot: &Plot,
    columns: &[String],
    rows: &[Vec<SqlValue>],
) -> Result<PlotData> {
    if rows.is_empty() {
        return Err(SvlError::DataProcessing(EMPTY_RESULT_MESSAGE.to_string()));
    }

    match plot.chart_type {
        ChartType::Line | ChartType::Bar | ChartType::Scatter => shape_xy(columns, rows),
        ChartType::Histogram => shape_histogram(plot, columns, rows),
        ChartType::Pie => shape_pie(columns, rows),
    }
}

fn shape_xy(columns: &[String], rows: &[Vec<SqlValue>]) -> Result<PlotData> {
    let x = column_index(columns, "x")?;
    let y = column_index(columns, "y")?;

    if let Ok(split_by) = column_index(columns, "split_by") {
        let mut partitions: BTreeMap<String, XyTrace> = BTreeMap::new();
        for row in rows {
            let trace = partitions.entry(row[split_by].to_string()).or_default();
            trace.x.push(row[x].clone());
            trace.y.push(row[y].clone());
        }
        return Ok(PlotData::XySplit(partitions));
    }

    let color_by = column_index(columns, "color_by").ok();
    Ok(PlotData::Xy {
        x: rows.iter().map(|row| row[x].clone()).collect(),
        y: rows.iter().map(|row| row[y].clone()).collect(),
        color_by: color_by
            .map(|index| rows.iter().map(|row| row[index].clone()).collect()),
    })
}

fn shape_histogram(
    plot: &Plot,
    columns: &[String],
    rows: &[Vec<SqlValue>],
) -> Result<PlotData> {
    let axis = if plot.x.is_some() {
        HistogramAxis::X
    } else {
        HistogramAxis::Y
    };
    let value = column_index(columns, axis.as_str())?;

    if let Ok(split_by) = column_index(columns, "split_by") {
        let mut groups: BTreeMap<String, Vec<SqlValue>> = BTreeMap::new();
        for row in rows {
            groups
                .entry(row[split_by].to_string())
                .or_default()
                .push(row[value].clone());
        }
        return Ok(PlotData::HistogramSplit { axis, groups });
    }

    Ok(PlotData::Histogram {
        axis,
        values: rows.iter().map(|row| row[value].clone()).collect(),
    })
}

fn shape_pie(columns: &[String], rows: &[Vec<SqlValue>]) -> Result<PlotData> {
    let label = column_index(columns, "label")?;
    let value = column_index(columns, "value")?;
    Ok(PlotData::Pie {
        labels: rows.iter().map(|row| row[label].clone()).collect(),
        values: rows.iter().map(|row| row[value].clone()).collect(),
    })
}
