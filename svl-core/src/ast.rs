//! The visualization IR produced by the parser.
//!
//! The parser folds the concrete tree into these types once; everything
//! downstream (validation, layout, query synthesis, rendering) treats them
//! as immutable.

use serde::Serialize;

/// Where a dataset's rows come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DatasetSource {
    /// A CSV or Parquet file on disk.
    File(String),
    /// A SQL statement evaluated against previously defined datasets.
    Sql(String),
}

/// The named datasets of a visualization, in declaration order.
///
/// Declaration order matters: SQL datasets may reference any dataset that
/// was declared before them, so materialization walks this in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Datasets(Vec<(String, DatasetSource)>);

impl Datasets {
    /// Create an empty dataset mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `source`, replacing any earlier binding of the same
    /// name.
    pub fn insert(&mut self, name: impl Into<String>, source: DatasetSource) {
        let name = name.into();
        if let Some(slot) = self.0.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = source;
        } else {
            self.0.push((name, source));
        }
    }

    /// Look up a dataset by name.
    pub fn get(&self, name: &str) -> Option<&DatasetSource> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatasetSource)> + '_ {
        self.0.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// The file-backed bindings, in declaration order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.iter().filter_map(|(n, s)| match s {
            DatasetSource::File(path) => Some((n, path.as_str())),
            DatasetSource::Sql(_) => None,
        })
    }

    /// The SQL-backed bindings, in declaration order.
    pub fn sqls(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.iter().filter_map(|(n, s)| match s {
            DatasetSource::Sql(sql) => Some((n, sql.as_str())),
            DatasetSource::File(_) => None,
        })
    }

    /// The bound names, comma-joined, for diagnostics.
    pub fn names(&self) -> String {
        self.0
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The kind of chart a plot renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Connected line chart.
    Line,
    /// Vertical bar chart.
    Bar,
    /// Point cloud.
    Scatter,
    /// Binned distribution of a single axis.
    Histogram,
    /// Proportional wedges of a categorical axis.
    Pie,
}

impl ChartType {
    /// Lowercase name, matching the source keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Scatter => "scatter",
            ChartType::Histogram => "histogram",
            ChartType::Pie => "pie",
        }
    }

    /// Whether this is one of the two-axis chart types.
    pub fn is_xy(&self) -> bool {
        matches!(self, ChartType::Line | ChartType::Bar | ChartType::Scatter)
    }
}

/// Aggregation functions an axis can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Aggregation {
    /// Row count.
    Count,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Arithmetic mean.
    Avg,
}

impl Aggregation {
    /// Uppercase SQL spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Count => "COUNT",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
            Aggregation::Avg => "AVG",
        }
    }
}

/// Units a timestamp axis can be truncated to for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemporalUnit {
    /// Truncate to the year.
    Year,
    /// Truncate to the month.
    Month,
    /// Truncate to the day.
    Day,
    /// Truncate to the hour.
    Hour,
    /// Truncate to the minute.
    Minute,
    /// Truncate to the second.
    Second,
}

impl TemporalUnit {
    /// Uppercase spelling, matching the source keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalUnit::Year => "YEAR",
            TemporalUnit::Month => "MONTH",
            TemporalUnit::Day => "DAY",
            TemporalUnit::Hour => "HOUR",
            TemporalUnit::Minute => "MINUTE",
            TemporalUnit::Second => "SECOND",
        }
    }
}

/// Sort direction for an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Uppercase SQL spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Per-direction configuration of a plot.
///
/// Either `field` or `transform` names the data; `transform` carries a
/// verbatim SQL expression whose case and content are never altered.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    /// Column identifier in the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Verbatim SQL expression used instead of a plain field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    /// Display label override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Aggregation applied to the resolved field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg: Option<Aggregation>,
    /// Temporal bucket applied to the resolved field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalUnit>,
    /// Sort direction, when this axis orders the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDirection>,
    /// Named color scale; only meaningful on a color axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<String>,
}

impl Axis {
    /// An axis naming a plain field.
    pub fn field(name: impl Into<String>) -> Self {
        Axis {
            field: Some(name.into()),
            ..Axis::default()
        }
    }

    /// An axis carrying a verbatim SQL expression.
    pub fn transform(expr: impl Into<String>) -> Self {
        Axis {
            transform: Some(expr.into()),
            ..Axis::default()
        }
    }
}

/// A single chart specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plot {
    /// Which chart type renders this plot.
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Name of the dataset the plot draws from.
    pub data: String,
    /// Title override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Verbatim WHERE-clause predicate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Horizontal axis (XY plots, or the single histogram axis).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Axis>,
    /// Vertical axis (XY plots, or the single histogram axis).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Axis>,
    /// The pie chart's value axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Axis>,
    /// Categorical axis producing one trace per distinct value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_by: Option<Axis>,
    /// Continuous axis coloring a single trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_by: Option<Axis>,
    /// Histogram bin count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<u32>,
    /// Histogram bin size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Pie donut hole fraction in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
}

impl Plot {
    /// A bare plot of the given type over the named dataset.
    pub fn new(chart_type: ChartType, data: impl Into<String>) -> Self {
        Plot {
            chart_type,
            data: data.into(),
            title: None,
            filter: None,
            x: None,
            y: None,
            axis: None,
            split_by: None,
            color_by: None,
            bins: None,
            step: None,
            hole: None,
        }
    }
}

/// The recursive arrangement of plots on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayoutNode {
    /// A single plot.
    Leaf(Box<Plot>),
    /// Children side by side, left to right.
    HCat(Vec<LayoutNode>),
    /// Children stacked, top to bottom.
    VCat(Vec<LayoutNode>),
}

impl LayoutNode {
    /// Number of leaf plots under this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            LayoutNode::Leaf(_) => 1,
            LayoutNode::HCat(children) | LayoutNode::VCat(children) => {
                children.iter().map(LayoutNode::leaf_count).sum()
            }
        }
    }
}

/// A parsed SVL program: its datasets and the chart arrangement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visualization {
    /// Dataset bindings, in declaration order.
    pub datasets: Datasets,
    /// The chart tree; a bare top-level sequence parses as a `VCat`.
    pub layout: LayoutNode,
}

/// A plot annotated with its absolute cell on the shared grid.
///
/// Intervals are half-open and zero-indexed; the renderer shifts them to the
/// 1-indexed CSS grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedPlot {
    /// The plot occupying the cell.
    #[serde(flatten)]
    pub plot: Plot,
    /// First grid row covered.
    pub row_start: usize,
    /// One past the last grid row covered.
    pub row_end: usize,
    /// First grid column covered.
    pub column_start: usize,
    /// One past the last grid column covered.
    pub column_end: usize,
}
