//! Composition of plotly plot dictionaries from plots and their data.

use serde::Serialize;
use serde_json::{json, Map, Value};

use svl_core::ast::{Axis, ChartType, Plot, PositionedPlot};
use svl_core::data::PlotData;

/// The name shown for an axis when no label overrides it: the transform
/// expression, the field, or everything.
fn field_name(axis: &Axis) -> String {
    if let Some(transform) = &axis.transform {
        transform.clone()
    } else if let Some(field) = &axis.field {
        field.clone()
    } else {
        "*".to_string()
    }
}

/// The plot's title: explicit, or derived from the dataset and axes.
fn plot_title(plot: &Plot) -> String {
    if let Some(title) = &plot.title {
        return title.clone();
    }
    match plot.chart_type {
        ChartType::Pie => {
            let axis = plot.axis.clone().unwrap_or_default();
            format!("{}: {}", plot.data, field_name(&axis))
        }
        ChartType::Histogram => {
            let axis = plot.x.as_ref().or(plot.y.as_ref()).cloned().unwrap_or_default();
            format!("{}: {}", plot.data, field_name(&axis))
        }
        _ => {
            let x = plot.x.clone().unwrap_or_default();
            let y = plot.y.clone().unwrap_or_default();
            format!("{}: {} - {}", plot.data, field_name(&x), field_name(&y))
        }
    }
}

/// The label for an axis: explicit, `field (AGG)` when aggregated, or the
/// bare field name.
fn axis_label(axis: &Axis) -> String {
    if let Some(label) = &axis.label {
        label.clone()
    } else if let Some(agg) = axis.agg {
        format!("{} ({})", field_name(axis), agg.as_str())
    } else {
        field_name(axis)
    }
}

/// The bin declaration plotly needs: a fixed size from STEP, a count from
/// BINS, or automatic binning.
fn bins_spec(plot: &Plot) -> Map<String, Value> {
    let axis = if plot.x.is_some() { "x" } else { "y" };
    let mut spec = Map::new();
    if let Some(step) = plot.step {
        spec.insert(format!("{}bins", axis), json!({ "size": step }));
    } else if let Some(bins) = plot.bins {
        spec.insert(format!("nbins{}", axis), json!(bins));
    } else {
        spec.insert(format!("autobin{}", axis), json!(true));
    }
    spec
}

/// The marker spec for a COLOR BY axis: per-point colors, a labeled color
/// bar, and the optional named scale.
fn color_spec(plot: &Plot, data: &PlotData) -> Map<String, Value> {
    let mut spec = Map::new();
    if let (Some(color_by), PlotData::Xy { color_by: Some(values), .. }) =
        (plot.color_by.as_ref(), data)
    {
        spec.insert(
            "marker".to_string(),
            json!({
                "color": values,
                "colorbar": { "title": axis_label(color_by) },
                "colorscale": &color_by.color_scale,
            }),
        );
    }
    spec
}

fn merge(base: Value, extra: Map<String, Value>) -> Value {
    let mut base = match base {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    base.extend(extra);
    Value::Object(base)
}

/// The XY chart types share their trace assembly; only the type/mode tag
/// and the split bar mode differ.
fn xy_spec(plot: &Plot, data: &PlotData, type_tag: Value, barmode: Option<&str>) -> Value {
    let mut layout = json!({
        "title": plot_title(plot),
        "xaxis": { "title": axis_label(&plot.x.clone().unwrap_or_default()) },
        "yaxis": { "title": axis_label(&plot.y.clone().unwrap_or_default()) },
    });

    let traces: Vec<Value> = match data {
        PlotData::XySplit(partitions) => {
            if let (Some(mode), Value::Object(map)) = (barmode, &mut layout) {
                map.insert("barmode".to_string(), json!(mode));
            }
            partitions
                .iter()
                .map(|(name, trace)| {
                    merge(
                        type_tag.clone(),
                        json!({ "name": name, "x": &trace.x, "y": &trace.y })
                            .as_object()
                            .cloned()
                            .unwrap_or_default(),
                    )
                })
                .collect()
        }
        PlotData::Xy { x, y, .. } => {
            let mut trace = json!({ "x": x, "y": y })
                .as_object()
                .cloned()
                .unwrap_or_default();
            trace.extend(color_spec(plot, data));
            vec![merge(type_tag, trace)]
        }
        other => {
            tracing::warn!(?other, "xy plot received non-xy data");
            Vec::new()
        }
    };

    json!({ "layout": layout, "data": traces })
}

fn histogram_spec(plot: &Plot, data: &PlotData) -> Value {
    let axis = plot.x.as_ref().or(plot.y.as_ref()).cloned().unwrap_or_default();
    let axis_key = if plot.x.is_some() { "x" } else { "y" };
    let mut layout_map = Map::new();
    layout_map.insert("title".to_string(), json!(plot_title(plot)));
    layout_map.insert(
        format!("{}axis", axis_key),
        json!({ "title": axis_label(&axis) }),
    );
    let mut layout = Value::Object(layout_map);

    let traces: Vec<Value> = match data {
        PlotData::HistogramSplit { groups, .. } => {
            // Overlaid translucent traces, one per split value.
            if let Value::Object(map) = &mut layout {
                map.insert("barmode".to_string(), json!("overlay"));
            }
            groups
                .iter()
                .map(|(name, values)| {
                    let mut trace = Map::new();
                    trace.insert("type".to_string(), json!("histogram"));
                    trace.insert("name".to_string(), json!(name));
                    trace.insert("opacity".to_string(), json!(0.6));
                    trace.insert(axis_key.to_string(), json!(values));
                    trace.extend(bins_spec(plot));
                    Value::Object(trace)
                })
                .collect()
        }
        PlotData::Histogram { values, .. } => {
            let mut trace = Map::new();
            trace.insert("type".to_string(), json!("histogram"));
            trace.insert(axis_key.to_string(), json!(values));
            trace.extend(bins_spec(plot));
            vec![Value::Object(trace)]
        }
        other => {
            tracing::warn!(?other, "histogram plot received non-histogram data");
            Vec::new()
        }
    };

    json!({ "layout": layout, "data": traces })
}

fn pie_spec(plot: &Plot, data: &PlotData) -> Value {
    let (labels, values) = match data {
        PlotData::Pie { labels, values } => (json!(labels), json!(values)),
        other => {
            tracing::warn!(?other, "pie plot received non-pie data");
            (json!([]), json!([]))
        }
    };
    json!({
        "layout": { "title": plot_title(plot) },
        "data": [{
            "type": "pie",
            "labels": labels,
            "values": values,
            "hole": plot.hole.unwrap_or(0.0),
        }],
    })
}

/// Compose the plotly dictionary (`layout` plus `data` traces) for a plot.
pub fn plotly_spec(plot: &Plot, data: &PlotData) -> Value {
    match plot.chart_type {
        ChartType::Line => xy_spec(
            plot,
            data,
            json!({ "mode": "lines+markers", "type": "scatter" }),
            None,
        ),
        ChartType::Scatter => xy_spec(
            plot,
            data,
            json!({ "mode": "markers", "type": "scatter" }),
            None,
        ),
        ChartType::Bar => xy_spec(plot, data, json!({ "type": "bar" }), Some("group")),
        ChartType::Histogram => histogram_spec(plot, data),
        ChartType::Pie => pie_spec(plot, data),
    }
}

/// A plot cell ready for the page template, with 1-indexed CSS grid lines.
#[derive(Debug, Clone, Serialize)]
pub struct PlotCell {
    /// First grid row line.
    pub row_start: usize,
    /// Grid row line one past the cell.
    pub row_end: usize,
    /// First grid column line.
    pub column_start: usize,
    /// Grid column line one past the cell.
    pub column_end: usize,
    /// The plotly dictionary rendered into the cell.
    pub plotly: Value,
}

/// Everything the page template needs.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateVars {
    /// Total grid rows.
    pub num_rows: usize,
    /// Total grid columns.
    pub num_columns: usize,
    /// One cell per plot, in source order.
    pub plots: Vec<PlotCell>,
}

/// Build the template variables from positioned plots and their data.
///
/// Grid coordinates shift from the layout's zero-indexed intervals to the
/// 1-indexed lines CSS grids use; interval widths are unchanged.
pub fn template_vars(plots: &[PositionedPlot], datas: &[PlotData]) -> TemplateVars {
    let num_rows = plots.iter().map(|p| p.row_end).max().unwrap_or(0);
    let num_columns = plots.iter().map(|p| p.column_end).max().unwrap_or(0);

    let cells = plots
        .iter()
        .zip(datas)
        .map(|(positioned, data)| PlotCell {
            row_start: positioned.row_start + 1,
            row_end: positioned.row_end + 1,
            column_start: positioned.column_start + 1,
            column_end: positioned.column_end + 1,
            plotly: plotly_spec(&positioned.plot, data),
        })
        .collect();

    TemplateVars {
        num_rows,
        num_columns,
        plots: cells,
    }
}
