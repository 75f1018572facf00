//! Synthesis of one relational query per plot.
//!
//! The SELECT list aliases every present axis to its axis key (`x`, `y`,
//! `split_by`, `color_by`), so the result shaper can address columns by
//! name regardless of the underlying expressions.

use crate::ast::{Axis, ChartType, Plot, TemporalUnit};

/// Time-bucket expression for a temporal unit, with `{}` standing in for
/// the field.
fn temporal_converter(unit: TemporalUnit) -> &'static str {
    match unit {
        TemporalUnit::Year => "STRFTIME('%Y', {})",
        TemporalUnit::Month => "STRFTIME('%Y-%m', {})",
        TemporalUnit::Day => "STRFTIME('%Y-%m-%D', {})",
        TemporalUnit::Hour => "STRFTIME('%Y-%m-%DT%H', {})",
        TemporalUnit::Minute => "STRFTIME('%Y-%m-%DT%H:%M', {})",
        TemporalUnit::Second => "STRFTIME('%Y-%m-%DT%H:%M:%S', {})",
    }
}

/// Resolve an axis to the expression selected for it.
///
/// A transform wins over everything; a temporal unit wraps the field in its
/// bucket expression; a bare field is emitted as-is; an empty axis selects
/// everything.
pub fn resolve_field(axis: &Axis) -> String {
    if let Some(transform) = &axis.transform {
        transform.clone()
    } else if let (Some(unit), Some(field)) = (axis.temporal, &axis.field) {
        temporal_converter(unit).replace("{}", field)
    } else if let Some(field) = &axis.field {
        field.clone()
    } else {
        "*".to_string()
    }
}

/// The query for an XY plot (line, bar, scatter).
fn xy_query(plot: &Plot) -> String {
    let axes: [(&str, Option<&Axis>); 4] = [
        ("x", plot.x.as_ref()),
        ("y", plot.y.as_ref()),
        ("split_by", plot.split_by.as_ref()),
        ("color_by", plot.color_by.as_ref()),
    ];

    let mut select_fields = Vec::new();
    for (key, axis) in axes {
        let Some(axis) = axis else { continue };
        let field = resolve_field(axis);
        // Split-by axes never aggregate; color-by may.
        match axis.agg {
            Some(agg) => select_fields.push(format!("{}({}) AS {}", agg.as_str(), field, key)),
            None => select_fields.push(format!("{} AS {}", field, key)),
        }
    }

    let mut query = format!(
        "SELECT {} FROM {}",
        select_fields.join(", "),
        plot.data
    );

    if let Some(filter) = &plot.filter {
        query = format!("{} WHERE {}", query, filter);
    }

    // Aggregating one axis groups by the other; split-by joins the grouping
    // when present. Color-by never appears in a GROUP BY: when x or y
    // aggregates, the validator has forced an aggregation onto color-by.
    let group_axis = if plot.x.as_ref().is_some_and(|a| a.agg.is_some()) {
        plot.y.as_ref()
    } else if plot.y.as_ref().is_some_and(|a| a.agg.is_some()) {
        plot.x.as_ref()
    } else {
        None
    };

    if let Some(group_axis) = group_axis {
        let mut group_fields = vec![resolve_field(group_axis)];
        if let Some(split_by) = &plot.split_by {
            group_fields.push(resolve_field(split_by));
        }
        query = format!("{} GROUP BY {}", query, group_fields.join(", "));
    }

    // With a split-by, the split column sorts first so each trace's points
    // stay contiguous.
    let sorted_axis = [("x", plot.x.as_ref()), ("y", plot.y.as_ref())]
        .into_iter()
        .find_map(|(key, axis)| {
            axis.and_then(|a| a.sort).map(|direction| (key, direction))
        });

    if let Some((key, direction)) = sorted_axis {
        let mut sort_fields = Vec::new();
        if plot.split_by.is_some() {
            sort_fields.push("split_by");
        }
        sort_fields.push(key);
        query = format!(
            "{} ORDER BY {} {}",
            query,
            sort_fields.join(", "),
            direction.as_str()
        );
    }

    query
}

/// The query for a histogram: the single value axis plus an optional
/// split-by, with no grouping.
fn histogram_query(plot: &Plot) -> String {
    let axes: [(&str, Option<&Axis>); 3] = [
        ("x", plot.x.as_ref()),
        ("y", plot.y.as_ref()),
        ("split_by", plot.split_by.as_ref()),
    ];

    let select_fields: Vec<String> = axes
        .into_iter()
        .filter_map(|(key, axis)| axis.map(|a| format!("{} AS {}", resolve_field(a), key)))
        .collect();

    let mut query = format!(
        "SELECT {} FROM {}",
        select_fields.join(", "),
        plot.data
    );

    if let Some(filter) = &plot.filter {
        query = format!("{} WHERE {}", query, filter);
    }

    query
}

/// The query for a pie chart: distinct axis values with their counts.
fn pie_query(plot: &Plot) -> String {
    let field = plot
        .axis
        .as_ref()
        .map(resolve_field)
        .unwrap_or_else(|| "*".to_string());

    let mut query = format!(
        "SELECT {} AS label, COUNT(*) AS value FROM {}",
        field, plot.data
    );

    if let Some(filter) = &plot.filter {
        query = format!("{} WHERE {}", query, filter);
    }

    format!("{} GROUP BY {}", query, field)
}

/// Synthesize the single relational statement fetching a plot's data.
pub fn plot_query(plot: &Plot) -> String {
    let query = match plot.chart_type {
        ChartType::Line | ChartType::Bar | ChartType::Scatter => xy_query(plot),
        ChartType::Histogram => histogram_query(plot),
        ChartType::Pie => pie_query(plot),
    };
    tracing::debug!(chart = plot.chart_type.as_str(), %query, "synthesized plot query");
    query
}
