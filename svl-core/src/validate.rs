//! Per-chart-type validation rules over the plot IR.
//!
//! Rules are a declarative table of (applicable chart types, predicate,
//! message); a plot fails when a predicate fires. All failures are collected
//! so the user sees everything wrong with a plot at once.

use crate::ast::{Axis, ChartType, Plot};

type Predicate = fn(&Plot) -> bool;

/// A single validation rule.
pub struct ValidationRule {
    /// Chart types the rule applies to.
    pub chart_types: &'static [ChartType],
    /// Fires when the plot is invalid.
    pub predicate: Predicate,
    /// Failure message shown to the user.
    pub message: &'static str,
}

const XY: &[ChartType] = &[ChartType::Line, ChartType::Scatter, ChartType::Bar];
const LINE_BAR: &[ChartType] = &[ChartType::Line, ChartType::Bar];
const HISTOGRAM: &[ChartType] = &[ChartType::Histogram];
const HISTOGRAM_PIE: &[ChartType] = &[ChartType::Histogram, ChartType::Pie];
const PIE: &[ChartType] = &[ChartType::Pie];

fn has_agg(axis: Option<&Axis>) -> bool {
    axis.is_some_and(|a| a.agg.is_some())
}

fn has_temporal(axis: Option<&Axis>) -> bool {
    axis.is_some_and(|a| a.temporal.is_some())
}

fn has_sort(axis: Option<&Axis>) -> bool {
    axis.is_some_and(|a| a.sort.is_some())
}

/// The full rule table, evaluated in order.
pub const PLOT_VALIDATORS: &[ValidationRule] = &[
    ValidationRule {
        chart_types: XY,
        predicate: |p| p.x.is_none() || p.y.is_none(),
        message: "XY plot does not have X and Y.",
    },
    ValidationRule {
        chart_types: HISTOGRAM,
        predicate: |p| p.step.is_some() && p.bins.is_some(),
        message: "Histogram cannot have STEP and BINS.",
    },
    ValidationRule {
        chart_types: XY,
        predicate: |p| has_agg(p.x.as_ref()) && has_agg(p.y.as_ref()),
        message: "XY plot cannot have an aggregation on X and Y.",
    },
    ValidationRule {
        chart_types: HISTOGRAM_PIE,
        predicate: |p| {
            has_agg(p.x.as_ref()) || has_agg(p.y.as_ref()) || has_agg(p.axis.as_ref())
        },
        message: "Histograms and pie charts cannot have aggregations.",
    },
    ValidationRule {
        chart_types: HISTOGRAM_PIE,
        predicate: |p| {
            has_temporal(p.x.as_ref())
                || has_temporal(p.y.as_ref())
                || has_temporal(p.axis.as_ref())
        },
        message: "Histograms and pie charts cannot have temporal axes.",
    },
    ValidationRule {
        chart_types: HISTOGRAM,
        predicate: |p| p.x.is_some() && p.y.is_some(),
        message: "Histograms can have X or Y, not both.",
    },
    ValidationRule {
        chart_types: HISTOGRAM,
        predicate: |p| p.x.is_none() && p.y.is_none(),
        message: "Histograms must have an X or Y.",
    },
    ValidationRule {
        chart_types: PIE,
        predicate: |p| p.axis.is_none(),
        message: "Pie charts must have an axis.",
    },
    // SORT is a no-op for scatter.
    ValidationRule {
        chart_types: LINE_BAR,
        predicate: |p| has_sort(p.x.as_ref()) && has_sort(p.y.as_ref()),
        message: "Cannot sort by two axes.",
    },
    ValidationRule {
        chart_types: PIE,
        predicate: |p| p.hole.is_some_and(|h| !(0.0..=1.0).contains(&h)),
        message: "HOLE must be between zero and one.",
    },
    ValidationRule {
        chart_types: HISTOGRAM,
        predicate: |p| p.step.is_some_and(|s| s <= 0.0),
        message: "STEP must be greater than zero.",
    },
    ValidationRule {
        chart_types: HISTOGRAM,
        predicate: |p| p.bins.is_some_and(|b| b == 0),
        message: "BINS must be greater than zero.",
    },
    ValidationRule {
        chart_types: HISTOGRAM_PIE,
        predicate: |p| p.color_by.is_some(),
        message: "Histograms and pie charts cannot have COLOR BY.",
    },
    ValidationRule {
        chart_types: PIE,
        predicate: |p| p.split_by.is_some(),
        message: "Pie charts cannot have SPLIT BY.",
    },
    ValidationRule {
        chart_types: XY,
        predicate: |p| p.split_by.is_some() && p.color_by.is_some(),
        message: "Cannot have COLOR BY and SPLIT BY on same plot.",
    },
    ValidationRule {
        chart_types: XY,
        predicate: |p| {
            (has_agg(p.x.as_ref()) || has_agg(p.y.as_ref()))
                && p.color_by.as_ref().is_some_and(|c| c.agg.is_none())
        },
        message: "If there's an aggregation on X or Y, COLOR BY must also aggregate.",
    },
];

/// Check a plot against every applicable rule.
///
/// Returns whether the plot is valid, along with the newline-joined failure
/// messages when it is not.
pub fn validate_plot(plot: &Plot) -> (bool, String) {
    let mut failures = Vec::new();

    for rule in PLOT_VALIDATORS {
        if rule.chart_types.contains(&plot.chart_type) && (rule.predicate)(plot) {
            failures.push(rule.message);
        }
    }

    (failures.is_empty(), failures.join("\n"))
}
