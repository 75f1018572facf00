//! Bottom-up fold from the concrete tree into the visualization IR.
//!
//! Each grammar rule has a small contract: quoted payloads are unquoted,
//! keyword-derived values are uppercased into their enum forms, and the
//! `transform` and `filter` payloads keep their content byte-for-byte since
//! they flow into SQL.

use crate::ast::{
    Aggregation, Axis, ChartType, DatasetSource, Datasets, LayoutNode, Plot, SortDirection,
    TemporalUnit, Visualization,
};
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::lex::{source_context, Token};
use crate::parse::{ParseTree, Rule};

/// Fold a concrete tree into a [`Visualization`].
///
/// The only fallible step is numeric payload conversion (`BINS`, `STEP`,
/// `HOLE`); an out-of-range literal reports an incorrect-type diagnostic at
/// the offending token.
pub fn build(tree: &ParseTree, source: &str) -> Result<Visualization, SyntaxError> {
    let ParseTree::Node(Rule::Visualization, children) = tree else {
        unreachable!("the parser only hands the builder a visualization root");
    };

    let mut datasets = Datasets::new();
    let mut layout = None;

    for child in children {
        match child {
            ParseTree::Node(Rule::Datasets, bindings) => {
                for binding in bindings {
                    fold_dataset(binding, &mut datasets);
                }
            }
            ParseTree::Node(Rule::Charts, charts) => {
                // A bare top-level chart list is an implicit vertical
                // concatenation.
                let nodes = charts
                    .iter()
                    .map(|chart| fold_layout_node(chart, source))
                    .collect::<Result<Vec<_>, _>>()?;
                layout = Some(LayoutNode::VCat(nodes));
            }
            _ => unreachable!("visualization has only datasets and charts children"),
        }
    }

    Ok(Visualization {
        datasets,
        layout: layout.unwrap_or_else(|| LayoutNode::VCat(Vec::new())),
    })
}

fn fold_dataset(tree: &ParseTree, datasets: &mut Datasets) {
    match tree {
        ParseTree::Node(Rule::FileDataset, children) => {
            let (name, value) = dataset_parts(children);
            datasets.insert(name, DatasetSource::File(value));
        }
        ParseTree::Node(Rule::SqlDataset, children) => {
            let (name, value) = dataset_parts(children);
            datasets.insert(name, DatasetSource::Sql(value));
        }
        _ => unreachable!("datasets contains only dataset bindings"),
    }
}

fn dataset_parts(children: &[ParseTree]) -> (String, String) {
    let [ParseTree::Leaf(name), ParseTree::Leaf(value)] = children else {
        unreachable!("dataset bindings are a name and a payload");
    };
    (name.text.clone(), unquote(&value.text))
}

fn fold_layout_node(tree: &ParseTree, source: &str) -> Result<LayoutNode, SyntaxError> {
    match tree {
        ParseTree::Node(Rule::Hcat, children) => Ok(LayoutNode::HCat(
            children
                .iter()
                .map(|child| fold_layout_node(child, source))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        ParseTree::Node(Rule::Vcat, children) => Ok(LayoutNode::VCat(
            children
                .iter()
                .map(|child| fold_layout_node(child, source))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        _ => Ok(LayoutNode::Leaf(Box::new(fold_plot(tree, source)?))),
    }
}

fn fold_plot(tree: &ParseTree, source: &str) -> Result<Plot, SyntaxError> {
    let ParseTree::Node(rule, children) = tree else {
        unreachable!("plots are interior nodes");
    };

    let mut plot = match rule {
        // The mark token tags the chart type for XY charts.
        Rule::XyChart => {
            let mark = match &children[0] {
                ParseTree::Node(Rule::Markxy, mark_children) => leaf_text(&mark_children[0]),
                _ => unreachable!("xy charts lead with their mark"),
            };
            let chart_type = match mark.to_ascii_lowercase().as_str() {
                "line" => ChartType::Line,
                "bar" => ChartType::Bar,
                _ => ChartType::Scatter,
            };
            Plot::new(chart_type, data_name(children))
        }
        Rule::HistogramChart => Plot::new(ChartType::Histogram, data_name(children)),
        Rule::PieChart => Plot::new(ChartType::Pie, data_name(children)),
        _ => unreachable!("chart rules are xy, histogram, or pie"),
    };

    for child in children {
        let ParseTree::Node(rule, grandchildren) = child else {
            continue;
        };
        match rule {
            Rule::Markxy | Rule::Data => {}
            Rule::Title => plot.title = Some(unquote(&leaf_text(&grandchildren[0]))),
            Rule::Filter => plot.filter = Some(unquote(&leaf_text(&grandchildren[0]))),
            Rule::X => plot.x = Some(fold_axis(grandchildren)),
            Rule::Y => plot.y = Some(fold_axis(grandchildren)),
            Rule::Axis => plot.axis = Some(fold_axis(grandchildren)),
            Rule::SplitBy => plot.split_by = Some(fold_axis(grandchildren)),
            Rule::ColorBy => plot.color_by = Some(fold_axis(grandchildren)),
            Rule::Bins => plot.bins = Some(int_payload(&grandchildren[0], source)?),
            Rule::Step => plot.step = Some(number_payload(&grandchildren[0], source)?),
            Rule::Hole => plot.hole = Some(number_payload(&grandchildren[0], source)?),
            _ => unreachable!("chart children are options"),
        }
    }

    Ok(plot)
}

fn fold_axis(options: &[ParseTree]) -> Axis {
    let mut axis = Axis::default();
    for option in options {
        let ParseTree::Node(rule, children) = option else {
            continue;
        };
        let payload = leaf_text(&children[0]);
        match rule {
            Rule::Field => axis.field = Some(payload),
            // Transform content is untouched; its case matters to SQL.
            Rule::Transform => axis.transform = Some(unquote(&payload)),
            Rule::Label => axis.label = Some(unquote(&payload)),
            Rule::ColorScale => axis.color_scale = Some(unquote(&payload)),
            Rule::Temporal => {
                axis.temporal = Some(match payload.to_ascii_uppercase().as_str() {
                    "YEAR" => TemporalUnit::Year,
                    "MONTH" => TemporalUnit::Month,
                    "DAY" => TemporalUnit::Day,
                    "HOUR" => TemporalUnit::Hour,
                    "MINUTE" => TemporalUnit::Minute,
                    _ => TemporalUnit::Second,
                })
            }
            Rule::Aggregation => {
                axis.agg = Some(match payload.to_ascii_uppercase().as_str() {
                    "COUNT" => Aggregation::Count,
                    "MIN" => Aggregation::Min,
                    "MAX" => Aggregation::Max,
                    _ => Aggregation::Avg,
                })
            }
            Rule::Sort => {
                axis.sort = Some(if payload.eq_ignore_ascii_case("ASC") {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                })
            }
            _ => unreachable!("axis options are field, transform, or modifiers"),
        }
    }
    axis
}

fn data_name(children: &[ParseTree]) -> String {
    for child in children {
        if let ParseTree::Node(Rule::Data, data_children) = child {
            return leaf_text(&data_children[0]);
        }
    }
    unreachable!("every chart names its dataset");
}

fn leaf_text(tree: &ParseTree) -> String {
    match tree {
        ParseTree::Leaf(token) => token.text.clone(),
        ParseTree::Node(..) => unreachable!("payloads are leaves"),
    }
}

/// Strip the enclosing double quotes, leaving the payload verbatim.
fn unquote(text: &str) -> String {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .to_string()
}

fn int_payload(tree: &ParseTree, source: &str) -> Result<u32, SyntaxError> {
    let ParseTree::Leaf(token) = tree else {
        unreachable!("numeric payloads are leaves");
    };
    token
        .text
        .parse()
        .map_err(|_| incorrect_type(token, source))
}

fn number_payload(tree: &ParseTree, source: &str) -> Result<f64, SyntaxError> {
    let ParseTree::Leaf(token) = tree else {
        unreachable!("numeric payloads are leaves");
    };
    token
        .text
        .parse()
        .map_err(|_| incorrect_type(token, source))
}

fn incorrect_type(token: &Token, source: &str) -> SyntaxError {
    SyntaxError {
        kind: SyntaxErrorKind::TypeError,
        context: source_context(source, token.line, token.column),
        line: token.line,
        column: token.column,
    }
}
