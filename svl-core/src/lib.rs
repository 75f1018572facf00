//! Core compiler for SVL, the small visualization language.
//!
//! This crate owns the language itself: tokenizing and parsing source text,
//! folding the concrete tree into the visualization IR, classifying parse
//! failures, validating plots, assigning grid positions, synthesizing one
//! relational query per plot, and shaping result rows into per-trace
//! structures. Dataset execution lives in `svl-engine`; renderer spec and
//! HTML composition live in `svl-render`.

#![warn(missing_docs)]

pub mod ast;
pub mod build;
pub mod classify;
pub mod data;
pub mod error;
pub mod layout;
pub mod lex;
pub mod parse;
pub mod sql;
pub mod validate;

// Re-export commonly used types
pub use ast::{
    Aggregation, Axis, ChartType, DatasetSource, Datasets, LayoutNode, Plot, PositionedPlot,
    SortDirection, TemporalUnit, Visualization,
};
pub use data::{PlotData, SqlValue};
pub use error::{Result, SvlError, SyntaxError, SyntaxErrorKind};

/// Parse SVL source into the visualization IR, classifying any parse
/// failure against the example-error bank.
pub fn parse_svl(source: &str) -> Result<Visualization> {
    match parse::parse(source) {
        Ok(tree) => Ok(build::build(&tree, source)?),
        Err(failure) => Err(classify::classify_failure(source, &failure).into()),
    }
}

/// Parse SVL source and return the pretty-printed concrete tree, for
/// debugging the grammar rather than running the pipeline.
pub fn parse_svl_debug(source: &str) -> Result<String> {
    match parse::parse(source) {
        Ok(tree) => Ok(tree.pretty()),
        Err(failure) => Err(classify::classify_failure(source, &failure).into()),
    }
}
