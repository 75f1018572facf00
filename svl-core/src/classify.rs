//! Classification of parse failures against an example-error bank.
//!
//! Each refined syntax-error kind maps to minimal snippets that fail the
//! same way a user's source would. On a live failure every snippet is
//! re-parsed and the first whose failure signature (offending token kind
//! plus expected-token set) matches determines the diagnostic kind. The
//! re-parsing cost only occurs on the error path.

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::lex::source_context;
use crate::parse::{parse, ParseFailure};

/// Representative failing snippets per error kind, checked in order.
pub const ERROR_BANK: &[(SyntaxErrorKind, &[&str])] = &[
    (
        SyntaxErrorKind::MissingValue,
        &[
            // Missing dataset label.
            r#"DATASETS "bigfoot.csv" LINE bigfoot X date Y temperature"#,
            // Missing file or SQL specifier.
            "DATASETS bigfoot LINE bigfoot X date Y temperature",
            // Missing dataset specifier for plot.
            "DATASETS bigfoot SCATTER X latitude Y temperature",
            // Missing dataset specifier for plot without DATASETS.
            "BAR X classification Y classification COUNT",
            // Missing axis specifier.
            r#"DATASETS bigfoot "bigfoot.csv" PIE bigfoot AXIS TITLE "a" "#,
            // Missing axis field.
            r#"LINE bigfoot X LABEL "x" Y temperature"#,
            // Missing title.
            r#"PIE bigfoot AXIS has_location TITLE "#,
            // Missing label value.
            "HISTOGRAM bigfoot X temperature_mid LABEL",
            // Missing bin value.
            "HISTOGRAM bigfoot Y temperature_mid BINS",
            // Missing step value.
            "HISTOGRAM bigfoot Y humidity STEP",
            // Missing TRANSFORM value.
            "LINE bigfoot X TRANSFORM Y classification COUNT",
            // Missing COLOR BY value.
            "BAR bigfoot X classification Y classification COUNT COLOR BY",
            // Missing FILTER value.
            "PIE bigfoot AXIS has_location FILTER ",
            // Missing SORT value.
            "BAR bigfoot X classification Y classification COUNT SORT",
        ],
    ),
    (
        SyntaxErrorKind::MissingParen,
        &[
            // Missing open paren on CONCAT.
            "CONCAT
                LINE bigfoot X date BY YEAR Y report_number COUNT
                HISTOGRAM bigfoot X temperature_mid
            )
            ",
            // Missing open paren on vcat.
            "
            LINE bigfoot X date BY YEAR Y report_number COUNT
            HISTOGRAM bigfoot X temperature_mid
            )
            ",
            // Missing close paren on CONCAT.
            "CONCAT(
                LINE bigfoot X date BY YEAR Y report_number COUNT
                HISTOGRAM bigfoot X temperature_mid
            ",
        ],
    ),
    (
        SyntaxErrorKind::TypeError,
        &[
            // HOLE with a non-number.
            r#"PIE bigfoot AXIS classification HOLE "hi there" "#,
        ],
    ),
    (
        SyntaxErrorKind::InvalidTimeUnit,
        &[
            // BY with a word that is not a supported unit.
            "LINE bigfoot X date BY WEEK Y date COUNT",
        ],
    ),
    // No representative snippet yet; invalid aggregations surface as the
    // generic syntax error.
    (SyntaxErrorKind::InvalidAggregation, &[]),
    (
        SyntaxErrorKind::InvalidSort,
        &[
            // SORT with something other than ASC / DESC.
            "BAR bigfoot X classification Y classification COUNT SORT DESCCCCC",
        ],
    ),
    (
        SyntaxErrorKind::UnsupportedDeclaration,
        &[
            // BINS on a non-histogram chart.
            "BAR bigfoot X classification Y classification COUNT BINS 30",
            // STEP on a non-histogram chart.
            "LINE bigfoot X date BY YEAR Y classification COUNT STEP 0.1",
            // HOLE on a non-pie chart.
            "HISTOGRAM bigfoot Y humidity HOLE 0.9",
            // Dimension on a pie chart.
            "PIE bigfoot X latitude",
        ],
    ),
];

/// Turn a raw parse failure into a classified syntax error.
pub fn classify_failure(source: &str, failure: &ParseFailure) -> SyntaxError {
    let kind = ERROR_BANK
        .iter()
        .find_map(|(kind, snippets)| {
            snippets
                .iter()
                .any(|snippet| {
                    parse(snippet)
                        .err()
                        .is_some_and(|bank_failure| bank_failure.same_signature(failure))
                })
                .then_some(*kind)
        })
        .unwrap_or(SyntaxErrorKind::Generic);

    tracing::debug!(
        kind = kind.label(),
        line = failure.found.line,
        column = failure.found.column,
        "classified parse failure"
    );

    SyntaxError {
        kind,
        context: source_context(source, failure.found.line, failure.found.column),
        line: failure.found.line,
        column: failure.found.column,
    }
}
