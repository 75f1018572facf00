//! Tokenizer for SVL source text.
//!
//! Keywords are case-insensitive; identifiers are ASCII word characters;
//! strings are double-quoted and may span lines; `--` starts a line comment.

use std::fmt;

use crate::error::{SyntaxError, SyntaxErrorKind};

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum TokenKind {
    // Keywords.
    Datasets,
    Sql,
    Line,
    Bar,
    Scatter,
    Histogram,
    Pie,
    Concat,
    X,
    Y,
    Axis,
    By,
    Count,
    Min,
    Max,
    Avg,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Step,
    Bins,
    Hole,
    Label,
    Title,
    Filter,
    Split,
    Color,
    Transform,
    Sort,
    Asc,
    Desc,
    // Literals and punctuation.
    Ident,
    StringLit,
    Int,
    Float,
    LParen,
    RParen,
    Eof,
}

impl TokenKind {
    /// The spelling shown in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Datasets => "DATASETS",
            TokenKind::Sql => "SQL",
            TokenKind::Line => "LINE",
            TokenKind::Bar => "BAR",
            TokenKind::Scatter => "SCATTER",
            TokenKind::Histogram => "HISTOGRAM",
            TokenKind::Pie => "PIE",
            TokenKind::Concat => "CONCAT",
            TokenKind::X => "X",
            TokenKind::Y => "Y",
            TokenKind::Axis => "AXIS",
            TokenKind::By => "BY",
            TokenKind::Count => "COUNT",
            TokenKind::Min => "MIN",
            TokenKind::Max => "MAX",
            TokenKind::Avg => "AVG",
            TokenKind::Year => "YEAR",
            TokenKind::Month => "MONTH",
            TokenKind::Day => "DAY",
            TokenKind::Hour => "HOUR",
            TokenKind::Minute => "MINUTE",
            TokenKind::Second => "SECOND",
            TokenKind::Step => "STEP",
            TokenKind::Bins => "BINS",
            TokenKind::Hole => "HOLE",
            TokenKind::Label => "LABEL",
            TokenKind::Title => "TITLE",
            TokenKind::Filter => "FILTER",
            TokenKind::Split => "SPLIT",
            TokenKind::Color => "COLOR",
            TokenKind::Transform => "TRANSFORM",
            TokenKind::Sort => "SORT",
            TokenKind::Asc => "ASC",
            TokenKind::Desc => "DESC",
            TokenKind::Ident => "identifier",
            TokenKind::StringLit => "string",
            TokenKind::Int => "integer",
            TokenKind::Float => "number",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// The token's text. For string literals this still includes the
    /// surrounding quotes; the AST builder strips them.
    pub text: String,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub column: usize,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("DATASETS", TokenKind::Datasets),
    ("SQL", TokenKind::Sql),
    ("LINE", TokenKind::Line),
    ("BAR", TokenKind::Bar),
    ("SCATTER", TokenKind::Scatter),
    ("HISTOGRAM", TokenKind::Histogram),
    ("PIE", TokenKind::Pie),
    ("CONCAT", TokenKind::Concat),
    ("X", TokenKind::X),
    ("Y", TokenKind::Y),
    ("AXIS", TokenKind::Axis),
    ("BY", TokenKind::By),
    ("COUNT", TokenKind::Count),
    ("MIN", TokenKind::Min),
    ("MAX", TokenKind::Max),
    ("AVG", TokenKind::Avg),
    ("YEAR", TokenKind::Year),
    ("MONTH", TokenKind::Month),
    ("DAY", TokenKind::Day),
    ("HOUR", TokenKind::Hour),
    ("MINUTE", TokenKind::Minute),
    ("SECOND", TokenKind::Second),
    ("STEP", TokenKind::Step),
    ("BINS", TokenKind::Bins),
    ("HOLE", TokenKind::Hole),
    ("LABEL", TokenKind::Label),
    ("TITLE", TokenKind::Title),
    ("FILTER", TokenKind::Filter),
    ("SPLIT", TokenKind::Split),
    ("COLOR", TokenKind::Color),
    ("TRANSFORM", TokenKind::Transform),
    ("SORT", TokenKind::Sort),
    ("ASC", TokenKind::Asc),
    ("DESC", TokenKind::Desc),
];

fn keyword_kind(word: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(kw, _)| kw.eq_ignore_ascii_case(word))
        .map(|(_, kind)| *kind)
}

/// Tokenize SVL source. The returned stream always ends with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut pos = 0;
    let mut line = 1;
    let mut column = 1;

    let advance = |pos: &mut usize, line: &mut usize, column: &mut usize| {
        if chars[*pos] == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
        *pos += 1;
    };

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            advance(&mut pos, &mut line, &mut column);
            continue;
        }

        // Line comments run to the end of the line.
        if c == '-' && chars.get(pos + 1) == Some(&'-') {
            while pos < chars.len() && chars[pos] != '\n' {
                advance(&mut pos, &mut line, &mut column);
            }
            continue;
        }

        let start_line = line;
        let start_column = column;

        if c == '(' {
            tokens.push(Token {
                kind: TokenKind::LParen,
                text: "(".to_string(),
                line: start_line,
                column: start_column,
            });
            advance(&mut pos, &mut line, &mut column);
            continue;
        }

        if c == ')' {
            tokens.push(Token {
                kind: TokenKind::RParen,
                text: ")".to_string(),
                line: start_line,
                column: start_column,
            });
            advance(&mut pos, &mut line, &mut column);
            continue;
        }

        if c == '"' {
            // Strings may span lines; the payload is kept verbatim.
            let mut text = String::from('"');
            advance(&mut pos, &mut line, &mut column);
            let mut closed = false;
            while pos < chars.len() {
                let sc = chars[pos];
                text.push(sc);
                advance(&mut pos, &mut line, &mut column);
                if sc == '"' {
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err(unexpected_char_error(
                    source,
                    start_line,
                    start_column,
                ));
            }
            tokens.push(Token {
                kind: TokenKind::StringLit,
                text,
                line: start_line,
                column: start_column,
            });
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && matches!(chars.get(pos + 1), Some(d) if d.is_ascii_digit())) {
            let mut text = String::new();
            let mut is_float = false;
            while pos < chars.len()
                && (chars[pos].is_ascii_digit() || (chars[pos] == '.' && !is_float))
            {
                if chars[pos] == '.' {
                    is_float = true;
                }
                text.push(chars[pos]);
                advance(&mut pos, &mut line, &mut column);
            }
            tokens.push(Token {
                kind: if is_float { TokenKind::Float } else { TokenKind::Int },
                text,
                line: start_line,
                column: start_column,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut text = String::new();
            while pos < chars.len()
                && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_')
            {
                text.push(chars[pos]);
                advance(&mut pos, &mut line, &mut column);
            }
            let kind = keyword_kind(&text).unwrap_or(TokenKind::Ident);
            tokens.push(Token {
                kind,
                text,
                line: start_line,
                column: start_column,
            });
            continue;
        }

        return Err(unexpected_char_error(source, start_line, start_column));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        line,
        column,
    });

    Ok(tokens)
}

/// The failing source line with a caret marking the column.
pub fn source_context(source: &str, line: usize, column: usize) -> String {
    let text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let caret_offset = column.saturating_sub(1).min(text.chars().count());
    format!("{}\n{}^", text, " ".repeat(caret_offset))
}

fn unexpected_char_error(source: &str, line: usize, column: usize) -> SyntaxError {
    SyntaxError {
        kind: SyntaxErrorKind::Generic,
        context: source_context(source, line, column),
        line,
        column,
    }
}
