//! Recursive-descent parser producing the concrete SVL tree.
//!
//! The parser only decides structure; folding into the visualization IR
//! happens in [`crate::build`]. Parse failures carry the offending token and
//! the expected-token set so the error classifier can match them against its
//! example bank.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::lex::{tokenize, Token, TokenKind};

/// Grammar rule names annotating the concrete tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Rule {
    Visualization,
    Datasets,
    FileDataset,
    SqlDataset,
    Charts,
    Hcat,
    Vcat,
    XyChart,
    HistogramChart,
    PieChart,
    Markxy,
    Data,
    Title,
    Filter,
    X,
    Y,
    Axis,
    SplitBy,
    ColorBy,
    Field,
    Temporal,
    Transform,
    Aggregation,
    Sort,
    Label,
    ColorScale,
    Bins,
    Step,
    Hole,
}

impl Rule {
    /// The rule's name as printed in the debug parse tree.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Visualization => "visualization",
            Rule::Datasets => "datasets",
            Rule::FileDataset => "file_dataset",
            Rule::SqlDataset => "sql_dataset",
            Rule::Charts => "charts",
            Rule::Hcat => "hcat",
            Rule::Vcat => "vcat",
            Rule::XyChart => "xy_chart",
            Rule::HistogramChart => "histogram_chart",
            Rule::PieChart => "pie_chart",
            Rule::Markxy => "markxy",
            Rule::Data => "data",
            Rule::Title => "title",
            Rule::Filter => "filter",
            Rule::X => "x",
            Rule::Y => "y",
            Rule::Axis => "axis",
            Rule::SplitBy => "split_by",
            Rule::ColorBy => "color_by",
            Rule::Field => "field",
            Rule::Temporal => "temporal",
            Rule::Transform => "transform",
            Rule::Aggregation => "aggregation",
            Rule::Sort => "sort",
            Rule::Label => "label",
            Rule::ColorScale => "color_scale",
            Rule::Bins => "bins",
            Rule::Step => "step",
            Rule::Hole => "hole",
        }
    }
}

/// A node of the concrete tree: a rule with children, or a bare token.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    /// An interior node annotated with its grammar rule.
    Node(Rule, Vec<ParseTree>),
    /// A token kept for the fold (identifiers, strings, numbers, marks).
    Leaf(Token),
}

impl ParseTree {
    /// Pretty-print the tree, one node per line, children indented.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, 0);
        out
    }

    fn pretty_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            ParseTree::Node(rule, children) => {
                let _ = writeln!(out, "{}{}", indent, rule.name());
                for child in children {
                    child.pretty_into(out, depth + 1);
                }
            }
            ParseTree::Leaf(token) => {
                let _ = writeln!(out, "{}{}", indent, token.text);
            }
        }
    }
}

/// A parse failure: the token the parser stopped on and what it would have
/// accepted there. Two failures with equal signatures stopped in the same
/// parser state, which is what the error classifier compares.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    /// The offending token.
    pub found: Token,
    /// Token kinds the parser would have accepted instead.
    pub expected: BTreeSet<TokenKind>,
}

impl ParseFailure {
    /// Whether `other` failed in the same parser state on the same kind of
    /// token.
    pub fn same_signature(&self, other: &ParseFailure) -> bool {
        self.found.kind == other.found.kind && self.expected == other.expected
    }
}

const CHART_STARTS: &[TokenKind] = &[
    TokenKind::Line,
    TokenKind::Bar,
    TokenKind::Scatter,
    TokenKind::Histogram,
    TokenKind::Pie,
    TokenKind::Concat,
    TokenKind::LParen,
];

const AXIS_STARTS: &[TokenKind] = &[TokenKind::Ident, TokenKind::Transform];

const TEMPORAL_UNITS: &[TokenKind] = &[
    TokenKind::Year,
    TokenKind::Month,
    TokenKind::Day,
    TokenKind::Hour,
    TokenKind::Minute,
    TokenKind::Second,
];

/// Parse SVL source into its concrete tree.
pub fn parse(source: &str) -> Result<ParseTree, ParseFailure> {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(err) => {
            // Surface lexer failures through the same signature type so the
            // classifier treats them uniformly. Nothing is expected at an
            // unlexable character.
            return Err(ParseFailure {
                found: Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    line: err.line,
                    column: err.column,
                },
                expected: BTreeSet::new(),
            });
        }
    };
    Parser { tokens, pos: 0 }.visualization()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn fail(&self, expected: &[TokenKind]) -> ParseFailure {
        ParseFailure {
            found: self.peek().clone(),
            expected: expected.iter().copied().collect(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseFailure> {
        if self.peek().kind == kind {
            Ok(self.bump())
        } else {
            Err(self.fail(&[kind]))
        }
    }

    fn expect_one(&mut self, kinds: &[TokenKind]) -> Result<Token, ParseFailure> {
        if kinds.contains(&self.peek().kind) {
            Ok(self.bump())
        } else {
            Err(self.fail(kinds))
        }
    }

    fn visualization(&mut self) -> Result<ParseTree, ParseFailure> {
        let mut children = Vec::new();
        if self.peek().kind == TokenKind::Datasets {
            children.push(self.datasets()?);
        }
        children.push(self.charts()?);
        if self.peek().kind != TokenKind::Eof {
            let mut expected: Vec<TokenKind> = CHART_STARTS.to_vec();
            expected.push(TokenKind::Eof);
            return Err(self.fail(&expected));
        }
        Ok(ParseTree::Node(Rule::Visualization, children))
    }

    fn datasets(&mut self) -> Result<ParseTree, ParseFailure> {
        self.expect(TokenKind::Datasets)?;
        let mut children = Vec::new();
        loop {
            let name = self.expect(TokenKind::Ident)?;
            match self.peek().kind {
                TokenKind::StringLit => {
                    let path = self.bump();
                    children.push(ParseTree::Node(
                        Rule::FileDataset,
                        vec![ParseTree::Leaf(name), ParseTree::Leaf(path)],
                    ));
                }
                TokenKind::Sql => {
                    self.bump();
                    let sql = self.expect(TokenKind::StringLit)?;
                    children.push(ParseTree::Node(
                        Rule::SqlDataset,
                        vec![ParseTree::Leaf(name), ParseTree::Leaf(sql)],
                    ));
                }
                _ => return Err(self.fail(&[TokenKind::StringLit, TokenKind::Sql])),
            }
            if self.peek().kind != TokenKind::Ident {
                break;
            }
        }
        Ok(ParseTree::Node(Rule::Datasets, children))
    }

    fn charts(&mut self) -> Result<ParseTree, ParseFailure> {
        let children = self.chart_sequence()?;
        Ok(ParseTree::Node(Rule::Charts, children))
    }

    /// One or more charts or concatenations, as found inside parens or at the
    /// top level.
    fn chart_sequence(&mut self) -> Result<Vec<ParseTree>, ParseFailure> {
        let mut children = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Line | TokenKind::Bar | TokenKind::Scatter => {
                    children.push(self.xy_chart()?);
                }
                TokenKind::Histogram => children.push(self.histogram_chart()?),
                TokenKind::Pie => children.push(self.pie_chart()?),
                TokenKind::Concat => children.push(self.hcat()?),
                TokenKind::LParen => children.push(self.vcat()?),
                _ => break,
            }
        }
        if children.is_empty() {
            return Err(self.fail(CHART_STARTS));
        }
        Ok(children)
    }

    fn hcat(&mut self) -> Result<ParseTree, ParseFailure> {
        self.expect(TokenKind::Concat)?;
        self.expect(TokenKind::LParen)?;
        let children = self.cat_body()?;
        Ok(ParseTree::Node(Rule::Hcat, children))
    }

    fn vcat(&mut self) -> Result<ParseTree, ParseFailure> {
        self.expect(TokenKind::LParen)?;
        let children = self.cat_body()?;
        Ok(ParseTree::Node(Rule::Vcat, children))
    }

    fn cat_body(&mut self) -> Result<Vec<ParseTree>, ParseFailure> {
        let children = self.chart_sequence()?;
        if self.peek().kind != TokenKind::RParen {
            let mut expected: Vec<TokenKind> = CHART_STARTS.to_vec();
            expected.push(TokenKind::RParen);
            return Err(self.fail(&expected));
        }
        self.bump();
        Ok(children)
    }

    fn xy_chart(&mut self) -> Result<ParseTree, ParseFailure> {
        let mark = self.bump();
        let mut children = vec![
            ParseTree::Node(Rule::Markxy, vec![ParseTree::Leaf(mark)]),
            self.data()?,
        ];
        loop {
            match self.peek().kind {
                TokenKind::X => {
                    self.bump();
                    children.push(ParseTree::Node(Rule::X, self.axis_options(false)?));
                }
                TokenKind::Y => {
                    self.bump();
                    children.push(ParseTree::Node(Rule::Y, self.axis_options(false)?));
                }
                TokenKind::Split => {
                    children.push(self.split_by()?);
                }
                TokenKind::Color => {
                    children.push(self.color_by()?);
                }
                TokenKind::Title => children.push(self.title()?),
                TokenKind::Filter => children.push(self.filter()?),
                _ => break,
            }
        }
        Ok(ParseTree::Node(Rule::XyChart, children))
    }

    fn histogram_chart(&mut self) -> Result<ParseTree, ParseFailure> {
        self.bump();
        let mut children = vec![self.data()?];
        loop {
            match self.peek().kind {
                TokenKind::X => {
                    self.bump();
                    children.push(ParseTree::Node(Rule::X, self.axis_options(false)?));
                }
                TokenKind::Y => {
                    self.bump();
                    children.push(ParseTree::Node(Rule::Y, self.axis_options(false)?));
                }
                TokenKind::Split => children.push(self.split_by()?),
                TokenKind::Bins => {
                    self.bump();
                    let value = self.expect(TokenKind::Int)?;
                    children.push(ParseTree::Node(Rule::Bins, vec![ParseTree::Leaf(value)]));
                }
                TokenKind::Step => {
                    self.bump();
                    let value =
                        self.expect_one(&[TokenKind::Int, TokenKind::Float])?;
                    children.push(ParseTree::Node(Rule::Step, vec![ParseTree::Leaf(value)]));
                }
                TokenKind::Title => children.push(self.title()?),
                TokenKind::Filter => children.push(self.filter()?),
                _ => break,
            }
        }
        Ok(ParseTree::Node(Rule::HistogramChart, children))
    }

    fn pie_chart(&mut self) -> Result<ParseTree, ParseFailure> {
        self.bump();
        let mut children = vec![self.data()?];
        loop {
            match self.peek().kind {
                TokenKind::Axis => {
                    self.bump();
                    children.push(ParseTree::Node(Rule::Axis, self.axis_options(false)?));
                }
                TokenKind::Hole => {
                    self.bump();
                    let value =
                        self.expect_one(&[TokenKind::Int, TokenKind::Float])?;
                    children.push(ParseTree::Node(Rule::Hole, vec![ParseTree::Leaf(value)]));
                }
                TokenKind::Title => children.push(self.title()?),
                TokenKind::Filter => children.push(self.filter()?),
                _ => break,
            }
        }
        Ok(ParseTree::Node(Rule::PieChart, children))
    }

    fn data(&mut self) -> Result<ParseTree, ParseFailure> {
        let name = self.expect(TokenKind::Ident)?;
        Ok(ParseTree::Node(Rule::Data, vec![ParseTree::Leaf(name)]))
    }

    fn title(&mut self) -> Result<ParseTree, ParseFailure> {
        self.bump();
        let value = self.expect(TokenKind::StringLit)?;
        Ok(ParseTree::Node(Rule::Title, vec![ParseTree::Leaf(value)]))
    }

    fn filter(&mut self) -> Result<ParseTree, ParseFailure> {
        self.bump();
        let value = self.expect(TokenKind::StringLit)?;
        Ok(ParseTree::Node(Rule::Filter, vec![ParseTree::Leaf(value)]))
    }

    fn split_by(&mut self) -> Result<ParseTree, ParseFailure> {
        self.bump();
        self.expect(TokenKind::By)?;
        Ok(ParseTree::Node(Rule::SplitBy, self.axis_options(false)?))
    }

    fn color_by(&mut self) -> Result<ParseTree, ParseFailure> {
        self.bump();
        self.expect(TokenKind::By)?;
        Ok(ParseTree::Node(Rule::ColorBy, self.axis_options(true)?))
    }

    /// The option list of an axis: a field or transform, then modifiers.
    /// Color axes additionally accept a bare string naming the color scale.
    fn axis_options(&mut self, color_scale: bool) -> Result<Vec<ParseTree>, ParseFailure> {
        let mut children = Vec::new();
        match self.peek().kind {
            TokenKind::Ident => {
                let field = self.bump();
                children.push(ParseTree::Node(Rule::Field, vec![ParseTree::Leaf(field)]));
            }
            TokenKind::Transform => {
                self.bump();
                let expr = self.expect(TokenKind::StringLit)?;
                children.push(ParseTree::Node(
                    Rule::Transform,
                    vec![ParseTree::Leaf(expr)],
                ));
            }
            _ => return Err(self.fail(AXIS_STARTS)),
        }
        loop {
            match self.peek().kind {
                TokenKind::By => {
                    self.bump();
                    let unit = self.expect_one(TEMPORAL_UNITS)?;
                    children.push(ParseTree::Node(
                        Rule::Temporal,
                        vec![ParseTree::Leaf(unit)],
                    ));
                }
                TokenKind::Count | TokenKind::Min | TokenKind::Max | TokenKind::Avg => {
                    let agg = self.bump();
                    children.push(ParseTree::Node(
                        Rule::Aggregation,
                        vec![ParseTree::Leaf(agg)],
                    ));
                }
                TokenKind::Sort => {
                    self.bump();
                    let direction =
                        self.expect_one(&[TokenKind::Asc, TokenKind::Desc])?;
                    children.push(ParseTree::Node(
                        Rule::Sort,
                        vec![ParseTree::Leaf(direction)],
                    ));
                }
                TokenKind::Label => {
                    self.bump();
                    let value = self.expect(TokenKind::StringLit)?;
                    children.push(ParseTree::Node(
                        Rule::Label,
                        vec![ParseTree::Leaf(value)],
                    ));
                }
                TokenKind::StringLit if color_scale => {
                    let value = self.bump();
                    children.push(ParseTree::Node(
                        Rule::ColorScale,
                        vec![ParseTree::Leaf(value)],
                    ));
                }
                _ => break,
            }
        }
        Ok(children)
    }
}
