//! pest front-end for the `.tm` grammar and the enter/exit tree walk the
//! semantic phases are driven by.

use std::path::PathBuf;
use std::sync::Arc;

use pest::Parser;
use pest_derive::Parser;

use crate::error::FatalError;
use crate::stmt_info::StmtInfo;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct TmParser;

/// A parse-tree node; its kind is the grammar [`Rule`].
pub type Node<'i> = pest::iterators::Pair<'i, Rule>;

/// A syntax error reported by the grammar front-end.
#[derive(Debug)]
pub struct ParseFailure {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Parses a whole source file and returns the `document` node.
pub fn parse_document(source: &str) -> Result<Node<'_>, ParseFailure> {
    let mut pairs = TmParser::parse(Rule::document, source).map_err(|err| {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos((line, column)) => (line, column),
            pest::error::LineColLocation::Span((line, column), _) => (line, column),
        };
        ParseFailure {
            message: err.variant.message().to_string(),
            line,
            column,
        }
    })?;
    Ok(pairs
        .next()
        .expect("grammar: a successful parse yields a document node"))
}

/// Receives the walk events. Fatal errors propagate out of the walk; the
/// collected diagnostics stay inside the listener.
pub trait TreeListener<'i> {
    fn enter(&mut self, node: &Node<'i>) -> Result<(), FatalError>;
    fn exit(&mut self, node: &Node<'i>) -> Result<(), FatalError>;
}

/// Depth-first walk delivering enter/exit events in document order.
pub fn walk<'i, L: TreeListener<'i>>(listener: &mut L, node: Node<'i>) -> Result<(), FatalError> {
    listener.enter(&node)?;
    for child in node.clone().into_inner() {
        walk(listener, child)?;
    }
    listener.exit(&node)
}

pub fn stmt_info(node: &Node, source: &Arc<PathBuf>) -> StmtInfo {
    let span = node.as_span();
    let (start_line, start_column) = span.start_pos().line_col();
    let (end_line, end_column) = span.end_pos().line_col();
    StmtInfo::new(
        (start_line, end_line),
        (start_column, end_column),
        Arc::clone(source),
    )
}

/// First direct child with the given rule, if any.
pub fn child<'i>(node: &Node<'i>, rule: Rule) -> Option<Node<'i>> {
    node.clone()
        .into_inner()
        .find(|child| child.as_rule() == rule)
}

/// All direct children with the given rule.
pub fn children<'i>(node: &Node<'i>, rule: Rule) -> impl Iterator<Item = Node<'i>> {
    node.clone()
        .into_inner()
        .filter(move |child| child.as_rule() == rule)
}

/// The unescaped text of a `string_literal` node.
pub fn string_value(node: &Node) -> String {
    let inner = child(node, Rule::string_inner)
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default();
    unescape(&inner)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
