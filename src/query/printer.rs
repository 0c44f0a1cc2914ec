//! Render parse trees back into query text that parses to the same tree.

use crate::query::node::{Node, OperatorKind, Parameter, Pattern};
use crate::query::parser::scan_balanced_pattern_literal;

/// Escape a pattern for use between `delimiter`s. Pattern literals are
/// scanned leniently, so backslashes are only doubled where the parser
/// would otherwise consume them as an escape.
fn escape_delimited(value: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let consumed = match chars.peek() {
                    None => true,
                    Some(&next) => matches!(next, '\\' | 'n' | 'r' | 't') || next == delimiter,
                };
                out.push('\\');
                if consumed {
                    out.push('\\');
                }
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Quote a field value. Field values are scanned strictly, so every
/// backslash is doubled.
fn quote_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Values with parentheses stay bare as long as they scan back unchanged,
/// as in `file:^src/(a|b)\.go$`. A trailing backslash would escape the
/// separator that follows.
fn needs_quotes(value: &str) -> bool {
    if value.is_empty()
        || value.ends_with('\\')
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\''))
    {
        return true;
    }
    if !value.contains(['(', ')']) {
        return false;
    }
    scan_balanced_pattern_literal(value) != Some((value.to_string(), value.len()))
}

pub fn parameter_string(p: &Parameter) -> String {
    let value = if needs_quotes(&p.value) {
        quote_value(&p.value)
    } else {
        p.value.clone()
    };
    if p.negated {
        format!("-{}:{}", p.field, value)
    } else {
        format!("{}:{}", p.field, value)
    }
}

pub fn pattern_string(p: &Pattern) -> String {
    let value = if p.is_quoted() {
        format!("\"{}\"", escape_delimited(&p.value, '"'))
    } else if p.is_regexp() {
        format!("/{}/", escape_delimited(&p.value, '/'))
    } else {
        p.value.clone()
    };
    if p.negated {
        format!("NOT {}", value)
    } else {
        value
    }
}

fn node_string(node: &Node, nested_in_and: bool) -> String {
    match node {
        Node::Pattern(p) => pattern_string(p),
        Node::Parameter(p) => parameter_string(p),
        Node::Operator(op) => match op.kind {
            OperatorKind::Concat => op
                .operands
                .iter()
                .map(|n| node_string(n, false))
                .collect::<Vec<_>>()
                .join(" "),
            OperatorKind::Or => {
                let joined = op
                    .operands
                    .iter()
                    .map(|n| node_string(n, false))
                    .collect::<Vec<_>>()
                    .join(" OR ");
                if nested_in_and {
                    format!("({})", joined)
                } else {
                    joined
                }
            }
            OperatorKind::And => and_string(&op.operands),
        },
    }
}

/// Parameters lead, separated by spaces; the remaining operands are joined
/// with `AND`.
fn and_string(operands: &[Node]) -> String {
    let (parameters, rest): (Vec<&Node>, Vec<&Node>) = operands
        .iter()
        .partition(|n| matches!(n, Node::Parameter(_)));

    let mut parts: Vec<String> = parameters.iter().map(|n| node_string(n, true)).collect();
    let patterns = rest
        .iter()
        .map(|n| node_string(n, true))
        .collect::<Vec<_>>()
        .join(" AND ");
    if !patterns.is_empty() {
        parts.push(patterns);
    }
    parts.join(" ")
}

/// Render top-level nodes, which are implicitly and-ed.
pub fn string_human(nodes: &[Node]) -> String {
    and_string(nodes)
}
