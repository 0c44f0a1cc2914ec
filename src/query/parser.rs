//! Query parser.
//!
//! Grammar:
//!
//! ```text
//! OrTerm     → AndTerm { OR AndTerm }
//! AndTerm    → Term { AND Term }
//! Term       → (OrTerm) | Leaves
//! Leaves     → { Parameter | Pattern | NOT Parameter | NOT Pattern }
//! ```
//!
//! Keywords are case-insensitive and must be separated by whitespace.
//! Parameters and patterns that appear next to each other at one level are
//! partitioned into an `and` node, where adjacent patterns are grouped in an
//! ordered `concat` node.

use crate::query::fields::{is_known_field, resolve_alias, FIELD_TYPE, TYPE_VALUES};
use crate::query::node::{Labels, Node, Operator, OperatorKind, Parameter, Pattern};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// How undelimited patterns are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Patterns are literal; `/.../` delimits a regular expression.
    #[default]
    Standard,
    /// Patterns are regular expressions.
    Regexp,
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchType::Standard => write!(f, "standard"),
            SearchType::Regexp => write!(f, "regexp"),
        }
    }
}

/// Errors produced while parsing or validating a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected operand at {pos}")]
    ExpectedOperand { pos: usize },

    #[error("unbalanced expression")]
    UnbalancedExpression,

    #[error("unterminated literal: expected {delimiter}")]
    UnterminatedLiteral { delimiter: char },

    #[error("unterminated escape sequence")]
    UnterminatedEscape,

    #[error("unrecognized escape sequence")]
    UnrecognizedEscape,

    #[error("unexpected NOT before \"-{field}:{value}\". Remove NOT and try again")]
    NotBeforeNegatedParameter { field: String, value: String },

    #[error("invalid regular expression {pattern:?}: {reason}")]
    InvalidRegexp { pattern: String, reason: String },

    #[error("invalid value {value:?} for field type:, expected one of {expected}")]
    InvalidTypeValue { value: String, expected: String },

    #[error("concat operator may only contain patterns")]
    InvalidConcat,

    #[error("not a basic query: {reason}")]
    NotBasic { reason: String },
}

#[derive(Debug, Clone, Copy, Default)]
struct Heuristics {
    /// Balanced parentheses may be scanned as literal patterns.
    parens_as_patterns: bool,
    /// All parentheses are pattern characters; grouping is disabled.
    allow_dangling_parens: bool,
    /// At least one expression was disambiguated by explicit parentheses.
    disambiguated: bool,
}

struct Parser<'a> {
    buf: &'a str,
    pos: usize,
    balanced: i32,
    heuristics: Heuristics,
    search_type: SearchType,
}

impl<'a> Parser<'a> {
    fn new(buf: &'a str, search_type: SearchType, heuristics: Heuristics) -> Self {
        Self {
            buf,
            pos: 0,
            balanced: 0,
            heuristics,
            search_type,
        }
    }

    fn rest(&self) -> &'a str {
        &self.buf[self.pos..]
    }

    fn done(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn base_labels(&self) -> Labels {
        match self.search_type {
            SearchType::Standard => Labels::LITERAL,
            SearchType::Regexp => Labels::REGEXP,
        }
    }

    /// Whether the input at the current position starts with `keyword`,
    /// ignoring case. Does not advance.
    fn matches(&self, keyword: &str) -> bool {
        self.rest()
            .get(..keyword.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(keyword))
    }

    fn expect(&mut self, keyword: &str) -> bool {
        if !self.matches(keyword) {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    fn preceded_by_space(&self) -> bool {
        self.buf[..self.pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace)
    }

    fn followed_by_space(&self, len: usize) -> bool {
        self.buf
            .get(self.pos + len..)
            .and_then(|s| s.chars().next())
            .is_some_and(char::is_whitespace)
    }

    /// Binary keyword: whitespace on both sides.
    fn match_keyword(&self, keyword: &str) -> bool {
        self.pos > 0
            && self.preceded_by_space()
            && self.followed_by_space(keyword.len())
            && self.matches(keyword)
    }

    /// Unary keyword: start of input or whitespace before, whitespace after.
    fn match_unary_keyword(&self, keyword: &str) -> bool {
        (self.pos == 0 || self.preceded_by_space())
            && self.followed_by_space(keyword.len())
            && self.matches(keyword)
    }

    fn skip_spaces(&mut self) {
        let skipped: usize = self
            .rest()
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        self.pos += skipped;
    }

    /// Try to parse a `'...'`, `"..."` or `/.../` delimited value, which
    /// must be followed by whitespace, the end of input, or a closing
    /// parenthesis inside a group.
    fn try_parse_delimiter(&mut self) -> Option<(String, char)> {
        for delimiter in ['\'', '"', '/'] {
            if !self.rest().starts_with(delimiter) {
                continue;
            }
            let Ok((value, advance)) = scan_delimited(self.rest(), false, delimiter) else {
                continue;
            };
            let next = self.rest()[advance..].chars().next();
            let terminated = match next {
                None => true,
                Some(c) if c.is_whitespace() => true,
                Some(')') => self.balanced > 0,
                Some(_) => false,
            };
            if terminated {
                self.pos += advance;
                return Some((value, delimiter));
            }
        }
        None
    }

    fn parse_field_value(&mut self) -> Result<String, ParseError> {
        for delimiter in ['\'', '"'] {
            if self.rest().starts_with(delimiter) {
                let (value, advance) = scan_delimited(self.rest(), true, delimiter)?;
                self.pos += advance;
                return Ok(value);
            }
        }
        // A trailing `)` may close a group, as in `(a b repo:foo)`.
        let (value, advance) = match scan_balanced_pattern_literal(self.rest()) {
            Some(scanned) => scanned,
            None => {
                let (value, advance, _) = scan_value(self.rest(), false);
                (value, advance)
            }
        };
        self.pos += advance;
        Ok(value)
    }

    fn parse_parameter(&mut self) -> Result<Option<Parameter>, ParseError> {
        let Some((field, negated, advance)) = scan_field(self.rest()) else {
            return Ok(None);
        };
        self.pos += advance;
        let value = self.parse_field_value()?;
        let field = resolve_alias(&field.to_ascii_lowercase()).to_string();
        Ok(Some(Parameter {
            field,
            value,
            negated,
        }))
    }

    fn parse_pattern(&mut self) -> Pattern {
        let base = self.base_labels();
        if let Some((value, delimiter)) = self.try_parse_delimiter() {
            let labels = if delimiter == '/' {
                Labels::REGEXP
            } else {
                Labels::LITERAL | Labels::QUOTED
            };
            return Pattern::new(value, labels);
        }

        if self.heuristics.parens_as_patterns {
            if let Some((value, advance)) = scan_balanced_pattern_literal(self.rest()) {
                // Outside a group a trailing `)` can't close anything.
                let closes_nothing =
                    self.balanced <= 0 && self.rest()[advance..].starts_with(')');
                if !value.is_empty() && !closes_nothing {
                    self.pos += advance;
                    return Pattern::new(value, base);
                }
            }
        }

        let allow_dangling = self.heuristics.allow_dangling_parens;
        let (value, advance, dangling) = match self.search_type {
            SearchType::Standard if !allow_dangling => {
                let (value, advance) = scan_any_pattern_literal(self.rest());
                (value, advance, false)
            }
            _ => scan_value(self.rest(), allow_dangling),
        };
        self.pos += advance;
        let labels = if dangling {
            base | Labels::HEURISTIC_DANGLING_PARENS
        } else {
            base
        };
        Pattern::new(value, labels)
    }

    fn parse_leaves(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_spaces();
            if self.done() {
                break;
            }

            let grouping = !self.heuristics.allow_dangling_parens;

            if grouping && self.matches("(") {
                if self.heuristics.parens_as_patterns {
                    if let Some((value, advance)) = scan_balanced_pattern_literal(self.rest()) {
                        self.pos += advance;
                        let labels = self.base_labels() | Labels::HEURISTIC_PARENS_AS_PATTERNS;
                        nodes.push(Pattern::new(value, labels).into());
                        continue;
                    }
                }
                self.pos += 1;
                self.balanced += 1;
                self.heuristics.disambiguated = true;
                nodes.extend(self.parse_or()?);
                continue;
            }

            if grouping && self.matches(")") {
                if self.balanced <= 0 {
                    // Dangling right paren: it can't close a group, so it's
                    // part of a pattern.
                    let (value, advance) = scan_any_pattern_literal(self.rest());
                    self.pos += advance;
                    let labels = self.base_labels() | Labels::HEURISTIC_DANGLING_PARENS;
                    nodes.push(Pattern::new(value, labels).into());
                    continue;
                }
                self.pos += 1;
                self.balanced -= 1;
                self.heuristics.disambiguated = true;
                if nodes.is_empty() {
                    nodes.push(
                        Pattern::new("()", Labels::LITERAL | Labels::HEURISTIC_PARENS_AS_PATTERNS)
                            .into(),
                    );
                }
                break;
            }

            if self.match_keyword("and") || self.match_keyword("or") {
                // Caller advances.
                break;
            }

            if self.match_unary_keyword("not") {
                self.expect("not");
                self.skip_spaces();
                if let Some(parameter) = self.parse_parameter()? {
                    if parameter.negated {
                        return Err(ParseError::NotBeforeNegatedParameter {
                            field: parameter.field,
                            value: parameter.value,
                        });
                    }
                    nodes.push(parameter.negated(true).into());
                    continue;
                }
                let mut pattern = self.parse_pattern();
                pattern.negated = true;
                nodes.push(pattern.into());
                continue;
            }

            match self.parse_parameter()? {
                Some(parameter) => nodes.push(parameter.into()),
                None => nodes.push(self.parse_pattern().into()),
            }
        }
        Ok(partition_parameters(nodes))
    }

    fn parse_and(&mut self) -> Result<Vec<Node>, ParseError> {
        let left = self.parse_leaves()?;
        if left.is_empty() {
            return Err(ParseError::ExpectedOperand { pos: self.pos });
        }
        if !self.expect("and") {
            return Ok(left);
        }
        let mut nodes = left;
        nodes.extend(self.parse_and()?);
        Ok(new_operator(nodes, OperatorKind::And))
    }

    /// Or binds weaker than and, so this calls `parse_and`.
    fn parse_or(&mut self) -> Result<Vec<Node>, ParseError> {
        let left = self.parse_and()?;
        if left.is_empty() {
            return Err(ParseError::ExpectedOperand { pos: self.pos });
        }
        if !self.expect("or") {
            return Ok(left);
        }
        let mut nodes = left;
        nodes.extend(self.parse_or()?);
        Ok(new_operator(nodes, OperatorKind::Or))
    }
}

/// Scan a value delimited by `delimiter` at the start of `buf`, returning the
/// unescaped value and the number of bytes consumed including delimiters.
/// With `strict`, only recognized escape sequences are accepted.
pub fn scan_delimited(
    buf: &str,
    strict: bool,
    delimiter: char,
) -> Result<(String, usize), ParseError> {
    let mut chars = buf.char_indices();
    match chars.next() {
        Some((_, c)) if c == delimiter => {}
        _ => return Err(ParseError::UnterminatedLiteral { delimiter }),
    }

    let mut result = String::new();
    while let Some((i, c)) = chars.next() {
        if c == delimiter {
            return Ok((result, i + c.len_utf8()));
        }
        if c != '\\' {
            result.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            return Err(ParseError::UnterminatedEscape);
        };
        match escaped {
            'a' | 'b' | 'f' | 'v' => {
                result.push('\\');
                result.push(escaped);
            }
            'n' => result.push('\n'),
            'r' => result.push('\r'),
            't' => result.push('\t'),
            e if e == '\\' || e == delimiter => result.push(e),
            other => {
                if strict {
                    return Err(ParseError::UnrecognizedEscape);
                }
                result.push('\\');
                result.push(other);
            }
        }
    }
    Err(ParseError::UnterminatedLiteral { delimiter })
}

/// Consume everything up to whitespace.
fn scan_any_pattern_literal(buf: &str) -> (String, usize) {
    let end = buf.find(char::is_whitespace).unwrap_or(buf.len());
    (buf[..end].to_string(), end)
}

/// Scan an optional `-` and a recognized field name followed by `:`.
/// Returns the field, whether it is negated, and the bytes consumed.
fn scan_field(buf: &str) -> Option<(String, bool, usize)> {
    let mut name = String::new();
    let mut chars = buf.char_indices();
    let (_, first) = chars.next()?;
    if first != '-' && !first.is_ascii_alphabetic() {
        return None;
    }
    name.push(first);

    let mut end = None;
    for (i, c) in chars {
        if c.is_ascii_alphabetic() {
            name.push(c);
            continue;
        }
        if c == ':' && name != "-" {
            end = Some(i + 1);
        }
        break;
    }
    let end = end?;

    let negated = name.starts_with('-');
    let field = name.trim_start_matches('-').to_string();
    if !is_known_field(&field) {
        return None;
    }
    Some((field, negated, end))
}

fn is_field(token: &str) -> bool {
    scan_field(token).is_some()
}

fn contains_and_or_keyword(value: &str) -> bool {
    value
        .split_whitespace()
        .map(|token| token.trim_matches(|c| c == '(' || c == ')'))
        .any(|token| token.eq_ignore_ascii_case("and") || token.eq_ignore_ascii_case("or"))
}

/// Try to scan a pattern that may contain balanced parentheses, such as
/// `foo(bar)` or `(a b)`. Fails if the scanned value is unbalanced, contains
/// `and`/`or` keywords, or contains a token that is a field.
pub fn scan_balanced_pattern_literal(buf: &str) -> Option<(String, usize)> {
    let mut balanced = 0i32;
    let mut result = String::new();
    let mut token = String::new();
    let mut end = 0;
    let mut chars = buf.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            c if c.is_whitespace() && balanced == 0 => break,
            '(' => balanced += 1,
            ')' => {
                balanced -= 1;
                if balanced < 0 {
                    // Unmatched closing paren, possibly closing a group.
                    balanced = 0;
                    break;
                }
            }
            c if c.is_whitespace() => {
                if is_field(&token) {
                    return None;
                }
                token.clear();
            }
            '\\' => {
                result.push(c);
                end = i + 1;
                if let Some((j, escaped)) = chars.next() {
                    result.push(escaped);
                    end = j + escaped.len_utf8();
                }
                continue;
            }
            c => token.push(c),
        }
        result.push(c);
        end = i + c.len_utf8();
    }

    if is_field(&token) || contains_and_or_keyword(&result) || balanced != 0 {
        return None;
    }
    Some((result, end))
}

/// Scan a value up to whitespace. Parentheses end the value unless
/// `allow_dangling_parens` is set. Returns the value, bytes consumed, and
/// whether unbalanced parentheses were consumed.
fn scan_value(buf: &str, allow_dangling_parens: bool) -> (String, usize, bool) {
    let mut balanced = 0i32;
    let mut result = String::new();
    let mut count = 0;
    let mut chars = buf.char_indices();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() {
            break;
        }
        if c == '(' || c == ')' {
            balanced += if c == '(' { 1 } else { -1 };
            if !allow_dangling_parens {
                break;
            }
            result.push(c);
            count = i + 1;
            continue;
        }
        if c == '\\' {
            if let Some((j, escaped)) = chars.next() {
                result.push('\\');
                result.push(escaped);
                count = j + escaped.len_utf8();
                continue;
            }
        }
        result.push(c);
        count = i + c.len_utf8();
    }
    (result, count, balanced != 0)
}

/// Split nodes into unordered parameters and ordered patterns. More than one
/// pattern at the same level is grouped into a `concat` node.
fn partition_parameters(nodes: Vec<Node>) -> Vec<Node> {
    let mut patterns = Vec::new();
    let mut parameters = Vec::new();
    for node in nodes {
        match node {
            Node::Pattern(_) => patterns.push(node),
            Node::Parameter(_) => parameters.push(node),
            Node::Operator(_) if node.contains_pattern() => patterns.push(node),
            Node::Operator(_) => parameters.push(node),
        }
    }
    if patterns.len() > 1 {
        // Concat only holds leaf patterns; groups next to patterns are and-ed.
        let kind = if patterns.iter().all(|n| matches!(n, Node::Pattern(_))) {
            OperatorKind::Concat
        } else {
            OperatorKind::And
        };
        parameters.extend(new_operator(patterns, kind));
    } else {
        parameters.extend(patterns);
    }
    new_operator(parameters, OperatorKind::And)
}

fn is_empty_leaf(node: &Node) -> bool {
    match node {
        Node::Parameter(p) => p.value.is_empty(),
        Node::Pattern(p) => p.value.is_empty(),
        Node::Operator(_) => false,
    }
}

/// Flatten nested operators of the same kind and drop empty leaves:
/// `(and a (and b c))` becomes `(and a b c)`.
fn reduce(mut left: Vec<Node>, mut right: Vec<Node>, kind: OperatorKind) -> (Vec<Node>, bool) {
    if let Some(Node::Parameter(p)) = left.first() {
        if p.value.is_empty() {
            left.remove(0);
            left.extend(right);
            return (left, true);
        }
    }

    if let Some(head) = right.first() {
        if is_empty_leaf(head) {
            right.remove(0);
            left.extend(right);
            return (left, true);
        }
        match head {
            Node::Operator(op) if op.kind == kind => {
                if let Node::Operator(op) = right.remove(0) {
                    left.extend(op.operands);
                }
                left.extend(right);
                return (left, true);
            }
            Node::Operator(_) => {}
            Node::Parameter(_) | Node::Pattern(_) => {
                if matches!(left.first(), Some(Node::Operator(op)) if op.kind == kind) {
                    if let Node::Operator(op) = left.remove(0) {
                        let mut reduced = op.operands;
                        reduced.append(&mut left);
                        reduced.extend(right);
                        return (reduced, true);
                    }
                }
            }
        }
    }

    if right.len() > 1 {
        let rest = right.split_off(1);
        left.extend(right);
        return reduce(left, rest, kind);
    }
    left.extend(right);
    (left, false)
}

/// Build an operator of `kind` over `nodes`, reducing where possible. A
/// single node is returned as-is.
pub fn new_operator(mut nodes: Vec<Node>, kind: OperatorKind) -> Vec<Node> {
    if nodes.len() <= 1 {
        return nodes;
    }
    let rest = nodes.split_off(1);
    let (reduced, changed) = reduce(nodes, rest, kind);
    if changed {
        return new_operator(reduced, kind);
    }
    vec![Node::Operator(Operator {
        kind,
        operands: reduced,
    })]
}

fn parse_with(
    input: &str,
    search_type: SearchType,
    heuristics: Heuristics,
) -> Result<(Vec<Node>, i32), ParseError> {
    let mut parser = Parser::new(input, search_type, heuristics);
    let nodes = parser.parse_or()?;
    if !parser.done() {
        return Err(ParseError::UnbalancedExpression);
    }
    Ok((nodes, parser.balanced))
}

/// Parse `input` into a parse tree. Empty input parses to no nodes.
pub fn parse(input: &str, search_type: SearchType) -> Result<Vec<Node>, ParseError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let primary = Heuristics {
        parens_as_patterns: true,
        ..Heuristics::default()
    };
    // Inputs like "(" or "x or (x" are retried treating parentheses as
    // pattern characters.
    let fallback = Heuristics {
        allow_dangling_parens: true,
        ..Heuristics::default()
    };

    let nodes = match parse_with(input, search_type, primary) {
        Ok((nodes, 0)) => nodes,
        Ok(_) | Err(ParseError::ExpectedOperand { .. }) | Err(ParseError::UnbalancedExpression) => {
            match parse_with(input, search_type, fallback) {
                Ok((nodes, _)) => nodes,
                Err(ParseError::ExpectedOperand { pos }) => {
                    return Err(ParseError::ExpectedOperand { pos })
                }
                Err(_) => return Err(ParseError::UnbalancedExpression),
            }
        }
        Err(err) => return Err(err),
    };

    let nodes = new_operator(nodes, OperatorKind::And);
    let nodes = dangling_regexp_to_literal(nodes);
    validate(&nodes)?;
    Ok(nodes)
}

/// Regexp patterns that picked up unbalanced parentheses and don't compile
/// are searched literally instead.
fn dangling_regexp_to_literal(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Pattern(mut p)
                if p.is_regexp()
                    && p.annotation.labels.is_set(Labels::HEURISTIC_DANGLING_PARENS)
                    && regex::Regex::new(&p.value).is_err() =>
            {
                p.annotation.labels.unset(Labels::REGEXP);
                p.annotation.labels.set(Labels::LITERAL);
                Node::Pattern(p)
            }
            Node::Operator(op) => Node::Operator(Operator {
                kind: op.kind,
                operands: dangling_regexp_to_literal(op.operands),
            }),
            other => other,
        })
        .collect()
}

/// Check the structural and value invariants of a parse tree.
pub fn validate(nodes: &[Node]) -> Result<(), ParseError> {
    for node in nodes {
        match node {
            Node::Pattern(p) => {
                if p.is_regexp() {
                    regex::Regex::new(&p.value).map_err(|e| ParseError::InvalidRegexp {
                        pattern: p.value.clone(),
                        reason: e.to_string(),
                    })?;
                }
            }
            Node::Parameter(p) => {
                if p.field == FIELD_TYPE && !TYPE_VALUES.contains(&p.value.to_lowercase().as_str())
                {
                    return Err(ParseError::InvalidTypeValue {
                        value: p.value.clone(),
                        expected: TYPE_VALUES.join(", "),
                    });
                }
            }
            Node::Operator(op) => {
                if op.kind == OperatorKind::Concat
                    && op.operands.iter().any(|n| !matches!(n, Node::Pattern(_)))
                {
                    return Err(ParseError::InvalidConcat);
                }
                validate(&op.operands)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::node::to_sexp;

    fn sexp(input: &str) -> String {
        to_sexp(&parse(input, SearchType::Standard).expect("parse failed"))
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("   ", SearchType::Standard).unwrap().is_empty());
    }

    #[test]
    fn test_parse_concat_and_parameters() {
        assert_eq!(sexp("repo:foo a b"), r#"(and "repo:foo" (concat "a" "b"))"#);
    }

    #[test]
    fn test_parse_field_alias_and_case() {
        assert_eq!(sexp("R:foo L:go x"), r#"(and "repo:foo" "lang:go" "x")"#);
    }

    #[test]
    fn test_parse_negated_parameter() {
        assert_eq!(sexp("-file:test x"), r#"(and "-file:test" "x")"#);
    }

    #[test]
    fn test_parse_and_or_precedence() {
        assert_eq!(sexp("a or b and c"), r#"(or "a" (and "b" "c"))"#);
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(sexp("(a or b) and c"), r#"(and (or "a" "b") "c")"#);
    }

    #[test]
    fn test_parse_balanced_parens_as_pattern() {
        assert_eq!(sexp("test.get(id)"), r#""test.get(id)""#);
        assert_eq!(sexp("(using|struct)"), r#""(using|struct)""#);
    }

    #[test]
    fn test_parse_quoted_pattern() {
        let nodes = parse(r#""foo \"bar\"""#, SearchType::Standard).unwrap();
        match &nodes[0] {
            Node::Pattern(p) => {
                assert_eq!(p.value, r#"foo "bar""#);
                assert!(p.is_quoted());
            }
            other => panic!("expected pattern, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_slash_delimited_regexp() {
        let nodes = parse("/foo.*bar/", SearchType::Standard).unwrap();
        assert!(matches!(&nodes[0], Node::Pattern(p) if p.is_regexp() && p.value == "foo.*bar"));
    }

    #[test]
    fn test_parse_not_pattern() {
        assert_eq!(sexp("a NOT b"), r#"(concat "a" "NOT b")"#);
    }

    #[test]
    fn test_parse_not_negated_parameter_is_error() {
        let err = parse("NOT -repo:foo", SearchType::Standard).unwrap_err();
        assert!(matches!(err, ParseError::NotBeforeNegatedParameter { .. }));
    }

    #[test]
    fn test_parse_unbalanced_falls_back() {
        assert_eq!(sexp("foo("), r#""foo(""#);
        assert_eq!(sexp("(foo"), r#""(foo""#);
    }

    #[test]
    fn test_parse_invalid_type_value() {
        let err = parse("type:nope x", SearchType::Standard).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTypeValue { .. }));
    }

    #[test]
    fn test_parse_unknown_field_is_pattern() {
        assert_eq!(
            sexp("https://github.com/a/b"),
            r#""https://github.com/a/b""#
        );
    }

    #[test]
    fn test_parse_regexp_search_type_labels() {
        let nodes = parse("foo.*", SearchType::Regexp).unwrap();
        assert!(matches!(&nodes[0], Node::Pattern(p) if p.is_regexp()));
    }

    #[test]
    fn test_new_operator_flattens() {
        let nodes = vec![
            Node::Operator(Operator {
                kind: OperatorKind::And,
                operands: vec![Pattern::new("a", Labels::LITERAL).into()],
            }),
            Pattern::new("b", Labels::LITERAL).into(),
        ];
        assert_eq!(
            to_sexp(&new_operator(nodes, OperatorKind::And)),
            r#"(and "a" "b")"#
        );
    }

    #[test]
    fn test_scan_delimited_escapes() {
        let (value, advance) = scan_delimited(r#""a\tb\\c" rest"#, false, '"').unwrap();
        assert_eq!(value, "a\tb\\c");
        assert_eq!(advance, 9);
    }

    #[test]
    fn test_scan_delimited_unterminated() {
        assert!(scan_delimited("\"abc", false, '"').is_err());
    }
}
