//! Parse tree node types.
//!
//! A query is a tree of [`Node`]s. Leaves are search [`Pattern`]s and
//! `field:value` [`Parameter`]s; interior nodes are [`Operator`]s.

use serde::Serialize;
use std::fmt;

/// Bit set of annotations attached to a pattern while parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Labels(u8);

impl Labels {
    pub const NONE: Labels = Labels(0);
    /// Pattern is matched literally.
    pub const LITERAL: Labels = Labels(1);
    /// Pattern is interpreted as a regular expression.
    pub const REGEXP: Labels = Labels(1 << 1);
    /// Pattern was written inside quotes.
    pub const QUOTED: Labels = Labels(1 << 2);
    /// Balanced parentheses were scanned as part of the pattern.
    pub const HEURISTIC_PARENS_AS_PATTERNS: Labels = Labels(1 << 3);
    /// Unbalanced parentheses were scanned as part of the pattern.
    pub const HEURISTIC_DANGLING_PARENS: Labels = Labels(1 << 4);

    pub const fn is_set(self, other: Labels) -> bool {
        self.0 & other.0 != 0
    }

    pub fn set(&mut self, other: Labels) {
        self.0 |= other.0;
    }

    pub fn unset(&mut self, other: Labels) {
        self.0 &= !other.0;
    }

    /// Human-readable label names, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        const NAMES: [(Labels, &str); 5] = [
            (Labels::LITERAL, "Literal"),
            (Labels::REGEXP, "Regexp"),
            (Labels::QUOTED, "Quoted"),
            (Labels::HEURISTIC_PARENS_AS_PATTERNS, "HeuristicParensAsPatterns"),
            (Labels::HEURISTIC_DANGLING_PARENS, "HeuristicDanglingParens"),
        ];
        NAMES
            .iter()
            .filter(|(label, _)| self.is_set(*label))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl std::ops::BitOr for Labels {
    type Output = Labels;

    fn bitor(self, rhs: Labels) -> Labels {
        Labels(self.0 | rhs.0)
    }
}

/// Information attached to a pattern by the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Annotation {
    pub labels: Labels,
}

impl Annotation {
    pub fn new(labels: Labels) -> Self {
        Self { labels }
    }
}

/// A search pattern fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pattern {
    pub value: String,
    pub negated: bool,
    #[serde(skip)]
    pub annotation: Annotation,
}

impl Pattern {
    pub fn new(value: impl Into<String>, labels: Labels) -> Self {
        Self {
            value: value.into(),
            negated: false,
            annotation: Annotation::new(labels),
        }
    }

    pub fn is_regexp(&self) -> bool {
        self.annotation.labels.is_set(Labels::REGEXP)
    }

    pub fn is_quoted(&self) -> bool {
        self.annotation.labels.is_set(Labels::QUOTED)
    }
}

/// A `field:value` parameter, e.g. `repo:sourcegraph` or `-file:test`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Parameter {
    pub field: String,
    pub value: String,
    pub negated: bool,
}

impl Parameter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            negated: false,
        }
    }

    pub fn negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    Or,
    And,
    /// Ordered sequence of patterns. Only ever has pattern operands.
    Concat,
}

impl OperatorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Or => "or",
            OperatorKind::And => "and",
            OperatorKind::Concat => "concat",
        }
    }
}

/// Interior node of kind `kind` over `operands`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Operator {
    pub kind: OperatorKind,
    pub operands: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Node {
    Pattern(Pattern),
    Parameter(Parameter),
    Operator(Operator),
}

impl Node {
    /// Whether this node or any descendant is a pattern.
    pub fn contains_pattern(&self) -> bool {
        match self {
            Node::Pattern(_) => true,
            Node::Parameter(_) => false,
            Node::Operator(op) => op.operands.iter().any(Node::contains_pattern),
        }
    }

    /// Whether this node or any descendant is a parameter.
    pub fn contains_parameter(&self) -> bool {
        match self {
            Node::Pattern(_) => false,
            Node::Parameter(_) => true,
            Node::Operator(op) => op.operands.iter().any(Node::contains_parameter),
        }
    }
}

impl From<Pattern> for Node {
    fn from(pattern: Pattern) -> Self {
        Node::Pattern(pattern)
    }
}

impl From<Parameter> for Node {
    fn from(parameter: Parameter) -> Self {
        Node::Parameter(parameter)
    }
}

/// S-expression form, used for debugging and in tests:
/// `(and "repo:foo" (concat "a" "b"))`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Pattern(p) => {
                if p.negated {
                    write!(f, "{:?}", format!("NOT {}", p.value))
                } else {
                    write!(f, "{:?}", p.value)
                }
            }
            Node::Parameter(p) => {
                let v = if p.field.is_empty() {
                    p.value.clone()
                } else if p.negated {
                    format!("-{}:{}", p.field, p.value)
                } else {
                    format!("{}:{}", p.field, p.value)
                };
                write!(f, "{:?}", v)
            }
            Node::Operator(op) => {
                write!(f, "({}", op.kind.as_str())?;
                for operand in &op.operands {
                    write!(f, " {}", operand)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// S-expression for a list of nodes, space separated.
pub fn to_sexp(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
