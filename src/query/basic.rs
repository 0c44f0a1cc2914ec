//! Basic queries and query plans.
//!
//! A [`Basic`] query has parameters only at the top level and at most one
//! pattern expression. A query with `or` between branches that carry
//! parameters, like `repo:a x or repo:b y`, is split into a plan of several
//! basic queries.

use crate::query::node::{Node, OperatorKind, Parameter};
use crate::query::parser::{new_operator, parse, ParseError, SearchType};
use crate::query::printer;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Basic {
    pub parameters: Vec<Parameter>,
    pub pattern: Option<Node>,
}

impl Basic {
    pub fn new(parameters: Vec<Parameter>, pattern: Option<Node>) -> Self {
        Self {
            parameters,
            pattern,
        }
    }

    /// Top-level nodes: parameters followed by the pattern, implicitly and-ed.
    pub fn to_parse_tree(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self
            .parameters
            .iter()
            .cloned()
            .map(Node::Parameter)
            .collect();
        nodes.extend(self.pattern.iter().cloned());
        nodes
    }

    pub fn string_human(&self) -> String {
        printer::string_human(&self.to_parse_tree())
    }

    /// Values of `field`, split into included and excluded (negated) values.
    pub fn include_exclude_values(&self, field: &str) -> (Vec<String>, Vec<String>) {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for p in self.parameters.iter().filter(|p| p.field == field) {
            if p.negated {
                exclude.push(p.value.clone());
            } else {
                include.push(p.value.clone());
            }
        }
        (include, exclude)
    }

    pub fn exists(&self, field: &str) -> bool {
        self.parameters.iter().any(|p| p.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.pattern.is_none()
    }
}

/// Convert a parse tree with parameters only at the top level into a
/// [`Basic`] query.
pub fn to_basic_query(nodes: Vec<Node>) -> Result<Basic, ParseError> {
    let top_level_and =
        matches!(nodes.as_slice(), [Node::Operator(op)] if op.kind == OperatorKind::And);
    let nodes = if top_level_and {
        nodes
            .into_iter()
            .flat_map(|node| match node {
                Node::Operator(op) => op.operands,
                other => vec![other],
            })
            .collect()
    } else {
        nodes
    };

    let mut parameters = Vec::new();
    let mut patterns = Vec::new();
    for node in nodes {
        match node {
            Node::Parameter(p) => parameters.push(p),
            node if !node.contains_parameter() => patterns.push(node),
            _ => {
                return Err(ParseError::NotBasic {
                    reason: "parameters must not appear inside or-expressions".to_string(),
                })
            }
        }
    }
    let pattern = new_operator(patterns, OperatorKind::And).into_iter().next();
    Ok(Basic::new(parameters, pattern))
}

/// Disjunctive normal form over operators that contain parameters. Or nodes
/// made only of patterns stay intact.
fn dnf(node: Node) -> Vec<Vec<Node>> {
    match node {
        Node::Operator(op) if op.kind == OperatorKind::Or && op.operands.iter().any(Node::contains_parameter) => {
            op.operands.into_iter().flat_map(dnf).collect()
        }
        Node::Operator(op) if op.kind == OperatorKind::And => dnf_conjunction(op.operands),
        other => vec![vec![other]],
    }
}

fn dnf_conjunction(operands: Vec<Node>) -> Vec<Vec<Node>> {
    let mut product: Vec<Vec<Node>> = vec![Vec::new()];
    for operand in operands {
        let branches = dnf(operand);
        product = product
            .into_iter()
            .flat_map(|prefix| {
                branches.iter().map(move |branch| {
                    let mut conjunction = prefix.clone();
                    conjunction.extend(branch.iter().cloned());
                    conjunction
                })
            })
            .collect();
    }
    product
}

/// Split a parse tree into the basic queries it is the union of.
pub fn to_plan(nodes: Vec<Node>) -> Result<Vec<Basic>, ParseError> {
    dnf_conjunction(nodes)
        .into_iter()
        .map(|conjunction| to_basic_query(new_operator(conjunction, OperatorKind::And)))
        .collect()
}

/// Parse `input` as a single basic query.
pub fn parse_basic(input: &str, search_type: SearchType) -> Result<Basic, ParseError> {
    to_basic_query(parse(input, search_type)?)
}

/// Parse `input` into a plan of one or more basic queries.
pub fn parse_plan(input: &str, search_type: SearchType) -> Result<Vec<Basic>, ParseError> {
    to_plan(parse(input, search_type)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::node::to_sexp;

    #[test]
    fn test_parse_basic_partitions() {
        let basic = parse_basic("repo:foo -file:test a b", SearchType::Standard).unwrap();
        assert_eq!(basic.parameters.len(), 2);
        assert_eq!(
            to_sexp(&basic.pattern.clone().into_iter().collect::<Vec<_>>()),
            r#"(concat "a" "b")"#
        );
        assert_eq!(basic.string_human(), "repo:foo -file:test a b");
    }

    #[test]
    fn test_parse_basic_rejects_nested_parameters() {
        let err = parse_basic("repo:a x or repo:b y", SearchType::Standard).unwrap_err();
        assert!(matches!(err, ParseError::NotBasic { .. }));
    }

    #[test]
    fn test_parse_plan_splits_or_with_parameters() {
        let plan = parse_plan("repo:a x or repo:b y", SearchType::Standard).unwrap();
        let printed: Vec<String> = plan.iter().map(Basic::string_human).collect();
        assert_eq!(printed, vec!["repo:a x", "repo:b y"]);
    }

    #[test]
    fn test_parse_plan_distributes_shared_parameters() {
        let plan = parse_plan("lang:go (repo:a or repo:b) x", SearchType::Standard).unwrap();
        let printed: Vec<String> = plan.iter().map(Basic::string_human).collect();
        assert_eq!(printed, vec!["lang:go repo:a x", "lang:go repo:b x"]);
    }

    #[test]
    fn test_parse_plan_keeps_pattern_or() {
        let plan = parse_plan("repo:a x or y", SearchType::Standard).unwrap();
        assert_eq!(plan.len(), 2);
        let plan = parse_plan("repo:a (x or y)", SearchType::Standard).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].string_human(), "repo:a (x OR y)");
    }

    #[test]
    fn test_include_exclude_values() {
        let basic = parse_basic("repo:a -repo:b repo:c x", SearchType::Standard).unwrap();
        let (include, exclude) = basic.include_exclude_values("repo");
        assert_eq!(include, vec!["a", "c"]);
        assert_eq!(exclude, vec!["b"]);
        assert!(basic.exists("repo"));
        assert!(!basic.exists("lang"));
    }

    #[test]
    fn test_empty_query() {
        let basic = parse_basic("", SearchType::Standard).unwrap();
        assert!(basic.is_empty());
        assert_eq!(basic.string_human(), "");
    }
}
