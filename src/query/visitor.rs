//! Pattern-tree traversals.

use crate::query::node::{Node, Operator, OperatorKind, Pattern};
use crate::query::parser::new_operator;

/// Map every pattern in `nodes` through `f`. Returning `None` removes the
/// pattern; operators left with no operands disappear and operators left
/// with one operand collapse into it.
pub fn map_pattern<F>(nodes: Vec<Node>, f: &mut F) -> Vec<Node>
where
    F: FnMut(Pattern) -> Option<Node>,
{
    let mut mapped = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Pattern(p) => mapped.extend(f(p)),
            Node::Parameter(_) => mapped.push(node),
            Node::Operator(op) => {
                let operands = map_pattern(op.operands, f);
                mapped.extend(new_operator(operands, op.kind));
            }
        }
    }
    mapped
}

/// Visit every pattern in `nodes`, in order.
pub fn visit_patterns<'a, F>(nodes: &'a [Node], f: &mut F)
where
    F: FnMut(&'a Pattern),
{
    for node in nodes {
        match node {
            Node::Pattern(p) => f(p),
            Node::Parameter(_) => {}
            Node::Operator(op) => visit_patterns(&op.operands, f),
        }
    }
}

/// Turn every `concat` node into an `and` node. Returns whether any node
/// changed. `concat` only has pattern operands, so there is nothing below
/// it to rewrite.
pub fn map_concat(nodes: Vec<Node>) -> (Vec<Node>, bool) {
    let mut changed = false;
    let mut mapped = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Operator(op) if op.kind == OperatorKind::Concat => {
                changed = true;
                mapped.push(Node::Operator(Operator {
                    kind: OperatorKind::And,
                    operands: op.operands,
                }));
            }
            Node::Operator(op) => {
                let (operands, operands_changed) = map_concat(op.operands);
                changed |= operands_changed;
                mapped.push(Node::Operator(Operator {
                    kind: op.kind,
                    operands,
                }));
            }
            other => mapped.push(other),
        }
    }
    (mapped, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::node::to_sexp;
    use crate::query::parser::{parse, SearchType};

    #[test]
    fn test_map_pattern_removes_and_collapses() {
        let nodes = parse("repo:x go parse", SearchType::Standard).unwrap();
        let mapped = map_pattern(nodes, &mut |p: Pattern| {
            if p.value == "go" {
                None
            } else {
                Some(Node::Pattern(p))
            }
        });
        assert_eq!(to_sexp(&mapped), r#"(and "repo:x" "parse")"#);
    }

    #[test]
    fn test_map_concat() {
        let nodes = parse("a b or c", SearchType::Standard).unwrap();
        let (mapped, changed) = map_concat(nodes);
        assert!(changed);
        assert_eq!(to_sexp(&mapped), r#"(or (and "a" "b") "c")"#);
    }

    #[test]
    fn test_visit_patterns_in_order() {
        let nodes = parse("a (b or c) d", SearchType::Standard).unwrap();
        let mut seen = Vec::new();
        visit_patterns(&nodes, &mut |p: &Pattern| seen.push(p.value.clone()));
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }
}
