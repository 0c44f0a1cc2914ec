//! Query transforms.
//!
//! Each transform rewrites a [`Basic`] query into a new one with a different
//! interpretation, or reports that it does not apply. Inputs are never
//! modified. Transforms that rewrite the pattern tree first print the query
//! and parse it back, so they operate on the same tree a user typing the
//! printed query would get.

use crate::query::fields::{FIELD_LANG, FIELD_REPO, FIELD_SELECT, FIELD_TYPE};
use crate::query::{
    map_concat, map_pattern, new_operator, parse, string_human, to_basic_query, validate, Basic,
    Labels, Node, OperatorKind, Parameter, Pattern, SearchType,
};
use crate::smartsearch::codehost::{code_host_filters, rewrite_repo_url};
use crate::smartsearch::languages::{language_by_alias, symbol_kind_by_alias};
use crate::smartsearch::metasyntax::looks_like_regexp;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The rewrite has nothing to act on in this query.
    #[error("transform does not apply")]
    NotApplicable,

    /// The rewritten query could not be printed and parsed back.
    #[error("internal transform error: {0}")]
    Internal(String),
}

pub type Transform = fn(&Basic) -> Result<Basic, TransformError>;

const TYPE_PATTERN_VALUES: &[&str] = &["symbol", "commit", "diff", "path"];

fn reparse(nodes: &[Node]) -> Result<Vec<Node>, TransformError> {
    let text = string_human(nodes);
    parse(&text, SearchType::Standard)
        .map_err(|e| TransformError::Internal(format!("cannot parse {:?}: {}", text, e)))
}

/// The pattern of `b`, reparsed from its printed form.
fn pattern_tree(b: &Basic) -> Result<Vec<Node>, TransformError> {
    match &b.pattern {
        Some(pattern) => reparse(std::slice::from_ref(pattern)),
        None => Err(TransformError::NotApplicable),
    }
}

/// Check that `basic` is well formed and survives a print and parse.
fn checked(basic: Basic) -> Result<Basic, TransformError> {
    let nodes = basic.to_parse_tree();
    validate(&nodes).map_err(|e| {
        TransformError::Internal(format!("invalid query {:?}: {}", basic.string_human(), e))
    })?;
    reparse(&nodes)?;
    Ok(basic)
}

fn rebuild(nodes: Vec<Node>) -> Result<Basic, TransformError> {
    let nodes = new_operator(nodes, OperatorKind::And);
    let basic = to_basic_query(nodes).map_err(|e| TransformError::Internal(e.to_string()))?;
    checked(basic)
}

fn with_pattern(parameters: Vec<Parameter>, pattern: Vec<Node>) -> Result<Basic, TransformError> {
    let pattern = new_operator(pattern, OperatorKind::And).into_iter().next();
    checked(Basic::new(parameters, pattern))
}

/// Remove the first pattern for which `lift` returns a value, returning the
/// remaining pattern tree and the value.
fn lift_first_pattern<T, F>(nodes: Vec<Node>, mut lift: F) -> (Vec<Node>, Option<T>)
where
    F: FnMut(&Pattern) -> Option<T>,
{
    let mut lifted = None;
    let remaining = map_pattern(nodes, &mut |pattern: Pattern| {
        if lifted.is_none() {
            if let Some(value) = lift(&pattern) {
                lifted = Some(value);
                return None;
            }
        }
        Some(Node::Pattern(pattern))
    });
    (remaining, lifted)
}

/// Search quoted patterns literally without quotes. Escape sequences were
/// already honored when the quoted value was parsed.
pub fn unquote_patterns(b: &Basic) -> Result<Basic, TransformError> {
    let tree = reparse(&b.to_parse_tree())?;

    let mut changed = false;
    let mapped = map_pattern(tree, &mut |mut pattern: Pattern| {
        if pattern.is_quoted() {
            changed = true;
            pattern.annotation.labels.unset(Labels::QUOTED);
            pattern.annotation.labels.set(Labels::LITERAL);
        }
        Some(Node::Pattern(pattern))
    });
    if !changed {
        return Err(TransformError::NotApplicable);
    }
    rebuild(mapped)
}

/// Search literal patterns with enough regexp metasyntax as regular
/// expressions. Quoted patterns are left alone.
pub fn regexp_patterns(b: &Basic) -> Result<Basic, TransformError> {
    let tree = reparse(&b.to_parse_tree())?;

    let mut changed = false;
    let mapped = map_pattern(tree, &mut |mut pattern: Pattern| {
        if !pattern.is_regexp() && !pattern.is_quoted() && looks_like_regexp(&pattern.value) {
            changed = true;
            pattern.annotation.labels.unset(Labels::LITERAL);
            pattern.annotation.labels.set(Labels::REGEXP);
        }
        Some(Node::Pattern(pattern))
    });
    if !changed {
        return Err(TransformError::NotApplicable);
    }
    rebuild(mapped)
}

/// Match adjacent patterns in any order by turning `concat` into `and`.
pub fn unordered_patterns(b: &Basic) -> Result<Basic, TransformError> {
    let tree = reparse(&b.to_parse_tree())?;
    let (mapped, changed) = map_concat(tree);
    if !changed {
        return Err(TransformError::NotApplicable);
    }
    rebuild(mapped)
}

/// Lift the first pattern naming a language into a `lang:` filter.
pub fn lang_patterns(b: &Basic) -> Result<Basic, TransformError> {
    let tree = pattern_tree(b)?;
    let (remaining, lifted) =
        lift_first_pattern(tree, |p| language_by_alias(&p.value).map(|lang| (lang, p.negated)));
    let (lang, negated) = lifted.ok_or(TransformError::NotApplicable)?;

    let mut parameters = b.parameters.clone();
    parameters.push(Parameter::new(FIELD_LANG, lang).negated(negated));
    with_pattern(parameters, remaining)
}

/// Lift the first pattern naming a result type (`symbol`, `commit`, `diff`,
/// `path`) into a `type:` filter.
pub fn type_patterns(b: &Basic) -> Result<Basic, TransformError> {
    if b.exists(FIELD_TYPE) {
        return Err(TransformError::NotApplicable);
    }
    let tree = pattern_tree(b)?;
    let (remaining, lifted) = lift_first_pattern(tree, |p| {
        if p.negated || p.is_regexp() || p.is_quoted() {
            return None;
        }
        let lower = p.value.to_lowercase();
        TYPE_PATTERN_VALUES.contains(&lower.as_str()).then_some(lower)
    });
    let typ = lifted.ok_or(TransformError::NotApplicable)?;

    let mut parameters = b.parameters.clone();
    parameters.push(Parameter::new(FIELD_TYPE, typ));
    with_pattern(parameters, remaining)
}

/// Lift the first pattern naming a symbol kind into `select:symbol.<kind>`
/// and `type:symbol` filters.
pub fn symbol_patterns(b: &Basic) -> Result<Basic, TransformError> {
    if b.exists(FIELD_TYPE) || b.exists(FIELD_SELECT) {
        return Err(TransformError::NotApplicable);
    }
    let tree = pattern_tree(b)?;
    let (remaining, lifted) = lift_first_pattern(tree, |p| {
        if p.negated || p.is_regexp() || p.is_quoted() {
            return None;
        }
        symbol_kind_by_alias(&p.value)
    });
    let kind = lifted.ok_or(TransformError::NotApplicable)?;

    // Symbol search needs something to match symbol names against.
    if remaining.is_empty() {
        return Err(TransformError::NotApplicable);
    }

    let mut parameters = b.parameters.clone();
    parameters.push(Parameter::new(FIELD_SELECT, format!("symbol.{}", kind)));
    parameters.push(Parameter::new(FIELD_TYPE, "symbol"));
    with_pattern(parameters, remaining)
}

/// Turn patterns that are code host URLs into `repo:`, `rev:` and `file:`
/// filters. Filters are added as top-level parameters; patterns can't be
/// replaced in place because parameters may not appear inside `concat`.
pub fn patterns_to_code_host_filters(b: &Basic) -> Result<Basic, TransformError> {
    let tree = pattern_tree(b)?;

    let mut filters = Vec::new();
    let remaining = map_pattern(tree, &mut |pattern: Pattern| {
        match code_host_filters(&pattern.value, pattern.negated) {
            Some(params) => {
                filters.extend(params);
                None
            }
            None => Some(Node::Pattern(pattern)),
        }
    });
    if filters.is_empty() {
        return Err(TransformError::NotApplicable);
    }

    let mut parameters = b.parameters.clone();
    parameters.extend(filters);
    with_pattern(parameters, remaining)
}

/// Rewrite `repo:` values that are GitHub URLs into repo name patterns.
pub fn rewrite_repo_filter(b: &Basic) -> Result<Basic, TransformError> {
    let mut changed = false;
    let parameters = b
        .parameters
        .iter()
        .map(|p| {
            if p.field != FIELD_REPO {
                return p.clone();
            }
            match rewrite_repo_url(&p.value) {
                Some(value) => {
                    changed = true;
                    Parameter {
                        value,
                        ..p.clone()
                    }
                }
                None => p.clone(),
            }
        })
        .collect();
    if !changed {
        return Err(TransformError::NotApplicable);
    }
    checked(Basic::new(parameters, b.pattern.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_basic;

    fn basic(input: &str) -> Basic {
        parse_basic(input, SearchType::Standard).expect("query should parse")
    }

    fn apply(transform: Transform, input: &str) -> Result<String, TransformError> {
        transform(&basic(input)).map(|b| b.string_human())
    }

    #[test]
    fn test_unquote_patterns() {
        assert_eq!(apply(unquote_patterns, r#""foo bar""#), Ok("foo bar".to_string()));
        assert_eq!(
            apply(unquote_patterns, r#"repo:x "a\"b""#),
            Ok(r#"repo:x a"b"#.to_string())
        );
    }

    #[test]
    fn test_unquote_patterns_is_idempotent() {
        let once = unquote_patterns(&basic(r#""foo""#)).unwrap();
        assert_eq!(unquote_patterns(&once), Err(TransformError::NotApplicable));
    }

    #[test]
    fn test_unquote_patterns_nothing_quoted() {
        assert_eq!(apply(unquote_patterns, "foo"), Err(TransformError::NotApplicable));
    }

    #[test]
    fn test_regexp_patterns() {
        assert_eq!(
            apply(regexp_patterns, "(using|struct) parse"),
            Ok("/(using|struct)/ parse".to_string())
        );
        assert_eq!(
            apply(regexp_patterns, "test.get(id)"),
            Err(TransformError::NotApplicable)
        );
        assert_eq!(
            apply(regexp_patterns, "my.config.yaml"),
            Err(TransformError::NotApplicable)
        );
    }

    #[test]
    fn test_regexp_patterns_skips_quoted() {
        assert_eq!(
            apply(regexp_patterns, r#""foo.*bar""#),
            Err(TransformError::NotApplicable)
        );
    }

    #[test]
    fn test_unordered_patterns() {
        assert_eq!(apply(unordered_patterns, "a b"), Ok("a AND b".to_string()));
        assert_eq!(
            apply(unordered_patterns, "repo:x a b c"),
            Ok("repo:x a AND b AND c".to_string())
        );
        assert_eq!(apply(unordered_patterns, "a"), Err(TransformError::NotApplicable));
    }

    #[test]
    fn test_lang_patterns() {
        assert_eq!(apply(lang_patterns, "go parse"), Ok("lang:Go parse".to_string()));
        assert_eq!(
            apply(lang_patterns, "parse NOT python"),
            Ok("-lang:Python parse".to_string())
        );
        assert_eq!(apply(lang_patterns, "rust"), Ok("lang:Rust".to_string()));
        assert_eq!(apply(lang_patterns, "parse"), Err(TransformError::NotApplicable));
    }

    #[test]
    fn test_lang_patterns_only_first_language() {
        assert_eq!(
            apply(lang_patterns, "go python"),
            Ok("lang:Go python".to_string())
        );
    }

    #[test]
    fn test_type_patterns() {
        assert_eq!(apply(type_patterns, "Diff fix"), Ok("type:diff fix".to_string()));
        assert_eq!(
            apply(type_patterns, "NOT commit fix"),
            Err(TransformError::NotApplicable)
        );
        assert_eq!(
            apply(type_patterns, "type:commit diff"),
            Err(TransformError::NotApplicable)
        );
        assert_eq!(
            apply(type_patterns, r#""diff" fix"#),
            Err(TransformError::NotApplicable)
        );
    }

    #[test]
    fn test_symbol_patterns() {
        assert_eq!(
            apply(symbol_patterns, "func parse"),
            Ok("select:symbol.function type:symbol parse".to_string())
        );
        assert_eq!(apply(symbol_patterns, "class"), Err(TransformError::NotApplicable));
        assert_eq!(
            apply(symbol_patterns, "NOT class foo"),
            Err(TransformError::NotApplicable)
        );
        assert_eq!(
            apply(symbol_patterns, r#""func" parse"#),
            Err(TransformError::NotApplicable)
        );
    }

    #[test]
    fn test_unordered_patterns_keeps_filter_with_parens() {
        assert_eq!(
            apply(unordered_patterns, r"file:^src/(a|b)\.go$ foo bar"),
            Ok(r"file:^src/(a|b)\.go$ foo AND bar".to_string())
        );
    }

    #[test]
    fn test_patterns_to_code_host_filters() {
        assert_eq!(
            apply(
                patterns_to_code_host_filters,
                "https://github.com/sourcegraph/sourcegraph/blob/main/lib/README.md#L50"
            ),
            Ok(r"repo:^github\.com/sourcegraph/sourcegraph$ rev:main file:^lib/README\.md$".to_string())
        );
        assert_eq!(
            apply(patterns_to_code_host_filters, "github.com/a/b parse"),
            Ok(r"repo:^github\.com/a/b$ parse".to_string())
        );
        assert_eq!(
            apply(
                patterns_to_code_host_filters,
                "https://github.com/a/b/blob/main/docs/foo(1).md"
            ),
            Ok(r"repo:^github\.com/a/b$ rev:main file:^docs/foo\(1\)\.md$".to_string())
        );
        assert_eq!(
            apply(patterns_to_code_host_filters, "parse"),
            Err(TransformError::NotApplicable)
        );
    }

    #[test]
    fn test_rewrite_repo_filter() {
        assert_eq!(
            apply(rewrite_repo_filter, "repo:https://github.com/a/b foo"),
            Ok(r"repo:^github\.com/a/b$ foo".to_string())
        );
        assert_eq!(
            apply(rewrite_repo_filter, "repo:a/b foo"),
            Err(TransformError::NotApplicable)
        );
    }

    #[test]
    fn test_transforms_do_not_modify_input() {
        let seed = basic(r#"go "x y""#);
        let before = seed.clone();
        let _ = unquote_patterns(&seed);
        let _ = lang_patterns(&seed);
        assert_eq!(seed, before);
    }

    #[test]
    fn test_transforms_without_pattern_do_not_apply() {
        let seed = basic("repo:x");
        assert_eq!(lang_patterns(&seed), Err(TransformError::NotApplicable));
        assert_eq!(type_patterns(&seed), Err(TransformError::NotApplicable));
        assert_eq!(unordered_patterns(&seed), Err(TransformError::NotApplicable));
    }
}
