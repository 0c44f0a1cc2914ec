//! Integration tests for query generation.
//!
//! Tests for:
//! - Phase ordering of rule combinations
//! - Determinism and exhaustion
//! - Pruning against the seed query
//! - The type:diff clamp
use smartsearch::query::{parse_basic, Basic, SearchType};
use smartsearch::smartsearch::{
    prune_rules, regexp_patterns, unquote_patterns, AutoQuery, Generator, PruneOptions, Rule,
    TransformError, DESCRIPTION_SEPARATOR, RULES_NARROW, RULES_WIDEN,
};

fn basic(input: &str) -> Basic {
    parse_basic(input, SearchType::Standard).expect("query should parse")
}

fn generate(input: &str) -> Vec<AutoQuery> {
    Generator::new(basic(input), &RULES_NARROW, &RULES_WIDEN).collect()
}

fn descriptions(queries: &[AutoQuery]) -> Vec<&str> {
    queries.iter().map(|q| q.description.as_str()).collect()
}

fn printed(queries: &[AutoQuery]) -> Vec<String> {
    queries.iter().map(|q| q.query.string_human()).collect()
}

#[test]
fn test_narrow_then_widen_order() {
    let queries = generate("go parse");
    assert_eq!(
        descriptions(&queries),
        vec!["apply language filter for pattern", "AND patterns together"]
    );
    assert_eq!(printed(&queries), vec!["lang:Go parse", "go AND parse"]);
}

#[test]
fn test_phase_ordering_with_two_narrowing_rules() {
    let queries = generate(r#"go "foo bar""#);
    let sep = DESCRIPTION_SEPARATOR;
    let unquote = "unquote patterns";
    let lang = "apply language filter for pattern";
    let and = "AND patterns together";
    assert_eq!(
        descriptions(&queries),
        vec![
            format!("{unquote}{sep}{lang}"),
            unquote.to_string(),
            lang.to_string(),
            format!("{unquote}{sep}{lang}{sep}{and}"),
            format!("{unquote}{sep}{and}"),
            and.to_string(),
        ]
    );
    let printed = printed(&queries);
    assert_eq!(printed[0], "lang:Go foo bar");
    assert_eq!(printed[1], "go foo bar");
    assert_eq!(printed[2], r#"lang:Go "foo bar""#);
}

#[test]
fn test_generation_is_deterministic() {
    let seed = basic(r#"go "foo bar" func"#);
    let first: Vec<AutoQuery> = Generator::new(seed.clone(), &RULES_NARROW, &RULES_WIDEN).collect();
    let second: Vec<AutoQuery> = Generator::new(seed, &RULES_NARROW, &RULES_WIDEN).collect();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_generator_stays_exhausted() {
    let mut generator = Generator::new(basic("go parse"), &RULES_NARROW, &RULES_WIDEN);
    assert!(generator.next().is_some());
    assert!(generator.next().is_some());
    assert!(generator.next().is_none());
    assert!(generator.next().is_none());
}

#[test]
fn test_nothing_to_generate() {
    assert!(generate("foo").is_empty());
    assert!(generate("repo:x").is_empty());
}

#[test]
fn test_single_quoted_pattern_yields_unquote_only() {
    let queries = generate(r#""foo""#);
    assert_eq!(descriptions(&queries), vec!["unquote patterns"]);
    assert_eq!(printed(&queries), vec!["foo"]);
}

#[test]
fn test_every_rule_in_a_combination_applies_to_seed() {
    let seed = basic(r#"go "foo bar" func parse"#);
    let options = PruneOptions::default();
    let applicable: Vec<String> = prune_rules(&seed, &RULES_NARROW, &options)
        .into_iter()
        .chain(prune_rules(&seed, &RULES_WIDEN, &options))
        .map(|rule| rule.description)
        .collect();

    let queries: Vec<AutoQuery> = Generator::new(seed, &RULES_NARROW, &RULES_WIDEN).collect();
    assert!(!queries.is_empty());
    for query in &queries {
        for part in query.description.split(DESCRIPTION_SEPARATOR) {
            assert!(
                applicable.iter().any(|d| d == part),
                "{:?} was not applicable to the seed",
                part
            );
        }
    }
}

#[test]
fn test_diff_clamp() {
    assert!(generate("type:diff go parse").is_empty());

    let unclamped: Vec<AutoQuery> = Generator::with_options(
        basic("type:diff go parse"),
        &RULES_NARROW,
        &RULES_WIDEN,
        &PruneOptions { clamp_diff: false },
    )
    .collect();
    assert_eq!(
        printed(&unclamped).first().map(String::as_str),
        Some("type:diff lang:Go parse")
    );
}

#[test]
fn test_custom_rules() {
    let narrow = vec![Rule::new("unquote", unquote_patterns)];
    let widen = vec![Rule::new("regexp", regexp_patterns)];
    let queries: Vec<AutoQuery> =
        Generator::new(basic(r#""x" foo.*bar"#), &narrow, &widen).collect();
    assert_eq!(
        descriptions(&queries),
        vec![
            "unquote".to_string(),
            format!("unquote{}regexp", DESCRIPTION_SEPARATOR),
            "regexp".to_string(),
        ]
    );
}

#[test]
fn test_regexp_threshold_boundary() {
    let apply = |input: &str| regexp_patterns(&basic(input)).map(|b| b.string_human());
    assert_eq!(apply("foo.*bar"), Ok("/foo.*bar/".to_string()));
    assert_eq!(apply("a+"), Err(TransformError::NotApplicable));
    assert_eq!(apply("foo.bar"), Err(TransformError::NotApplicable));
}

#[test]
fn test_unquote_is_idempotent() {
    let once = unquote_patterns(&basic(r#"repo:x "a b" "c""#)).unwrap();
    assert_eq!(unquote_patterns(&once), Err(TransformError::NotApplicable));
}

#[test]
fn test_filter_with_parens_still_generates() {
    let queries = generate(r"file:^src/(a|b)\.go$ foo bar");
    assert_eq!(descriptions(&queries), vec!["AND patterns together"]);
    assert_eq!(printed(&queries), vec![r"file:^src/(a|b)\.go$ foo AND bar"]);
}
