//! Rules and the built-in rule tables.

use crate::query::fields::FIELD_TYPE;
use crate::query::Basic;
use crate::smartsearch::options::PruneOptions;
use crate::smartsearch::transforms::{
    lang_patterns, patterns_to_code_host_filters, regexp_patterns, rewrite_repo_filter,
    symbol_patterns, type_patterns, unordered_patterns, unquote_patterns, Transform,
    TransformError,
};
use once_cell::sync::Lazy;
use tracing::warn;

/// A named sequence of transforms applied in order.
#[derive(Debug, Clone)]
pub struct Rule {
    pub description: String,
    pub transform: Vec<Transform>,
}

impl Rule {
    pub fn new(description: impl Into<String>, transform: Transform) -> Self {
        Self::chain(description, vec![transform])
    }

    pub fn chain(description: impl Into<String>, transform: Vec<Transform>) -> Self {
        Self {
            description: description.into(),
            transform,
        }
    }

    pub fn apply(&self, seed: &Basic) -> Result<Basic, TransformError> {
        apply_transformation(seed, &self.transform)
    }
}

/// Apply `transform` in order, each step to the previous step's output. The
/// first step that fails decides the result.
pub fn apply_transformation(seed: &Basic, transform: &[Transform]) -> Result<Basic, TransformError> {
    let Some((first, rest)) = transform.split_first() else {
        return Ok(seed.clone());
    };
    let mut current = first(seed)?;
    for apply in rest {
        current = apply(&current)?;
    }
    Ok(current)
}

/// Rules expected to shrink the result set.
pub static RULES_NARROW: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("unquote patterns", unquote_patterns),
        Rule::new("apply search type for pattern", type_patterns),
        Rule::new("apply language filter for pattern", lang_patterns),
        Rule::new("apply symbol select for pattern", symbol_patterns),
        Rule::new("expand URL to filters", patterns_to_code_host_filters),
        Rule::new("rewrite repo URLs", rewrite_repo_filter),
    ]
});

/// Rules expected to grow the result set.
pub static RULES_WIDEN: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("patterns as regular expressions", regexp_patterns),
        Rule::new("AND patterns together", unordered_patterns),
    ]
});

fn searches_diffs(seed: &Basic) -> bool {
    let (include, _) = seed.include_exclude_values(FIELD_TYPE);
    include.iter().any(|value| value.eq_ignore_ascii_case("diff"))
}

/// Keep the rules that apply to `seed` on their own, in order.
pub fn prune_rules(seed: &Basic, rules: &[Rule], options: &PruneOptions) -> Vec<Rule> {
    if options.clamp_diff && searches_diffs(seed) {
        return Vec::new();
    }
    rules
        .iter()
        .filter(|rule| match rule.apply(seed) {
            Ok(_) => true,
            Err(TransformError::NotApplicable) => false,
            Err(TransformError::Internal(reason)) => {
                warn!(rule = %rule.description, query = %seed.string_human(), %reason, "rule failed on seed query");
                false
            }
        })
        .cloned()
        .collect()
}
