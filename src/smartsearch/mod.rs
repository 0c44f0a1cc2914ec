//! Smart search: alternative queries for searches that find nothing.
//!
//! A seed query is rewritten by [`Rule`]s, each a named chain of
//! [`Transform`]s. The [`Generator`] enumerates rule combinations in a fixed
//! order and [`SmartSearchJob`] runs the resulting queries until enough
//! results have been found.

mod codehost;
mod generator;
mod job;
mod languages;
mod metasyntax;
mod options;
mod rules;
mod transforms;

pub use codehost::{code_host_filters, rewrite_repo_url, CODE_HOST_DOMAINS};
pub use generator::{AutoQuery, Combinations, Generator, DESCRIPTION_SEPARATOR};
pub use job::{
    result_count_string, GeneratedRun, GeneratedSearchJob, Job, JobFactory, LuckyQueries,
    ProposedQuery, SearchOutcome, SmartSearchJob, LUCKY_PATTERN_TYPE,
};
pub use languages::{language_by_alias, symbol_kind_by_alias};
pub use metasyntax::{looks_like_regexp, metasyntax_weight, METASYNTAX_THRESHOLD};
pub use options::{PruneOptions, SmartSearchOptions, DEFAULT_MAX_SEARCH_RESULTS_STREAMING};
pub use rules::{apply_transformation, prune_rules, Rule, RULES_NARROW, RULES_WIDEN};
pub use transforms::{
    lang_patterns, patterns_to_code_host_filters, regexp_patterns, rewrite_repo_filter,
    symbol_patterns, type_patterns, unordered_patterns, unquote_patterns, Transform,
    TransformError,
};
