//! Options for smart search.

/// Result count at which smart search stops running generated queries.
pub const DEFAULT_MAX_SEARCH_RESULTS_STREAMING: usize = 500;

/// Options for pruning rules against a seed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneOptions {
    /// Generate nothing for queries that search diffs (`type:diff`). Diff
    /// searches are expensive enough that running extra variants of them is
    /// off by default.
    pub clamp_diff: bool,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self { clamp_diff: true }
    }
}

/// Options for a smart search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartSearchOptions {
    /// Stop once the initial query, or generated queries together, stream
    /// this many results.
    pub result_threshold: usize,
    pub prune: PruneOptions,
}

impl Default for SmartSearchOptions {
    fn default() -> Self {
        Self {
            result_threshold: DEFAULT_MAX_SEARCH_RESULTS_STREAMING,
            prune: PruneOptions::default(),
        }
    }
}
