//! Running smart search.
//!
//! [`SmartSearchJob`] runs the user's query first. If it finds nothing, the
//! job runs queries from a [`Generator`] per plan branch until they have
//! streamed enough results, and proposes the generated queries that found
//! something.

use crate::alert::{Alert, MaxAlerter};
use crate::error::SearchError;
use crate::query::Basic;
use crate::smartsearch::generator::{AutoQuery, Generator};
use crate::smartsearch::options::SmartSearchOptions;
use crate::smartsearch::rules::{Rule, RULES_NARROW, RULES_WIDEN};
use crate::streaming::{DedupingStream, SearchContext, Sender};
use serde::Serialize;
use tracing::{debug, info};

/// Pattern type of proposed queries.
pub const LUCKY_PATTERN_TYPE: &str = "lucky";

/// A unit of search work that streams results.
pub trait Job {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &SearchContext, stream: &mut dyn Sender)
        -> Result<Option<Alert>, SearchError>;
}

/// Builds the job that searches for a query.
pub type JobFactory = Box<dyn Fn(&Basic) -> Result<Box<dyn Job>, SearchError>>;

/// A generated query that found results, offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedQuery {
    /// Rule descriptions with the result count, e.g.
    /// `apply language filter for pattern (3 additional results)`.
    pub description: String,
    pub query: String,
    pub pattern_type: &'static str,
    pub result_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LuckyQueries {
    pub proposed_queries: Vec<ProposedQuery>,
}

/// Result of a smart search run.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The search ran. Errors from generated queries, if any, are in
    /// `errors`.
    Completed {
        alert: Option<Alert>,
        errors: Vec<SearchError>,
    },
    /// The search ran and generated queries found results.
    Suggested {
        alert: Option<Alert>,
        errors: Vec<SearchError>,
        lucky: LuckyQueries,
    },
    /// The initial query failed.
    Failed {
        alert: Option<Alert>,
        error: SearchError,
    },
}

impl SearchOutcome {
    fn finish(alert: Option<Alert>, errors: Vec<SearchError>, proposed: Vec<ProposedQuery>) -> Self {
        if proposed.is_empty() {
            SearchOutcome::Completed { alert, errors }
        } else {
            SearchOutcome::Suggested {
                alert,
                errors,
                lucky: LuckyQueries {
                    proposed_queries: proposed,
                },
            }
        }
    }

    pub fn alert(&self) -> Option<&Alert> {
        match self {
            SearchOutcome::Completed { alert, .. }
            | SearchOutcome::Suggested { alert, .. }
            | SearchOutcome::Failed { alert, .. } => alert.as_ref(),
        }
    }

    pub fn errors(&self) -> Vec<&SearchError> {
        match self {
            SearchOutcome::Completed { errors, .. } | SearchOutcome::Suggested { errors, .. } => {
                errors.iter().collect()
            }
            SearchOutcome::Failed { error, .. } => vec![error],
        }
    }

    pub fn proposed_queries(&self) -> &[ProposedQuery] {
        match self {
            SearchOutcome::Suggested { lucky, .. } => &lucky.proposed_queries,
            _ => &[],
        }
    }
}

/// `1 result`, `N additional results`, or `N+ results` when `count` hit the
/// threshold exactly.
pub fn result_count_string(count: usize, threshold: usize) -> String {
    if count == threshold {
        format!("{}+ results", count)
    } else if count == 1 {
        "1 result".to_string()
    } else {
        format!("{} additional results", count)
    }
}

/// What running one generated query produced.
#[derive(Debug)]
pub struct GeneratedRun {
    pub alert: Option<Alert>,
    pub error: Option<SearchError>,
    /// Set when the query streamed at least one result.
    pub proposed: Option<ProposedQuery>,
}

/// Runs the job for a generated query and proposes the query if it found
/// anything.
pub struct GeneratedSearchJob {
    child: Box<dyn Job>,
    auto_query: AutoQuery,
    threshold: usize,
}

impl GeneratedSearchJob {
    pub fn new(child: Box<dyn Job>, auto_query: AutoQuery, threshold: usize) -> Self {
        Self {
            child,
            auto_query,
            threshold,
        }
    }

    fn proposed_query(&self, count: usize) -> ProposedQuery {
        ProposedQuery {
            description: format!(
                "{} ({})",
                self.auto_query.description,
                result_count_string(count, self.threshold)
            ),
            query: self.auto_query.query.string_human(),
            pattern_type: LUCKY_PATTERN_TYPE,
            result_count: count,
        }
    }

    /// Only results `stream` has not seen before count towards the proposal.
    pub fn run(&self, ctx: &SearchContext, stream: &mut DedupingStream<'_>) -> GeneratedRun {
        let before = stream.count();
        let result = self.child.run(ctx, stream);
        let count = stream.count() - before;

        let (alert, error) = match result {
            Ok(alert) => (alert, None),
            Err(error) => (None, Some(error)),
        };
        // Results streamed before an error or cancellation still count.
        let proposed = (count > 0).then(|| self.proposed_query(count));
        debug!(
            job = self.child.name(),
            description = %self.auto_query.description,
            count,
            failed = error.is_some(),
            "generated query finished"
        );
        GeneratedRun {
            alert,
            error,
            proposed,
        }
    }
}

/// Runs a query and, when it finds nothing, generated alternatives.
pub struct SmartSearchJob {
    initial: Box<dyn Job>,
    factory: JobFactory,
    plan: Vec<Basic>,
    narrow: Vec<Rule>,
    widen: Vec<Rule>,
    options: SmartSearchOptions,
}

impl SmartSearchJob {
    pub fn new(initial: Box<dyn Job>, factory: JobFactory, plan: Vec<Basic>) -> Self {
        Self {
            initial,
            factory,
            plan,
            narrow: RULES_NARROW.clone(),
            widen: RULES_WIDEN.clone(),
            options: SmartSearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SmartSearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the built-in rule tables.
    pub fn with_rules(mut self, narrow: Vec<Rule>, widen: Vec<Rule>) -> Self {
        self.narrow = narrow;
        self.widen = widen;
        self
    }

    pub fn run(&self, ctx: &SearchContext, stream: &mut dyn Sender) -> SearchOutcome {
        let threshold = self.options.result_threshold;
        let mut stream = DedupingStream::new(stream);
        let mut alerter = MaxAlerter::default();

        let initial = self.initial.run(ctx, &mut stream);
        let initial_count = stream.count();
        match initial {
            Ok(alert) => alerter.add(alert),
            Err(SearchError::NoResolvedRepos) => {
                debug!(job = self.initial.name(), "initial query resolved no repositories");
            }
            Err(error) => {
                return SearchOutcome::Failed {
                    alert: alerter.into_alert(),
                    error,
                }
            }
        }

        if initial_count >= threshold {
            info!(initial_count, threshold, "initial query reached the result limit");
            return SearchOutcome::finish(alerter.into_alert(), Vec::new(), Vec::new());
        }
        if initial_count > 0 {
            info!(initial_count, "initial query found results, not generating queries");
            return SearchOutcome::finish(alerter.into_alert(), Vec::new(), Vec::new());
        }

        info!(branches = self.plan.len(), "initial query found nothing, generating queries");
        let mut errors = Vec::new();
        let mut proposed = Vec::new();

        'plan: for seed in &self.plan {
            let generator =
                Generator::with_options(seed.clone(), &self.narrow, &self.widen, &self.options.prune);
            for auto_query in generator {
                if ctx.is_cancelled() {
                    info!("search cancelled, not running more generated queries");
                    break 'plan;
                }

                let child = match (self.factory)(&auto_query.query) {
                    Ok(child) => child,
                    Err(err) => {
                        debug!(
                            query = %auto_query.query.string_human(),
                            error = %err,
                            "skipping generated query without a job"
                        );
                        continue;
                    }
                };

                let run = GeneratedSearchJob::new(child, auto_query, threshold).run(ctx, &mut stream);
                alerter.add(run.alert);
                errors.extend(run.error);
                proposed.extend(run.proposed);

                // The initial query found nothing, so everything counted
                // came from generated queries.
                if stream.count() >= threshold {
                    info!(count = stream.count(), threshold, "generated queries reached the result limit");
                    break 'plan;
                }
            }
        }

        SearchOutcome::finish(alerter.into_alert(), errors, proposed)
    }
}
