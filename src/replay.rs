//! Fixture-backed search jobs.
//!
//! A fixture file stands in for a search backend. It is a JSON object:
//!
//! ```json
//! {
//!   "results": {
//!     "lang:Go parse": [
//!       {"repository": "github.com/a/b", "path": "main.go", "line_number": 3, "preview": "parse()"}
//!     ]
//!   },
//!   "failures": {
//!     "parse AND go": "backend timed out"
//!   }
//! }
//! ```
//!
//! Keys are queries. They are parsed and printed again on load, so any
//! spelling that prints the same way finds the same entry. Queries without
//! an entry return no results.

use crate::alert::Alert;
use crate::error::SearchError;
use crate::query::fields::FIELD_REPO;
use crate::query::{parse_basic, Basic, SearchType};
use crate::smartsearch::{Job, JobFactory};
use crate::streaming::{SearchContext, SearchEvent, SearchMatch, Sender};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    results: BTreeMap<String, Vec<SearchMatch>>,
    #[serde(default)]
    failures: BTreeMap<String, String>,
}

/// Canned results keyed by printed query.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    results: BTreeMap<String, Vec<SearchMatch>>,
    failures: BTreeMap<String, String>,
    repositories: BTreeSet<String>,
}

fn normalize_key(key: &str) -> Result<String, SearchError> {
    Ok(parse_basic(key, SearchType::Standard)?.string_human())
}

impl Fixture {
    /// Load a fixture from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path).map_err(SearchError::IoError)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SearchError> {
        let file: FixtureFile = serde_json::from_str(content).map_err(SearchError::JsonError)?;

        let mut fixture = Fixture::default();
        for (key, matches) in file.results {
            fixture
                .repositories
                .extend(matches.iter().map(|m| m.repository.clone()));
            fixture
                .results
                .entry(normalize_key(&key)?)
                .or_default()
                .extend(matches);
        }
        for (key, reason) in file.failures {
            fixture.failures.insert(normalize_key(&key)?, reason);
        }
        debug!(
            queries = fixture.results.len(),
            failures = fixture.failures.len(),
            repositories = fixture.repositories.len(),
            "loaded fixture"
        );
        Ok(fixture)
    }

    pub fn add(&mut self, query: &str, matches: Vec<SearchMatch>) -> Result<(), SearchError> {
        self.repositories
            .extend(matches.iter().map(|m| m.repository.clone()));
        self.results
            .entry(normalize_key(query)?)
            .or_default()
            .extend(matches);
        Ok(())
    }

    pub fn fail(&mut self, query: &str, reason: impl Into<String>) -> Result<(), SearchError> {
        self.failures.insert(normalize_key(query)?, reason.into());
        Ok(())
    }

    pub fn results(&self, query: &Basic) -> &[SearchMatch] {
        self.results
            .get(&query.string_human())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the query's `repo:` filters match any repository the fixture
    /// knows of. Queries without `repo:` filters always resolve.
    fn resolves_repos(&self, query: &Basic) -> Result<bool, SearchError> {
        let (include, _) = query.include_exclude_values(FIELD_REPO);
        if include.is_empty() {
            return Ok(true);
        }
        let filters = include
            .iter()
            .map(|value| {
                Regex::new(value).map_err(|e| SearchError::JobCreation {
                    query: query.string_human(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self
            .repositories
            .iter()
            .any(|repo| filters.iter().all(|filter| filter.is_match(repo))))
    }

    /// A factory creating [`FixtureJob`]s over this fixture.
    pub fn job_factory(self: &Rc<Self>) -> JobFactory {
        let fixture = Rc::clone(self);
        Box::new(move |query: &Basic| -> Result<Box<dyn Job>, SearchError> {
            let job = FixtureJob::new(Rc::clone(&fixture), query.clone())?;
            Ok(Box::new(job) as Box<dyn Job>)
        })
    }
}

/// Streams a fixture's results for one query, or for each branch of a plan.
#[derive(Debug)]
pub struct FixtureJob {
    fixture: Rc<Fixture>,
    queries: Vec<Basic>,
}

impl FixtureJob {
    pub fn new(fixture: Rc<Fixture>, query: Basic) -> Result<Self, SearchError> {
        Self::for_plan(fixture, vec![query])
    }

    pub fn for_plan(fixture: Rc<Fixture>, plan: Vec<Basic>) -> Result<Self, SearchError> {
        if plan.iter().all(Basic::is_empty) {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self {
            fixture,
            queries: plan,
        })
    }

    fn run_query(&self, query: &Basic, stream: &mut dyn Sender) -> Result<(), SearchError> {
        if !self.fixture.resolves_repos(query)? {
            return Err(SearchError::NoResolvedRepos);
        }
        let results = self.fixture.results(query);
        if !results.is_empty() {
            stream.send(SearchEvent::new(results.to_vec()));
        }
        match self.fixture.failures.get(&query.string_human()) {
            Some(reason) => Err(SearchError::SearchFailed {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Job for FixtureJob {
    fn name(&self) -> &'static str {
        "FixtureJob"
    }

    /// Branches run in order. The first failing branch ends the run, except
    /// that a branch resolving no repositories only fails the run when no
    /// branch resolved any.
    fn run(
        &self,
        ctx: &SearchContext,
        stream: &mut dyn Sender,
    ) -> Result<Option<Alert>, SearchError> {
        let mut resolved = false;
        for query in &self.queries {
            if ctx.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            match self.run_query(query, stream) {
                Ok(()) => resolved = true,
                Err(SearchError::NoResolvedRepos) => {
                    debug!(query = %query.string_human(), "no repositories resolved");
                }
                Err(err) => return Err(err),
            }
        }
        if resolved {
            Ok(None)
        } else {
            Err(SearchError::NoResolvedRepos)
        }
    }
}
