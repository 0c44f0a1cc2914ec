//! Result streaming.
//!
//! Search jobs send batches of matches to a [`Sender`]. A
//! [`DedupingStream`] around the parent sender drops repeated matches and
//! counts the distinct ones.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single matched line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchMatch {
    pub repository: String,
    pub path: String,
    pub line_number: u32,
    pub preview: String,
}

impl SearchMatch {
    pub fn new(
        repository: impl Into<String>,
        path: impl Into<String>,
        line_number: u32,
        preview: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
            line_number,
            preview: preview.into(),
        }
    }

    /// Identity of the match location. Two matches with the same key are the
    /// same result even if their previews differ.
    pub fn key(&self) -> MatchKey {
        MatchKey {
            repository: self.repository.clone(),
            path: self.path.clone(),
            line_number: self.line_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub repository: String,
    pub path: String,
    pub line_number: u32,
}

/// A batch of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchEvent {
    pub results: Vec<SearchMatch>,
}

impl SearchEvent {
    pub fn new(results: Vec<SearchMatch>) -> Self {
        Self { results }
    }
}

pub trait Sender {
    fn send(&mut self, event: SearchEvent);
}

/// Buffers every event it receives.
#[derive(Debug, Default)]
pub struct CollectingSender {
    events: Vec<SearchEvent>,
}

impl CollectingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SearchEvent] {
        &self.events
    }

    pub fn results(&self) -> impl Iterator<Item = &SearchMatch> {
        self.events.iter().flat_map(|event| event.results.iter())
    }

    pub fn into_results(self) -> Vec<SearchMatch> {
        self.events.into_iter().flat_map(|event| event.results).collect()
    }
}

impl Sender for CollectingSender {
    fn send(&mut self, event: SearchEvent) {
        self.events.push(event);
    }
}

/// Drops results already sent through this stream and counts the rest.
/// Events left empty are not forwarded.
pub struct DedupingStream<'a> {
    parent: &'a mut dyn Sender,
    seen: HashSet<MatchKey>,
}

impl<'a> DedupingStream<'a> {
    pub fn new(parent: &'a mut dyn Sender) -> Self {
        Self {
            parent,
            seen: HashSet::new(),
        }
    }

    /// Distinct results forwarded so far.
    pub fn count(&self) -> usize {
        self.seen.len()
    }
}

impl Sender for DedupingStream<'_> {
    fn send(&mut self, mut event: SearchEvent) {
        event.results.retain(|m| self.seen.insert(m.key()));
        if !event.results.is_empty() {
            self.parent.send(event);
        }
    }
}

/// Cancellation state shared by everything running on behalf of one search.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    cancelled: Arc<AtomicBool>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `flag` as the cancellation flag, e.g. one registered with a
    /// signal handler.
    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Self { cancelled: flag }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
