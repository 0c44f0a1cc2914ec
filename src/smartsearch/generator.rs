//! Combinatorial generation of alternative queries.
//!
//! Rules come in two kinds. Narrowing rules are expected to make a query
//! more specific (`go parse` to `lang:Go parse`), widening rules to make it
//! more general (`a b` to `a AND b`). The generator walks three phases:
//!
//! 1. Every combination of narrowing rules, from all `N` rules down to
//!    single rules. The most specific interpretation comes first.
//! 2. The same narrowing combinations, each followed by one widening rule,
//!    for each widening rule in order.
//! 3. Each widening rule on its own.
//!
//! Both rule sets are first pruned to the rules that apply to the seed query
//! on their own. Combinations that don't apply are skipped.

use crate::query::Basic;
use crate::smartsearch::options::PruneOptions;
use crate::smartsearch::rules::{apply_transformation, prune_rules, Rule};
use crate::smartsearch::transforms::{Transform, TransformError};
use serde::Serialize;
use tracing::{debug, warn};

/// Separator between rule descriptions of a combination.
pub const DESCRIPTION_SEPARATOR: &str = " ⚬ ";

/// A generated query and the rules that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoQuery {
    pub description: String,
    pub query: Basic,
}

/// Size-`k` combinations of `0..n` in lexicographic order. There are no
/// combinations of size 0.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    next: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        let next = (k > 0 && k <= n).then(|| (0..k).collect());
        Self { n, next }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let k = current.len();
        // Rightmost index that can still move right.
        if let Some(i) = (0..k).rev().find(|&i| current[i] < self.n - k + i) {
            let mut successor = current.clone();
            successor[i] += 1;
            for j in i + 1..k {
                successor[j] = successor[j - 1] + 1;
            }
            self.next = Some(successor);
        }
        Some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    One,
    Two,
    Three,
}

/// Lazily yields [`AutoQuery`]s for a seed query. See the module docs for
/// the order.
#[derive(Debug, Clone)]
pub struct Generator {
    seed: Basic,
    narrow: Vec<Rule>,
    widen: Vec<Rule>,
    phase: Phase,
    /// Size of the narrowing combinations being enumerated.
    k: usize,
    combinations: Combinations,
    /// Index of the widening rule being applied.
    w: usize,
}

impl Generator {
    pub fn new(seed: Basic, narrow: &[Rule], widen: &[Rule]) -> Self {
        Self::with_options(seed, narrow, widen, &PruneOptions::default())
    }

    pub fn with_options(seed: Basic, narrow: &[Rule], widen: &[Rule], options: &PruneOptions) -> Self {
        let narrow = prune_rules(&seed, narrow, options);
        let widen = prune_rules(&seed, widen, options);
        let num = narrow.len();
        debug!(
            query = %seed.string_human(),
            narrow = num,
            widen = widen.len(),
            "generator rules pruned"
        );

        let phase = if num == 0 { Phase::Three } else { Phase::One };
        Self {
            seed,
            narrow,
            widen,
            phase,
            k: num,
            combinations: Combinations::new(num, num),
            w: 0,
        }
    }

    fn restart_narrowing(&mut self) {
        self.k = self.narrow.len();
        self.combinations = Combinations::new(self.k, self.k);
    }

    fn shrink_narrowing(&mut self) {
        self.k -= 1;
        self.combinations = Combinations::new(self.narrow.len(), self.k);
    }

    /// Indices of the next combination of narrowing rules to try, and the
    /// widening rule to follow it with, advancing phases as they run out.
    /// None once every phase is exhausted.
    fn next_combination(&mut self) -> Option<(Vec<usize>, Option<usize>)> {
        loop {
            match self.phase {
                Phase::One => {
                    if self.k == 0 {
                        self.phase = Phase::Two;
                        self.w = 0;
                        self.restart_narrowing();
                        continue;
                    }
                    match self.combinations.next() {
                        Some(indices) => return Some((indices, None)),
                        None => self.shrink_narrowing(),
                    }
                }
                Phase::Two => {
                    if self.w >= self.widen.len() {
                        self.phase = Phase::Three;
                        self.w = 0;
                        continue;
                    }
                    if self.k == 0 {
                        self.w += 1;
                        self.restart_narrowing();
                        continue;
                    }
                    match self.combinations.next() {
                        Some(indices) => return Some((indices, Some(self.w))),
                        None => self.shrink_narrowing(),
                    }
                }
                Phase::Three => {
                    if self.w >= self.widen.len() {
                        return None;
                    }
                    self.w += 1;
                    return Some((Vec::new(), Some(self.w - 1)));
                }
            }
        }
    }
}

impl Iterator for Generator {
    type Item = AutoQuery;

    fn next(&mut self) -> Option<AutoQuery> {
        loop {
            let (narrow, widen) = self.next_combination()?;
            let rules: Vec<&Rule> = narrow
                .into_iter()
                .map(|i| &self.narrow[i])
                .chain(widen.map(|w| &self.widen[w]))
                .collect();
            let transform: Vec<Transform> = rules
                .iter()
                .flat_map(|rule| rule.transform.iter().copied())
                .collect();
            let description = rules
                .iter()
                .map(|rule| rule.description.as_str())
                .collect::<Vec<_>>()
                .join(DESCRIPTION_SEPARATOR);

            match apply_transformation(&self.seed, &transform) {
                Ok(query) => return Some(AutoQuery { description, query }),
                Err(TransformError::NotApplicable) => {
                    debug!(%description, "rule combination does not apply");
                }
                Err(TransformError::Internal(reason)) => {
                    warn!(%description, query = %self.seed.string_human(), %reason, "rule combination failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(n: usize, k: usize) -> Vec<Vec<usize>> {
        Combinations::new(n, k).collect()
    }

    #[test]
    fn test_combinations_lexicographic() {
        assert_eq!(
            all(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(all(3, 3), vec![vec![0, 1, 2]]);
        assert_eq!(all(3, 1), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_combinations_empty() {
        assert!(all(3, 0).is_empty());
        assert!(all(2, 3).is_empty());
        assert!(all(0, 0).is_empty());
    }
}
