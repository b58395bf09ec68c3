//! Active target management.
//!
//! A [`TargetPolicy`] decides which objectives take part in ranking. MOSA
//! ranks on every objective ([`AllTargets`]). DynaMOSA starts from the
//! targets that depend only on a CDG root and opens a target's control
//! dependents once it is covered ([`DynamicTargets`]), so ranking cost
//! follows the reachable frontier instead of the whole program.
//!
//! Targets are referred to by their index in the run's objective slice.

use super::types::Objective;
use crate::cdg::{BlockObjective, CdgAnalysis, CoverageTarget};
use std::collections::HashMap;
use tracing::debug;

/// Chooses the objectives considered by ranking.
pub trait TargetPolicy<C, O: Objective<C>> {
    /// The active set before any chromosome has run.
    fn initial(&mut self, objectives: &[O]) -> Vec<usize>;

    /// Updates `active` after `population` has been executed.
    ///
    /// Returns the number of targets added.
    fn update(&mut self, objectives: &[O], active: &mut Vec<usize>, population: &[C]) -> usize;
}

/// Every objective, always. The MOSA policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTargets;

impl<C, O: Objective<C>> TargetPolicy<C, O> for AllTargets {
    fn initial(&mut self, objectives: &[O]) -> Vec<usize> {
        (0..objectives.len()).collect()
    }

    fn update(&mut self, _objectives: &[O], _active: &mut Vec<usize>, _population: &[C]) -> usize {
        0
    }
}

/// Control-dependence frontier. The DynaMOSA policy.
///
/// The active set only ever gains targets that were never active before:
/// every target that enters it, or is skipped over because it was already
/// covered, is marked visited.
#[derive(Debug, Clone, Default)]
pub struct DynamicTargets {
    roots: Vec<usize>,
    dependents: Vec<Vec<usize>>,
    visited: Vec<bool>,
}

impl DynamicTargets {
    /// Builds a frontier from explicit structure.
    ///
    /// `roots` are the initially active targets and `dependents[i]` lists the
    /// direct control dependents of target `i`.
    pub fn new(roots: Vec<usize>, dependents: Vec<Vec<usize>>) -> Self {
        let visited = vec![false; dependents.len()];
        Self {
            roots,
            dependents,
            visited,
        }
    }

    /// Derives the frontier structure of `objectives` from their graphs.
    ///
    /// Dependents that are not among `objectives` are ignored.
    ///
    /// # Panics
    ///
    /// Panics if an objective's code unit is not registered in `analysis`.
    pub fn from_analysis(analysis: &CdgAnalysis, objectives: &[BlockObjective]) -> Self {
        let index: HashMap<&CoverageTarget, usize> = objectives
            .iter()
            .enumerate()
            .map(|(i, o)| (o.target(), i))
            .collect();

        let roots = analysis
            .independent_targets()
            .iter()
            .filter_map(|t| index.get(t).copied())
            .collect();

        let dependents = objectives
            .iter()
            .map(|o| {
                analysis
                    .dependent_targets(o.target())
                    .iter()
                    .filter_map(|t| index.get(t).copied())
                    .collect()
            })
            .collect();

        Self::new(roots, dependents)
    }

    /// Whether target `i` has entered (or been skipped over by) the frontier.
    pub fn is_visited(&self, i: usize) -> bool {
        self.visited[i]
    }

    fn visit<F>(&mut self, target: usize, active: &mut Vec<usize>, covered: &mut F) -> usize
    where
        F: FnMut(usize) -> bool,
    {
        let mut added = 0;
        for k in 0..self.dependents[target].len() {
            let dependent = self.dependents[target][k];
            if self.visited[dependent] {
                continue;
            }
            self.visited[dependent] = true;
            if covered(dependent) {
                added += self.visit(dependent, active, covered);
            } else {
                active.push(dependent);
                added += 1;
            }
        }
        added
    }
}

impl<C, O: Objective<C>> TargetPolicy<C, O> for DynamicTargets {
    fn initial(&mut self, objectives: &[O]) -> Vec<usize> {
        self.visited = vec![false; objectives.len().max(self.dependents.len())];
        for &root in &self.roots {
            self.visited[root] = true;
        }
        self.roots.clone()
    }

    fn update(&mut self, objectives: &[O], active: &mut Vec<usize>, population: &[C]) -> usize {
        let mut memo: Vec<Option<bool>> = vec![None; objectives.len()];
        let mut covered = |t: usize| {
            *memo[t].get_or_insert_with(|| population.iter().any(|c| objectives[t].is_covered_by(c)))
        };

        let snapshot = active.clone();
        let mut added = 0;
        for target in snapshot {
            if covered(target) {
                active.retain(|&t| t != target);
                added += self.visit(target, active, &mut covered);
            }
        }

        if added > 0 {
            debug!(active = active.len(), added, "DynaMOSA targets updated");
        }
        added
    }
}
