//! Coverage fitness over a control dependence graph.
//!
//! The fitness of a target combines the approach level (how many control
//! dependences away the nearest covered ancestor is) with the normalized
//! branch distance measured at that ancestor:
//!
//! ```text
//! covered target t        : normalize(cov[t])
//! nearest covered ancestor: level + normalize(cov[ancestor])
//! nothing on the path     : MAX_FITNESS
//! ```
//!
//! Normalization maps `[0, ∞)` into `[0, 1)`, so the integral approach level
//! always dominates and branch distance only breaks ties within one level.

use super::graph::ControlDependenceGraph;
use super::target::{CodeUnitId, CoverageTarget};
use crate::search::Objective;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Fitness of a target with no covered ancestor on its path.
pub const MAX_FITNESS: f64 = f64::MAX;

/// Maps a branch distance in `[0, ∞)` into `[0, 1)`.
#[inline]
pub fn normalize(distance: f64) -> f64 {
    distance / (distance + 1.0)
}

/// Targets reached by one execution, with the branch distance measured at
/// each of them.
///
/// Written by the executor after running a chromosome, then only read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageMap {
    distances: HashMap<CoverageTarget, f64>,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a branch distance for `target`.
    ///
    /// If the target was reached more than once, the smallest distance is
    /// kept.
    pub fn record(&mut self, target: CoverageTarget, distance: f64) {
        self.distances
            .entry(target)
            .and_modify(|d| *d = d.min(distance))
            .or_insert(distance);
    }

    /// Branch distance recorded for `target`, if it was reached.
    pub fn get(&self, target: &CoverageTarget) -> Option<f64> {
        self.distances.get(target).copied()
    }

    /// Whether `target` was reached.
    pub fn contains(&self, target: &CoverageTarget) -> bool {
        self.distances.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Forgets every recorded target, ahead of a fresh execution.
    pub fn clear(&mut self) {
        self.distances.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CoverageTarget, f64)> + '_ {
        self.distances.iter().map(|(t, &d)| (t, d))
    }
}

impl FromIterator<(CoverageTarget, f64)> for CoverageMap {
    fn from_iter<I: IntoIterator<Item = (CoverageTarget, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (target, distance) in iter {
            map.record(target, distance);
        }
        map
    }
}

/// A chromosome that carries the coverage map of its last execution.
pub trait Instrumented {
    fn coverage(&self) -> &CoverageMap;
}

/// Minimizing objective for one coverage target, backed by its code unit's
/// control dependence graph.
///
/// Equality and hashing consider only the target.
#[derive(Debug, Clone)]
pub struct BlockObjective {
    target: CoverageTarget,
    cdg: Arc<ControlDependenceGraph>,
}

impl BlockObjective {
    /// Binds `target` to the graph of its code unit.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of `cdg`.
    pub fn new(cdg: Arc<ControlDependenceGraph>, target: CoverageTarget) -> Self {
        assert!(
            cdg.contains(&target),
            "target {target} is not part of the CDG of {}",
            cdg.code_unit()
        );
        Self { target, cdg }
    }

    pub fn target(&self) -> &CoverageTarget {
        &self.target
    }

    /// The code unit whose graph backs this objective.
    pub fn code_unit(&self) -> &CodeUnitId {
        self.target.code_unit()
    }

    /// Whether this objective is the root sentinel.
    pub fn is_root(&self) -> bool {
        self.target.is_root()
    }

    pub fn cdg(&self) -> &ControlDependenceGraph {
        &self.cdg
    }

    /// Fitness of this target against a coverage map.
    pub fn fitness_of(&self, coverage: &CoverageMap) -> f64 {
        if let Some(distance) = coverage.get(&self.target) {
            return normalize(distance);
        }

        let path = self.cdg.path_to(&self.target);
        let level = self.cdg.approach_level(&self.target, |t| coverage.contains(t));
        if level == path.len() {
            return MAX_FITNESS;
        }

        let ancestor = &path[path.len() - level - 1];
        let local = coverage.get(ancestor).unwrap_or(0.0);
        level as f64 + normalize(local)
    }
}

impl<C: Instrumented> Objective<C> for BlockObjective {
    fn fitness(&self, chromosome: &C) -> f64 {
        self.fitness_of(chromosome.coverage())
    }
}

impl PartialEq for BlockObjective {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for BlockObjective {}

impl Hash for BlockObjective {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

impl fmt::Display for BlockObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.target, f)
    }
}
