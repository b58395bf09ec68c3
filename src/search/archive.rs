//! Best-known cover per objective.
//!
//! The archive is the only output of a search run. It keeps, for every
//! objective, the shortest chromosome ever seen with fitness `0`. Entries are
//! only ever replaced by an equal-or-shorter cover, so covered objectives
//! never become uncovered again.

use super::types::{Chromosome, Objective};

/// Shortest covering chromosome per objective.
///
/// `objectives` is the full objective set of the run; entry `i` belongs to
/// `objectives[i]`.
#[derive(Debug, Clone)]
pub struct Archive<'a, O, C> {
    objectives: &'a [O],
    entries: Vec<Option<C>>,
    best_fitness: Vec<f64>,
}

impl<'a, O, C> Archive<'a, O, C>
where
    O: Objective<C>,
    C: Chromosome,
{
    pub fn new(objectives: &'a [O]) -> Self {
        Self {
            objectives,
            entries: vec![None; objectives.len()],
            best_fitness: vec![f64::MAX; objectives.len()],
        }
    }

    /// Records every cover found in `population`.
    ///
    /// A chromosome with fitness `0` for an objective replaces that
    /// objective's entry when it is no longer than the current one. Ties go
    /// to the later chromosome. Calling `update` again with the same
    /// population leaves the covered set and every entry length unchanged.
    ///
    /// Returns the number of objectives that were uncovered before this call.
    pub fn update(&mut self, population: &[C]) -> usize {
        let mut newly_covered = 0;
        for (i, objective) in self.objectives.iter().enumerate() {
            let was_covered = self.entries[i].is_some();
            let mut best_len = self.entries[i].as_ref().map_or(usize::MAX, Chromosome::size);

            for chromosome in population {
                let fitness = objective.fitness(chromosome);
                if fitness < self.best_fitness[i] {
                    self.best_fitness[i] = fitness;
                }
                if fitness == 0.0 && chromosome.size() <= best_len {
                    best_len = chromosome.size();
                    self.entries[i] = Some(chromosome.clone());
                }
            }

            if !was_covered && self.entries[i].is_some() {
                newly_covered += 1;
            }
        }
        newly_covered
    }

    /// Distinct archived chromosomes, in objective order of first reference.
    pub fn get(&self) -> Vec<C> {
        let mut tests: Vec<C> = Vec::new();
        for chromosome in self.entries.iter().flatten() {
            if !tests.contains(chromosome) {
                tests.push(chromosome.clone());
            }
        }
        tests
    }

    /// The cover of `objectives[index]`, if any.
    pub fn entry(&self, index: usize) -> Option<&C> {
        self.entries[index].as_ref()
    }

    /// Whether `objectives[index]` is covered.
    pub fn is_covered(&self, index: usize) -> bool {
        self.entries[index].is_some()
    }

    /// Number of covered objectives.
    pub fn covered_targets(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Total number of objectives.
    pub fn total_targets(&self) -> usize {
        self.objectives.len()
    }

    /// Covered objectives in percent; 100 for an empty objective set.
    pub fn coverage(&self) -> f64 {
        if self.objectives.is_empty() {
            return 100.0;
        }
        self.covered_targets() as f64 * 100.0 / self.objectives.len() as f64
    }

    /// Sum over all objectives of the best fitness ever observed.
    ///
    /// Objectives never evaluated or never approached contribute `f64::MAX`.
    pub fn fitness_sum(&self) -> f64 {
        self.best_fitness.iter().sum()
    }

    /// Number of distinct archived chromosomes.
    pub fn size(&self) -> usize {
        self.get().len()
    }

    /// Mean statement count of the distinct archived chromosomes; 0 when empty.
    pub fn average_length(&self) -> f64 {
        let tests = self.get();
        if tests.is_empty() {
            return 0.0;
        }
        tests.iter().map(Chromosome::size).sum::<usize>() as f64 / tests.len() as f64
    }

    pub fn objectives(&self) -> &'a [O] {
        self.objectives
    }
}
