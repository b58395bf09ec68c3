//! Population × target fitness table.
//!
//! Ranking compares the same `(individual, objective)` fitness values many
//! times, so they are evaluated once per generation into a dense table.
//! Column `j` holds the fitness for `targets[j]`.

use super::types::Objective;

/// Fitness values of a population against a set of targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitnessMatrix {
    rows: Vec<Vec<f64>>,
    columns: usize,
}

impl FitnessMatrix {
    /// Evaluates every individual against `objectives[t]` for each `t` in
    /// `targets`.
    ///
    /// With the `parallel` feature and `parallel == true`, rows are computed
    /// on the rayon pool. Evaluation only reads the individuals' execution
    /// records, which are complete by the time ranking starts.
    pub fn evaluate<C, O>(population: &[C], objectives: &[O], targets: &[usize], parallel: bool) -> Self
    where
        C: Sync,
        O: Objective<C>,
    {
        let row = |individual: &C| -> Vec<f64> {
            targets
                .iter()
                .map(|&t| objectives[t].fitness(individual))
                .collect()
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if parallel {
                return Self {
                    rows: population.par_iter().map(&row).collect(),
                    columns: targets.len(),
                };
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        Self {
            rows: population.iter().map(row).collect(),
            columns: targets.len(),
        }
    }

    /// Builds a matrix from explicit rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let columns = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|r| r.len() == columns),
            "all fitness rows must have the same length"
        );
        Self { rows, columns }
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of targets.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Fitness vector of individual `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    /// Fitness of individual `i` for column `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }
}
