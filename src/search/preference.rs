//! Preference sorting for many-objective coverage search.
//!
//! Classic NSGA-II front 0 is replaced by a *preference front*: for every
//! objective still uncovered by the population, the individual closest to
//! covering it. The rest of the population is ranked by non-dominated
//! sorting restricted to those uncovered objectives.
//!
//! ```text
//!   front 0   best approacher of each uncovered column (first seen wins ties)
//!   front 1.. non_dominated_sort(remainder, uncovered columns)
//! ```
//!
//! Survivors are then taken front by front, each front ordered by
//! sub-vector dominance, until the population is full.

use super::matrix::FitnessMatrix;
use super::multi_objective::{non_dominated_sort_with, svd_sort, DominationStrategy, Pareto};

/// Result of preference sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceFronts {
    /// Matrix row indices grouped by rank, best front first.
    pub fronts: Vec<Vec<usize>>,

    /// Matrix columns no individual covers. Remaining fronts are ranked on
    /// these columns only.
    pub uncovered: Vec<usize>,
}

impl PreferenceFronts {
    /// Total number of ranked individuals.
    pub fn len(&self) -> usize {
        self.fronts.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fronts.is_empty()
    }
}

/// Preference sorting with [`Pareto`] dominance.
///
/// See [`preference_sort_with`].
pub fn preference_sort(matrix: &FitnessMatrix) -> PreferenceFronts {
    preference_sort_with(&Pareto, matrix)
}

/// Ranks every row of `matrix` into preference fronts.
///
/// For each column, the row with minimal fitness is found (the first such row
/// wins exact ties). When that minimum is not `0`, the column is uncovered and
/// its best row joins front 0. A row can represent several columns but
/// appears once, in the order it was first chosen.
///
/// The remaining rows are ranked by non-dominated sorting on the uncovered
/// columns and appended as fronts 1, 2, … When every column is covered
/// there is no preference front and the fronts start with the non-dominated
/// ones.
///
/// The fronts partition the rows exactly.
///
/// # Example
///
/// ```
/// use u_mosa::search::{preference_sort, FitnessMatrix};
///
/// let m = FitnessMatrix::from_rows(vec![
///     vec![0.0, 2.0], // covers column 0
///     vec![1.0, 0.5], // best approacher of column 1
///     vec![1.0, 3.0],
/// ]);
///
/// let sorted = preference_sort(&m);
/// assert_eq!(sorted.uncovered, vec![1]);
/// assert_eq!(sorted.fronts, vec![vec![1], vec![0], vec![2]]);
/// ```
pub fn preference_sort_with<D: DominationStrategy>(strategy: &D, matrix: &FitnessMatrix) -> PreferenceFronts {
    let n = matrix.len();
    if n == 0 {
        return PreferenceFronts::default();
    }

    let mut in_front0 = vec![false; n];
    let mut front0 = Vec::new();
    let mut uncovered = Vec::new();

    for column in 0..matrix.columns() {
        let mut best = 0;
        for i in 1..n {
            if matrix.get(i, column) < matrix.get(best, column) {
                best = i;
            }
        }
        if matrix.get(best, column) > 0.0 {
            uncovered.push(column);
            if !in_front0[best] {
                in_front0[best] = true;
                front0.push(best);
            }
        }
    }

    let remainder: Vec<usize> = (0..n).filter(|&i| !in_front0[i]).collect();

    let mut fronts = Vec::new();
    if !front0.is_empty() {
        fronts.push(front0);
    }
    fronts.extend(non_dominated_sort_with(strategy, matrix, &remainder, &uncovered).fronts);

    PreferenceFronts { fronts, uncovered }
}

/// Selects `size` survivors from the rows of `matrix`.
///
/// Fronts are admitted in rank order. Each front is ordered by sub-vector
/// dominance over every column before its members are appended; the last
/// admitted front may be cut short. The returned order is the preference
/// order the next generation's selection sees.
pub fn survivors(matrix: &FitnessMatrix, size: usize) -> Vec<usize> {
    survivors_with(&Pareto, matrix, size)
}

/// [`survivors`] with a custom dominance test.
pub fn survivors_with<D: DominationStrategy>(strategy: &D, matrix: &FitnessMatrix, size: usize) -> Vec<usize> {
    let columns: Vec<usize> = (0..matrix.columns()).collect();
    let sorted = preference_sort_with(strategy, matrix);

    let mut selected = Vec::with_capacity(size.min(matrix.len()));
    for front in &sorted.fronts {
        if selected.len() >= size {
            break;
        }
        let ordered = svd_sort(matrix, front, &columns);
        let room = size - selected.len();
        selected.extend(ordered.into_iter().take(room));
    }
    selected
}
