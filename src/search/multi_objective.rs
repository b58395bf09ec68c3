//! Many-objective ranking utilities.
//!
//! Domain-agnostic building blocks over a [`FitnessMatrix`]. All objectives
//! are **minimized**. Every function works on a subset of the matrix rows
//! (`members`) and a subset of its columns (`columns`), so callers can rank
//! part of a population against part of the objective set without copying.
//!
//! # Algorithms
//!
//! - [`Pareto`]: the [`DominationStrategy`] used everywhere by default
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`subvector_dominance`] / [`svd_sort`]: sub-vector dominance density
//!   estimation (de Freitas et al., 2015), used instead of crowding distance
//!   because crowding is unstable in very high-dimensional, sparse objective
//!   spaces
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Panichella, Kifetew, Tonella (2015), "Reformulating Branch Coverage as a
//!   Many-Objective Optimization Problem"

use super::matrix::FitnessMatrix;

/// Dominance comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Pairwise dominance test between two fitness vectors.
pub trait DominationStrategy {
    /// Whether `a` dominates `b` on the given columns.
    fn dominates(&self, a: &[f64], b: &[f64], columns: &[usize]) -> bool;

    /// Both directions at once.
    fn compare(&self, a: &[f64], b: &[f64], columns: &[usize]) -> Dominance {
        if self.dominates(a, b, columns) {
            Dominance::Left
        } else if self.dominates(b, a, columns) {
            Dominance::Right
        } else {
            Dominance::Neither
        }
    }
}

/// Pareto dominance (minimization).
///
/// `a` dominates `b` iff `b` is strictly better on no column and `a` is
/// strictly better on at least one. Irreflexive and antisymmetric; identical
/// vectors never dominate each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pareto;

impl DominationStrategy for Pareto {
    fn dominates(&self, a: &[f64], b: &[f64], columns: &[usize]) -> bool {
        self.compare(a, b, columns) == Dominance::Left
    }

    fn compare(&self, a: &[f64], b: &[f64], columns: &[usize]) -> Dominance {
        let mut a_better_in_some = false;
        let mut b_better_in_some = false;

        for &j in columns {
            let (va, vb) = (a[j], b[j]);
            if va < vb {
                a_better_in_some = true;
            } else if vb < va {
                b_better_in_some = true;
            }
        }

        match (a_better_in_some, b_better_in_some) {
            (true, false) => Dominance::Left,
            (false, true) => Dominance::Right,
            _ => Dominance::Neither,
        }
    }
}

/// Result of non-dominated sorting.
#[derive(Debug, Clone, Default)]
pub struct NondominatedSortResult {
    /// Pareto rank of `members[k]` at position `k` (0 = first front).
    pub ranks: Vec<usize>,

    /// Matrix row indices grouped by front: `fronts[0]` holds rank 0, etc.
    pub fronts: Vec<Vec<usize>>,
}

/// Fast non-dominated sorting with [`Pareto`] dominance.
///
/// See [`non_dominated_sort_with`].
///
/// # Example
///
/// ```
/// use u_mosa::search::{non_dominated_sort, FitnessMatrix};
///
/// let m = FitnessMatrix::from_rows(vec![
///     vec![1.0, 5.0], // A
///     vec![3.0, 3.0], // B
///     vec![5.0, 1.0], // C
///     vec![4.0, 4.0], // D, dominated by B
/// ]);
///
/// let result = non_dominated_sort(&m, &[0, 1, 2, 3], &[0, 1]);
/// assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3]]);
/// ```
pub fn non_dominated_sort(
    matrix: &FitnessMatrix,
    members: &[usize],
    columns: &[usize],
) -> NondominatedSortResult {
    non_dominated_sort_with(&Pareto, matrix, members, columns)
}

/// Fast non-dominated sorting (Deb et al., 2002).
///
/// Partitions `members` into fronts: every member lands in exactly one
/// front, front 0 is mutually non-dominated, and every member of front
/// `k > 0` is dominated by at least one member of front `k - 1`. Within a
/// front, members keep their order in `members`.
///
/// # Complexity
///
/// O(m · n²) where m = `columns.len()`, n = `members.len()`
pub fn non_dominated_sort_with<D: DominationStrategy>(
    strategy: &D,
    matrix: &FitnessMatrix,
    members: &[usize],
    columns: &[usize],
) -> NondominatedSortResult {
    let n = members.len();
    if n == 0 {
        return NondominatedSortResult::default();
    }
    if n == 1 {
        return NondominatedSortResult {
            ranks: vec![0],
            fronts: vec![vec![members[0]]],
        };
    }

    let mut domination_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            match strategy.compare(matrix.row(members[i]), matrix.row(members[j]), columns) {
                Dominance::Left => {
                    dominates[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominates[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    let mut fronts = Vec::new();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominates[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len() + 1;
                    next.push(j);
                }
            }
        }
        // Keep input order inside a front.
        next.sort_unstable();
        fronts.push(current.iter().map(|&i| members[i]).collect());
        current = next;
    }

    NondominatedSortResult { ranks, fronts }
}

/// Sub-vector dominance score of each member.
///
/// For member `i`, the score is the largest number of columns on which any
/// other member `j` is strictly better than `i`. Lower is better: the
/// individual is out-performed in breadth by fewer competitors. Scores are
/// returned in `members` order.
///
/// If `a` Pareto-dominates `b` then `score(a) <= score(b)`. With no columns
/// every score is 0.
///
/// # Complexity
///
/// O(m · n²)
pub fn subvector_dominance(matrix: &FitnessMatrix, members: &[usize], columns: &[usize]) -> Vec<usize> {
    members
        .iter()
        .map(|&i| {
            let row_i = matrix.row(i);
            members
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| {
                    let row_j = matrix.row(j);
                    columns.iter().filter(|&&c| row_j[c] < row_i[c]).count()
                })
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Orders `members` ascending by [`subvector_dominance`] score.
///
/// The sort is stable: members with equal scores keep their relative order.
///
/// # Example
///
/// ```
/// use u_mosa::search::{svd_sort, FitnessMatrix};
///
/// let m = FitnessMatrix::from_rows(vec![
///     vec![3.0, 3.0, 3.0], // beaten on all three columns by row 1
///     vec![1.0, 1.0, 1.0],
///     vec![2.0, 0.0, 2.0],
/// ]);
///
/// assert_eq!(svd_sort(&m, &[0, 1, 2], &[0, 1, 2]), vec![1, 2, 0]);
/// ```
pub fn svd_sort(matrix: &FitnessMatrix, members: &[usize], columns: &[usize]) -> Vec<usize> {
    let scores = subvector_dominance(matrix, members, columns);
    let mut order: Vec<usize> = (0..members.len()).collect();
    order.sort_by_key(|&k| scores[k]);
    order.into_iter().map(|k| members[k]).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn all(m: &FitnessMatrix) -> (Vec<usize>, Vec<usize>) {
        ((0..m.len()).collect(), (0..m.columns()).collect())
    }

    fn sort(rows: Vec<Vec<f64>>) -> NondominatedSortResult {
        let m = FitnessMatrix::from_rows(rows);
        let (members, columns) = all(&m);
        non_dominated_sort(&m, &members, &columns)
    }

    // ---- Dominance ----

    #[test]
    fn test_identical_vectors_do_not_dominate() {
        let a = [1.0, 2.0];
        assert!(!Pareto.dominates(&a, &a, &[0, 1]));
        assert_eq!(Pareto.compare(&a, &a, &[0, 1]), Dominance::Neither);
    }

    #[test]
    fn test_dominance_restricted_to_columns() {
        let a = [1.0, 9.0];
        let b = [2.0, 0.0];
        assert_eq!(Pareto.compare(&a, &b, &[0, 1]), Dominance::Neither);
        assert_eq!(Pareto.compare(&a, &b, &[0]), Dominance::Left);
        assert_eq!(Pareto.compare(&a, &b, &[1]), Dominance::Right);
        assert_eq!(Pareto.compare(&a, &b, &[]), Dominance::Neither);
    }

    // ---- Non-dominated sort ----

    #[test]
    fn test_single_solution() {
        let result = sort(vec![vec![1.0, 2.0]]);
        assert_eq!(result.ranks, vec![0]);
        assert_eq!(result.fronts, vec![vec![0]]);
    }

    #[test]
    fn test_empty_members() {
        let m = FitnessMatrix::from_rows(vec![vec![1.0]]);
        let result = non_dominated_sort(&m, &[], &[0]);
        assert!(result.fronts.is_empty());
    }

    #[test]
    fn test_two_non_dominated() {
        let result = sort(vec![vec![1.0, 3.0], vec![3.0, 1.0]]);
        assert_eq!(result.ranks, vec![0, 0]);
        assert_eq!(result.fronts.len(), 1);
    }

    #[test]
    fn test_clear_dominance() {
        let result = sort(vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]]);
        assert_eq!(result.ranks, vec![0, 1, 2]);
        assert_eq!(result.fronts, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_mixed_fronts() {
        let result = sort(vec![
            vec![1.0, 5.0], // front 0
            vec![3.0, 3.0], // front 0
            vec![5.0, 1.0], // front 0
            vec![4.0, 4.0], // dominated by [1] → front 1
            vec![6.0, 6.0], // dominated by [3] → front 2
        ]);
        assert_eq!(result.ranks, vec![0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_all_equal() {
        let result = sort(vec![vec![2.0, 2.0]; 3]);
        assert!(result.ranks.iter().all(|&r| r == 0));
    }

    #[test]
    fn test_member_subset_reports_row_indices() {
        let m = FitnessMatrix::from_rows(vec![
            vec![0.0, 0.0], // excluded
            vec![2.0, 2.0],
            vec![1.0, 1.0],
        ]);
        let result = non_dominated_sort(&m, &[1, 2], &[0, 1]);
        assert_eq!(result.fronts, vec![vec![2], vec![1]]);
        assert_eq!(result.ranks, vec![1, 0]);
    }

    #[test]
    fn test_max_fitness_rows_are_comparable() {
        let max = f64::MAX;
        let result = sort(vec![vec![max, max], vec![1.0, max], vec![max, max]]);
        assert_eq!(result.fronts, vec![vec![1], vec![0, 2]]);
    }

    // ---- Sub-vector dominance ----

    #[test]
    fn test_svd_scores() {
        let m = FitnessMatrix::from_rows(vec![
            vec![1.0, 5.0, 5.0],
            vec![2.0, 1.0, 1.0],
            vec![3.0, 3.0, 0.0],
        ]);
        let (members, columns) = all(&m);
        // 0 is beaten on 2 columns by both 1 and 2; 1 on 1 column by 0 and by 2;
        // 2 on 2 columns by 1.
        assert_eq!(subvector_dominance(&m, &members, &columns), vec![2, 1, 2]);
        assert_eq!(svd_sort(&m, &members, &columns), vec![1, 0, 2]);
    }

    #[test]
    fn test_svd_no_columns_preserves_order() {
        let m = FitnessMatrix::from_rows(vec![vec![3.0], vec![1.0], vec![2.0]]);
        let members = [2, 0, 1];
        assert_eq!(subvector_dominance(&m, &members, &[]), vec![0, 0, 0]);
        assert_eq!(svd_sort(&m, &members, &[]), vec![2, 0, 1]);
    }

    #[test]
    fn test_svd_single_member() {
        let m = FitnessMatrix::from_rows(vec![vec![3.0]]);
        assert_eq!(subvector_dominance(&m, &[0], &[0]), vec![0]);
    }

    // ---- Properties ----

    fn matrix_strategy() -> impl Strategy<Value = FitnessMatrix> {
        (1usize..5).prop_flat_map(|cols| {
            prop::collection::vec(prop::collection::vec(0u8..4, cols), 1..12)
                .prop_map(|rows| {
                    FitnessMatrix::from_rows(
                        rows.into_iter()
                            .map(|r| r.into_iter().map(f64::from).collect())
                            .collect(),
                    )
                })
        })
    }

    proptest! {
        #[test]
        fn prop_fronts_partition_population(m in matrix_strategy()) {
            let (members, columns) = all(&m);
            let result = non_dominated_sort(&m, &members, &columns);

            let mut seen: Vec<usize> = result.fronts.iter().flatten().copied().collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, members.clone());
            prop_assert!(result.fronts.iter().all(|f| !f.is_empty()));

            for (rank, front) in result.fronts.iter().enumerate() {
                for &i in front {
                    prop_assert_eq!(result.ranks[i], rank);
                }
            }
        }

        #[test]
        fn prop_front_zero_mutually_non_dominated(m in matrix_strategy()) {
            let (members, columns) = all(&m);
            let result = non_dominated_sort(&m, &members, &columns);
            for &a in &result.fronts[0] {
                for &b in &result.fronts[0] {
                    prop_assert!(!Pareto.dominates(m.row(a), m.row(b), &columns));
                }
            }
        }

        #[test]
        fn prop_later_fronts_dominated_by_previous(m in matrix_strategy()) {
            let (members, columns) = all(&m);
            let result = non_dominated_sort(&m, &members, &columns);
            for k in 1..result.fronts.len() {
                for &b in &result.fronts[k] {
                    let dominated = result.fronts[k - 1]
                        .iter()
                        .any(|&a| Pareto.dominates(m.row(a), m.row(b), &columns));
                    prop_assert!(dominated, "member {} of front {} has no dominator in front {}", b, k, k - 1);
                }
            }
        }

        #[test]
        fn prop_dominance_irreflexive_antisymmetric(
            a in prop::collection::vec(0u8..4, 4),
            b in prop::collection::vec(0u8..4, 4),
        ) {
            let a: Vec<f64> = a.into_iter().map(f64::from).collect();
            let b: Vec<f64> = b.into_iter().map(f64::from).collect();
            let cols = [0, 1, 2, 3];
            prop_assert!(!Pareto.dominates(&a, &a, &cols));
            prop_assert!(!(Pareto.dominates(&a, &b, &cols) && Pareto.dominates(&b, &a, &cols)));
            if a == b {
                prop_assert!(!Pareto.dominates(&a, &b, &cols));
            }
        }

        #[test]
        fn prop_svd_respects_dominance(m in matrix_strategy()) {
            let (members, columns) = all(&m);
            let scores = subvector_dominance(&m, &members, &columns);
            for &a in &members {
                for &b in &members {
                    if Pareto.dominates(m.row(a), m.row(b), &columns) {
                        prop_assert!(scores[a] <= scores[b]);
                    }
                }
            }
        }
    }
}
