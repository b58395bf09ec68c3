//! Core trait definitions for the many-objective search.
//!
//! The engine is generic over the chromosome representation and the
//! objective type. Concrete test-case encodings, execution, and the
//! variation operators' internals live outside the crate and plug in
//! through these traits.

use rand::Rng;

/// A candidate test case under evolution.
///
/// Chromosomes are values: [`Clone`] is the copy operator and
/// [`PartialEq`] is the equality used to de-duplicate the archive.
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone, PartialEq)]
/// struct TestCase {
///     statements: Vec<Statement>,
///     coverage: CoverageMap,
/// }
///
/// impl Chromosome for TestCase {
///     fn size(&self) -> usize { self.statements.len() }
///
///     fn mutate<R: Rng>(&self, rng: &mut R) -> Self {
///         let mut child = self.clone();
///         child.statements.remove(rng.random_range(0..child.statements.len()));
///         child
///     }
/// }
/// ```
pub trait Chromosome: Clone + PartialEq + Send + Sync {
    /// Number of statements. Shorter chromosomes win archive ties.
    fn size(&self) -> usize;

    /// Returns a mutated copy.
    ///
    /// The default implementation returns an unchanged copy.
    fn mutate<R: Rng>(&self, _rng: &mut R) -> Self {
        self.clone()
    }

    /// Recombines two parents into two children.
    ///
    /// The default implementation returns copies of both parents.
    fn crossover<R: Rng>(&self, other: &Self, _rng: &mut R) -> (Self, Self) {
        (self.clone(), other.clone())
    }
}

/// A minimizing fitness function bound to one coverage goal.
///
/// `fitness` is a pure read of the chromosome's last execution and lies in
/// `[0, MAX)`; `0` means covered.
pub trait Objective<C>: Send + Sync {
    fn fitness(&self, chromosome: &C) -> f64;

    /// Whether `chromosome` covers this objective.
    fn is_covered_by(&self, chromosome: &C) -> bool {
        self.fitness(chromosome) == 0.0
    }
}

/// Creates fresh random chromosomes.
pub trait ChromosomeGenerator<C>: Send + Sync {
    fn generate<R: Rng>(&self, rng: &mut R) -> C;
}

/// Runs chromosomes and records their coverage.
///
/// `execute` must leave every chromosome of `population` with an up-to-date
/// coverage record before it returns; fitness is only evaluated afterwards.
/// A chromosome that fails to run keeps an empty record and is simply
/// maximally unfit.
pub trait Executor<C> {
    fn execute(&mut self, population: &mut [C]);
}

/// Produces the offspring population of one generation.
///
/// `population` arrives ordered by preference rank: index 0 is the best
/// individual of the previous survival step.
pub trait OffspringGenerator<C> {
    fn offspring<R: Rng>(&self, population: &[C], size: usize, rng: &mut R) -> Vec<C>;
}

impl<C, G: ChromosomeGenerator<C>> ChromosomeGenerator<C> for &G {
    fn generate<R: Rng>(&self, rng: &mut R) -> C {
        (**self).generate(rng)
    }
}

impl<C, E: Executor<C>> Executor<C> for &mut E {
    fn execute(&mut self, population: &mut [C]) {
        (**self).execute(population);
    }
}

impl<C, X: OffspringGenerator<C>> OffspringGenerator<C> for &X {
    fn offspring<R: Rng>(&self, population: &[C], size: usize, rng: &mut R) -> Vec<C> {
        (**self).offspring(population, size, rng)
    }
}
