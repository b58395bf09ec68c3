//! Default offspring generation: selection → crossover → mutation.

use super::selection::Selection;
use super::types::{Chromosome, OffspringGenerator};
use rand::Rng;

/// Breeds offspring from a preference-ordered population.
///
/// Each step selects two parents, recombines them with probability
/// `crossover_rate` (otherwise copies them), and mutates each child with
/// probability `mutation_rate`. When only one slot is left, one of the two
/// children is kept at random.
///
/// # Examples
///
/// ```
/// use u_mosa::search::{Breeder, Selection};
///
/// let breeder = Breeder::new(Selection::Tournament(2), 0.75);
/// assert_eq!(breeder.mutation_rate, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breeder {
    /// Parent selection strategy.
    pub selection: Selection,

    /// Probability of recombining a selected pair.
    pub crossover_rate: f64,

    /// Probability of mutating each child.
    pub mutation_rate: f64,
}

impl Default for Breeder {
    fn default() -> Self {
        Self::new(Selection::default(), 0.8)
    }
}

impl Breeder {
    pub fn new(selection: Selection, crossover_rate: f64) -> Self {
        Self {
            selection,
            crossover_rate: crossover_rate.clamp(0.0, 1.0),
            mutation_rate: 1.0,
        }
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }
}

impl<C: Chromosome> OffspringGenerator<C> for Breeder {
    /// # Panics
    ///
    /// Panics if `population` has fewer than 2 individuals.
    fn offspring<R: Rng>(&self, population: &[C], size: usize, rng: &mut R) -> Vec<C> {
        let mut offspring = Vec::with_capacity(size);

        while offspring.len() < size {
            let p1 = &population[self.selection.select(population.len(), rng)];
            let p2 = &population[self.selection.select(population.len(), rng)];

            let (c1, c2) = if rng.random_bool(self.crossover_rate) {
                p1.crossover(p2, rng)
            } else {
                (p1.clone(), p2.clone())
            };

            let mutate = |child: C, rng: &mut R| {
                if rng.random_bool(self.mutation_rate) {
                    child.mutate(rng)
                } else {
                    child
                }
            };
            let c1 = mutate(c1, rng);
            let c2 = mutate(c2, rng);

            if size - offspring.len() >= 2 {
                offspring.push(c1);
                offspring.push(c2);
            } else if rng.random_bool(0.5) {
                offspring.push(c1);
            } else {
                offspring.push(c2);
            }
        }

        offspring
    }
}
