//! Search configuration.
//!
//! [`SearchConfig`] holds all parameters that control the generational loop.

use super::offspring::Breeder;
use super::selection::Selection;

/// Configuration for MOSA, DynaMOSA and the random search baseline.
///
/// # Defaults
///
/// ```
/// use u_mosa::search::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_generations, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_mosa::search::{SearchConfig, Selection};
///
/// let config = SearchConfig::default()
///     .with_population_size(80)
///     .with_selection(Selection::Tournament(4))
///     .with_crossover_rate(0.75)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Number of individuals kept after each survival step.
    pub population_size: usize,

    /// Number of generations after the initial population.
    pub max_generations: usize,

    /// Parent selection used by the default [`Breeder`].
    pub selection: Selection,

    /// Probability of recombining a selected pair (0.0–1.0).
    pub crossover_rate: f64,

    /// Probability of mutating each child (0.0–1.0).
    pub mutation_rate: f64,

    /// Stop as soon as every objective is covered.
    ///
    /// Off by default: the run then always spends the full generation budget.
    pub stop_on_full_coverage: bool,

    /// Whether to evaluate the fitness matrix in parallel using rayon.
    ///
    /// Only effective with the `parallel` cargo feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            selection: Selection::default(),
            crossover_rate: 0.8,
            mutation_rate: 1.0,
            stop_on_full_coverage: false,
            parallel: false,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables the early stop at full coverage.
    pub fn with_stop_on_full_coverage(mut self, stop: bool) -> Self {
        self.stop_on_full_coverage = stop;
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick smoke runs.
    ///
    /// - Population: 20, Generations: 30
    pub fn fast() -> Self {
        Self {
            population_size: 20,
            max_generations: 30,
            ..Self::default()
        }
    }

    /// Preset matching the defaults.
    ///
    /// - Population: 50, Generations: 100
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Preset for large code units with many hard-to-reach targets.
    ///
    /// - Population: 100, Generations: 300, Tournament(3) selection
    pub fn thorough() -> Self {
        Self {
            population_size: 100,
            max_generations: 300,
            selection: Selection::Tournament(3),
            ..Self::default()
        }
    }

    /// Selects a preset from the number of coverage targets.
    ///
    /// - `target_count < 50` → [`fast()`](Self::fast)
    /// - `50 ≤ target_count < 500` → [`balanced()`](Self::balanced)
    /// - `target_count ≥ 500` → [`thorough()`](Self::thorough)
    pub fn auto_select(target_count: usize) -> Self {
        if target_count < 50 {
            Self::fast()
        } else if target_count < 500 {
            Self::balanced()
        } else {
            Self::thorough()
        }
    }

    /// The default offspring generator for this configuration.
    pub fn breeder(&self) -> Breeder {
        Breeder::new(self.selection, self.crossover_rate).with_mutation_rate(self.mutation_rate)
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err("crossover_rate must be within [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be within [0, 1]".into());
        }
        if let Selection::Rank { bias } = self.selection {
            if !(1.0..=2.0).contains(&bias) {
                return Err("rank selection bias must be within [1, 2]".into());
            }
        }
        if self.selection == Selection::Tournament(0) {
            return Err("tournament size must be at least 1".into());
        }
        Ok(())
    }
}
