//! Generational search loops.
//!
//! [`MosaRunner`] and [`DynaMosaRunner`] share one loop and differ only in
//! the [`TargetPolicy`] that decides which objectives are ranked:
//!
//! ```text
//! init:  generate N → execute → archive.update → targets → rank
//! gen:   offspring(N) → execute → archive.update
//!        → combined = population ++ offspring → targets
//!        → preference fronts + SVD → keep N
//! done:  archive.get()
//! ```
//!
//! [`RandomSearchRunner`] is the baseline: fresh random chromosomes every
//! generation, no ranking.

use super::archive::Archive;
use super::config::SearchConfig;
use super::matrix::FitnessMatrix;
use super::preference::survivors;
use super::targets::{AllTargets, DynamicTargets, TargetPolicy};
use super::types::{Chromosome, ChromosomeGenerator, Executor, Objective, OffspringGenerator};
use crate::cdg::{CdgAnalysis, Instrumented};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Archive snapshot at the end of one generation.
///
/// Generation `0` describes the initial population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub covered_targets: usize,
    pub total_targets: usize,
    /// Covered targets in percent.
    pub coverage: f64,
    /// Number of distinct archived chromosomes.
    pub archive_size: usize,
    /// Objectives considered by ranking in this generation.
    pub active_targets: usize,
    /// Mean statement count of the archived chromosomes.
    pub average_length: f64,
}

impl GenerationStats {
    fn capture<O, C>(generation: usize, archive: &Archive<'_, O, C>, active_targets: usize) -> Self
    where
        O: Objective<C>,
        C: Chromosome,
    {
        Self {
            generation,
            covered_targets: archive.covered_targets(),
            total_targets: archive.total_targets(),
            coverage: archive.coverage(),
            archive_size: archive.size(),
            active_targets,
            average_length: archive.average_length(),
        }
    }
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchResult<C> {
    /// The archived test suite: distinct shortest covers.
    pub tests: Vec<C>,

    pub covered_targets: usize,

    pub total_targets: usize,

    /// Covered targets in percent.
    pub coverage: f64,

    /// Number of generations executed after the initial population.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the run stopped at full coverage before its budget.
    pub stopped_early: bool,

    /// One entry for the initial population plus one per generation.
    pub history: Vec<GenerationStats>,
}

/// External pieces driven by the loop.
///
/// Borrowed collaborators work too: `&G`, `&X` and `&mut E` implement the
/// respective traits.
pub struct Collaborators<'a, G, X, E> {
    pub generator: G,
    pub offspring: X,
    pub executor: E,
    listeners: Vec<Box<dyn FnMut(&GenerationStats) + 'a>>,
}

impl<'a, G, X, E> Collaborators<'a, G, X, E> {
    pub fn new(generator: G, offspring: X, executor: E) -> Self {
        Self {
            generator,
            offspring,
            executor,
            listeners: Vec::new(),
        }
    }

    /// Registers a callback invoked after the initial population and after
    /// every generation.
    pub fn on_generation(mut self, listener: impl FnMut(&GenerationStats) + 'a) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    fn notify(&mut self, stats: &GenerationStats) {
        for listener in &mut self.listeners {
            listener(stats);
        }
    }
}

/// Many-objective search over every objective (MOSA).
///
/// # Usage
///
/// ```ignore
/// let objectives = analysis.objectives();
/// let config = SearchConfig::default().with_seed(42);
/// let mut collaborators = Collaborators::new(&generator, config.breeder(), &mut executor);
/// let result = MosaRunner::run(&objectives, &mut collaborators, &config);
/// println!("coverage: {:.1}%", result.coverage);
/// ```
pub struct MosaRunner;

impl MosaRunner {
    /// Runs MOSA.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`SearchConfig::validate`]
    /// first to get a descriptive error).
    pub fn run<C, O, G, X, E>(
        objectives: &[O],
        collaborators: &mut Collaborators<'_, G, X, E>,
        config: &SearchConfig,
    ) -> SearchResult<C>
    where
        C: Chromosome,
        O: Objective<C>,
        G: ChromosomeGenerator<C>,
        X: OffspringGenerator<C>,
        E: Executor<C>,
    {
        Self::run_with_cancel(objectives, collaborators, config, None)
    }

    /// Runs MOSA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the search stops
    /// before the next generation and returns the archive built so far.
    pub fn run_with_cancel<C, O, G, X, E>(
        objectives: &[O],
        collaborators: &mut Collaborators<'_, G, X, E>,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SearchResult<C>
    where
        C: Chromosome,
        O: Objective<C>,
        G: ChromosomeGenerator<C>,
        X: OffspringGenerator<C>,
        E: Executor<C>,
    {
        evolve("MOSA", objectives, &mut AllTargets, collaborators, config, cancel)
    }
}

/// Many-objective search over the control-dependence frontier (DynaMOSA).
pub struct DynaMosaRunner;

impl DynaMosaRunner {
    /// Runs DynaMOSA on every target of `analysis`.
    ///
    /// # Panics
    /// Panics if the configuration is invalid.
    pub fn run<C, G, X, E>(
        analysis: &CdgAnalysis,
        collaborators: &mut Collaborators<'_, G, X, E>,
        config: &SearchConfig,
    ) -> SearchResult<C>
    where
        C: Chromosome + Instrumented,
        G: ChromosomeGenerator<C>,
        X: OffspringGenerator<C>,
        E: Executor<C>,
    {
        Self::run_with_cancel(analysis, collaborators, config, None)
    }

    /// Runs DynaMOSA with an optional cancellation token.
    pub fn run_with_cancel<C, G, X, E>(
        analysis: &CdgAnalysis,
        collaborators: &mut Collaborators<'_, G, X, E>,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SearchResult<C>
    where
        C: Chromosome + Instrumented,
        G: ChromosomeGenerator<C>,
        X: OffspringGenerator<C>,
        E: Executor<C>,
    {
        let objectives = analysis.objectives();
        let mut targets = DynamicTargets::from_analysis(analysis, &objectives);
        Self::run_with_targets(&objectives, &mut targets, collaborators, config, cancel)
    }

    /// Runs DynaMOSA with an explicit frontier over arbitrary objectives.
    pub fn run_with_targets<C, O, G, X, E>(
        objectives: &[O],
        targets: &mut DynamicTargets,
        collaborators: &mut Collaborators<'_, G, X, E>,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SearchResult<C>
    where
        C: Chromosome,
        O: Objective<C>,
        G: ChromosomeGenerator<C>,
        X: OffspringGenerator<C>,
        E: Executor<C>,
    {
        evolve("DynaMOSA", objectives, targets, collaborators, config, cancel)
    }
}

/// Random sampling baseline.
///
/// Every generation draws `population_size` fresh chromosomes, executes them
/// and updates the archive. Nothing is ranked or bred.
pub struct RandomSearchRunner;

impl RandomSearchRunner {
    /// # Panics
    /// Panics if the configuration is invalid.
    pub fn run<C, O, G, E>(objectives: &[O], generator: &G, executor: &mut E, config: &SearchConfig) -> SearchResult<C>
    where
        C: Chromosome,
        O: Objective<C>,
        G: ChromosomeGenerator<C>,
        E: Executor<C>,
    {
        Self::run_with_cancel(objectives, generator, executor, config, None)
    }

    /// Runs random search with an optional cancellation token.
    pub fn run_with_cancel<C, O, G, E>(
        objectives: &[O],
        generator: &G,
        executor: &mut E,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SearchResult<C>
    where
        C: Chromosome,
        O: Objective<C>,
        G: ChromosomeGenerator<C>,
        E: Executor<C>,
    {
        config.validate().expect("invalid SearchConfig");
        let mut rng = create_rng(config.seed);
        let mut archive = Archive::new(objectives);
        let mut history = Vec::with_capacity(config.max_generations + 1);

        info!(
            algorithm = "random",
            objectives = objectives.len(),
            population = config.population_size,
            generations = config.max_generations,
            "search started"
        );

        let mut outcome = Outcome::default();
        for generation in 0..=config.max_generations {
            if generation > 0 {
                if let Some(stop) = should_stop(&archive, config, cancel.as_deref()) {
                    outcome = Outcome {
                        generations: generation - 1,
                        ..stop
                    };
                    break;
                }
            }

            let mut batch: Vec<C> = (0..config.population_size)
                .map(|_| generator.generate(&mut rng))
                .collect();
            executor.execute(&mut batch);
            archive.update(&batch);

            let stats = GenerationStats::capture(generation, &archive, objectives.len());
            log_generation("random", &stats);
            history.push(stats);
            outcome.generations = generation;
        }

        finish("random", &archive, outcome, history)
    }
}

#[derive(Debug, Default)]
struct Outcome {
    generations: usize,
    cancelled: bool,
    stopped_early: bool,
}

fn create_rng(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

fn should_stop<O, C>(archive: &Archive<'_, O, C>, config: &SearchConfig, cancel: Option<&AtomicBool>) -> Option<Outcome>
where
    O: Objective<C>,
    C: Chromosome,
{
    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        return Some(Outcome {
            cancelled: true,
            ..Outcome::default()
        });
    }
    if config.stop_on_full_coverage && archive.covered_targets() == archive.total_targets() {
        return Some(Outcome {
            stopped_early: true,
            ..Outcome::default()
        });
    }
    None
}

/// Reorders `population` best first and keeps `size` survivors.
fn survive<C, O>(population: Vec<C>, objectives: &[O], active: &[usize], size: usize, parallel: bool) -> Vec<C>
where
    C: Chromosome,
    O: Objective<C>,
{
    let matrix = FitnessMatrix::evaluate(&population, objectives, active, parallel);
    let order = survivors(&matrix, size);
    let mut slots: Vec<Option<C>> = population.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

fn evolve<C, O, P, G, X, E>(
    algorithm: &'static str,
    objectives: &[O],
    policy: &mut P,
    collaborators: &mut Collaborators<'_, G, X, E>,
    config: &SearchConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> SearchResult<C>
where
    C: Chromosome,
    O: Objective<C>,
    P: TargetPolicy<C, O>,
    G: ChromosomeGenerator<C>,
    X: OffspringGenerator<C>,
    E: Executor<C>,
{
    config.validate().expect("invalid SearchConfig");
    let n = config.population_size;
    let mut rng = create_rng(config.seed);
    let mut archive = Archive::new(objectives);

    info!(
        algorithm,
        objectives = objectives.len(),
        population = n,
        generations = config.max_generations,
        "search started"
    );

    // 1. Initial population
    let mut population: Vec<C> = (0..n)
        .map(|_| collaborators.generator.generate(&mut rng))
        .collect();
    collaborators.executor.execute(&mut population);
    archive.update(&population);

    // 2. Initial targets and ranking
    let mut active = policy.initial(objectives);
    policy.update(objectives, &mut active, &population);
    population = survive(population, objectives, &active, n, config.parallel);

    let mut history = Vec::with_capacity(config.max_generations + 1);
    let stats = GenerationStats::capture(0, &archive, active.len());
    log_generation(algorithm, &stats);
    collaborators.notify(&stats);
    history.push(stats);

    // 3. Generational loop
    let mut outcome = Outcome::default();
    for generation in 1..=config.max_generations {
        if let Some(stop) = should_stop(&archive, config, cancel.as_deref()) {
            outcome = Outcome {
                generations: generation - 1,
                ..stop
            };
            break;
        }

        let mut offspring = collaborators.offspring.offspring(&population, n, &mut rng);
        collaborators.executor.execute(&mut offspring);
        archive.update(&offspring);

        let mut combined = population;
        combined.append(&mut offspring);
        policy.update(objectives, &mut active, &combined);
        population = survive(combined, objectives, &active, n, config.parallel);

        let stats = GenerationStats::capture(generation, &archive, active.len());
        log_generation(algorithm, &stats);
        collaborators.notify(&stats);
        history.push(stats);
        outcome.generations = generation;
    }

    finish(algorithm, &archive, outcome, history)
}

fn log_generation(algorithm: &'static str, stats: &GenerationStats) {
    info!(
        algorithm,
        generation = stats.generation,
        covered = stats.covered_targets,
        total = stats.total_targets,
        coverage = stats.coverage,
        archive = stats.archive_size,
        active = stats.active_targets,
        "generation finished"
    );
}

fn finish<O, C>(
    algorithm: &'static str,
    archive: &Archive<'_, O, C>,
    outcome: Outcome,
    history: Vec<GenerationStats>,
) -> SearchResult<C>
where
    O: Objective<C>,
    C: Chromosome,
{
    let result = SearchResult {
        tests: archive.get(),
        covered_targets: archive.covered_targets(),
        total_targets: archive.total_targets(),
        coverage: archive.coverage(),
        generations: outcome.generations,
        cancelled: outcome.cancelled,
        stopped_early: outcome.stopped_early,
        history,
    };
    info!(
        algorithm,
        generations = result.generations,
        covered = result.covered_targets,
        total = result.total_targets,
        coverage = result.coverage,
        tests = result.tests.len(),
        cancelled = result.cancelled,
        "search finished"
    );
    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdg::{CdgInput, CoverageMap, CoverageTarget, EdgeRecord, ROOT_BLOCK};
    use crate::search::{Breeder, Selection};
    use rand::Rng;
    use std::cell::Cell;

    // ---- A toy program: a list of statement opcodes ----

    #[derive(Debug, Clone, PartialEq)]
    struct Program {
        statements: Vec<u8>,
        coverage: CoverageMap,
    }

    impl Program {
        fn new(statements: Vec<u8>) -> Self {
            Self {
                statements,
                coverage: CoverageMap::new(),
            }
        }
    }

    impl Chromosome for Program {
        fn size(&self) -> usize {
            self.statements.len()
        }

        fn mutate<R: Rng>(&self, rng: &mut R) -> Self {
            let mut statements = self.statements.clone();
            if !statements.is_empty() && rng.random_bool(0.5) {
                statements.remove(rng.random_range(0..statements.len()));
            } else {
                let at = rng.random_range(0..=statements.len());
                statements.insert(at, rng.random_range(0..4));
            }
            Program::new(statements)
        }

        fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> (Self, Self) {
            let a = rng.random_range(0..=self.statements.len());
            let b = rng.random_range(0..=other.statements.len());
            let mut c1 = self.statements[..a].to_vec();
            c1.extend_from_slice(&other.statements[b..]);
            let mut c2 = other.statements[..b].to_vec();
            c2.extend_from_slice(&self.statements[a..]);
            (Program::new(c1), Program::new(c2))
        }
    }

    impl Instrumented for Program {
        fn coverage(&self) -> &CoverageMap {
            &self.coverage
        }
    }

    struct RandomPrograms;

    impl ChromosomeGenerator<Program> for RandomPrograms {
        fn generate<R: Rng>(&self, rng: &mut R) -> Program {
            let len = rng.random_range(1..=6);
            Program::new((0..len).map(|_| rng.random_range(0..4)).collect())
        }
    }

    /// Covers block `k` of unit "f" when opcodes `1..=k` all occur. Tracks
    /// the shortest program that contained opcode 0.
    #[derive(Default)]
    struct Interpreter {
        executed: usize,
        shortest_zero: Option<usize>,
    }

    impl Executor<Program> for Interpreter {
        fn execute(&mut self, population: &mut [Program]) {
            for program in population.iter_mut() {
                self.executed += 1;
                program.coverage.clear();
                for block in 1..=3u8 {
                    if !program.statements.contains(&block) {
                        break;
                    }
                    program.coverage.record(CoverageTarget::new("f", u64::from(block)), 0.0);
                }
                if program.statements.contains(&0) {
                    let len = program.size();
                    self.shortest_zero = Some(self.shortest_zero.map_or(len, |s| s.min(len)));
                }
            }
        }
    }

    /// Covered by any program containing opcode 0.
    struct HasZero;

    impl Objective<Program> for HasZero {
        fn fitness(&self, p: &Program) -> f64 {
            if p.statements.contains(&0) {
                0.0
            } else {
                1.0
            }
        }
    }

    /// Never covered.
    struct Unreachable;

    impl Objective<Program> for Unreachable {
        fn fitness(&self, _p: &Program) -> f64 {
            f64::MAX
        }
    }

    enum Goal {
        Zero(HasZero),
        Never(Unreachable),
    }

    impl Objective<Program> for Goal {
        fn fitness(&self, p: &Program) -> f64 {
            match self {
                Goal::Zero(o) => o.fitness(p),
                Goal::Never(o) => o.fitness(p),
            }
        }
    }

    fn chain_analysis() -> CdgAnalysis {
        CdgAnalysis::from_inputs([CdgInput::new(
            "f",
            vec![ROOT_BLOCK, 1, 2, 3],
            vec![EdgeRecord::new(0, 1), EdgeRecord::new(1, 2), EdgeRecord::new(2, 3)],
        )])
        .unwrap()
    }

    fn config(population: usize, generations: usize) -> SearchConfig {
        SearchConfig::default()
            .with_population_size(population)
            .with_max_generations(generations)
            .with_seed(42)
    }

    #[test]
    fn test_mosa_archive_keeps_single_shortest_cover() {
        let goals = [Goal::Zero(HasZero), Goal::Never(Unreachable)];
        let mut interpreter = Interpreter::default();
        let cfg = config(10, 5);
        let mut collaborators = Collaborators::new(RandomPrograms, cfg.breeder(), &mut interpreter);

        let result: SearchResult<Program> = MosaRunner::run(&goals, &mut collaborators, &cfg);
        drop(collaborators);

        assert_eq!(result.tests.len(), 1, "only one objective is coverable");
        assert_eq!(result.covered_targets, 1);
        assert_eq!(result.total_targets, 2);
        assert!((result.coverage - 50.0).abs() < 1e-10);

        let test = &result.tests[0];
        assert_eq!(HasZero.fitness(test), 0.0);
        assert_eq!(Unreachable.fitness(test), f64::MAX);
        assert_eq!(Some(test.size()), interpreter.shortest_zero);
        assert_eq!(interpreter.executed, 10 * 6);
    }

    #[test]
    fn test_history_has_entry_per_generation() {
        let goals = [Goal::Zero(HasZero), Goal::Never(Unreachable)];
        let calls = Cell::new(0);
        let cfg = config(8, 7);
        let mut collaborators = Collaborators::new(RandomPrograms, cfg.breeder(), Interpreter::default())
            .on_generation(|_| calls.set(calls.get() + 1));

        let result: SearchResult<Program> = MosaRunner::run(&goals, &mut collaborators, &cfg);
        drop(collaborators);

        assert_eq!(result.generations, 7);
        assert_eq!(result.history.len(), 8);
        assert_eq!(calls.get(), 8);
        for (i, stats) in result.history.iter().enumerate() {
            assert_eq!(stats.generation, i);
            assert_eq!(stats.active_targets, 2);
        }
        for window in result.history.windows(2) {
            assert!(
                window[1].covered_targets >= window[0].covered_targets,
                "archive coverage must not decrease"
            );
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let goals = [Goal::Zero(HasZero), Goal::Never(Unreachable)];
        let cfg = config(10, 10);
        let run = || {
            let mut collaborators = Collaborators::new(RandomPrograms, cfg.breeder(), Interpreter::default());
            MosaRunner::run::<Program, _, _, _, _>(&goals, &mut collaborators, &cfg)
        };
        let (a, b) = (run(), run());
        assert_eq!(a.tests, b.tests);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_cancellation_before_first_generation() {
        let goals = [Goal::Zero(HasZero)];
        let cfg = config(10, 1000);
        let mut collaborators = Collaborators::new(RandomPrograms, Breeder::default(), Interpreter::default());
        let cancel = Arc::new(AtomicBool::new(true));

        let result: SearchResult<Program> = MosaRunner::run_with_cancel(&goals, &mut collaborators, &cfg, Some(cancel));

        assert!(result.cancelled, "expected cancelled result");
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_dynamosa_covers_chain() {
        let analysis = chain_analysis();
        let cfg = config(20, 40).with_stop_on_full_coverage(true);
        let mut collaborators = Collaborators::new(RandomPrograms, cfg.breeder(), Interpreter::default());

        let result: SearchResult<Program> = DynaMosaRunner::run(&analysis, &mut collaborators, &cfg);

        assert_eq!(result.total_targets, 3);
        assert_eq!(result.covered_targets, 3, "history: {:?}", result.history);
        assert!(result.stopped_early || result.generations == 40);
        // The frontier never exceeds the chain's width.
        assert!(result.history.iter().all(|s| s.active_targets <= 1));
    }

    #[test]
    fn test_dynamosa_starts_from_independent_targets() {
        let analysis = chain_analysis();
        let cfg = config(4, 1);
        // Programs without opcode 1 cover nothing, so the frontier stays at A.
        struct Zeros;
        impl ChromosomeGenerator<Program> for Zeros {
            fn generate<R: Rng>(&self, _rng: &mut R) -> Program {
                Program::new(vec![0, 0])
            }
        }
        let breeder = Breeder::new(Selection::Tournament(2), 0.0).with_mutation_rate(0.0);
        let mut collaborators = Collaborators::new(Zeros, breeder, Interpreter::default());

        let result: SearchResult<Program> = DynaMosaRunner::run(&analysis, &mut collaborators, &cfg);

        assert_eq!(result.covered_targets, 0);
        assert!(result.tests.is_empty());
        assert!(result.history.iter().all(|s| s.active_targets == 1));
    }

    #[test]
    fn test_stop_on_full_coverage() {
        let goals = [Goal::Zero(HasZero)];
        let cfg = config(10, 500).with_stop_on_full_coverage(true);
        let mut collaborators = Collaborators::new(RandomPrograms, cfg.breeder(), Interpreter::default());

        let result: SearchResult<Program> = MosaRunner::run(&goals, &mut collaborators, &cfg);

        assert!(result.stopped_early);
        assert!(result.generations < 500);
        assert_eq!(result.coverage, 100.0);
    }

    #[test]
    fn test_random_search_baseline() {
        let goals = [Goal::Zero(HasZero), Goal::Never(Unreachable)];
        let mut interpreter = Interpreter::default();
        let cfg = config(10, 5);

        let result: SearchResult<Program> = RandomSearchRunner::run(&goals, &RandomPrograms, &mut interpreter, &cfg);

        assert_eq!(interpreter.executed, 60);
        assert_eq!(result.history.len(), 6);
        assert_eq!(result.covered_targets, 1);
        assert_eq!(result.tests.len(), 1);
        assert_eq!(Some(result.tests[0].size()), interpreter.shortest_zero);
    }

    #[test]
    #[should_panic(expected = "invalid SearchConfig")]
    fn test_invalid_config_panics() {
        let goals = [Goal::Zero(HasZero)];
        let cfg = SearchConfig::default().with_population_size(1);
        let mut collaborators = Collaborators::new(RandomPrograms, Breeder::default(), Interpreter::default());
        let _: SearchResult<Program> = MosaRunner::run(&goals, &mut collaborators, &cfg);
    }
}
