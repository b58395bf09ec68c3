//! Many-objective search engine.
//!
//! A generic, domain-agnostic implementation of MOSA and DynaMOSA. Users
//! plug in their test-case representation by implementing [`Chromosome`]
//! and the collaborator traits; objectives implement [`Objective`] (the CDG
//! layer provides [`BlockObjective`](crate::cdg::BlockObjective)).
//!
//! # Core Traits
//!
//! - [`Chromosome`]: A candidate test case with size, mutation and crossover
//! - [`Objective`]: A minimizing fitness function, `0` meaning covered
//! - [`ChromosomeGenerator`], [`Executor`], [`OffspringGenerator`]: external
//!   collaborators driven by the loop
//!
//! # Key Types
//!
//! - [`SearchConfig`]: Algorithm parameters (population size, selection, presets)
//! - [`MosaRunner`], [`DynaMosaRunner`], [`RandomSearchRunner`]: The loops
//! - [`SearchResult`]: Archived test suite with per-generation statistics
//! - [`Archive`]: Shortest cover per objective
//!
//! # Ranking
//!
//! - [`preference_sort`]: preference front plus non-dominated fronts
//! - [`non_dominated_sort`], [`svd_sort`]: building blocks in [`multi_objective`]
//!
//! # References
//!
//! - Panichella, Kifetew, Tonella (2015), *Reformulating Branch Coverage as a
//!   Many-Objective Optimization Problem*
//! - Panichella, Kifetew, Tonella (2018), *Automated Test Case Generation as a
//!   Many-Objective Optimisation Problem with Dynamic Selection of the Targets*
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

mod archive;
mod config;
mod matrix;
pub mod multi_objective;
mod offspring;
mod preference;
mod runner;
mod selection;
pub mod targets;
mod types;

pub use archive::Archive;
pub use config::SearchConfig;
pub use matrix::FitnessMatrix;
pub use multi_objective::{
    non_dominated_sort, non_dominated_sort_with, subvector_dominance, svd_sort, Dominance,
    DominationStrategy, NondominatedSortResult, Pareto,
};
pub use offspring::Breeder;
pub use preference::{preference_sort, preference_sort_with, survivors, survivors_with, PreferenceFronts};
pub use runner::{
    Collaborators, DynaMosaRunner, GenerationStats, MosaRunner, RandomSearchRunner, SearchResult,
};
pub use selection::Selection;
pub use targets::{AllTargets, DynamicTargets, TargetPolicy};
pub use types::{Chromosome, ChromosomeGenerator, Executor, Objective, OffspringGenerator};
