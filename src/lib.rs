//! Many-objective search-based test generation.
//!
//! Every branch or basic block of the code under test is one minimizing
//! objective. A population of candidate test cases is evolved to cover them:
//!
//! - **CDG layer** ([`cdg`]): control dependence graphs built from analysis
//!   records, and the approach-level + branch-distance fitness computed
//!   over them.
//! - **Search engine** ([`search`]): MOSA and DynaMOSA with preference
//!   sorting, sub-vector dominance density, the shortest-cover archive, and
//!   DynaMOSA's control-dependence frontier. A random search baseline shares
//!   the same result types.
//!
//! # Architecture
//!
//! The engine is generic over the chromosome representation. Test case
//! construction and instrumented execution are supplied by the caller
//! through the traits in [`search`].
//! All run state, including the CDG registry, is owned by explicitly
//! constructed values; the crate keeps no process-wide state.
//!
//! # Feature flags
//!
//! - `parallel`: evaluates the per-generation fitness matrix on the rayon
//!   pool when [`search::SearchConfig::parallel`] is set.

pub mod cdg;
pub mod error;
pub mod search;
