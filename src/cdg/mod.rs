//! Control dependence graphs and coverage fitness.
//!
//! One [`ControlDependenceGraph`] per code unit, built from analysis records
//! and read-only afterwards. Graphs are shared behind `Arc` by every
//! [`BlockObjective`] of their unit.
//!
//! # Key Types
//!
//! - [`CoverageTarget`]: `(code unit, block)` identity of one objective
//! - [`CdgInput`], [`MirRecord`]: serde input records
//! - [`CdgAnalysis`]: run-scoped registry of all graphs
//! - [`CoverageMap`], [`BlockObjective`]: approach level + branch distance

mod analysis;
mod fitness;
mod graph;
mod input;
mod target;

pub use analysis::{CdgAnalysis, MIR_LOG_PREFIX};
pub use fitness::{normalize, BlockObjective, CoverageMap, Instrumented, MAX_FITNESS};
pub use graph::ControlDependenceGraph;
pub use input::{CdgInput, EdgeRecord, GraphRecord, MirRecord};
pub use target::{CodeUnitId, CoverageTarget, ROOT_BLOCK};
