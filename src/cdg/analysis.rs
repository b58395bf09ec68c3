//! Run-scoped registry of control dependence graphs.
//!
//! [`CdgAnalysis`] owns every graph of one search run and derives the
//! objective set from them. It is constructed explicitly and passed to the
//! components that need it; nothing about it is process-global.

use super::fitness::BlockObjective;
use super::graph::ControlDependenceGraph;
use super::input::{CdgInput, MirRecord};
use super::target::{CodeUnitId, CoverageTarget};
use crate::error::{CdgError, CdgResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use walkdir::WalkDir;

/// File name prefix of analysis log records.
pub const MIR_LOG_PREFIX: &str = "mir";

/// All control dependence graphs of a run, keyed by code unit.
#[derive(Debug, Clone, Default)]
pub struct CdgAnalysis {
    cdgs: BTreeMap<CodeUnitId, Arc<ControlDependenceGraph>>,
}

impl CdgAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph for every input record.
    ///
    /// # Errors
    ///
    /// Any [`CdgError`] raised while building a graph, or
    /// [`CdgError::DuplicateCodeUnit`] if two records share a code unit.
    pub fn from_inputs<I>(inputs: I) -> CdgResult<Self>
    where
        I: IntoIterator<Item = CdgInput>,
    {
        let mut analysis = Self::new();
        for input in inputs {
            analysis.insert(ControlDependenceGraph::from_input(&input)?)?;
        }
        analysis.log_summary();
        Ok(analysis)
    }

    /// Loads every analysis log record (files named `mir*`) below `dir`.
    ///
    /// Files are visited in name order, so the resulting objective order is
    /// stable across runs.
    pub fn load_dir(dir: impl AsRef<Path>) -> CdgResult<Self> {
        let dir = dir.as_ref();
        info!(path = %dir.display(), "control dependence graph analysis");

        let mut analysis = Self::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|err| CdgError::Io {
                path: err.path().unwrap_or(dir).to_path_buf(),
                source: err.into(),
            })?;
            if !entry.file_type().is_file()
                || !entry.file_name().to_string_lossy().starts_with(MIR_LOG_PREFIX)
            {
                continue;
            }

            let content = fs::read_to_string(entry.path()).map_err(|source| CdgError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let input = MirRecord::from_json(&content)?.into_input()?;
            analysis.insert(ControlDependenceGraph::from_input(&input)?)?;
        }

        analysis.log_summary();
        Ok(analysis)
    }

    /// Registers one graph.
    pub fn insert(&mut self, cdg: ControlDependenceGraph) -> CdgResult<()> {
        let unit = cdg.code_unit().clone();
        if self.cdgs.contains_key(&unit) {
            return Err(CdgError::DuplicateCodeUnit {
                code_unit: unit.to_string(),
            });
        }
        self.cdgs.insert(unit, Arc::new(cdg));
        Ok(())
    }

    fn log_summary(&self) {
        info!(
            cdgs = self.cdgs.len(),
            targets = self.target_count(),
            average_depth = self.average_depth(),
            branches = self.branches(),
            assertions = self.assertions(),
            "control dependence graphs ready"
        );
    }

    pub fn len(&self) -> usize {
        self.cdgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cdgs.is_empty()
    }

    /// The graph of `code_unit`, if registered.
    pub fn get(&self, code_unit: &CodeUnitId) -> Option<&Arc<ControlDependenceGraph>> {
        self.cdgs.get(code_unit)
    }

    /// The graph of `code_unit`.
    ///
    /// # Panics
    ///
    /// Panics if no graph was registered for `code_unit`.
    pub fn cdg_for(&self, code_unit: &CodeUnitId) -> &Arc<ControlDependenceGraph> {
        self.cdgs
            .get(code_unit)
            .unwrap_or_else(|| panic!("no CDG registered for code unit {code_unit}"))
    }

    /// Graphs in code unit order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ControlDependenceGraph>> + '_ {
        self.cdgs.values()
    }

    /// Number of real targets across all graphs.
    pub fn target_count(&self) -> usize {
        self.cdgs.values().map(|cdg| cdg.targets().count()).sum()
    }

    /// One objective per real target, ordered by code unit then vertex.
    pub fn objectives(&self) -> Vec<BlockObjective> {
        self.cdgs
            .values()
            .flat_map(|cdg| {
                cdg.targets()
                    .map(move |t| BlockObjective::new(Arc::clone(cdg), t.clone()))
            })
            .collect()
    }

    /// Targets directly controlled by a root, across all graphs.
    pub fn independent_targets(&self) -> Vec<CoverageTarget> {
        self.cdgs
            .values()
            .flat_map(|cdg| cdg.independent_targets().into_iter().cloned())
            .collect()
    }

    /// Direct control dependents of `target` in its own graph.
    ///
    /// # Panics
    ///
    /// Panics if the code unit is unknown or `target` is not in its graph.
    pub fn dependent_targets(&self, target: &CoverageTarget) -> Vec<CoverageTarget> {
        self.cdg_for(target.code_unit())
            .dependent_targets(target)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The objective for `target`.
    ///
    /// # Panics
    ///
    /// Panics if the code unit is unknown or `target` is not in its graph.
    pub fn objective(&self, target: &CoverageTarget) -> BlockObjective {
        BlockObjective::new(Arc::clone(self.cdg_for(target.code_unit())), target.clone())
    }

    /// Sum of the branch counts reported by the analysis.
    pub fn branches(&self) -> usize {
        self.cdgs.values().map(|cdg| cdg.branches()).sum()
    }

    /// Sum of the assertion counts reported by the analysis.
    pub fn assertions(&self) -> usize {
        self.cdgs.values().map(|cdg| cdg.assertions()).sum()
    }

    /// Mean of the per-graph average depths; 0 without graphs.
    pub fn average_depth(&self) -> f64 {
        if self.cdgs.is_empty() {
            return 0.0;
        }
        self.cdgs.values().map(|cdg| cdg.average_depth()).sum::<f64>() / self.cdgs.len() as f64
    }
}
