//! Serialized analysis input.
//!
//! Two shapes are accepted:
//!
//! - [`CdgInput`]: one self-describing record per code unit,
//!   `{code_unit_id, nodes, edges}`.
//! - [`MirRecord`]: the analysis log format, where the graph is embedded as
//!   a JSON string under `cdg` next to the unit's `global_id` and counters.
//!
//! Edges are `[from, to]` or `[from, to, weight]` pairs of positions into
//! `nodes`; weights are ignored.

use super::target::CodeUnitId;
use crate::error::{CdgError, CdgResult};
use serde::de::IgnoredAny;
use serde::Deserialize;

/// A directed control-dependence edge between two node positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawEdge")]
pub struct EdgeRecord {
    /// Position of the controlling node in `nodes`.
    pub from: usize,
    /// Position of the dependent node in `nodes`.
    pub to: usize,
}

impl EdgeRecord {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEdge {
    Weighted(usize, usize, IgnoredAny),
    Pair(usize, usize),
}

impl From<RawEdge> for EdgeRecord {
    fn from(raw: RawEdge) -> Self {
        match raw {
            RawEdge::Weighted(from, to, _) | RawEdge::Pair(from, to) => Self { from, to },
        }
    }
}

/// Node and edge lists of one graph, as serialized by the analysis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphRecord {
    pub nodes: Vec<u64>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// Control dependence graph input for one code unit.
#[derive(Debug, Clone, Deserialize)]
pub struct CdgInput {
    /// Owning code unit.
    #[serde(alias = "global_id")]
    pub code_unit_id: String,

    /// Block ids; the root sentinel is among them.
    pub nodes: Vec<u64>,

    /// Control-dependence edges by node position.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,

    /// Number of branches reported by the analysis (informational).
    #[serde(default)]
    pub branches: usize,

    /// Number of assertions reported by the analysis (informational).
    #[serde(default)]
    pub assertions: usize,
}

impl CdgInput {
    /// Creates an input record from parts.
    pub fn new(code_unit_id: impl Into<String>, nodes: Vec<u64>, edges: Vec<EdgeRecord>) -> Self {
        Self {
            code_unit_id: code_unit_id.into(),
            nodes,
            edges,
            branches: 0,
            assertions: 0,
        }
    }

    /// Parses a self-describing `{code_unit_id, nodes, edges}` record.
    pub fn from_json(json: &str) -> CdgResult<Self> {
        serde_json::from_str(json).map_err(|source| CdgError::Malformed {
            context: "cdg input".into(),
            source,
        })
    }

    /// Parses a bare `{nodes, edges}` graph and attaches it to `code_unit`.
    pub fn from_graph_json(code_unit: &CodeUnitId, json: &str) -> CdgResult<Self> {
        let graph: GraphRecord = serde_json::from_str(json).map_err(|source| CdgError::Malformed {
            context: code_unit.to_string(),
            source,
        })?;
        Ok(Self::new(code_unit.as_str(), graph.nodes, graph.edges))
    }

    /// The owning code unit as an id.
    pub fn code_unit(&self) -> CodeUnitId {
        CodeUnitId::new(&self.code_unit_id)
    }
}

/// One analysis log record.
#[derive(Debug, Clone, Deserialize)]
pub struct MirRecord {
    pub global_id: String,
    /// The graph, serialized as a JSON string.
    pub cdg: String,
    #[serde(default)]
    pub branches: usize,
    #[serde(default)]
    pub assertions: usize,
}

impl MirRecord {
    /// Parses a log record.
    pub fn from_json(json: &str) -> CdgResult<Self> {
        serde_json::from_str(json).map_err(|source| CdgError::Malformed {
            context: "mir record".into(),
            source,
        })
    }

    /// Decodes the embedded graph into a [`CdgInput`].
    pub fn into_input(self) -> CdgResult<CdgInput> {
        let code_unit = CodeUnitId::new(&self.global_id);
        let mut input = CdgInput::from_graph_json(&code_unit, &self.cdg)?;
        input.branches = self.branches;
        input.assertions = self.assertions;
        Ok(input)
    }
}
