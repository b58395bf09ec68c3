//! Control dependence graph of one code unit.
//!
//! Built once from analysis input, then read-only for the rest of the run.
//! Construction precomputes, for every vertex:
//!
//! - the shortest path from the root sentinel (ordered ancestors ending in
//!   the vertex itself),
//! - its distance from the root,
//! - the set of transitive control dependents.
//!
//! The graph is unweighted, so shortest paths come from a breadth-first
//! search. When several shortest paths exist the one through the
//! earliest-declared parent wins.

use super::input::CdgInput;
use super::target::{CodeUnitId, CoverageTarget, ROOT_BLOCK};
use crate::error::{CdgError, CdgResult};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};

/// A control dependence graph over the coverage targets of one code unit.
#[derive(Debug, Clone)]
pub struct ControlDependenceGraph {
    code_unit: CodeUnitId,
    graph: DiGraph<CoverageTarget, ()>,
    /// Block id → vertex.
    index: HashMap<u64, NodeIndex>,
    root: NodeIndex,
    /// Root-to-vertex path per vertex, including both ends.
    paths: Vec<Vec<CoverageTarget>>,
    /// Transitive dependents per vertex, in vertex order.
    dependents: Vec<Vec<CoverageTarget>>,
    average_depth: f64,
    branches: usize,
    assertions: usize,
}

impl ControlDependenceGraph {
    /// Builds the graph and its caches from an input record.
    ///
    /// # Errors
    ///
    /// - [`CdgError::DuplicateBlock`] if a block id is listed twice
    /// - [`CdgError::MissingRoot`] if no node is the [`ROOT_BLOCK`] sentinel
    /// - [`CdgError::EdgeOutOfBounds`] if an edge names a missing position
    /// - [`CdgError::Unreachable`] if a vertex has no path from the root
    pub fn from_input(input: &CdgInput) -> CdgResult<Self> {
        let code_unit = input.code_unit();
        let mut graph = DiGraph::with_capacity(input.nodes.len(), input.edges.len());
        let mut index = HashMap::with_capacity(input.nodes.len());

        for &block in &input.nodes {
            let node = graph.add_node(CoverageTarget::new(code_unit.clone(), block));
            if index.insert(block, node).is_some() {
                return Err(CdgError::DuplicateBlock {
                    code_unit: code_unit.to_string(),
                    block,
                });
            }
        }

        let root = *index.get(&ROOT_BLOCK).ok_or_else(|| CdgError::MissingRoot {
            code_unit: code_unit.to_string(),
        })?;

        let n = input.nodes.len();
        for edge in &input.edges {
            if edge.from >= n || edge.to >= n {
                return Err(CdgError::EdgeOutOfBounds {
                    code_unit: code_unit.to_string(),
                    from: edge.from,
                    to: edge.to,
                    nodes: n,
                });
            }
            graph.update_edge(NodeIndex::new(edge.from), NodeIndex::new(edge.to), ());
        }

        let mut cdg = Self {
            code_unit,
            graph,
            index,
            root,
            paths: Vec::new(),
            dependents: Vec::new(),
            average_depth: 0.0,
            branches: input.branches,
            assertions: input.assertions,
        };
        cdg.paths = cdg.shortest_paths()?;
        cdg.dependents = (0..n)
            .map(|i| cdg.transitive_dependents(NodeIndex::new(i)))
            .collect();

        let total_depth: usize = cdg.paths.iter().map(|p| p.len() - 1).sum();
        cdg.average_depth = total_depth as f64 / n as f64;

        Ok(cdg)
    }

    /// Successors of `node` without self loops, in declaration order.
    fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .filter(|&m| m != node)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// BFS from the root, recording the first parent that reaches each vertex.
    fn shortest_paths(&self) -> CdgResult<Vec<Vec<CoverageTarget>>> {
        let n = self.graph.node_count();
        let mut parent: Vec<Option<NodeIndex>> = vec![None; n];
        let mut seen = vec![false; n];
        let mut queue = VecDeque::new();

        seen[self.root.index()] = true;
        queue.push_back(self.root);
        while let Some(node) = queue.pop_front() {
            for next in self.successors(node) {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    parent[next.index()] = Some(node);
                    queue.push_back(next);
                }
            }
        }

        let mut paths = Vec::with_capacity(n);
        for i in 0..n {
            let node = NodeIndex::new(i);
            if !seen[i] {
                return Err(CdgError::Unreachable {
                    code_unit: self.code_unit.to_string(),
                    block: self.graph[node].block(),
                });
            }
            let mut path = vec![self.graph[node].clone()];
            let mut cursor = node;
            while let Some(p) = parent[cursor.index()] {
                path.push(self.graph[p].clone());
                cursor = p;
            }
            path.reverse();
            paths.push(path);
        }
        Ok(paths)
    }

    fn transitive_dependents(&self, start: NodeIndex) -> Vec<CoverageTarget> {
        let mut seen = vec![false; self.graph.node_count()];
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for next in self.successors(node) {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    stack.push(next);
                }
            }
        }
        // A vertex on a cycle back to itself is still not its own dependent.
        seen[start.index()] = false;
        seen.iter()
            .enumerate()
            .filter(|&(_, &s)| s)
            .map(|(i, _)| self.graph[NodeIndex::new(i)].clone())
            .collect()
    }

    fn node(&self, target: &CoverageTarget) -> Option<NodeIndex> {
        if target.code_unit() != &self.code_unit {
            return None;
        }
        self.index.get(&target.block()).copied()
    }

    fn expect_node(&self, target: &CoverageTarget) -> NodeIndex {
        self.node(target)
            .unwrap_or_else(|| panic!("target {target} is not part of the CDG of {}", self.code_unit))
    }

    /// The owning code unit.
    pub fn code_unit(&self) -> &CodeUnitId {
        &self.code_unit
    }

    /// The root sentinel vertex.
    pub fn root(&self) -> &CoverageTarget {
        &self.graph[self.root]
    }

    /// Number of vertices, root included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Always false: a valid graph holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether `target` is a vertex of this graph.
    pub fn contains(&self, target: &CoverageTarget) -> bool {
        self.node(target).is_some()
    }

    /// The cached root-to-target path, ending in `target` itself.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of this graph.
    pub fn path_to(&self, target: &CoverageTarget) -> &[CoverageTarget] {
        &self.paths[self.expect_node(target).index()]
    }

    /// Distance (in edges) from the root to `target`.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of this graph.
    pub fn distance(&self, target: &CoverageTarget) -> usize {
        self.path_to(target).len() - 1
    }

    /// Hop count from the nearest covered ancestor of `target` on its
    /// cached path, or the full path length if none is covered.
    ///
    /// A covered `target` has approach level 0.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of this graph.
    pub fn approach_level<F>(&self, target: &CoverageTarget, is_covered: F) -> usize
    where
        F: Fn(&CoverageTarget) -> bool,
    {
        let path = self.path_to(target);
        path.iter()
            .rev()
            .position(|ancestor| is_covered(ancestor))
            .unwrap_or(path.len())
    }

    /// All real objectives: every vertex except the root.
    pub fn targets(&self) -> impl Iterator<Item = &CoverageTarget> + '_ {
        self.graph.node_weights().filter(|t| !t.is_root())
    }

    /// Direct children of the root: the targets with no controlling branch.
    pub fn independent_targets(&self) -> Vec<&CoverageTarget> {
        self.successors(self.root)
            .into_iter()
            .map(|n| &self.graph[n])
            .collect()
    }

    /// Direct control dependents of `target`, self loops excluded.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of this graph.
    pub fn dependent_targets(&self, target: &CoverageTarget) -> Vec<&CoverageTarget> {
        self.successors(self.expect_node(target))
            .into_iter()
            .map(|n| &self.graph[n])
            .collect()
    }

    /// Every vertex reachable from `target` through dependence edges.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of this graph.
    pub fn all_dependents(&self, target: &CoverageTarget) -> &[CoverageTarget] {
        &self.dependents[self.expect_node(target).index()]
    }

    /// Direct controllers of `target`, self loops excluded.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a vertex of this graph.
    pub fn real_parents(&self, target: &CoverageTarget) -> Vec<&CoverageTarget> {
        let node = self.expect_node(target);
        let mut parents: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|&p| p != node)
            .collect();
        parents.sort_unstable();
        parents.dedup();
        parents.into_iter().map(|p| &self.graph[p]).collect()
    }

    /// Mean root distance over all vertices.
    pub fn average_depth(&self) -> f64 {
        self.average_depth
    }

    /// Branch count reported by the analysis.
    pub fn branches(&self) -> usize {
        self.branches
    }

    /// Assertion count reported by the analysis.
    pub fn assertions(&self) -> usize {
        self.assertions
    }

    /// Graphviz rendering, one labelled vertex per target.
    pub fn to_dot(&self) -> String {
        let labelled = self.graph.map(|_, t| t.to_string(), |_, _| "");
        format!("{}", Dot::with_config(&labelled, &[Config::EdgeNoLabel]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdg::input::EdgeRecord;

    const R: u64 = ROOT_BLOCK;

    fn build(nodes: &[u64], edges: &[(usize, usize)]) -> CdgResult<ControlDependenceGraph> {
        let edges = edges.iter().map(|&(a, b)| EdgeRecord::new(a, b)).collect();
        ControlDependenceGraph::from_input(&CdgInput::new("unit", nodes.to_vec(), edges))
    }

    fn t(block: u64) -> CoverageTarget {
        CoverageTarget::new("unit", block)
    }

    fn blocks(targets: &[CoverageTarget]) -> Vec<u64> {
        targets.iter().map(CoverageTarget::block).collect()
    }

    /// root → 1 → {2, 3}; 2 → {6, 7}; 3 → 8; 7 → 10; 1 → 1 (self loop)
    fn tree() -> ControlDependenceGraph {
        build(
            &[R, 1, 2, 3, 6, 7, 8, 10],
            &[(0, 1), (1, 2), (1, 3), (2, 4), (2, 5), (3, 6), (5, 7), (1, 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_path_to() {
        let cdg = tree();
        assert_eq!(blocks(cdg.path_to(&t(10))), vec![R, 1, 2, 7, 10]);
        assert_eq!(blocks(cdg.path_to(&t(1))), vec![R, 1]);
        assert_eq!(blocks(cdg.path_to(cdg.root())), vec![R]);
        assert_eq!(cdg.distance(&t(10)), 4);
    }

    #[test]
    fn test_shortest_path_prefers_short_route() {
        // root → 1 → 2 → 3 and root → 3
        let cdg = build(&[R, 1, 2, 3], &[(0, 1), (1, 2), (2, 3), (0, 3)]).unwrap();
        assert_eq!(blocks(cdg.path_to(&t(3))), vec![R, 3]);
    }

    #[test]
    fn test_approach_level() {
        let cdg = tree();
        let covered = [t(1), t(2)];
        let level = cdg.approach_level(&t(10), |x| covered.contains(x));
        assert_eq!(level, 2); // 2 → 7 → 10
        assert_eq!(cdg.approach_level(&t(2), |x| covered.contains(x)), 0);
        assert_eq!(cdg.approach_level(&t(10), |_| false), 5);
    }

    #[test]
    fn test_independent_and_dependent_targets() {
        let cdg = tree();
        assert_eq!(cdg.independent_targets(), vec![&t(1)]);
        assert_eq!(cdg.dependent_targets(&t(1)), vec![&t(2), &t(3)]);
        assert!(cdg.dependent_targets(&t(10)).is_empty());
    }

    #[test]
    fn test_all_dependents_transitive() {
        let cdg = tree();
        assert_eq!(blocks(cdg.all_dependents(&t(2))), vec![6, 7, 10]);
        assert_eq!(blocks(cdg.all_dependents(&t(1))), vec![2, 3, 6, 7, 8, 10]);
        assert!(cdg.all_dependents(&t(8)).is_empty());
    }

    #[test]
    fn test_targets_exclude_root() {
        let cdg = tree();
        let targets: Vec<u64> = cdg.targets().map(CoverageTarget::block).collect();
        assert_eq!(targets, vec![1, 2, 3, 6, 7, 8, 10]);
        assert_eq!(cdg.len(), 8);
    }

    #[test]
    fn test_real_parents_skip_self_loop() {
        let cdg = tree();
        assert_eq!(cdg.real_parents(&t(1)), vec![cdg.root()]);
        assert_eq!(cdg.real_parents(&t(7)), vec![&t(2)]);
    }

    #[test]
    fn test_average_depth() {
        let cdg = build(&[R, 1, 2], &[(0, 1), (1, 2)]).unwrap();
        assert!((cdg.average_depth() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_root() {
        let err = build(&[1, 2], &[(0, 1)]).unwrap_err();
        assert!(matches!(err, CdgError::MissingRoot { .. }));
    }

    #[test]
    fn test_unreachable_vertex() {
        let err = build(&[R, 1, 2], &[(0, 1)]).unwrap_err();
        assert!(matches!(err, CdgError::Unreachable { block: 2, .. }));
    }

    #[test]
    fn test_edge_out_of_bounds() {
        let err = build(&[R, 1], &[(0, 5)]).unwrap_err();
        assert!(matches!(err, CdgError::EdgeOutOfBounds { to: 5, .. }));
    }

    #[test]
    fn test_duplicate_block() {
        let err = build(&[R, 1, 1], &[(0, 1)]).unwrap_err();
        assert!(matches!(err, CdgError::DuplicateBlock { block: 1, .. }));
    }

    #[test]
    fn test_foreign_target_not_contained() {
        let cdg = tree();
        assert!(cdg.contains(&t(7)));
        assert!(!cdg.contains(&CoverageTarget::new("other", 7)));
    }

    #[test]
    #[should_panic(expected = "not part of the CDG")]
    fn test_path_to_unknown_target_panics() {
        tree().path_to(&t(99));
    }

    #[test]
    fn test_to_dot_mentions_targets() {
        let dot = tree().to_dot();
        assert!(dot.contains("digraph"));
        assert!(dot.contains("unit:10"));
        assert!(dot.contains("unit:root"));
    }
}
