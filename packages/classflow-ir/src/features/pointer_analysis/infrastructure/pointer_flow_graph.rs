//! Pointer flow graph
//!
//! Directed graph whose edges are subset constraints: an edge `s -> t`
//! obliges `pts(s) ⊆ pts(t)` at the fixpoint. Edge insertion is idempotent
//! and reports whether the edge is new, so the solver seeds the target with
//! the source's current points-to set exactly once per edge.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::pointer_analysis::domain::pointer::PointerId;

#[derive(Debug, Default)]
pub struct PointerFlowGraph {
    succs: FxHashMap<PointerId, Vec<PointerId>>,
    edge_set: FxHashSet<(PointerId, PointerId)>,
}

impl PointerFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `source -> target`. Returns false when already present.
    pub fn add_edge(&mut self, source: PointerId, target: PointerId) -> bool {
        if !self.edge_set.insert((source, target)) {
            return false;
        }
        self.succs.entry(source).or_default().push(target);
        true
    }

    /// Successors in edge-insertion order. The slice stays valid while the
    /// solver pushes worklist entries; graph mutation never happens during
    /// the iteration.
    pub fn succs_of(&self, pointer: PointerId) -> &[PointerId] {
        self.succs.get(&pointer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, source: PointerId, target: PointerId) -> bool {
        self.edge_set.contains(&(source, target))
    }

    pub fn num_edges(&self) -> usize {
        self.edge_set.len()
    }

    /// All edges, for invariant checking and reporting
    pub fn edges(&self) -> impl Iterator<Item = (PointerId, PointerId)> + '_ {
        self.succs
            .iter()
            .flat_map(|(&s, ts)| ts.iter().map(move |&t| (s, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_is_idempotent() {
        let mut pfg = PointerFlowGraph::new();
        assert!(pfg.add_edge(1, 2));
        assert!(!pfg.add_edge(1, 2));
        assert_eq!(pfg.num_edges(), 1);
        assert_eq!(pfg.succs_of(1), &[2]);
    }

    #[test]
    fn test_succs_in_insertion_order() {
        let mut pfg = PointerFlowGraph::new();
        pfg.add_edge(1, 5);
        pfg.add_edge(1, 3);
        pfg.add_edge(1, 4);
        assert_eq!(pfg.succs_of(1), &[5, 3, 4]);
        assert!(pfg.succs_of(9).is_empty());
    }

    #[test]
    fn test_self_loops_and_cycles_allowed() {
        let mut pfg = PointerFlowGraph::new();
        assert!(pfg.add_edge(1, 1));
        assert!(pfg.add_edge(1, 2));
        assert!(pfg.add_edge(2, 1));
        assert_eq!(pfg.num_edges(), 3);
        assert!(pfg.has_edge(2, 1));
    }
}
