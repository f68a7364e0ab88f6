//! Context-sensitive call graph, grown on the fly
//!
//! Nodes are context-sensitive methods; edges connect a context-sensitive
//! call site to its resolved callee and carry the call kind. Reachability
//! and edge insertion are idempotent, and both iterate in insertion order
//! for reproducible output.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::pointer::{CsCallSiteId, CsMethodId};
use crate::shared::models::ir::CallKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub kind: CallKind,
    pub call_site: CsCallSiteId,
    pub callee: CsMethodId,
}

#[derive(Debug, Default)]
pub struct CsCallGraph {
    reachable: Vec<CsMethodId>,
    reachable_set: FxHashSet<CsMethodId>,
    entries: Vec<CsMethodId>,
    edges: Vec<CallEdge>,
    edge_set: FxHashSet<(CsCallSiteId, CsMethodId)>,
}

impl CsCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry_method(&mut self, method: CsMethodId) {
        if !self.entries.contains(&method) {
            self.entries.push(method);
        }
    }

    /// Mark a method reachable. Returns false when it already was, in which
    /// case the caller must not re-walk its statements.
    pub fn add_reachable_method(&mut self, method: CsMethodId) -> bool {
        if self.reachable_set.insert(method) {
            self.reachable.push(method);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn contains(&self, method: CsMethodId) -> bool {
        self.reachable_set.contains(&method)
    }

    /// Add a call edge. Returns false when the (call site, callee) pair is
    /// already connected; the solver gates parameter and return wiring on
    /// this.
    pub fn add_edge(&mut self, edge: CallEdge) -> bool {
        if self.edge_set.insert((edge.call_site, edge.callee)) {
            self.edges.push(edge);
            true
        } else {
            false
        }
    }

    /// Reachable methods in discovery order
    pub fn reachable_methods(&self) -> &[CsMethodId] {
        &self.reachable
    }

    pub fn entry_methods(&self) -> &[CsMethodId] {
        &self.entries
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    /// Callees of one context-sensitive call site
    pub fn callees_of(&self, call_site: CsCallSiteId) -> impl Iterator<Item = CsMethodId> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.call_site == call_site)
            .map(|e| e.callee)
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}
