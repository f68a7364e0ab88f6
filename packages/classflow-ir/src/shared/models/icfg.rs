//! Interprocedural control-flow graph
//!
//! Union of per-method CFGs with four edge kinds. Assembled by the caller:
//! `add_cfg` copies a method CFG in (all intra edges become `Normal`), then
//! `link_call` rewires one call site: the fall-through edge becomes
//! `CallToReturn`, a `Call` edge runs to the callee entry, and `Return`
//! edges run from the callee exit back to every return site.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::cfg::Cfg;
use super::ir::{MethodId, StmtId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcfgEdgeKind {
    Normal,
    /// Call site to callee entry
    Call,
    /// Call site to its fall-through successor, bypassing the callee
    CallToReturn,
    /// Callee exit to the return site; remembers which call it answers
    Return { call_site: StmtId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcfgEdge {
    pub source: StmtId,
    pub target: StmtId,
    pub kind: IcfgEdgeKind,
}

#[derive(Debug, Clone, Default)]
pub struct Icfg {
    entry_methods: Vec<MethodId>,
    nodes: Vec<StmtId>,
    node_set: FxHashSet<StmtId>,
    entry_of: FxHashMap<MethodId, StmtId>,
    exit_of: FxHashMap<MethodId, StmtId>,
    out_edges: FxHashMap<StmtId, Vec<IcfgEdge>>,
    in_edges: FxHashMap<StmtId, Vec<IcfgEdge>>,
}

const NO_EDGES: &[IcfgEdge] = &[];

impl Icfg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a method as a program entry; its CFG entry node receives the
    /// boundary fact.
    pub fn add_entry_method(&mut self, method: MethodId) {
        if !self.entry_methods.contains(&method) {
            self.entry_methods.push(method);
        }
    }

    /// Copy one method CFG into the graph. Intra edge kinds are collapsed to
    /// `Normal`; branch kinds only matter to the intraprocedural clients.
    pub fn add_cfg(&mut self, cfg: &Cfg) {
        self.entry_of.insert(cfg.method(), cfg.entry());
        self.exit_of.insert(cfg.method(), cfg.exit());
        for &n in cfg.nodes() {
            self.add_node(n);
        }
        for &n in cfg.nodes() {
            for e in cfg.out_edges_of(n) {
                self.add_edge(e.source, e.target, IcfgEdgeKind::Normal);
            }
        }
    }

    pub fn add_node(&mut self, stmt: StmtId) {
        if self.node_set.insert(stmt) {
            self.nodes.push(stmt);
        }
    }

    pub fn add_edge(&mut self, source: StmtId, target: StmtId, kind: IcfgEdgeKind) {
        self.add_node(source);
        self.add_node(target);
        let edge = IcfgEdge { source, target, kind };
        self.out_edges.entry(source).or_default().push(edge);
        self.in_edges.entry(target).or_default().push(edge);
    }

    /// Wire one call site to a callee whose CFG has been added already.
    ///
    /// Every existing `Normal` out-edge of the call site is downgraded to
    /// `CallToReturn`, and each of its targets gains a `Return` edge from the
    /// callee exit.
    pub fn link_call(&mut self, call_site: StmtId, callee: MethodId) {
        let entry = self.entry_of[&callee];
        let exit = self.exit_of[&callee];

        let mut return_sites = Vec::new();
        if let Some(edges) = self.out_edges.get_mut(&call_site) {
            for e in edges.iter_mut() {
                if e.kind == IcfgEdgeKind::Normal {
                    e.kind = IcfgEdgeKind::CallToReturn;
                }
                if e.kind == IcfgEdgeKind::CallToReturn {
                    return_sites.push(e.target);
                }
            }
        }
        for edges in self.in_edges.values_mut() {
            for e in edges.iter_mut() {
                if e.source == call_site && e.kind == IcfgEdgeKind::Normal {
                    e.kind = IcfgEdgeKind::CallToReturn;
                }
            }
        }

        self.add_edge(call_site, entry, IcfgEdgeKind::Call);
        for site in return_sites {
            self.add_edge(exit, site, IcfgEdgeKind::Return { call_site });
        }
    }

    pub fn entry_methods(&self) -> &[MethodId] {
        &self.entry_methods
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[StmtId] {
        &self.nodes
    }

    pub fn entry_of(&self, method: MethodId) -> Option<StmtId> {
        self.entry_of.get(&method).copied()
    }

    pub fn exit_of(&self, method: MethodId) -> Option<StmtId> {
        self.exit_of.get(&method).copied()
    }

    pub fn out_edges_of(&self, stmt: StmtId) -> &[IcfgEdge] {
        self.out_edges.get(&stmt).map_or(NO_EDGES, Vec::as_slice)
    }

    pub fn in_edges_of(&self, stmt: StmtId) -> &[IcfgEdge] {
        self.in_edges.get(&stmt).map_or(NO_EDGES, Vec::as_slice)
    }

    pub fn succs_of(&self, stmt: StmtId) -> impl Iterator<Item = StmtId> + '_ {
        self.out_edges_of(stmt).iter().map(|e| e.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::cfg::CfgEdgeKind;

    #[test]
    fn test_link_call_rewires_fall_through() {
        // caller: entry(0) -> call(1) -> ret_site(2) -> exit(3)
        // callee: entry(10) -> body(11) -> exit(12)
        let mut caller = Cfg::new(0, 0, 3);
        caller.add_edge(0, 1, CfgEdgeKind::Normal);
        caller.add_edge(1, 2, CfgEdgeKind::Normal);
        caller.add_edge(2, 3, CfgEdgeKind::Normal);
        let mut callee = Cfg::new(1, 10, 12);
        callee.add_edge(10, 11, CfgEdgeKind::Normal);
        callee.add_edge(11, 12, CfgEdgeKind::Normal);

        let mut icfg = Icfg::new();
        icfg.add_cfg(&caller);
        icfg.add_cfg(&callee);
        icfg.add_entry_method(0);
        icfg.link_call(1, 1);

        let kinds: Vec<_> = icfg.out_edges_of(1).iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&IcfgEdgeKind::CallToReturn));
        assert!(kinds.contains(&IcfgEdgeKind::Call));

        let into_ret_site: Vec<_> = icfg.in_edges_of(2).iter().map(|e| e.kind).collect();
        assert!(into_ret_site.contains(&IcfgEdgeKind::Return { call_site: 1 }));

        // call edge lands on the callee entry
        assert!(icfg
            .out_edges_of(1)
            .iter()
            .any(|e| e.kind == IcfgEdgeKind::Call && e.target == 10));
    }
}
