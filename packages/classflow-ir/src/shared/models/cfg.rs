//! Intraprocedural control-flow graph
//!
//! The core consumes CFGs, it does not derive them from source: a front end
//! (or a test) assembles one per method with `add_node` / `add_edge`. Entry
//! and exit are ordinary `Nop` statements of the method so that every node
//! the solvers touch is a real statement id.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ir::{MethodId, StmtId};

/// Control-flow edge kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CfgEdgeKind {
    /// Fall-through
    Normal,
    /// True branch of an `If`
    IfTrue,
    /// False branch of an `If`
    IfFalse,
    /// `Switch` case edge carrying its case value
    SwitchCase(i32),
    /// `Switch` default edge
    SwitchDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgEdge {
    pub source: StmtId,
    pub target: StmtId,
    pub kind: CfgEdgeKind,
}

/// CFG of one method
#[derive(Debug, Clone)]
pub struct Cfg {
    method: MethodId,
    entry: StmtId,
    exit: StmtId,
    nodes: Vec<StmtId>,
    out_edges: FxHashMap<StmtId, Vec<CfgEdge>>,
    in_edges: FxHashMap<StmtId, Vec<CfgEdge>>,
}

const NO_EDGES: &[CfgEdge] = &[];

impl Cfg {
    /// Create a CFG whose entry and exit nodes are the given statements.
    /// Both are registered as nodes.
    pub fn new(method: MethodId, entry: StmtId, exit: StmtId) -> Self {
        let mut cfg = Self {
            method,
            entry,
            exit,
            nodes: Vec::new(),
            out_edges: FxHashMap::default(),
            in_edges: FxHashMap::default(),
        };
        cfg.add_node(entry);
        if exit != entry {
            cfg.add_node(exit);
        }
        cfg
    }

    pub fn add_node(&mut self, stmt: StmtId) {
        if !self.nodes.contains(&stmt) {
            self.nodes.push(stmt);
        }
    }

    pub fn add_edge(&mut self, source: StmtId, target: StmtId, kind: CfgEdgeKind) {
        self.add_node(source);
        self.add_node(target);
        let edge = CfgEdge { source, target, kind };
        self.out_edges.entry(source).or_default().push(edge);
        self.in_edges.entry(target).or_default().push(edge);
    }

    #[inline]
    pub fn method(&self) -> MethodId {
        self.method
    }

    #[inline]
    pub fn entry(&self) -> StmtId {
        self.entry
    }

    #[inline]
    pub fn exit(&self) -> StmtId {
        self.exit
    }

    /// Nodes in insertion order (entry first)
    pub fn nodes(&self) -> &[StmtId] {
        &self.nodes
    }

    pub fn out_edges_of(&self, stmt: StmtId) -> &[CfgEdge] {
        self.out_edges.get(&stmt).map_or(NO_EDGES, Vec::as_slice)
    }

    pub fn in_edges_of(&self, stmt: StmtId) -> &[CfgEdge] {
        self.in_edges.get(&stmt).map_or(NO_EDGES, Vec::as_slice)
    }

    pub fn succs_of(&self, stmt: StmtId) -> impl Iterator<Item = StmtId> + '_ {
        self.out_edges_of(stmt).iter().map(|e| e.target)
    }

    pub fn preds_of(&self, stmt: StmtId) -> impl Iterator<Item = StmtId> + '_ {
        self.in_edges_of(stmt).iter().map(|e| e.source)
    }
}
