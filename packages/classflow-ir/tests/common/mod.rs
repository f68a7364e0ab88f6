#![allow(dead_code)] // not every test binary uses every helper

//! Shared helpers for the end-to-end tests
//!
//! Builds small programs through the public `ProgramBuilder` API and
//! canonicalizes solver output into interning-order-independent shapes so
//! results from differently ordered runs can be compared directly.

use std::collections::{BTreeMap, BTreeSet};

use classflow_ir::features::pointer_analysis::domain::pointer::Pointer;
use classflow_ir::shared::models::ir::{CallKind, StmtId, VarId};
use classflow_ir::{ContextSelector, PointerAnalysis};

/// Pointer identity expressed through stable program facts (context call
/// strings, allocation sites, fields) instead of interning indexes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CanonPtr {
    Var(Vec<StmtId>, VarId),
    InstanceField(CanonObj, u32),
    StaticField(u32),
    ArrayIndex(CanonObj),
}

/// (heap-context call string, allocation site)
pub type CanonObj = (Vec<StmtId>, StmtId);

pub type PtsSnapshot = BTreeMap<CanonPtr, BTreeSet<CanonObj>>;
pub type CallGraphSnapshot = BTreeSet<(CallKind, Vec<StmtId>, StmtId, Vec<StmtId>, u32)>;

pub fn canon_obj<S: ContextSelector>(pta: &PointerAnalysis<'_, S>, cs_obj: u32) -> CanonObj {
    let (heap_ctx, obj) = pta.cs_manager().cs_obj_parts(cs_obj);
    let elems = pta.cs_manager().context(heap_ctx).elems().to_vec();
    (elems, pta.heap().obj(obj).alloc_site)
}

/// Every pointer's points-to set in canonical form
pub fn pts_snapshot<S: ContextSelector>(pta: &PointerAnalysis<'_, S>) -> PtsSnapshot {
    let mut snapshot = PtsSnapshot::new();
    for (id, pointer) in pta.cs_manager().pointers() {
        let canon = match pointer {
            Pointer::Var { ctx, var } => {
                CanonPtr::Var(pta.cs_manager().context(ctx).elems().to_vec(), var)
            }
            Pointer::InstanceField { obj, field } => {
                CanonPtr::InstanceField(canon_obj(pta, obj), field)
            }
            Pointer::StaticField { field } => CanonPtr::StaticField(field),
            Pointer::ArrayIndex { obj } => CanonPtr::ArrayIndex(canon_obj(pta, obj)),
        };
        let objs = pta
            .points_to(id)
            .iter()
            .map(|o| canon_obj(pta, o))
            .collect::<BTreeSet<_>>();
        if !objs.is_empty() {
            snapshot.insert(canon, objs);
        }
    }
    snapshot
}

/// Call-graph edges in canonical form
pub fn call_graph_snapshot<S: ContextSelector>(pta: &PointerAnalysis<'_, S>) -> CallGraphSnapshot {
    let csm = pta.cs_manager();
    pta.call_graph()
        .edges()
        .iter()
        .map(|e| {
            let (site_ctx, site) = csm.cs_call_site_parts(e.call_site);
            let (m_ctx, method) = csm.cs_method_parts(e.callee);
            (
                e.kind,
                csm.context(site_ctx).elems().to_vec(),
                site,
                csm.context(m_ctx).elems().to_vec(),
                method,
            )
        })
        .collect()
}

/// `pts(s) ⊆ pts(t)` must hold for every PFG edge at quiescence
pub fn assert_pfg_subset_invariant<S: ContextSelector>(pta: &PointerAnalysis<'_, S>) {
    for (s, t) in pta.pfg().edges() {
        for obj in pta.points_to(s).iter() {
            assert!(
                pta.points_to(t).contains(obj),
                "subset invariant violated on PFG edge {s} -> {t}"
            );
        }
    }
}
