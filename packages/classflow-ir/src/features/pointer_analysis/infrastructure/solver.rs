/*
 * Pointer Analysis Solver
 *
 * Fixpoint over the pointer flow graph with on-the-fly call-graph
 * construction:
 * 1. Wrap the entry method in the empty context and mark it reachable;
 *    walking a newly reachable method seeds allocations and wires copies,
 *    static field accesses and static calls.
 * 2. Drain the worklist: merge each delta into its pointer, forward it to
 *    PFG successors, and, for variable nodes, wire the instance field,
 *    array and call constraints that the new receiver objects unlock.
 * 3. Call edges discovered en route make more methods reachable, growing
 *    the graph mid-flight; monotone points-to sets over a finite domain of
 *    (context, object) pairs guarantee termination.
 *
 * Context-insensitive and context-sensitive analyses are the same engine:
 * only the supplied context selector differs.
 */

use serde::Serialize;

use crate::errors::{ClassflowError, Result};
use crate::features::pointer_analysis::domain::call_graph::{CallEdge, CsCallGraph};
use crate::features::pointer_analysis::domain::context::ContextSelector;
use crate::features::pointer_analysis::domain::obj::HeapModel;
use crate::features::pointer_analysis::domain::pointer::{
    CsMethodId, CsObjId, CtxId, Pointer, PointerId,
};
use crate::features::pointer_analysis::domain::points_to_set::PointsToSet;
use crate::features::pointer_analysis::domain::var_points_to::VarPointsTo;
use crate::shared::models::ir::{
    ClassHierarchy, Invoke, MethodId, Program, StmtId, StmtKind, VarId,
};

use super::cs_manager::CsManager;
use super::pointer_flow_graph::PointerFlowGraph;
use super::worklist::{Discipline, WorkList};

/// Solver tuning knobs
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverConfig {
    /// Work-queue pop order; the fixpoint is the same for every choice
    pub discipline: Discipline,
}

/// Counters reported after `solve()`
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolverStats {
    pub pointers: usize,
    pub objects: usize,
    pub pfg_edges: usize,
    pub reachable_methods: usize,
    pub call_edges: usize,
    pub propagated_objects: usize,
    pub worklist_polls: usize,
}

pub struct PointerAnalysis<'p, S: ContextSelector> {
    program: &'p Program,
    hierarchy: ClassHierarchy,
    selector: S,
    heap: HeapModel,
    csm: CsManager,
    pfg: PointerFlowGraph,
    cg: CsCallGraph,
    pts: Vec<PointsToSet>,
    worklist: WorkList,
    stats: SolverStats,
}

impl<'p, S: ContextSelector> PointerAnalysis<'p, S> {
    pub fn new(program: &'p Program, hierarchy: ClassHierarchy, selector: S) -> Self {
        Self::with_config(program, hierarchy, selector, SolverConfig::default())
    }

    pub fn with_config(
        program: &'p Program,
        hierarchy: ClassHierarchy,
        selector: S,
        config: SolverConfig,
    ) -> Self {
        Self {
            program,
            hierarchy,
            selector,
            heap: HeapModel::new(),
            csm: CsManager::new(),
            pfg: PointerFlowGraph::new(),
            cg: CsCallGraph::new(),
            pts: Vec::new(),
            worklist: WorkList::with_discipline(config.discipline),
            stats: SolverStats::default(),
        }
    }

    /// Run to the fixpoint. Single-shot: results are immutable afterwards.
    pub fn solve(&mut self) -> Result<()> {
        let entry = self.program.entry();
        if self.program.method(entry).is_abstract {
            return Err(ClassflowError::analysis("entry method is abstract"));
        }
        let ctx = self.csm.empty_ctx();
        let cs_entry = self.csm.cs_method(ctx, entry);
        self.cg.add_entry_method(cs_entry);
        self.add_reachable(cs_entry)?;
        self.analyze()?;

        self.stats.pointers = self.csm.num_pointers();
        self.stats.objects = self.heap.num_objs();
        self.stats.pfg_edges = self.pfg.num_edges();
        self.stats.reachable_methods = self.cg.reachable_methods().len();
        self.stats.call_edges = self.cg.num_edges();
        tracing::info!(
            pointers = self.stats.pointers,
            objects = self.stats.objects,
            pfg_edges = self.stats.pfg_edges,
            reachable = self.stats.reachable_methods,
            call_edges = self.stats.call_edges,
            "pointer analysis reached fixpoint"
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Reachability and the initial statement processor
    // ═══════════════════════════════════════════════════════════════════

    /// Mark a context-sensitive method reachable and walk its statements
    /// once. Instance field and array accesses wait for receiver objects;
    /// only allocation, copy, static field and static call statements are
    /// wired here.
    fn add_reachable(&mut self, cs_method: CsMethodId) -> Result<()> {
        if !self.cg.add_reachable_method(cs_method) {
            return Ok(());
        }
        let (ctx, method) = self.csm.cs_method_parts(cs_method);
        tracing::debug!(method = %self.program.method(method).name, ctx, "method reachable");
        let program = self.program;
        for &sid in &program.method(method).stmts {
            match &program.stmt(sid).kind {
                StmtKind::New { lhs, alloc } => {
                    let obj = self.heap.get_obj(sid, *alloc);
                    let method_ctx = self.csm.context(ctx).clone();
                    let heap_ctx_val = self.selector.select_heap_context(&method_ctx, obj);
                    let heap_ctx = self.csm.ctx(heap_ctx_val);
                    let cs_obj = self.csm.cs_obj(heap_ctx, obj);
                    let ptr = self.csm.var_ptr(ctx, *lhs);
                    self.worklist.add(ptr, PointsToSet::singleton(cs_obj));
                }
                StmtKind::Copy { lhs, rhs } => {
                    let source = self.csm.var_ptr(ctx, *rhs);
                    let target = self.csm.var_ptr(ctx, *lhs);
                    self.add_pfg_edge(source, target);
                }
                StmtKind::StoreField { base: None, field, rhs } => {
                    let source = self.csm.var_ptr(ctx, *rhs);
                    let target = self.csm.static_field_ptr(*field);
                    self.add_pfg_edge(source, target);
                }
                StmtKind::LoadField { lhs, base: None, field } => {
                    let source = self.csm.static_field_ptr(*field);
                    let target = self.csm.var_ptr(ctx, *lhs);
                    self.add_pfg_edge(source, target);
                }
                StmtKind::Invoke(invoke) if invoke.kind.is_static() => {
                    self.process_static_call(ctx, sid, invoke)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn process_static_call(&mut self, ctx: CtxId, call_site: StmtId, invoke: &Invoke) -> Result<()> {
        // unresolved callees are silently skipped
        let Some(callee) = self.hierarchy.resolve_callee(self.program, None, invoke) else {
            return Ok(());
        };
        let cs_call_site = self.csm.cs_call_site(ctx, call_site);
        let caller_ctx = self.csm.context(ctx).clone();
        let callee_ctx_val = self.selector.select_static_context(&caller_ctx, call_site, callee);
        let callee_ctx = self.csm.ctx(callee_ctx_val);
        let cs_callee = self.csm.cs_method(callee_ctx, callee);
        self.add_reachable(cs_callee)?;
        let edge = CallEdge { kind: invoke.kind, call_site: cs_call_site, callee: cs_callee };
        if self.cg.add_edge(edge) {
            self.wire_call(ctx, callee_ctx, invoke, callee);
        }
        Ok(())
    }

    /// Parameter and return wiring for a fresh call edge
    fn wire_call(&mut self, caller_ctx: CtxId, callee_ctx: CtxId, invoke: &Invoke, callee: MethodId) {
        let callee_m = self.program.method(callee);
        let pairs: Vec<(VarId, VarId)> = invoke
            .args
            .iter()
            .copied()
            .zip(callee_m.params.iter().copied())
            .collect();
        for (arg, param) in pairs {
            let source = self.csm.var_ptr(caller_ctx, arg);
            let target = self.csm.var_ptr(callee_ctx, param);
            self.add_pfg_edge(source, target);
        }
        if let Some(result) = invoke.result {
            let ret_vars = callee_m.return_vars.clone();
            for rv in ret_vars {
                let source = self.csm.var_ptr(callee_ctx, rv);
                let target = self.csm.var_ptr(caller_ctx, result);
                self.add_pfg_edge(source, target);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // The fixpoint loop
    // ═══════════════════════════════════════════════════════════════════

    /// New edges seed the target with the source's current set exactly once.
    fn add_pfg_edge(&mut self, source: PointerId, target: PointerId) {
        if self.pfg.add_edge(source, target) {
            let pts = self.pts_of(source).clone();
            if !pts.is_empty() {
                self.worklist.add(target, pts);
            }
        }
    }

    fn analyze(&mut self) -> Result<()> {
        while let Some(entry) = self.worklist.poll() {
            self.stats.worklist_polls += 1;
            let delta = self.propagate(entry.pointer, &entry.pts);
            if delta.is_empty() {
                continue;
            }
            if let Pointer::Var { ctx, var } = self.csm.pointer_at(entry.pointer) {
                let program = self.program;
                for cs_obj in delta.to_sorted_vec() {
                    for &sid in program.store_fields_of(var) {
                        if let StmtKind::StoreField { field, rhs, .. } = &program.stmt(sid).kind {
                            let source = self.csm.var_ptr(ctx, *rhs);
                            let target = self.csm.instance_field_ptr(cs_obj, *field);
                            self.add_pfg_edge(source, target);
                        }
                    }
                    for &sid in program.load_fields_of(var) {
                        if let StmtKind::LoadField { lhs, field, .. } = &program.stmt(sid).kind {
                            let source = self.csm.instance_field_ptr(cs_obj, *field);
                            let target = self.csm.var_ptr(ctx, *lhs);
                            self.add_pfg_edge(source, target);
                        }
                    }
                    for &sid in program.store_arrays_of(var) {
                        if let StmtKind::StoreArray { rhs, .. } = &program.stmt(sid).kind {
                            let source = self.csm.var_ptr(ctx, *rhs);
                            let target = self.csm.array_index_ptr(cs_obj);
                            self.add_pfg_edge(source, target);
                        }
                    }
                    for &sid in program.load_arrays_of(var) {
                        if let StmtKind::LoadArray { lhs, .. } = &program.stmt(sid).kind {
                            let source = self.csm.array_index_ptr(cs_obj);
                            let target = self.csm.var_ptr(ctx, *lhs);
                            self.add_pfg_edge(source, target);
                        }
                    }
                    self.process_call(ctx, var, cs_obj)?;
                }
            }
        }
        Ok(())
    }

    /// Merge `pts` into the pointer's set and forward the growth to PFG
    /// successors. Returns the growth; an empty delta means nothing to do.
    fn propagate(&mut self, pointer: PointerId, pts: &PointsToSet) -> PointsToSet {
        let delta = self.pts_of(pointer).diff(pts);
        if !delta.is_empty() {
            self.pts_mut(pointer).union_into(&delta);
            self.stats.propagated_objects += delta.len();
            for &t in self.pfg.succs_of(pointer) {
                self.worklist.add(t, delta.clone());
            }
        }
        delta
    }

    /// Instance-call handling when the receiver variable gains an object:
    /// dispatch on the object's class, pass the receiver into `this`, make
    /// the callee reachable, and wire arguments and returns for new edges.
    fn process_call(&mut self, caller_ctx: CtxId, recv_var: VarId, recv_obj: CsObjId) -> Result<()> {
        let program = self.program;
        for &sid in program.invokes_of(recv_var) {
            let StmtKind::Invoke(invoke) = &program.stmt(sid).kind else {
                continue;
            };
            if invoke.kind.is_static() {
                continue;
            }
            let (heap_ctx, obj) = self.csm.cs_obj_parts(recv_obj);
            let recv_class = self.heap.obj(obj).class;
            let Some(callee) = self.hierarchy.resolve_callee(program, recv_class, invoke) else {
                continue;
            };
            let cs_call_site = self.csm.cs_call_site(caller_ctx, sid);
            let caller_context = self.csm.context(caller_ctx).clone();
            let heap_context = self.csm.context(heap_ctx).clone();
            let callee_ctx_val = self
                .selector
                .select_instance_context(&caller_context, sid, &heap_context, obj, callee);
            let callee_ctx = self.csm.ctx(callee_ctx_val);

            let this_var = program.method(callee).this_var.ok_or_else(|| {
                ClassflowError::analysis(format!(
                    "instance method `{}` has no receiver variable",
                    program.method(callee).name
                ))
            })?;
            let this_ptr = self.csm.var_ptr(callee_ctx, this_var);
            self.worklist.add(this_ptr, PointsToSet::singleton(recv_obj));

            let cs_callee = self.csm.cs_method(callee_ctx, callee);
            self.add_reachable(cs_callee)?;
            let edge = CallEdge { kind: invoke.kind, call_site: cs_call_site, callee: cs_callee };
            if self.cg.add_edge(edge) {
                self.wire_call(caller_ctx, callee_ctx, invoke, callee);
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Results
    // ═══════════════════════════════════════════════════════════════════

    fn pts_of(&mut self, pointer: PointerId) -> &PointsToSet {
        self.ensure_pts(pointer);
        &self.pts[pointer as usize]
    }

    fn pts_mut(&mut self, pointer: PointerId) -> &mut PointsToSet {
        self.ensure_pts(pointer);
        &mut self.pts[pointer as usize]
    }

    fn ensure_pts(&mut self, pointer: PointerId) {
        if self.pts.len() <= pointer as usize {
            self.pts.resize_with(pointer as usize + 1, PointsToSet::new);
        }
    }

    /// Final points-to set of a pointer node
    pub fn points_to(&self, pointer: PointerId) -> &PointsToSet {
        static EMPTY: PointsToSet = PointsToSet::new();
        self.pts.get(pointer as usize).unwrap_or(&EMPTY)
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    pub fn pfg(&self) -> &PointerFlowGraph {
        &self.pfg
    }

    pub fn call_graph(&self) -> &CsCallGraph {
        &self.cg
    }

    pub fn cs_manager(&self) -> &CsManager {
        &self.csm
    }

    pub(crate) fn cs_manager_mut(&mut self) -> &mut CsManager {
        &mut self.csm
    }

    pub fn heap(&self) -> &HeapModel {
        &self.heap
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Context-merged, variable-level view for the dataflow clients
    pub fn var_points_to(&self) -> VarPointsTo {
        let mut vpt = VarPointsTo::new();
        for (id, pointer) in self.csm.pointers() {
            if let Pointer::Var { var, .. } = pointer {
                for cs_obj in self.points_to(id).iter() {
                    let (_, obj) = self.csm.cs_obj_parts(cs_obj);
                    vpt.add(var, obj);
                }
            }
        }
        vpt
    }
}
