//! End-to-end pointer-analysis scenarios
//!
//! Small hand-built programs checked against their expected points-to sets,
//! call graphs and the universal subset invariant.

mod common;

use classflow_ir::features::pointer_analysis::domain::pointer::Pointer;
use classflow_ir::shared::models::ir::{
    CallKind, ClassHierarchy, Invoke, MethodRef, NewKind, Program, StmtKind, TypeKind,
};
use classflow_ir::{
    CallSiteSensitiveSelector, ContextInsensitiveSelector, PointerAnalysis, ProgramBuilder,
};
use common::{assert_pfg_subset_invariant, call_graph_snapshot, pts_snapshot};
use rustc_hash::FxHashSet;

fn solve_ci(program: &Program) -> PointerAnalysis<'_, ContextInsensitiveSelector> {
    let hierarchy = ClassHierarchy::build(program);
    let mut pta = PointerAnalysis::new(program, hierarchy, ContextInsensitiveSelector);
    pta.solve().expect("analysis succeeds");
    pta
}

fn alloc_sites<S: classflow_ir::ContextSelector>(
    pta: &PointerAnalysis<'_, S>,
    objs: &FxHashSet<u32>,
) -> FxHashSet<u32> {
    objs.iter().map(|&o| pta.heap().obj(o).alloc_site).collect()
}

#[test]
fn test_allocation_and_copy() {
    // x = new A(); y = x
    let mut b = ProgramBuilder::new();
    let a = b.class("A", None);
    let main = b.method(a, "main", true);
    let x = b.var(main, "x", TypeKind::Reference(a));
    let y = b.var(main, "y", TypeKind::Reference(a));
    let s_new = b.stmt(main, StmtKind::New { lhs: x, alloc: NewKind::Object(a) });
    b.stmt(main, StmtKind::Copy { lhs: y, rhs: x });
    b.entry(main);
    let program = b.finish().unwrap();

    let pta = solve_ci(&program);
    let vpt = pta.var_points_to();

    let objs_of = |v| {
        vpt.points_to(v)
            .map(|s| {
                s.iter()
                    .map(|&o| pta.heap().obj(o).alloc_site)
                    .collect::<FxHashSet<_>>()
            })
            .unwrap_or_default()
    };
    assert_eq!(objs_of(x), FxHashSet::from_iter([s_new]));
    assert_eq!(objs_of(y), FxHashSet::from_iter([s_new]));
    assert_pfg_subset_invariant(&pta);
}

#[test]
fn test_virtual_dispatch_selects_runtime_class() {
    // class A { m() } class B extends A { m() }
    // b = new B(); b.m()  -- only B.m is called
    let mut b = ProgramBuilder::new();
    let a_cls = b.class("A", None);
    let b_cls = b.class("B", Some(a_cls));

    let m_a = b.method(a_cls, "m", false);
    b.this(m_a, TypeKind::Reference(a_cls));
    let m_b = b.method(b_cls, "m", false);
    b.this(m_b, TypeKind::Reference(b_cls));

    let main = b.method(a_cls, "main", true);
    let recv = b.var(main, "b", TypeKind::Reference(b_cls));
    let s_new = b.stmt(main, StmtKind::New { lhs: recv, alloc: NewKind::Object(b_cls) });
    b.stmt(
        main,
        StmtKind::Invoke(Invoke {
            result: None,
            callee: MethodRef::new(a_cls, "m", 0),
            base: Some(recv),
            args: vec![],
            kind: CallKind::Virtual,
        }),
    );
    b.entry(main);
    let program = b.finish().unwrap();

    let pta = solve_ci(&program);

    let callees: FxHashSet<u32> = pta
        .call_graph()
        .edges()
        .iter()
        .map(|e| pta.cs_manager().cs_method_parts(e.callee).1)
        .collect();
    assert_eq!(callees, FxHashSet::from_iter([m_b]), "dispatch must pick B.m only");

    let vpt = pta.var_points_to();
    let objs: FxHashSet<_> = vpt
        .points_to(recv)
        .unwrap()
        .iter()
        .map(|&o| pta.heap().obj(o).alloc_site)
        .collect();
    assert_eq!(objs, FxHashSet::from_iter([s_new]));
    assert_pfg_subset_invariant(&pta);
}

#[test]
fn test_field_sensitivity_merges_stores() {
    // a = new A(); x = new A(); y = new A();
    // a.f = x; a.f = y; z = a.f  -- pts(z) covers both stores
    let mut b = ProgramBuilder::new();
    let a_cls = b.class("A", None);
    let f = b.field(a_cls, "f", false);
    let main = b.method(a_cls, "main", true);
    let a = b.var(main, "a", TypeKind::Reference(a_cls));
    let x = b.var(main, "x", TypeKind::Reference(a_cls));
    let y = b.var(main, "y", TypeKind::Reference(a_cls));
    let z = b.var(main, "z", TypeKind::Reference(a_cls));
    b.stmt(main, StmtKind::New { lhs: a, alloc: NewKind::Object(a_cls) });
    let new_x = b.stmt(main, StmtKind::New { lhs: x, alloc: NewKind::Object(a_cls) });
    let new_y = b.stmt(main, StmtKind::New { lhs: y, alloc: NewKind::Object(a_cls) });
    b.stmt(main, StmtKind::StoreField { base: Some(a), field: f, rhs: x });
    b.stmt(main, StmtKind::StoreField { base: Some(a), field: f, rhs: y });
    b.stmt(main, StmtKind::LoadField { lhs: z, base: Some(a), field: f });
    b.entry(main);
    let program = b.finish().unwrap();

    let pta = solve_ci(&program);
    let vpt = pta.var_points_to();
    let z_objs: FxHashSet<_> = vpt
        .points_to(z)
        .unwrap()
        .iter()
        .map(|&o| pta.heap().obj(o).alloc_site)
        .collect();
    assert!(z_objs.contains(&new_x));
    assert!(z_objs.contains(&new_y));
    assert_pfg_subset_invariant(&pta);
}

#[test]
fn test_array_element_collapses() {
    // arr = new []; v = new A(); arr[i] = v; w = arr[j]
    let mut b = ProgramBuilder::new();
    let a_cls = b.class("A", None);
    let main = b.method(a_cls, "main", true);
    let arr = b.var(main, "arr", TypeKind::Array);
    let i = b.var(main, "i", TypeKind::Int);
    let j = b.var(main, "j", TypeKind::Int);
    let v = b.var(main, "v", TypeKind::Reference(a_cls));
    let w = b.var(main, "w", TypeKind::Reference(a_cls));
    b.stmt(main, StmtKind::New { lhs: arr, alloc: NewKind::Array });
    let new_v = b.stmt(main, StmtKind::New { lhs: v, alloc: NewKind::Object(a_cls) });
    b.stmt(main, StmtKind::StoreArray { base: arr, index: i, rhs: v });
    b.stmt(main, StmtKind::LoadArray { lhs: w, base: arr, index: j });
    b.entry(main);
    let program = b.finish().unwrap();

    let pta = solve_ci(&program);
    let vpt = pta.var_points_to();
    let w_objs: FxHashSet<_> = vpt
        .points_to(w)
        .unwrap()
        .iter()
        .map(|&o| pta.heap().obj(o).alloc_site)
        .collect();
    // index-insensitive: the load observes the store regardless of i and j
    assert_eq!(w_objs, FxHashSet::from_iter([new_v]));
    assert_pfg_subset_invariant(&pta);
}

#[test]
fn test_static_call_passes_args_and_returns() {
    // static A id(A p) { return p }
    // main: a = new A(); r = id(a)
    let mut b = ProgramBuilder::new();
    let a_cls = b.class("A", None);
    let id_m = b.method(a_cls, "id", true);
    let p = b.param(id_m, "p", TypeKind::Reference(a_cls));
    b.stmt(id_m, StmtKind::Return { value: Some(p) });

    let main = b.method(a_cls, "main", true);
    let a = b.var(main, "a", TypeKind::Reference(a_cls));
    let r = b.var(main, "r", TypeKind::Reference(a_cls));
    let s_new = b.stmt(main, StmtKind::New { lhs: a, alloc: NewKind::Object(a_cls) });
    b.stmt(
        main,
        StmtKind::Invoke(Invoke {
            result: Some(r),
            callee: MethodRef::new(a_cls, "id", 1),
            base: None,
            args: vec![a],
            kind: CallKind::Static,
        }),
    );
    b.entry(main);
    let program = b.finish().unwrap();

    let pta = solve_ci(&program);
    let vpt = pta.var_points_to();
    let r_objs: FxHashSet<_> = vpt
        .points_to(r)
        .unwrap()
        .iter()
        .map(|&o| pta.heap().obj(o).alloc_site)
        .collect();
    assert_eq!(r_objs, FxHashSet::from_iter([s_new]));

    // the static call produced exactly one call edge
    assert_eq!(pta.call_graph().num_edges(), 1);
    assert_eq!(pta.call_graph().edges()[0].kind, CallKind::Static);
    assert_pfg_subset_invariant(&pta);
}

#[test]
fn test_empty_receiver_produces_no_call_edges() {
    // x declared but never allocated; x.m() resolves nothing
    let mut b = ProgramBuilder::new();
    let a_cls = b.class("A", None);
    let m_a = b.method(a_cls, "m", false);
    b.this(m_a, TypeKind::Reference(a_cls));
    let main = b.method(a_cls, "main", true);
    let x = b.var(main, "x", TypeKind::Reference(a_cls));
    b.stmt(
        main,
        StmtKind::Invoke(Invoke {
            result: None,
            callee: MethodRef::new(a_cls, "m", 0),
            base: Some(x),
            args: vec![],
            kind: CallKind::Virtual,
        }),
    );
    b.entry(main);
    let program = b.finish().unwrap();

    let pta = solve_ci(&program);
    assert_eq!(pta.call_graph().num_edges(), 0);
    // only the entry is reachable
    assert_eq!(pta.call_graph().reachable_methods().len(), 1);
}

#[test]
fn test_new_object_lands_in_lhs_under_every_reaching_context() {
    // for every reachable `v = new T()` and every context reaching the
    // containing method, the allocation is in pts(VarPtr(ctx, v))
    let (program, _, _, _, _) = factory_program();
    let hierarchy = ClassHierarchy::build(&program);
    let mut pta = PointerAnalysis::new(&program, hierarchy, CallSiteSensitiveSelector::new(1));
    pta.solve().unwrap();

    let reachable: Vec<_> = pta.call_graph().reachable_methods().to_vec();
    for cs_method in reachable {
        let (ctx, method) = pta.cs_manager().cs_method_parts(cs_method);
        for &sid in &program.method(method).stmts {
            let StmtKind::New { lhs, .. } = &program.stmt(sid).kind else {
                continue;
            };
            let wanted = Pointer::Var { ctx, var: *lhs };
            let ptr = pta
                .cs_manager()
                .pointers()
                .find(|&(_, p)| p == wanted)
                .map(|(id, _)| id)
                .expect("allocation lvalue has a pointer under the reaching context");
            let has_alloc = pta
                .points_to(ptr)
                .iter()
                .any(|o| pta.heap().obj(pta.cs_manager().cs_obj_parts(o).1).alloc_site == sid);
            assert!(has_alloc, "allocation at {sid} missing from its lvalue");
        }
    }
    assert_pfg_subset_invariant(&pta);
    assert!(!pts_snapshot(&pta).is_empty());
}

/// static A id(A p) { return p }
/// main: a1 = new A(); a2 = new A(); x1 = id(a1); x2 = id(a2)
fn factory_program() -> (Program, u32, u32, u32, u32) {
    let mut b = ProgramBuilder::new();
    let a_cls = b.class("A", None);
    let id_m = b.method(a_cls, "id", true);
    let p = b.param(id_m, "p", TypeKind::Reference(a_cls));
    b.stmt(id_m, StmtKind::Return { value: Some(p) });

    let main = b.method(a_cls, "main", true);
    let a1 = b.var(main, "a1", TypeKind::Reference(a_cls));
    let a2 = b.var(main, "a2", TypeKind::Reference(a_cls));
    let x1 = b.var(main, "x1", TypeKind::Reference(a_cls));
    let x2 = b.var(main, "x2", TypeKind::Reference(a_cls));
    let new1 = b.stmt(main, StmtKind::New { lhs: a1, alloc: NewKind::Object(a_cls) });
    let new2 = b.stmt(main, StmtKind::New { lhs: a2, alloc: NewKind::Object(a_cls) });
    b.stmt(
        main,
        StmtKind::Invoke(Invoke {
            result: Some(x1),
            callee: MethodRef::new(a_cls, "id", 1),
            base: None,
            args: vec![a1],
            kind: CallKind::Static,
        }),
    );
    b.stmt(
        main,
        StmtKind::Invoke(Invoke {
            result: Some(x2),
            callee: MethodRef::new(a_cls, "id", 1),
            base: None,
            args: vec![a2],
            kind: CallKind::Static,
        }),
    );
    b.entry(main);
    (b.finish().unwrap(), x1, x2, new1, new2)
}

#[test]
fn test_context_sensitivity_separates_factory_results() {
    let (program, x1, x2, new1, new2) = factory_program();
    let hierarchy = ClassHierarchy::build(&program);

    // context-insensitive: both results merge
    let mut ci = PointerAnalysis::new(&program, hierarchy.clone(), ContextInsensitiveSelector);
    ci.solve().unwrap();
    let vpt = ci.var_points_to();
    assert_eq!(alloc_sites(&ci, vpt.points_to(x1).unwrap()), FxHashSet::from_iter([new1, new2]));
    assert_eq!(alloc_sites(&ci, vpt.points_to(x2).unwrap()), FxHashSet::from_iter([new1, new2]));

    // 1-call-site sensitivity: each result keeps its own allocation
    let mut cs = PointerAnalysis::new(&program, hierarchy, CallSiteSensitiveSelector::new(1));
    cs.solve().unwrap();
    let vpt = cs.var_points_to();
    assert_eq!(alloc_sites(&cs, vpt.points_to(x1).unwrap()), FxHashSet::from_iter([new1]));
    assert_eq!(alloc_sites(&cs, vpt.points_to(x2).unwrap()), FxHashSet::from_iter([new2]));

    assert_pfg_subset_invariant(&cs);
    assert!(call_graph_snapshot(&cs).len() >= call_graph_snapshot(&ci).len());
}
