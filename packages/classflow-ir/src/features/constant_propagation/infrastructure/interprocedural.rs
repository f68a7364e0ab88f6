/*
 * Interprocedural Constant Propagation
 *
 * Forward analysis over the ICFG. The node transfer is the intraprocedural
 * one, except that heap accesses consult the pointer-analysis result:
 * - a store wakes every load that may observe it (same static field, or an
 *   aliased base variable) by requeueing those statements;
 * - a load meets the stored values across all may-aliased stores, instead
 *   of giving up with NAC.
 *
 * Edge transfers move facts between methods: the call-to-return edge kills
 * the call-result variable, the call edge projects arguments onto callee
 * parameters, and the return edge meets the callee's return variables into
 * the call-result variable.
 */

use rustc_hash::FxHashMap;

use crate::features::constant_propagation::domain::fact::CpFact;
use crate::features::constant_propagation::domain::value::Value;
use crate::features::dataflow::inter::{FactView, InterDataflowAnalysis};
use crate::features::pointer_analysis::domain::var_points_to::VarPointsTo;
use crate::shared::models::icfg::{Icfg, IcfgEdge, IcfgEdgeKind};
use crate::shared::models::ir::{
    FieldId, MethodId, Program, Stmt, StmtId, StmtKind, VarId,
};

use super::intraprocedural::ConstantPropagation;

/// May two array indices address the same element? Biased toward "yes":
/// only a known-unreachable (`Undef`) or provably different pair says no.
pub fn index_may_match(i: Value, j: Value) -> bool {
    if i.is_undef() || j.is_undef() {
        return false;
    }
    if i.is_nac() || j.is_nac() {
        return true;
    }
    i.as_const() == j.as_const()
}

pub struct InterConstantPropagation {
    /// v -> all variables whose points-to set intersects v's
    alias_vars: FxHashMap<VarId, Vec<VarId>>,
    static_stores: FxHashMap<FieldId, Vec<StmtId>>,
    static_loads: FxHashMap<FieldId, Vec<StmtId>>,
}

impl InterConstantPropagation {
    /// Derive the alias relation from a pointer-analysis result and index
    /// the static field accesses reachable through the ICFG.
    pub fn new(program: &Program, icfg: &Icfg, pta: &VarPointsTo) -> Self {
        let mut alias_vars: FxHashMap<VarId, Vec<VarId>> = FxHashMap::default();
        for &a in pta.vars() {
            let mut set = Vec::new();
            for &b in pta.vars() {
                if pta.may_alias(a, b) {
                    set.push(b);
                }
            }
            alias_vars.insert(a, set);
        }

        let mut static_stores: FxHashMap<FieldId, Vec<StmtId>> = FxHashMap::default();
        let mut static_loads: FxHashMap<FieldId, Vec<StmtId>> = FxHashMap::default();
        for &sid in icfg.nodes() {
            match &program.stmt(sid).kind {
                StmtKind::StoreField { base: None, field, .. } => {
                    static_stores.entry(*field).or_default().push(sid)
                }
                StmtKind::LoadField { base: None, field, .. } => {
                    static_loads.entry(*field).or_default().push(sid)
                }
                _ => {}
            }
        }

        Self { alias_vars, static_stores, static_loads }
    }

    fn aliases_of(&self, var: VarId) -> &[VarId] {
        self.alias_vars.get(&var).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value of `var` in the IN fact of `stmt`, `Undef` while unanalyzed
    fn value_at(facts: &FactView<'_, CpFact>, stmt: StmtId, var: VarId) -> Value {
        facts.in_fact(stmt).map_or(Value::Undef, |f| f.get(var))
    }
}

impl InterDataflowAnalysis for InterConstantPropagation {
    type Fact = CpFact;

    fn boundary_fact(&self, program: &Program, method: MethodId) -> CpFact {
        let mut fact = CpFact::new();
        for &p in &program.method(method).params {
            if program.can_hold_int(p) {
                fact.update(p, Value::Nac);
            }
        }
        fact
    }

    fn initial_fact(&self) -> CpFact {
        CpFact::new()
    }

    fn meet_into(&self, fact: &CpFact, target: &mut CpFact) -> bool {
        target.meet_into(fact)
    }

    fn transfer_call_node(&self, _program: &Program, _stmt: &Stmt, input: &CpFact) -> CpFact {
        input.clone()
    }

    fn transfer_non_call_node(
        &self,
        program: &Program,
        stmt: &Stmt,
        input: &CpFact,
        facts: &FactView<'_, CpFact>,
        requeue: &mut Vec<StmtId>,
    ) -> CpFact {
        match &stmt.kind {
            StmtKind::StoreField { base, field, rhs } if program.can_hold_int(*rhs) => {
                match base {
                    None => {
                        if let Some(loads) = self.static_loads.get(field) {
                            requeue.extend_from_slice(loads);
                        }
                    }
                    Some(b) => {
                        for &alias in self.aliases_of(*b) {
                            requeue.extend_from_slice(program.load_fields_of(alias));
                        }
                    }
                }
                ConstantPropagation::transfer_stmt(program, stmt, input)
            }
            StmtKind::LoadField { lhs, base, field } if program.can_hold_int(*lhs) => {
                let mut val = Value::Undef;
                match base {
                    None => {
                        if let Some(stores) = self.static_stores.get(field) {
                            for &store in stores {
                                if let StmtKind::StoreField { rhs, .. } = &program.stmt(store).kind {
                                    val = val.meet(Self::value_at(facts, store, *rhs));
                                }
                            }
                        }
                    }
                    Some(b) => {
                        for &alias in self.aliases_of(*b) {
                            for &store in program.store_fields_of(alias) {
                                let StmtKind::StoreField { field: sf, rhs, .. } =
                                    &program.stmt(store).kind
                                else {
                                    continue;
                                };
                                if sf == field {
                                    val = val.meet(Self::value_at(facts, store, *rhs));
                                }
                            }
                        }
                    }
                }
                let mut out = input.clone();
                out.update(*lhs, val);
                out
            }
            StmtKind::StoreArray { base, rhs, .. } if program.can_hold_int(*rhs) => {
                for &alias in self.aliases_of(*base) {
                    requeue.extend_from_slice(program.load_arrays_of(alias));
                }
                ConstantPropagation::transfer_stmt(program, stmt, input)
            }
            StmtKind::LoadArray { lhs, base, index } if program.can_hold_int(*lhs) => {
                let load_index = input.get(*index);
                let mut val = Value::Undef;
                for &alias in self.aliases_of(*base) {
                    for &store in program.store_arrays_of(alias) {
                        let StmtKind::StoreArray { index: si, rhs, .. } =
                            &program.stmt(store).kind
                        else {
                            continue;
                        };
                        let store_index = Self::value_at(facts, store, *si);
                        if index_may_match(load_index, store_index) {
                            val = val.meet(Self::value_at(facts, store, *rhs));
                        }
                    }
                }
                let mut out = input.clone();
                out.update(*lhs, val);
                out
            }
            _ => ConstantPropagation::transfer_stmt(program, stmt, input),
        }
    }

    fn transfer_edge(&self, program: &Program, edge: &IcfgEdge, out: &CpFact) -> CpFact {
        match edge.kind {
            IcfgEdgeKind::Normal => out.clone(),
            IcfgEdgeKind::CallToReturn => {
                // the call result arrives over the Return edge; its stale
                // binding must not leak across the call site
                let mut fact = out.clone();
                if let StmtKind::Invoke(inv) = &program.stmt(edge.source).kind {
                    if let Some(result) = inv.result {
                        fact.update(result, Value::Undef);
                    }
                }
                fact
            }
            IcfgEdgeKind::Call => {
                let mut fact = CpFact::new();
                let StmtKind::Invoke(inv) = &program.stmt(edge.source).kind else {
                    return fact;
                };
                let callee = program.stmt(edge.target).method;
                for (&arg, &param) in inv.args.iter().zip(&program.method(callee).params) {
                    if program.can_hold_int(param) {
                        fact.update(param, out.get(arg));
                    }
                }
                fact
            }
            IcfgEdgeKind::Return { call_site } => {
                let mut fact = CpFact::new();
                let StmtKind::Invoke(inv) = &program.stmt(call_site).kind else {
                    return fact;
                };
                let Some(result) = inv.result else {
                    return fact;
                };
                if !program.can_hold_int(result) {
                    return fact;
                }
                let callee = program.stmt(edge.source).method;
                let mut val = Value::Undef;
                for &rv in &program.method(callee).return_vars {
                    val = val.meet(out.get(rv));
                }
                fact.update(result, val);
                fact
            }
        }
    }
}
