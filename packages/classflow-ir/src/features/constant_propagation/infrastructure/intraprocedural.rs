//! Intraprocedural constant propagation
//!
//! Forward instantiation of the dataflow engine for the integer lattice.
//! Parameters enter as NAC (the caller is unknown); heap reads and call
//! results are NAC within a single method. The interprocedural variant
//! refines both.

use crate::features::constant_propagation::domain::fact::CpFact;
use crate::features::constant_propagation::domain::value::Value;
use crate::features::dataflow::solver::DataflowAnalysis;
use crate::shared::models::cfg::Cfg;
use crate::shared::models::ir::{Program, Stmt, StmtKind};

use super::evaluate::evaluate;

pub struct ConstantPropagation;

impl ConstantPropagation {
    /// Shared node transfer: assign the evaluated right-hand side to an
    /// integer-typed definition, identity otherwise. The interprocedural
    /// analysis reuses this for every statement it does not special-case.
    pub fn transfer_stmt(program: &Program, stmt: &Stmt, input: &CpFact) -> CpFact {
        let mut out = input.clone();
        let Some(def) = stmt.kind.def_var() else {
            return out;
        };
        if !program.can_hold_int(def) {
            return out;
        }
        let value = match &stmt.kind {
            StmtKind::Copy { rhs, .. } => input.get(*rhs),
            StmtKind::Assign { rhs, .. } => evaluate(rhs, input),
            // heap reads and calls are opaque within one method
            StmtKind::New { .. }
            | StmtKind::LoadField { .. }
            | StmtKind::LoadArray { .. }
            | StmtKind::Invoke(_) => Value::Nac,
            _ => return out,
        };
        out.update(def, value);
        out
    }
}

impl DataflowAnalysis for ConstantPropagation {
    type Fact = CpFact;

    fn is_forward(&self) -> bool {
        true
    }

    fn boundary_fact(&self, program: &Program, cfg: &Cfg) -> CpFact {
        let mut fact = CpFact::new();
        for &p in &program.method(cfg.method()).params {
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

    fn transfer(&self, program: &Program, stmt: &Stmt, input: &CpFact) -> CpFact {
        Self::transfer_stmt(program, stmt, input)
    }
}
