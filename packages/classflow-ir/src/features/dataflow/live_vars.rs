//! Live-variable analysis
//!
//! Backward set analysis: `IN = use ∪ (OUT − def)`, meet = union. The
//! dead-code detector consumes the OUT facts to spot useless assignments.

use rustc_hash::FxHashSet;

use super::solver::DataflowAnalysis;
use crate::shared::models::cfg::Cfg;
use crate::shared::models::ir::{Program, Stmt, VarId};

/// Set-valued dataflow fact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetFact {
    vars: FxHashSet<VarId>,
}

impl SetFact {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, var: VarId) -> bool {
        self.vars.contains(&var)
    }

    pub fn insert(&mut self, var: VarId) -> bool {
        self.vars.insert(var)
    }

    pub fn remove(&mut self, var: VarId) -> bool {
        self.vars.remove(&var)
    }

    pub fn union_into(&self, target: &mut SetFact) -> bool {
        let before = target.vars.len();
        target.vars.extend(self.vars.iter().copied());
        target.vars.len() != before
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

pub struct LiveVariableAnalysis;

impl DataflowAnalysis for LiveVariableAnalysis {
    type Fact = SetFact;

    fn is_forward(&self) -> bool {
        false
    }

    fn boundary_fact(&self, _program: &Program, _cfg: &Cfg) -> SetFact {
        SetFact::new()
    }

    fn initial_fact(&self) -> SetFact {
        SetFact::new()
    }

    fn meet_into(&self, fact: &SetFact, target: &mut SetFact) -> bool {
        fact.union_into(target)
    }

    fn transfer(&self, _program: &Program, stmt: &Stmt, out: &SetFact) -> SetFact {
        let mut live = out.clone();
        if let Some(def) = stmt.kind.def_var() {
            live.remove(def);
        }
        let mut uses = Vec::new();
        stmt.kind.collect_uses(&mut uses);
        for u in uses {
            live.insert(u);
        }
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dataflow::solver::solve;
    use crate::shared::models::cfg::CfgEdgeKind;
    use crate::shared::models::ir::{Exp, ProgramBuilder, StmtKind, TypeKind};

    #[test]
    fn test_straight_line_liveness() {
        // x = 1; y = x; return y    -- x live between def and use, y until return
        let mut b = ProgramBuilder::new();
        let c = b.class("Main", None);
        let m = b.method(c, "main", true);
        let x = b.var(m, "x", TypeKind::Int);
        let y = b.var(m, "y", TypeKind::Int);
        let entry = b.stmt(m, StmtKind::Nop);
        let s1 = b.stmt(m, StmtKind::Assign { lhs: x, rhs: Exp::IntLiteral(1) });
        let s2 = b.stmt(m, StmtKind::Copy { lhs: y, rhs: x });
        let s3 = b.stmt(m, StmtKind::Return { value: Some(y) });
        let exit = b.stmt(m, StmtKind::Nop);
        b.entry(m);
        let p = b.finish().unwrap();

        let mut cfg = Cfg::new(m, entry, exit);
        cfg.add_edge(entry, s1, CfgEdgeKind::Normal);
        cfg.add_edge(s1, s2, CfgEdgeKind::Normal);
        cfg.add_edge(s2, s3, CfgEdgeKind::Normal);
        cfg.add_edge(s3, exit, CfgEdgeKind::Normal);

        let live = solve(&LiveVariableAnalysis, &p, &cfg);
        assert!(live.out_fact(s1).contains(x));
        assert!(!live.out_fact(s2).contains(x));
        assert!(live.out_fact(s2).contains(y));
        assert!(!live.out_fact(s3).contains(y));
    }

    #[test]
    fn test_dead_assignment_not_live() {
        // x = 1; y = 2; return x    -- y never live
        let mut b = ProgramBuilder::new();
        let c = b.class("Main", None);
        let m = b.method(c, "main", true);
        let x = b.var(m, "x", TypeKind::Int);
        let y = b.var(m, "y", TypeKind::Int);
        let entry = b.stmt(m, StmtKind::Nop);
        let s1 = b.stmt(m, StmtKind::Assign { lhs: x, rhs: Exp::IntLiteral(1) });
        let s2 = b.stmt(m, StmtKind::Assign { lhs: y, rhs: Exp::IntLiteral(2) });
        let s3 = b.stmt(m, StmtKind::Return { value: Some(x) });
        let exit = b.stmt(m, StmtKind::Nop);
        b.entry(m);
        let p = b.finish().unwrap();

        let mut cfg = Cfg::new(m, entry, exit);
        cfg.add_edge(entry, s1, CfgEdgeKind::Normal);
        cfg.add_edge(s1, s2, CfgEdgeKind::Normal);
        cfg.add_edge(s2, s3, CfgEdgeKind::Normal);
        cfg.add_edge(s3, exit, CfgEdgeKind::Normal);

        let live = solve(&LiveVariableAnalysis, &p, &cfg);
        assert!(!live.out_fact(s2).contains(y));
        assert!(live.out_fact(s2).contains(x));
    }
}
