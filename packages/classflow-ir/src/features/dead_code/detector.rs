//! Dead-code detection
//!
//! Two kinds of dead code, found in one BFS from the CFG entry:
//! - statements no constant-pruned control-flow path reaches: branches whose
//!   condition is a known constant follow only the matching edge, so the
//!   other arm is never enqueued;
//! - useless assignments: the left-hand side is not live after the
//!   statement and the right-hand side cannot raise or touch the heap.
//!
//! Whatever the walk never visited is control-flow dead. The result is
//! sorted by statement index.

use rustc_hash::FxHashSet;
use std::collections::{BTreeSet, VecDeque};

use crate::features::constant_propagation::domain::fact::CpFact;
use crate::features::constant_propagation::infrastructure::evaluate::evaluate;
use crate::features::dataflow::live_vars::SetFact;
use crate::features::dataflow::solver::DataflowResult;
use crate::shared::models::cfg::{Cfg, CfgEdgeKind};
use crate::shared::models::ir::{Exp, Program, StmtId, StmtKind};

/// Can this statement be removed without observable effect, ignoring its
/// definition? Allocation, casts, field and array accesses, and division
/// all have effects of their own.
fn assignment_is_removable(kind: &StmtKind) -> bool {
    match kind {
        StmtKind::Copy { .. } => true,
        StmtKind::Assign { rhs, .. } => rhs.is_side_effect_free(),
        _ => false,
    }
}

pub fn find_dead_code(
    program: &Program,
    cfg: &Cfg,
    constants: &DataflowResult<CpFact>,
    live_vars: &DataflowResult<SetFact>,
) -> BTreeSet<StmtId> {
    let mut dead: BTreeSet<StmtId> = BTreeSet::new();

    let mut unvisited: FxHashSet<StmtId> = cfg.nodes().iter().copied().collect();
    unvisited.remove(&cfg.entry());
    unvisited.remove(&cfg.exit());

    let mut queue: VecDeque<StmtId> = VecDeque::new();
    queue.push_back(cfg.entry());

    while let Some(sid) = queue.pop_front() {
        let stmt = program.stmt(sid);

        match &stmt.kind {
            StmtKind::If { cond } => {
                let value = evaluate(cond, constants.in_fact(sid));
                if let Some(c) = value.as_const() {
                    let wanted = if c == 1 { CfgEdgeKind::IfTrue } else { CfgEdgeKind::IfFalse };
                    for edge in cfg.out_edges_of(sid) {
                        if edge.kind == wanted && unvisited.remove(&edge.target) {
                            queue.push_back(edge.target);
                        }
                    }
                    continue;
                }
            }
            StmtKind::Switch { var } => {
                let value = constants.in_fact(sid).get(*var);
                if let Some(c) = value.as_const() {
                    let mut matched = false;
                    for edge in cfg.out_edges_of(sid) {
                        if edge.kind == CfgEdgeKind::SwitchCase(c) {
                            matched = true;
                            if unvisited.remove(&edge.target) {
                                queue.push_back(edge.target);
                            }
                        }
                    }
                    if !matched {
                        for edge in cfg.out_edges_of(sid) {
                            if edge.kind == CfgEdgeKind::SwitchDefault
                                && unvisited.remove(&edge.target)
                            {
                                queue.push_back(edge.target);
                            }
                        }
                    }
                    continue;
                }
            }
            kind => {
                if let Some(lhs) = kind.def_var() {
                    if assignment_is_removable(kind) && !live_vars.out_fact(sid).contains(lhs) {
                        dead.insert(sid);
                    }
                }
            }
        }

        for succ in cfg.succs_of(sid) {
            if unvisited.remove(&succ) {
                queue.push_back(succ);
            }
        }
    }

    // everything the pruned walk never reached
    dead.extend(unvisited);
    dead
}

/// True when the right-hand side of an `Assign` could be dropped; exposed
/// for the tests exercising the classification table.
pub fn exp_is_removable(exp: &Exp) -> bool {
    exp.is_side_effect_free()
}
