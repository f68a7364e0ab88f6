/*
 * Worklist Fixpoint Solver over the ICFG
 *
 * Same Kildall iteration as the intraprocedural engine with two additions:
 * - facts crossing an edge pass through a per-edge transfer first (this is
 *   where call-site projection, result kills and return meets happen);
 * - the node transfer may inspect the IN fact of *other* statements and
 *   requeue them, which the alias-aware constant propagation uses to wake
 *   heap loads when a store changes.
 *
 * Only entry nodes of entry methods carry boundary facts; every other
 * method receives its input through Call edges.
 */

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use super::solver::DataflowResult;
use crate::shared::models::icfg::{Icfg, IcfgEdge};
use crate::shared::models::ir::{MethodId, Program, Stmt, StmtId, StmtKind};

/// Read-only window onto the solver's current IN facts, handed to node
/// transfers that need facts at other statements.
pub struct FactView<'a, F> {
    in_facts: &'a FxHashMap<StmtId, F>,
}

impl<'a, F> FactView<'a, F> {
    pub fn in_fact(&self, stmt: StmtId) -> Option<&'a F> {
        self.in_facts.get(&stmt)
    }
}

/// One interprocedural dataflow analysis. Forward only: every client of the
/// ICFG engine in this crate flows with control.
pub trait InterDataflowAnalysis {
    type Fact: Clone + PartialEq;

    /// Fact at the entry node of an entry method
    fn boundary_fact(&self, program: &Program, method: MethodId) -> Self::Fact;

    fn initial_fact(&self) -> Self::Fact;

    fn meet_into(&self, fact: &Self::Fact, target: &mut Self::Fact) -> bool;

    /// Transfer for call-site nodes. The result value does not flow through
    /// the node itself (the Return edge carries it), so this is typically
    /// the identity.
    fn transfer_call_node(&self, program: &Program, stmt: &Stmt, input: &Self::Fact)
        -> Self::Fact;

    /// Transfer for every other node. `facts` exposes current IN facts of
    /// other statements; ids pushed into `requeue` are reprocessed even if
    /// this node's output did not change.
    fn transfer_non_call_node(
        &self,
        program: &Program,
        stmt: &Stmt,
        input: &Self::Fact,
        facts: &FactView<'_, Self::Fact>,
        requeue: &mut Vec<StmtId>,
    ) -> Self::Fact;

    /// Transfer a fact across an ICFG edge
    fn transfer_edge(&self, program: &Program, edge: &IcfgEdge, out: &Self::Fact) -> Self::Fact;
}

/// Run `analysis` over `icfg` to its fixpoint.
pub fn solve_inter<A: InterDataflowAnalysis>(
    analysis: &A,
    program: &Program,
    icfg: &Icfg,
) -> DataflowResult<A::Fact> {
    let mut in_facts: FxHashMap<StmtId, A::Fact> = FxHashMap::default();
    let mut out_facts: FxHashMap<StmtId, A::Fact> = FxHashMap::default();
    for &n in icfg.nodes() {
        in_facts.insert(n, analysis.initial_fact());
        out_facts.insert(n, analysis.initial_fact());
    }
    for &m in icfg.entry_methods() {
        if let Some(entry) = icfg.entry_of(m) {
            in_facts.insert(entry, analysis.boundary_fact(program, m));
        }
    }

    let mut worklist: VecDeque<StmtId> = icfg.nodes().iter().copied().collect();
    let mut iterations = 0usize;

    while let Some(n) = worklist.pop_front() {
        // requeues may name statements outside this ICFG (e.g. a heap access
        // in an unreached method); they carry no facts to update
        if !in_facts.contains_key(&n) {
            continue;
        }
        iterations += 1;

        for edge in icfg.in_edges_of(n) {
            let transferred = analysis.transfer_edge(program, edge, &out_facts[&edge.source]);
            analysis.meet_into(&transferred, in_facts.get_mut(&n).unwrap());
        }

        let input = in_facts[&n].clone();
        let stmt = program.stmt(n);
        let mut requeue = Vec::new();
        let new_out = match &stmt.kind {
            StmtKind::Invoke(_) => analysis.transfer_call_node(program, stmt, &input),
            _ => {
                let view = FactView { in_facts: &in_facts };
                analysis.transfer_non_call_node(program, stmt, &input, &view, &mut requeue)
            }
        };

        if new_out != out_facts[&n] {
            out_facts.insert(n, new_out);
            for succ in icfg.succs_of(n) {
                worklist.push_back(succ);
            }
        }
        for s in requeue {
            worklist.push_back(s);
        }
    }

    tracing::debug!(nodes = icfg.nodes().len(), iterations, "icfg fixpoint reached");

    DataflowResult::from_parts(in_facts, out_facts)
}
