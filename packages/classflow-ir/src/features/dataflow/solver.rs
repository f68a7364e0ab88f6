/*
 * Worklist Fixpoint Solver over a method CFG
 *
 * Kildall-style iteration, direction-agnostic:
 * 1. Every node's facts start at the initial (bottom) element; the boundary
 *    node (entry forward, exit backward) starts at the boundary fact.
 * 2. All nodes are queued once in CFG order.
 * 3. Pop a node, meet the neighbor facts into its input accumulator, apply
 *    the transfer function; when the output changed, queue the downstream
 *    neighbors.
 * 4. Fixpoint reached when the queue drains.
 *
 * Input facts are persistent accumulators: meets only descend the lattice,
 * so the boundary fact survives and reprocessing is monotone.
 */

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::shared::models::cfg::Cfg;
use crate::shared::models::ir::{Program, Stmt, StmtId};

/// One intraprocedural dataflow analysis: lattice + direction + transfer
pub trait DataflowAnalysis {
    type Fact: Clone + PartialEq;

    fn is_forward(&self) -> bool;

    /// Fact at the boundary node (entry forward, exit backward)
    fn boundary_fact(&self, program: &Program, cfg: &Cfg) -> Self::Fact;

    /// Bottom element every other node starts from
    fn initial_fact(&self) -> Self::Fact;

    /// Meet `fact` into `target`; true when `target` changed
    fn meet_into(&self, fact: &Self::Fact, target: &mut Self::Fact) -> bool;

    /// Transfer in program-order direction: forward consumes the IN fact and
    /// produces OUT, backward consumes OUT and produces IN.
    fn transfer(&self, program: &Program, stmt: &Stmt, input: &Self::Fact) -> Self::Fact;
}

/// Per-statement IN/OUT facts at the fixpoint
#[derive(Debug, Clone)]
pub struct DataflowResult<F> {
    in_facts: FxHashMap<StmtId, F>,
    out_facts: FxHashMap<StmtId, F>,
}

impl<F> DataflowResult<F> {
    pub(crate) fn from_parts(
        in_facts: FxHashMap<StmtId, F>,
        out_facts: FxHashMap<StmtId, F>,
    ) -> Self {
        Self { in_facts, out_facts }
    }

    pub fn in_fact(&self, stmt: StmtId) -> &F {
        self.in_facts.get(&stmt).expect("statement was analyzed")
    }

    pub fn out_fact(&self, stmt: StmtId) -> &F {
        self.out_facts.get(&stmt).expect("statement was analyzed")
    }
}

/// Run `analysis` over `cfg` to its fixpoint.
pub fn solve<A: DataflowAnalysis>(
    analysis: &A,
    program: &Program,
    cfg: &Cfg,
) -> DataflowResult<A::Fact> {
    let forward = analysis.is_forward();
    let boundary_node = if forward { cfg.entry() } else { cfg.exit() };

    // `input` is the accumulator side (IN forward, OUT backward),
    // `output` the transferred side.
    let mut input: FxHashMap<StmtId, A::Fact> = FxHashMap::default();
    let mut output: FxHashMap<StmtId, A::Fact> = FxHashMap::default();
    for &n in cfg.nodes() {
        input.insert(n, analysis.initial_fact());
        output.insert(n, analysis.initial_fact());
    }
    input.insert(boundary_node, analysis.boundary_fact(program, cfg));

    let mut worklist: VecDeque<StmtId> = cfg.nodes().iter().copied().collect();
    let mut iterations = 0usize;

    while let Some(n) = worklist.pop_front() {
        iterations += 1;

        // Meet upstream outputs into this node's input accumulator.
        let upstream: Vec<StmtId> = if forward {
            cfg.preds_of(n).collect()
        } else {
            cfg.succs_of(n).collect()
        };
        for m in upstream {
            let fact = output[&m].clone();
            analysis.meet_into(&fact, input.get_mut(&n).unwrap());
        }

        let new_out = analysis.transfer(program, program.stmt(n), &input[&n]);
        if new_out != output[&n] {
            output.insert(n, new_out);
            let downstream: Vec<StmtId> = if forward {
                cfg.succs_of(n).collect()
            } else {
                cfg.preds_of(n).collect()
            };
            for m in downstream {
                worklist.push_back(m);
            }
        }
    }

    tracing::debug!(
        method = cfg.method(),
        nodes = cfg.nodes().len(),
        iterations,
        "dataflow fixpoint reached"
    );

    if forward {
        DataflowResult { in_facts: input, out_facts: output }
    } else {
        DataflowResult { in_facts: output, out_facts: input }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::cfg::CfgEdgeKind;
    use crate::shared::models::ir::{ProgramBuilder, StmtKind};

    /// Reachability as a trivial forward analysis: fact = "reached" flag,
    /// meet = or, transfer = identity.
    struct Reach;

    impl DataflowAnalysis for Reach {
        type Fact = bool;

        fn is_forward(&self) -> bool {
            true
        }

        fn boundary_fact(&self, _: &Program, _: &Cfg) -> bool {
            true
        }

        fn initial_fact(&self) -> bool {
            false
        }

        fn meet_into(&self, fact: &bool, target: &mut bool) -> bool {
            let old = *target;
            *target |= *fact;
            *target != old
        }

        fn transfer(&self, _: &Program, _: &Stmt, input: &bool) -> bool {
            *input
        }
    }

    #[test]
    fn test_reachability_converges_on_loop() {
        let mut b = ProgramBuilder::new();
        let c = b.class("Main", None);
        let m = b.method(c, "main", true);
        let entry = b.stmt(m, StmtKind::Nop);
        let head = b.stmt(m, StmtKind::Nop);
        let body = b.stmt(m, StmtKind::Nop);
        let exit = b.stmt(m, StmtKind::Nop);
        b.entry(m);
        let p = b.finish().unwrap();

        let mut cfg = Cfg::new(m, entry, exit);
        cfg.add_edge(entry, head, CfgEdgeKind::Normal);
        cfg.add_edge(head, body, CfgEdgeKind::Normal);
        cfg.add_edge(body, head, CfgEdgeKind::Normal);
        cfg.add_edge(head, exit, CfgEdgeKind::Normal);

        let result = solve(&Reach, &p, &cfg);
        for n in [entry, head, body, exit] {
            assert!(*result.out_fact(n), "node {n} should be reached");
        }
    }
}
