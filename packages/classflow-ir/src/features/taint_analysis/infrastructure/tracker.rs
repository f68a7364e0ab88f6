/*
 * Taint Tracker
 *
 * Secondary fixpoint over the pointer flow graph, run after the pointer
 * analysis is at quiescence. Taint objects live in their own points-to map
 * and ride the frozen PFG:
 * 1. Every reachable call to a source method mints a taint object at the
 *    call result.
 * 2. The diff-driven loop pushes taint along PFG edges; when a tainted
 *    variable feeds a call matching a transfer rule, a re-typed taint
 *    (same originating source call) appears at the rule's target.
 * 3. At quiescence, taint sitting on a sink argument becomes a reported
 *    flow.
 *
 * Transfer rules are indexed by callee method, so each delta only looks at
 * the call sites that can actually match.
 */

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

use crate::features::pointer_analysis::domain::context::ContextSelector;
use crate::features::pointer_analysis::domain::pointer::PointerId;
use crate::features::pointer_analysis::domain::points_to_set::PointsToSet;
use crate::features::pointer_analysis::infrastructure::solver::PointerAnalysis;
use crate::features::pointer_analysis::infrastructure::worklist::WorkList;
use crate::features::taint_analysis::domain::config::{TaintConfig, TaintTransfer, BASE};
use crate::features::taint_analysis::domain::taint::{TaintFlow, TaintManager};
use crate::shared::models::ir::{ClassId, MethodId, StmtId, StmtKind, VarId};

pub struct TaintTracker<'a, 'p, S: ContextSelector> {
    pta: &'a mut PointerAnalysis<'p, S>,
    manager: TaintManager,
    /// Taint points-to, independent of the pointer analysis sets
    tpts: FxHashMap<PointerId, PointsToSet>,
    worklist: WorkList,

    /// Invoke statements of reachable methods, in discovery order
    all_invokes: Vec<StmtId>,
    /// Statically resolved callee per invoke
    resolved: FxHashMap<StmtId, MethodId>,
    /// Receiver/argument variable -> invokes mentioning it
    invokes_by_var: FxHashMap<VarId, Vec<StmtId>>,

    sources_by_method: FxHashMap<MethodId, Vec<ClassId>>,
    sinks_by_method: FxHashMap<MethodId, Vec<usize>>,
    transfers_by_method: FxHashMap<MethodId, Vec<TaintTransfer>>,
}

impl<'a, 'p, S: ContextSelector> TaintTracker<'a, 'p, S> {
    /// Track taint over a solved pointer analysis and return the distinct
    /// flows, sorted by (source call, sink call, argument index).
    pub fn run(pta: &'a mut PointerAnalysis<'p, S>, config: &TaintConfig) -> BTreeSet<TaintFlow> {
        let mut sources_by_method: FxHashMap<MethodId, Vec<ClassId>> = FxHashMap::default();
        for s in &config.sources {
            sources_by_method.entry(s.method).or_default().push(s.ty);
        }
        let mut sinks_by_method: FxHashMap<MethodId, Vec<usize>> = FxHashMap::default();
        for s in &config.sinks {
            sinks_by_method.entry(s.method).or_default().push(s.index);
        }
        let mut transfers_by_method: FxHashMap<MethodId, Vec<TaintTransfer>> =
            FxHashMap::default();
        for t in &config.transfers {
            transfers_by_method.entry(t.method).or_default().push(t.clone());
        }

        let mut tracker = Self {
            pta,
            manager: TaintManager::new(),
            tpts: FxHashMap::default(),
            worklist: WorkList::new(),
            all_invokes: Vec::new(),
            resolved: FxHashMap::default(),
            invokes_by_var: FxHashMap::default(),
            sources_by_method,
            sinks_by_method,
            transfers_by_method,
        };
        tracker.collect_invokes();
        tracker.seed_sources();
        tracker.analyze();
        let flows = tracker.collect_flows();
        tracing::info!(
            taints = tracker.manager.num_taints(),
            flows = flows.len(),
            "taint tracking finished"
        );
        flows
    }

    /// Invoke statements of every reachable method, each method once no
    /// matter how many contexts reached it.
    fn collect_invokes(&mut self) {
        let program = self.pta.program();
        let hierarchy = self.pta.hierarchy();
        let mut seen_methods: FxHashSet<MethodId> = FxHashSet::default();
        let reachable: Vec<_> = self.pta.call_graph().reachable_methods().to_vec();
        for cs_method in reachable {
            let (_, method) = self.pta.cs_manager().cs_method_parts(cs_method);
            if !seen_methods.insert(method) {
                continue;
            }
            for &sid in &program.method(method).stmts {
                let StmtKind::Invoke(inv) = &program.stmt(sid).kind else {
                    continue;
                };
                self.all_invokes.push(sid);
                if let Some(callee) = hierarchy.resolve_ref(&inv.callee) {
                    self.resolved.insert(sid, callee);
                }
                if let Some(base) = inv.base {
                    self.invokes_by_var.entry(base).or_default().push(sid);
                }
                for &arg in &inv.args {
                    self.invokes_by_var.entry(arg).or_default().push(sid);
                }
            }
        }
    }

    fn seed_sources(&mut self) {
        let program = self.pta.program();
        for i in 0..self.all_invokes.len() {
            let sid = self.all_invokes[i];
            let Some(&callee) = self.resolved.get(&sid) else {
                continue;
            };
            let Some(types) = self.sources_by_method.get(&callee) else {
                continue;
            };
            let StmtKind::Invoke(inv) = &program.stmt(sid).kind else {
                continue;
            };
            let Some(result) = inv.result else {
                continue;
            };
            let types = types.clone();
            for ty in types {
                let taint = self.manager.make_taint(sid, ty);
                let ptrs = self.pta.cs_manager().cs_vars_of(result).to_vec();
                for ptr in ptrs {
                    self.worklist.add(ptr, PointsToSet::singleton(taint));
                }
            }
        }
    }

    fn analyze(&mut self) {
        while let Some(entry) = self.worklist.poll() {
            let delta = self.propagate(entry.pointer, &entry.pts);
            if !delta.is_empty() {
                self.apply_transfers(entry.pointer, &delta);
            }
        }
    }

    /// Same diff-union-forward step as the pointer analysis, over `tpts`
    fn propagate(&mut self, pointer: PointerId, pts: &PointsToSet) -> PointsToSet {
        let current = self.tpts.entry(pointer).or_default();
        let delta = current.diff(pts);
        if !delta.is_empty() {
            current.union_into(&delta);
            for &succ in self.pta.pfg().succs_of(pointer) {
                self.worklist.add(succ, delta.clone());
            }
        }
        delta
    }

    /// Push re-typed taints through every matching transfer rule
    fn apply_transfers(&mut self, pointer: PointerId, delta: &PointsToSet) {
        let Some((ctx, var)) = self.pta.cs_manager().pointer_at(pointer).as_var() else {
            return;
        };
        let program = self.pta.program();
        let candidates = match self.invokes_by_var.get(&var) {
            Some(c) => c.clone(),
            None => return,
        };
        for sid in candidates {
            let Some(&callee) = self.resolved.get(&sid) else {
                continue;
            };
            let Some(rules) = self.transfers_by_method.get(&callee) else {
                continue;
            };
            let StmtKind::Invoke(inv) = &program.stmt(sid).kind else {
                continue;
            };
            let rules = rules.clone();
            for rule in rules {
                let from_matches = if rule.from == BASE {
                    inv.base == Some(var)
                } else {
                    rule.from >= 0 && inv.args.get(rule.from as usize) == Some(&var)
                };
                if !from_matches {
                    continue;
                }
                // BASE targets the receiver, anything else the call result
                let target_var = if rule.to == BASE { inv.base } else { inv.result };
                let Some(target_var) = target_var else {
                    continue;
                };
                let mut pts = PointsToSet::new();
                for t in delta.to_sorted_vec() {
                    let source_call = self.manager.source_call(t);
                    pts.add(self.manager.make_taint(source_call, rule.ty));
                }
                let target_ptr = self.pta.cs_manager_mut().var_ptr(ctx, target_var);
                self.worklist.add(target_ptr, pts);
            }
        }
    }

    fn collect_flows(&self) -> BTreeSet<TaintFlow> {
        let program = self.pta.program();
        let mut flows = BTreeSet::new();
        for &sid in &self.all_invokes {
            let Some(&callee) = self.resolved.get(&sid) else {
                continue;
            };
            let Some(indexes) = self.sinks_by_method.get(&callee) else {
                continue;
            };
            let StmtKind::Invoke(inv) = &program.stmt(sid).kind else {
                continue;
            };
            for &index in indexes {
                let Some(&arg) = inv.args.get(index) else {
                    continue;
                };
                for &ptr in self.pta.cs_manager().cs_vars_of(arg) {
                    let Some(taints) = self.tpts.get(&ptr) else {
                        continue;
                    };
                    for t in taints.iter() {
                        flows.insert(TaintFlow {
                            source_call: self.manager.source_call(t),
                            sink_call: sid,
                            index,
                        });
                    }
                }
            }
        }
        flows
    }
}
