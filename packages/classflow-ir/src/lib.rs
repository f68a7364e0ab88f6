/*
 * classflow-ir - Whole-Program Static-Analysis Core
 *
 * Feature-First Architecture:
 * - shared/   : the class-based IR, CFG and ICFG models
 * - features/ : vertical slices (constant propagation, generic dataflow,
 *               pointer analysis, taint tracking, dead-code detection)
 *
 * The two load-bearing fixpoints are the pointer-analysis solver (dynamic
 * pointer-flow graph, on-the-fly call graph) and the interprocedural
 * dataflow engine with alias-aware heap transfer. Everything is
 * single-threaded and single-shot: build, solve, read, drop.
 */

pub mod errors;
pub mod features;
pub mod shared;

pub use errors::{ClassflowError, Result};

// Primary entry points
pub use features::constant_propagation::{
    evaluate, ConstantPropagation, CpFact, InterConstantPropagation, Value,
};
pub use features::dataflow::{
    solve, solve_inter, DataflowResult, LiveVariableAnalysis, SetFact,
};
pub use features::dead_code::find_dead_code;
pub use features::pointer_analysis::{
    CallSiteSensitiveSelector, ContextInsensitiveSelector, ContextSelector, PointerAnalysis,
    PointsToSet, VarPointsTo,
};
pub use features::taint_analysis::{TaintConfig, TaintFlow, TaintTracker};
pub use shared::models::{
    Cfg, CfgEdgeKind, ClassHierarchy, Icfg, IcfgEdgeKind, Program, ProgramBuilder,
};
