// Pointer analysis with on-the-fly call-graph construction:
// - domain: contexts, abstract objects, pointer nodes, points-to sets,
//   the call graph and the merged variable-level result view
// - infrastructure: interning, the pointer flow graph, the work queue and
//   the fixpoint solver (context sensitivity is a selector choice)

pub mod domain;
pub mod infrastructure;

pub use domain::{
    CallSiteSensitiveSelector, Context, ContextInsensitiveSelector, ContextSelector, PointsToSet,
    VarPointsTo,
};
pub use infrastructure::{PointerAnalysis, SolverConfig, SolverStats};
