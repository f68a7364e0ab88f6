// Generic dataflow machinery: the intraprocedural worklist engine, its
// interprocedural extension, and the live-variable instantiation.

pub mod inter;
pub mod live_vars;
pub mod solver;

pub use inter::{solve_inter, FactView, InterDataflowAnalysis};
pub use live_vars::{LiveVariableAnalysis, SetFact};
pub use solver::{solve, DataflowAnalysis, DataflowResult};
