// Constant propagation over the three-point integer lattice:
// - domain: lattice value and per-statement fact
// - infrastructure: expression evaluation, the intraprocedural analysis,
//   and the alias-aware interprocedural analysis

pub mod domain;
pub mod infrastructure;

pub use domain::{CpFact, Value};
pub use infrastructure::{evaluate, ConstantPropagation, InterConstantPropagation};
