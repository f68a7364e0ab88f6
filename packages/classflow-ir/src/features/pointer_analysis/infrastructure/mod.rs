pub mod cs_manager;
pub mod pointer_flow_graph;
pub mod solver;
pub mod worklist;

pub use cs_manager::CsManager;
pub use pointer_flow_graph::PointerFlowGraph;
pub use solver::{PointerAnalysis, SolverConfig, SolverStats};
pub use worklist::{Discipline, WorkList};
