pub mod constant_propagation;
pub mod dataflow;
pub mod dead_code;
pub mod pointer_analysis;
pub mod taint_analysis;
