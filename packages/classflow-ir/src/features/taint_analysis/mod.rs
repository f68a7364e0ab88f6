// Taint tracking as a secondary fixpoint over the solved pointer analysis:
// - domain: the configuration record, taint-object interning, flows
// - infrastructure: the tracker itself

pub mod domain;
pub mod infrastructure;

pub use domain::{TaintConfig, TaintFlow, TaintSink, TaintSource, TaintTransfer};
pub use infrastructure::TaintTracker;
