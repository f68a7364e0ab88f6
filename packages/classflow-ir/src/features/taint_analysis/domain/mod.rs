pub mod config;
pub mod taint;

pub use config::{TaintConfig, TaintSink, TaintSource, TaintTransfer, BASE, RESULT};
pub use taint::{TaintFlow, TaintId, TaintManager};
