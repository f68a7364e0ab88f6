//! Taint configuration record
//!
//! Parsed externally (the crate consumes the resolved record; it does not
//! read spec files). Sources mint taint at call results, sinks report taint
//! arriving at an argument, transfers push taint through a call. The
//! receiver is addressed by the sentinel `BASE` (−1); any other `to`
//! denotes the call result.

use serde::{Deserialize, Serialize};

use crate::shared::models::ir::{ClassId, MethodId};

/// Sentinel argument position meaning "the receiver"
pub const BASE: i32 = -1;
/// Conventional encoding for "the call result" in `to` positions
pub const RESULT: i32 = -2;

/// Calls to `method` return a fresh taint object of type `ty`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintSource {
    pub method: MethodId,
    pub ty: ClassId,
}

/// Taint reaching argument `index` of a call to `method` is reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintSink {
    pub method: MethodId,
    pub index: usize,
}

/// Calls to `method` carry taint from `from` to `to`, re-typed as `ty`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintTransfer {
    pub method: MethodId,
    /// Argument index, or `BASE` for the receiver
    pub from: i32,
    /// `BASE` for the receiver; anything else targets the call result
    pub to: i32,
    pub ty: ClassId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintConfig {
    #[serde(default)]
    pub sources: Vec<TaintSource>,
    #[serde(default)]
    pub sinks: Vec<TaintSink>,
    #[serde(default)]
    pub transfers: Vec<TaintTransfer>,
}

impl TaintConfig {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.sinks.is_empty() && self.transfers.is_empty()
    }
}
