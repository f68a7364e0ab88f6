//! Taint objects and reported flows
//!
//! A taint object stands for "data minted at this source call, carrying
//! this type". Objects are interned: transfers re-key an existing taint
//! with a new type but keep its originating call, so a flow always reports
//! the true source site.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::shared::models::ir::{ClassId, StmtId};

/// Interned taint-object index
pub type TaintId = u32;

/// Interner for `(source call, type)` pairs
#[derive(Debug, Default)]
pub struct TaintManager {
    taints: Vec<(StmtId, ClassId)>,
    ids: FxHashMap<(StmtId, ClassId), TaintId>,
}

impl TaintManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_taint(&mut self, source_call: StmtId, ty: ClassId) -> TaintId {
        if let Some(&id) = self.ids.get(&(source_call, ty)) {
            return id;
        }
        let id = self.taints.len() as TaintId;
        self.taints.push((source_call, ty));
        self.ids.insert((source_call, ty), id);
        id
    }

    /// The call site that minted this taint
    #[inline]
    pub fn source_call(&self, taint: TaintId) -> StmtId {
        self.taints[taint as usize].0
    }

    #[inline]
    pub fn taint_type(&self, taint: TaintId) -> ClassId {
        self.taints[taint as usize].1
    }

    pub fn num_taints(&self) -> usize {
        self.taints.len()
    }
}

/// One reported source-to-sink flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaintFlow {
    pub source_call: StmtId,
    pub sink_call: StmtId,
    /// Sink argument position the taint arrived at
    pub index: usize,
}
