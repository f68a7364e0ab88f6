//! Abstract heap objects and the allocation-site heap model
//!
//! Each `New` statement abstracts to one object; the model is deterministic
//! per statement, so repeated queries for the same site return the same id.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::shared::models::ir::{ClassId, NewKind, StmtId};

/// Unique identifier for abstract objects
pub type ObjId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obj {
    pub id: ObjId,
    /// The `New` statement this object abstracts
    pub alloc_site: StmtId,
    /// Runtime class; `None` for arrays (never dispatched on)
    pub class: Option<ClassId>,
}

/// Allocation-site heap abstraction
#[derive(Debug, Default)]
pub struct HeapModel {
    objs: Vec<Obj>,
    by_site: FxHashMap<StmtId, ObjId>,
}

impl HeapModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object for an allocation site, created on first request
    pub fn get_obj(&mut self, alloc_site: StmtId, alloc: NewKind) -> ObjId {
        if let Some(&id) = self.by_site.get(&alloc_site) {
            return id;
        }
        let id = self.objs.len() as ObjId;
        self.objs.push(Obj {
            id,
            alloc_site,
            class: alloc.class(),
        });
        self.by_site.insert(alloc_site, id);
        id
    }

    #[inline]
    pub fn obj(&self, id: ObjId) -> &Obj {
        &self.objs[id as usize]
    }

    pub fn num_objs(&self) -> usize {
        self.objs.len()
    }
}
