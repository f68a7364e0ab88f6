//! Pointer nodes of the pointer flow graph
//!
//! Four flavors, all interned by the CS-manager so equal keys are the same
//! node. Context ids and context-sensitive object ids are themselves interned
//! indexes, which keeps the node a small `Copy` value.

use serde::{Deserialize, Serialize};

use crate::shared::models::ir::{FieldId, VarId};

/// Interned context index (`0` is always the empty context)
pub type CtxId = u32;
/// Interned (heap context, object) pair
pub type CsObjId = u32;
/// Interned pointer node index
pub type PointerId = u32;
/// Interned (context, method) pair
pub type CsMethodId = u32;
/// Interned (context, call site) pair
pub type CsCallSiteId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pointer {
    /// A local variable under a calling context
    Var { ctx: CtxId, var: VarId },
    /// An instance field of an abstract object
    InstanceField { obj: CsObjId, field: FieldId },
    /// A class-level field (context-free)
    StaticField { field: FieldId },
    /// The collapsed element slot of an abstract array
    ArrayIndex { obj: CsObjId },
}

impl Pointer {
    /// The variable, when this is a variable node
    #[inline]
    pub fn as_var(&self) -> Option<(CtxId, VarId)> {
        match self {
            Pointer::Var { ctx, var } => Some((*ctx, *var)),
            _ => None,
        }
    }
}
