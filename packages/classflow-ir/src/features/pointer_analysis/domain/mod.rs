pub mod call_graph;
pub mod context;
pub mod obj;
pub mod pointer;
pub mod points_to_set;
pub mod var_points_to;

pub use call_graph::{CallEdge, CsCallGraph};
pub use context::{
    CallSiteSensitiveSelector, Context, ContextInsensitiveSelector, ContextSelector,
};
pub use obj::{HeapModel, Obj, ObjId};
pub use pointer::{CsCallSiteId, CsMethodId, CsObjId, CtxId, Pointer, PointerId};
pub use points_to_set::PointsToSet;
pub use var_points_to::VarPointsTo;
