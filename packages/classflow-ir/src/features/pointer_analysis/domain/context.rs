//! Calling contexts and context selectors
//!
//! A context is a bounded string of call sites, the abstract call-stack
//! prefix distinguishing pointer identities. The empty context is the
//! distinguished bottom. Selectors decide the context of a callee and the
//! heap context of an allocation; the context-insensitive analysis is the
//! same solver run with a selector that always answers "empty".

use serde::{Deserialize, Serialize};

use super::obj::ObjId;
use crate::shared::models::ir::{MethodId, StmtId};

/// A calling context: most-recent call site last
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Context {
    elems: Vec<StmtId>,
}

impl Context {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn elems(&self) -> &[StmtId] {
        &self.elems
    }

    /// Append a call site and keep only the trailing `limit` elements
    pub fn push_truncated(&self, call_site: StmtId, limit: usize) -> Context {
        let mut elems = self.elems.clone();
        elems.push(call_site);
        let start = elems.len().saturating_sub(limit);
        Context { elems: elems.split_off(start) }
    }

    /// Keep only the trailing `limit` elements
    pub fn truncated(&self, limit: usize) -> Context {
        let start = self.elems.len().saturating_sub(limit);
        Context { elems: self.elems[start..].to_vec() }
    }
}

/// Chooses callee and heap contexts. All methods take the caller side fully
/// resolved; implementations never look at points-to state.
pub trait ContextSelector {
    fn empty_context(&self) -> Context {
        Context::empty()
    }

    /// Heap context for an allocation in a method analyzed under `method_ctx`
    fn select_heap_context(&self, method_ctx: &Context, obj: ObjId) -> Context;

    /// Callee context for a static call
    fn select_static_context(
        &self,
        caller_ctx: &Context,
        call_site: StmtId,
        callee: MethodId,
    ) -> Context;

    /// Callee context for an instance call with a discovered receiver object
    fn select_instance_context(
        &self,
        caller_ctx: &Context,
        call_site: StmtId,
        recv_heap_ctx: &Context,
        recv_obj: ObjId,
        callee: MethodId,
    ) -> Context;
}

/// Every context is the empty context: classic Andersen-style analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextInsensitiveSelector;

impl ContextSelector for ContextInsensitiveSelector {
    fn select_heap_context(&self, _method_ctx: &Context, _obj: ObjId) -> Context {
        Context::empty()
    }

    fn select_static_context(&self, _: &Context, _: StmtId, _: MethodId) -> Context {
        Context::empty()
    }

    fn select_instance_context(
        &self,
        _: &Context,
        _: StmtId,
        _: &Context,
        _: ObjId,
        _: MethodId,
    ) -> Context {
        Context::empty()
    }
}

/// k-limited call-site sensitivity: callee contexts keep the last `k` call
/// sites, heap contexts the last `k - 1`.
#[derive(Debug, Clone, Copy)]
pub struct CallSiteSensitiveSelector {
    k: usize,
}

impl CallSiteSensitiveSelector {
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "call-site sensitivity needs k >= 1");
        Self { k }
    }
}

impl ContextSelector for CallSiteSensitiveSelector {
    fn select_heap_context(&self, method_ctx: &Context, _obj: ObjId) -> Context {
        method_ctx.truncated(self.k - 1)
    }

    fn select_static_context(
        &self,
        caller_ctx: &Context,
        call_site: StmtId,
        _callee: MethodId,
    ) -> Context {
        caller_ctx.push_truncated(call_site, self.k)
    }

    fn select_instance_context(
        &self,
        caller_ctx: &Context,
        call_site: StmtId,
        _recv_heap_ctx: &Context,
        _recv_obj: ObjId,
        _callee: MethodId,
    ) -> Context {
        caller_ctx.push_truncated(call_site, self.k)
    }
}
