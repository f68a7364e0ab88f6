//! Interning of context-sensitive elements
//!
//! Contexts, (context, variable) pointers, field and array slots, call
//! sites, methods and heap objects are all mapped to dense `u32` indexes.
//! Equal keys always produce the same index, nodes are created lazily on
//! first reference and never destroyed. Creation order is the iteration
//! order everywhere, which keeps output deterministic.

use rustc_hash::FxHashMap;

use crate::features::pointer_analysis::domain::context::Context;
use crate::features::pointer_analysis::domain::obj::ObjId;
use crate::features::pointer_analysis::domain::pointer::{
    CsCallSiteId, CsMethodId, CsObjId, CtxId, Pointer, PointerId,
};
use crate::shared::models::ir::{FieldId, MethodId, StmtId, VarId};

#[derive(Debug, Default)]
pub struct CsManager {
    ctxs: Vec<Context>,
    ctx_ids: FxHashMap<Context, CtxId>,

    cs_objs: Vec<(CtxId, ObjId)>,
    cs_obj_ids: FxHashMap<(CtxId, ObjId), CsObjId>,

    pointers: Vec<Pointer>,
    pointer_ids: FxHashMap<Pointer, PointerId>,
    /// All context-qualified pointers of one IR variable
    vars_index: FxHashMap<VarId, Vec<PointerId>>,

    cs_methods: Vec<(CtxId, MethodId)>,
    cs_method_ids: FxHashMap<(CtxId, MethodId), CsMethodId>,

    cs_call_sites: Vec<(CtxId, StmtId)>,
    cs_call_site_ids: FxHashMap<(CtxId, StmtId), CsCallSiteId>,
}

impl CsManager {
    pub fn new() -> Self {
        let mut m = Self::default();
        // context 0 is the empty context
        m.ctx(Context::empty());
        m
    }

    pub fn ctx(&mut self, context: Context) -> CtxId {
        if let Some(&id) = self.ctx_ids.get(&context) {
            return id;
        }
        let id = self.ctxs.len() as CtxId;
        self.ctxs.push(context.clone());
        self.ctx_ids.insert(context, id);
        id
    }

    #[inline]
    pub fn empty_ctx(&self) -> CtxId {
        0
    }

    #[inline]
    pub fn context(&self, id: CtxId) -> &Context {
        &self.ctxs[id as usize]
    }

    pub fn cs_obj(&mut self, heap_ctx: CtxId, obj: ObjId) -> CsObjId {
        if let Some(&id) = self.cs_obj_ids.get(&(heap_ctx, obj)) {
            return id;
        }
        let id = self.cs_objs.len() as CsObjId;
        self.cs_objs.push((heap_ctx, obj));
        self.cs_obj_ids.insert((heap_ctx, obj), id);
        id
    }

    /// Underlying (heap context, allocation-site object) of a CS object
    #[inline]
    pub fn cs_obj_parts(&self, id: CsObjId) -> (CtxId, ObjId) {
        self.cs_objs[id as usize]
    }

    fn pointer(&mut self, pointer: Pointer) -> PointerId {
        if let Some(&id) = self.pointer_ids.get(&pointer) {
            return id;
        }
        let id = self.pointers.len() as PointerId;
        self.pointers.push(pointer);
        self.pointer_ids.insert(pointer, id);
        if let Pointer::Var { var, .. } = pointer {
            self.vars_index.entry(var).or_default().push(id);
        }
        id
    }

    pub fn var_ptr(&mut self, ctx: CtxId, var: VarId) -> PointerId {
        self.pointer(Pointer::Var { ctx, var })
    }

    pub fn instance_field_ptr(&mut self, obj: CsObjId, field: FieldId) -> PointerId {
        self.pointer(Pointer::InstanceField { obj, field })
    }

    pub fn static_field_ptr(&mut self, field: FieldId) -> PointerId {
        self.pointer(Pointer::StaticField { field })
    }

    pub fn array_index_ptr(&mut self, obj: CsObjId) -> PointerId {
        self.pointer(Pointer::ArrayIndex { obj })
    }

    #[inline]
    pub fn pointer_at(&self, id: PointerId) -> Pointer {
        self.pointers[id as usize]
    }

    pub fn num_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Pointers in creation order
    pub fn pointers(&self) -> impl Iterator<Item = (PointerId, Pointer)> + '_ {
        self.pointers
            .iter()
            .enumerate()
            .map(|(i, &p)| (i as PointerId, p))
    }

    /// Every context-qualified pointer of `var` created so far
    pub fn cs_vars_of(&self, var: VarId) -> &[PointerId] {
        self.vars_index.get(&var).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cs_method(&mut self, ctx: CtxId, method: MethodId) -> CsMethodId {
        if let Some(&id) = self.cs_method_ids.get(&(ctx, method)) {
            return id;
        }
        let id = self.cs_methods.len() as CsMethodId;
        self.cs_methods.push((ctx, method));
        self.cs_method_ids.insert((ctx, method), id);
        id
    }

    #[inline]
    pub fn cs_method_parts(&self, id: CsMethodId) -> (CtxId, MethodId) {
        self.cs_methods[id as usize]
    }

    pub fn cs_call_site(&mut self, ctx: CtxId, call_site: StmtId) -> CsCallSiteId {
        if let Some(&id) = self.cs_call_site_ids.get(&(ctx, call_site)) {
            return id;
        }
        let id = self.cs_call_sites.len() as CsCallSiteId;
        self.cs_call_sites.push((ctx, call_site));
        self.cs_call_site_ids.insert((ctx, call_site), id);
        id
    }

    #[inline]
    pub fn cs_call_site_parts(&self, id: CsCallSiteId) -> (CtxId, StmtId) {
        self.cs_call_sites[id as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_keys_same_identity() {
        let mut m = CsManager::new();
        let c = m.ctx(Context::empty().push_truncated(7, 2));
        assert_eq!(m.var_ptr(c, 3), m.var_ptr(c, 3));
        assert_ne!(m.var_ptr(c, 3), m.var_ptr(c, 4));
        assert_ne!(m.var_ptr(m.empty_ctx(), 3), m.var_ptr(c, 3));
        assert_eq!(m.static_field_ptr(1), m.static_field_ptr(1));
        assert_eq!(m.cs_obj(0, 9), m.cs_obj(0, 9));
        assert_ne!(m.cs_obj(0, 9), m.cs_obj(c, 9));
    }

    #[test]
    fn test_empty_context_is_zero() {
        let mut m = CsManager::new();
        assert_eq!(m.ctx(Context::empty()), 0);
        assert!(m.context(0).is_empty());
    }

    #[test]
    fn test_cs_vars_of_tracks_contexts() {
        let mut m = CsManager::new();
        let c1 = m.ctx(Context::empty().push_truncated(1, 1));
        let p0 = m.var_ptr(m.empty_ctx(), 5);
        let p1 = m.var_ptr(c1, 5);
        m.var_ptr(c1, 6);
        assert_eq!(m.cs_vars_of(5), &[p0, p1]);
        assert!(m.cs_vars_of(9).is_empty());
    }

    #[test]
    fn test_parts_roundtrip() {
        let mut m = CsManager::new();
        let c = m.ctx(Context::empty().push_truncated(2, 1));
        let cm = m.cs_method(c, 4);
        assert_eq!(m.cs_method_parts(cm), (c, 4));
        let cs = m.cs_call_site(c, 11);
        assert_eq!(m.cs_call_site_parts(cs), (c, 11));
    }
}
