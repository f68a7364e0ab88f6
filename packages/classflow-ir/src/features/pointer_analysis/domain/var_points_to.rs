//! Variable-level view of a pointer-analysis result
//!
//! Contexts and heap contexts are merged away: each IR variable maps to the
//! set of allocation-site objects it may point to. This is the interface the
//! interprocedural constant propagation consumes to derive aliasing, and it
//! can be fabricated directly in tests.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;

use super::obj::ObjId;
use crate::shared::models::ir::VarId;

#[derive(Debug, Clone, Default)]
pub struct VarPointsTo {
    map: FxHashMap<VarId, FxHashSet<ObjId>>,
    vars: Vec<VarId>,
}

impl VarPointsTo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, var: VarId, obj: ObjId) {
        let set = match self.map.entry(var) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                self.vars.push(var);
                e.insert(FxHashSet::default())
            }
        };
        set.insert(obj);
    }

    /// Variables with a non-empty points-to set, in first-seen order
    pub fn vars(&self) -> &[VarId] {
        &self.vars
    }

    pub fn points_to(&self, var: VarId) -> Option<&FxHashSet<ObjId>> {
        self.map.get(&var)
    }

    /// May `a` and `b` refer to the same object?
    pub fn may_alias(&self, a: VarId, b: VarId) -> bool {
        match (self.map.get(&a), self.map.get(&b)) {
            (Some(sa), Some(sb)) => sa.iter().any(|o| sb.contains(o)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_may_alias_requires_overlap() {
        let mut v = VarPointsTo::new();
        v.add(1, 100);
        v.add(2, 100);
        v.add(2, 200);
        v.add(3, 300);
        assert!(v.may_alias(1, 2));
        assert!(v.may_alias(1, 1));
        assert!(!v.may_alias(1, 3));
        assert!(!v.may_alias(1, 9));
        assert_eq!(v.vars(), &[1, 2, 3]);
    }
}
