//! Constant-propagation fact: variable -> lattice value
//!
//! Absent variables are implicitly `Undef`, and `update` removes a binding
//! that would store `Undef` so that fact equality stays canonical.

use rustc_hash::FxHashMap;

use super::value::Value;
use crate::shared::models::ir::VarId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpFact {
    values: FxHashMap<VarId, Value>,
}

impl CpFact {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value bound to `var`, `Undef` when absent
    #[inline]
    pub fn get(&self, var: VarId) -> Value {
        self.values.get(&var).copied().unwrap_or(Value::Undef)
    }

    /// Bind `var` to `value`. Binding `Undef` erases the entry.
    /// Returns true when the fact changed.
    pub fn update(&mut self, var: VarId, value: Value) -> bool {
        match value {
            Value::Undef => self.values.remove(&var).is_some(),
            v => self.values.insert(var, v) != Some(v),
        }
    }

    /// Pointwise meet of `other` into `self`; true when `self` changed
    pub fn meet_into(&mut self, other: &CpFact) -> bool {
        let mut changed = false;
        for (&var, &v) in &other.values {
            let met = v.meet(self.get(var));
            changed |= self.update(var, met);
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, Value)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
