//! Points-to set
//!
//! Monotone set of `u32` ids (context-sensitive objects, or taint objects in
//! the taint tracker) with a diff operation driving the worklist. Hybrid
//! representation: a sorted inline vector while the set is small (the
//! overwhelmingly common case), spilling to a hash table beyond that.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Inline capacity before spilling to the table representation
const SMALL_MAX: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Repr {
    /// Sorted, deduplicated
    Small(Vec<u32>),
    Large(FxHashSet<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsToSet {
    repr: Repr,
}

impl Default for PointsToSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PointsToSet {
    pub const fn new() -> Self {
        Self { repr: Repr::Small(Vec::new()) }
    }

    pub fn singleton(elem: u32) -> Self {
        Self { repr: Repr::Small(vec![elem]) }
    }

    /// Add an element. Returns true when the set grew.
    pub fn add(&mut self, elem: u32) -> bool {
        match &mut self.repr {
            Repr::Small(v) => match v.binary_search(&elem) {
                Ok(_) => false,
                Err(pos) => {
                    v.insert(pos, elem);
                    if v.len() > SMALL_MAX {
                        self.repr = Repr::Large(v.iter().copied().collect());
                    }
                    true
                }
            },
            Repr::Large(s) => s.insert(elem),
        }
    }

    #[inline]
    pub fn contains(&self, elem: u32) -> bool {
        match &self.repr {
            Repr::Small(v) => v.binary_search(&elem).is_ok(),
            Repr::Large(s) => s.contains(&elem),
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Small(v) => v.len(),
            Repr::Large(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate in unspecified (but run-deterministic) order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let (small, large) = match &self.repr {
            Repr::Small(v) => (Some(v.iter().copied()), None),
            Repr::Large(s) => (None, Some(s.iter().copied())),
        };
        small.into_iter().flatten().chain(large.into_iter().flatten())
    }

    /// Elements in ascending order; use for externally visible output
    pub fn to_sorted_vec(&self) -> Vec<u32> {
        match &self.repr {
            Repr::Small(v) => v.clone(),
            Repr::Large(s) => {
                let mut v: Vec<u32> = s.iter().copied().collect();
                v.sort_unstable();
                v
            }
        }
    }

    /// Elements of `other` not present in `self`
    pub fn diff(&self, other: &PointsToSet) -> PointsToSet {
        let mut result = PointsToSet::new();
        for elem in other.iter() {
            if !self.contains(elem) {
                result.add(elem);
            }
        }
        result
    }

    /// Union `other` into `self`; true when `self` grew
    pub fn union_into(&mut self, other: &PointsToSet) -> bool {
        let mut changed = false;
        for elem in other.iter() {
            changed |= self.add(elem);
        }
        changed
    }
}

impl FromIterator<u32> for PointsToSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        let mut set = PointsToSet::new();
        for elem in iter {
            set.add(elem);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut s = PointsToSet::new();
        assert!(s.add(3));
        assert!(!s.add(3));
        assert_eq!(s.len(), 1);
        assert!(s.contains(3));
        assert!(!s.contains(4));
    }

    #[test]
    fn test_small_stays_sorted() {
        let mut s = PointsToSet::new();
        for e in [5, 1, 4, 2, 3] {
            s.add(e);
        }
        assert_eq!(s.to_sorted_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_spill_to_large_preserves_elements() {
        let mut s = PointsToSet::new();
        for e in 0..100 {
            assert!(s.add(e));
        }
        assert_eq!(s.len(), 100);
        for e in 0..100 {
            assert!(s.contains(e));
            assert!(!s.add(e));
        }
        assert_eq!(s.to_sorted_vec(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_diff() {
        let a: PointsToSet = [1, 2, 3].into_iter().collect();
        let b: PointsToSet = [2, 3, 4, 5].into_iter().collect();
        assert_eq!(a.diff(&b).to_sorted_vec(), vec![4, 5]);
        assert_eq!(b.diff(&a).to_sorted_vec(), Vec::<u32>::new());
        assert!(PointsToSet::new().diff(&PointsToSet::new()).is_empty());
    }

    #[test]
    fn test_union_into() {
        let mut a: PointsToSet = [1, 2].into_iter().collect();
        let b: PointsToSet = [2, 3].into_iter().collect();
        assert!(a.union_into(&b));
        assert_eq!(a.to_sorted_vec(), vec![1, 2, 3]);
        assert!(!a.union_into(&b));
    }
}
