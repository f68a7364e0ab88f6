//! Three-point integer lattice
//!
//! ```text
//!          NAC            (not a constant, top)
//!        /  |  \
//!  ... Const(c) ...
//!        \  |  /
//!         Undef           (unreached, bottom)
//! ```
//!
//! The meet moves downward-in-precision: two distinct constants collapse to
//! `Nac`, `Undef` is the identity, `Nac` absorbs everything.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Undef,
    Const(i32),
    Nac,
}

impl Value {
    #[inline]
    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        matches!(self, Value::Const(_))
    }

    #[inline]
    pub fn is_nac(&self) -> bool {
        matches!(self, Value::Nac)
    }

    /// Constant payload, `None` unless `Const`
    #[inline]
    pub fn as_const(&self) -> Option<i32> {
        match self {
            Value::Const(c) => Some(*c),
            _ => None,
        }
    }

    /// Lattice meet
    pub fn meet(self, other: Value) -> Value {
        match (self, other) {
            (Value::Undef, v) | (v, Value::Undef) => v,
            (Value::Nac, _) | (_, Value::Nac) => Value::Nac,
            (Value::Const(a), Value::Const(b)) => {
                if a == b {
                    Value::Const(a)
                } else {
                    Value::Nac
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "UNDEF"),
            Value::Const(c) => write!(f, "{c}"),
            Value::Nac => write!(f, "NAC"),
        }
    }
}
