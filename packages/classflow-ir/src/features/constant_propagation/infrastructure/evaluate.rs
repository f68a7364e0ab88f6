//! Expression evaluation over a constant-propagation fact
//!
//! All arithmetic is 32-bit two's complement (wrapping). Division and
//! remainder by a known zero evaluate to `Undef`: the statement would throw
//! at runtime, so the value never reaches a successor. That short-circuit
//! fires before the NAC check.

use crate::features::constant_propagation::domain::fact::CpFact;
use crate::features::constant_propagation::domain::value::Value;
use crate::shared::models::ir::{BinaryOp, Exp};

pub fn evaluate(exp: &Exp, fact: &CpFact) -> Value {
    match exp {
        Exp::Var(v) => fact.get(*v),
        Exp::IntLiteral(c) => Value::Const(*c),
        Exp::Binary { op, lhs, rhs } => {
            let v1 = fact.get(*lhs);
            let v2 = fact.get(*rhs);
            if op.is_division() && v2 == Value::Const(0) {
                return Value::Undef;
            }
            if v1.is_nac() || v2.is_nac() {
                return Value::Nac;
            }
            if v1.is_undef() || v2.is_undef() {
                return Value::Undef;
            }
            let (c1, c2) = (v1.as_const().unwrap(), v2.as_const().unwrap());
            Value::Const(apply(*op, c1, c2))
        }
        Exp::Cast { .. } => Value::Nac,
    }
}

fn apply(op: BinaryOp, c1: i32, c2: i32) -> i32 {
    match op {
        BinaryOp::Add => c1.wrapping_add(c2),
        BinaryOp::Sub => c1.wrapping_sub(c2),
        BinaryOp::Mul => c1.wrapping_mul(c2),
        // divisor is non-zero here; wrapping covers i32::MIN / -1
        BinaryOp::Div => c1.wrapping_div(c2),
        BinaryOp::Rem => c1.wrapping_rem(c2),
        BinaryOp::Eq => (c1 == c2) as i32,
        BinaryOp::Ne => (c1 != c2) as i32,
        BinaryOp::Lt => (c1 < c2) as i32,
        BinaryOp::Gt => (c1 > c2) as i32,
        BinaryOp::Le => (c1 <= c2) as i32,
        BinaryOp::Ge => (c1 >= c2) as i32,
        // shift distance is masked to the low five bits, as on the JVM
        BinaryOp::Shl => c1.wrapping_shl(c2 as u32),
        BinaryOp::Shr => c1.wrapping_shr(c2 as u32),
        BinaryOp::Ushr => (c1 as u32).wrapping_shr(c2 as u32) as i32,
        BinaryOp::And => c1 & c2,
        BinaryOp::Or => c1 | c2,
        BinaryOp::Xor => c1 ^ c2,
    }
}
