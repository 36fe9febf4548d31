//! Arithmetic, comparison, bitwise, and boolean operator semantics.
//!
//! Every function here returns `Result<Value, Value>`: `Err` carries an already
//! constructed exception value (built through [`crate::builtins::type_error`] and
//! friends) rather than a host-level [`crate::Error`], because operator failures are
//! catchable by scripted `try`/`except` just like any other raise.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Pow, ToPrimitive, Zero};
use rustpython_parser::ast::{CmpOp, Operator, UnaryOp};

use crate::builtins::{system_error, type_error, zero_division_error};
use crate::value::Value;

pub fn bigint_to_f64(i: &BigInt) -> f64 {
    i.to_f64().unwrap_or(f64::NAN)
}

pub fn binop(op: &Operator, left: &Value, right: &Value) -> Result<Value, Value> {
    match op {
        Operator::Add => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
            (Value::Tuple(a), Value::Tuple(b)) => {
                Ok(Value::Tuple(a.iter().chain(b.iter()).cloned().collect()))
            }
            (Value::List(a), Value::List(b)) => {
                let mut out = a.borrow().clone();
                out.extend(b.borrow().iter().cloned());
                Ok(Value::list(out))
            }
            _ => numeric_binop(left, right, |a, b| a + b, |a, b| a + b),
        },
        Operator::Sub => numeric_binop(left, right, |a, b| a - b, |a, b| a - b),
        Operator::Mult => match (left, right) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                Ok(Value::str(repeat(s, n)))
            }
            (Value::List(l), Value::Int(n)) | (Value::Int(n), Value::List(l)) => {
                let count = n.to_i64().unwrap_or(0).max(0) as usize;
                let mut out = Vec::with_capacity(l.borrow().len() * count);
                for _ in 0..count {
                    out.extend(l.borrow().iter().cloned());
                }
                Ok(Value::list(out))
            }
            _ => numeric_binop(left, right, |a, b| a * b, |a, b| a * b),
        },
        Operator::Div => {
            let (a, b) = as_f64_pair(left, right)?;
            if b == 0.0 {
                return Err(zero_division_error("division by zero"));
            }
            Ok(Value::Float(a / b))
        }
        Operator::FloorDiv => match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                if b.is_zero() {
                    return Err(zero_division_error("integer division by zero"));
                }
                Ok(Value::Int(a.div_floor(b)))
            }
            _ => {
                let (a, b) = as_f64_pair(left, right)?;
                if b == 0.0 {
                    return Err(zero_division_error("float floor division by zero"));
                }
                Ok(Value::Float((a / b).floor()))
            }
        },
        Operator::Mod => match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                if b.is_zero() {
                    return Err(zero_division_error("integer modulo by zero"));
                }
                Ok(Value::Int(a.mod_floor(b)))
            }
            _ => {
                let (a, b) = as_f64_pair(left, right)?;
                if b == 0.0 {
                    return Err(zero_division_error("float modulo by zero"));
                }
                Ok(Value::Float(a - b * (a / b).floor()))
            }
        },
        Operator::Pow => {
            let (a, b) = as_f64_pair(left, right)?;
            if let (Value::Int(a), Value::Int(b)) = (left, right) {
                if let Some(exp) = b.to_u32() {
                    return Ok(Value::Int(a.clone().pow(exp)));
                }
            }
            Ok(Value::Float(a.powf(b)))
        }
        Operator::BitOr => int_binop(left, right, |a, b| a | b),
        Operator::BitXor => int_binop(left, right, |a, b| a ^ b),
        Operator::BitAnd => int_binop(left, right, |a, b| a & b),
        Operator::LShift => shift_binop(left, right, |a, n| a << n),
        Operator::RShift => shift_binop(left, right, |a, n| a >> n),
        Operator::MatMult => Err(type_error(format!(
            "unsupported operand type(s) for @: '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn numeric_binop(
    left: &Value,
    right: &Value,
    int_op: impl Fn(&BigInt, &BigInt) -> BigInt,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(a, b))),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = as_f64_pair(left, right)?;
            Ok(Value::Float(float_op(a, b)))
        }
        _ => Err(system_error(format!(
            "unsupported operand type(s): '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn int_binop(left: &Value, right: &Value, op: impl Fn(&BigInt, &BigInt) -> BigInt) -> Result<Value, Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(op(a, b))),
        _ => Err(system_error(format!(
            "unsupported operand type(s): '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn shift_binop(left: &Value, right: &Value, op: impl Fn(&BigInt, u32) -> BigInt) -> Result<Value, Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let shift = b
                .to_u32()
                .ok_or_else(|| system_error("shift count out of range"))?;
            Ok(Value::Int(op(a, shift)))
        }
        _ => Err(system_error(format!(
            "unsupported operand type(s): '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn as_f64_pair(left: &Value, right: &Value) -> Result<(f64, f64), Value> {
    let a = as_f64(left).ok_or_else(|| system_error(format!("expected number, got {}", left.type_name())))?;
    let b = as_f64(right).ok_or_else(|| system_error(format!("expected number, got {}", right.type_name())))?;
    Ok((a, b))
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(bigint_to_f64(i)),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn repeat(s: &str, n: &BigInt) -> String {
    let count = n.to_i64().unwrap_or(0).max(0) as usize;
    s.repeat(count)
}

pub fn cmpop(op: &CmpOp, left: &Value, right: &Value) -> Result<bool, Value> {
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::NotEq => Ok(left != right),
        CmpOp::Lt => order(left, right).map(|o| o == std::cmp::Ordering::Less),
        CmpOp::LtE => order(left, right).map(|o| o != std::cmp::Ordering::Greater),
        CmpOp::Gt => order(left, right).map(|o| o == std::cmp::Ordering::Greater),
        CmpOp::GtE => order(left, right).map(|o| o != std::cmp::Ordering::Less),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|b| !b),
        CmpOp::Is => Ok(is_same(left, right)),
        CmpOp::IsNot => Ok(!is_same(left, right)),
    }
}

fn order(left: &Value, right: &Value) -> Result<std::cmp::Ordering, Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = as_f64_pair(left, right)?;
            a.partial_cmp(&b)
                .ok_or_else(|| type_error("cannot compare NaN"))
        }
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => Err(system_error(format!(
            "'<' not supported between instances of '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn contains(container: &Value, needle: &Value) -> Result<bool, Value> {
    match container {
        Value::List(items) => Ok(items.borrow().iter().any(|v| v == needle)),
        Value::Tuple(items) => Ok(items.iter().any(|v| v == needle)),
        Value::Str(s) => match needle {
            Value::Str(n) => Ok(s.contains(n.as_ref())),
            _ => Err(type_error("'in <string>' requires string as left operand")),
        },
        _ => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            container.type_name()
        ))),
    }
}

fn is_same(left: &Value, right: &Value) -> bool {
    use std::rc::Rc;
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
        (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
        _ => left == right,
    }
}

pub fn unaryop(op: &UnaryOp, operand: &Value) -> Result<Value, Value> {
    match (op, operand) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::USub, Value::Int(i)) => Ok(Value::Int(-i)),
        (UnaryOp::USub, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::UAdd, Value::Int(i)) => Ok(Value::Int(i.clone())),
        (UnaryOp::UAdd, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnaryOp::Invert, Value::Int(i)) => Ok(Value::Int(!i)),
        _ => Err(system_error(format!(
            "bad operand type for unary operator: '{}'",
            operand.type_name()
        ))),
    }
}
