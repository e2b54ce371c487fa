//! Value capabilities: truthiness, ordering and arithmetic.
//!
//! Arithmetic is checked. Overflow, division by zero and non-finite float
//! results are reported as errors, as are operands of different types.

use std::cmp::Ordering;

use super::{EvalResult, Value};
use crate::errors::{
    division_by_zero, incompatible_operands, integer_overflow, modulo_by_zero,
    non_finite_result, not_comparable,
};

/// Arithmetic operator selector shared by the binary operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    fn verb(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "subtract",
            ArithOp::Mul => "multiply",
            ArithOp::Div => "divide",
            ArithOp::Rem => "take the remainder of",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "addition",
            ArithOp::Sub => "subtraction",
            ArithOp::Mul => "multiplication",
            ArithOp::Div => "division",
            ArithOp::Rem => "remainder",
        }
    }
}

impl Value {
    /// `false`, `nil`, `0`, `0.0`, `""` and the empty list are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil(_) => false,
            Value::Boolean(b) => **b,
            Value::Integer(n) => **n != 0,
            Value::Float(f) => **f != 0.0,
            Value::String(s) => !s.text().is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Error(_) => false,
            _ => true,
        }
    }

    /// Order two values of the same type.
    pub fn compare(&self, other: &Value) -> Result<Ordering, super::ErrorValue> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok((**a).cmp(&**b)),
            (Value::Float(a), Value::Float(b)) => (**a)
                .partial_cmp(&**b)
                .ok_or_else(|| not_comparable(self.type_tag(), other.type_tag())),
            (Value::String(a), Value::String(b)) => Ok(a.text().cmp(b.text())),
            (Value::Boolean(a), Value::Boolean(b)) => Ok((**a).cmp(&**b)),
            (Value::Identifier(a), Value::Identifier(b)) => {
                Ok(a.to_string().cmp(&b.to_string()))
            }
            (Value::Nil(_), Value::Nil(_)) => Ok(Ordering::Equal),
            _ => Err(not_comparable(self.type_tag(), other.type_tag())),
        }
    }

    pub fn add(&self, other: &Value) -> EvalResult {
        self.arith(ArithOp::Add, other)
    }

    pub fn sub(&self, other: &Value) -> EvalResult {
        self.arith(ArithOp::Sub, other)
    }

    pub fn mul(&self, other: &Value) -> EvalResult {
        self.arith(ArithOp::Mul, other)
    }

    pub fn div(&self, other: &Value) -> EvalResult {
        self.arith(ArithOp::Div, other)
    }

    pub fn rem(&self, other: &Value) -> EvalResult {
        self.arith(ArithOp::Rem, other)
    }

    pub fn arith(&self, op: ArithOp, other: &Value) -> EvalResult {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => int_arith(op, **a, **b),
            (Value::Float(a), Value::Float(b)) => float_arith(op, **a, **b),
            (Value::String(a), Value::String(b)) if op == ArithOp::Add => {
                let mut joined = String::with_capacity(a.text().len() + b.text().len());
                joined.push_str(a.text());
                joined.push_str(b.text());
                Ok(Value::string(joined))
            }
            (Value::List(a), Value::List(b)) if op == ArithOp::Add => {
                let mut items = a.snapshot();
                items.extend(b.snapshot());
                Ok(Value::list(items))
            }
            _ => Err(incompatible_operands(
                op.verb(),
                self.type_tag(),
                other.type_tag(),
            )),
        }
    }
}

fn int_arith(op: ArithOp, a: i64, b: i64) -> EvalResult {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            a.checked_div(b)
        }
        ArithOp::Rem => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            a.checked_rem(b)
        }
    };
    result
        .map(Value::int)
        .ok_or_else(|| integer_overflow(op.name()))
}

fn float_arith(op: ArithOp, a: f64, b: f64) -> EvalResult {
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            a / b
        }
        ArithOp::Rem => {
            if b == 0.0 {
                return Err(modulo_by_zero());
            }
            a % b
        }
    };
    if result.is_finite() {
        Ok(Value::float(result))
    } else {
        Err(non_finite_result(op.name()))
    }
}
