//! Runtime error constructors.
//!
//! Every error message the engine and the core library produce is built
//! here so the wording stays consistent.

use crate::value::{ErrorValue, TypeTag};

pub fn undefined_call(name: &str) -> ErrorValue {
    ErrorValue::new(format!("call to undefined «{name}»"))
}

pub fn undefined_name(name: &str) -> ErrorValue {
    ErrorValue::new(format!("undefined «{name}»"))
}

pub fn not_callable(type_name: &str) -> ErrorValue {
    ErrorValue::new(format!("{type_name} is not callable"))
}

pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> ErrorValue {
    let plural = if expected == 1 { "" } else { "s" };
    ErrorValue::new(format!(
        "{name} expects {expected} argument{plural}, got {got}"
    ))
}

pub fn too_few_args(name: &str, min: usize, got: usize) -> ErrorValue {
    ErrorValue::new(format!(
        "{name} expects at least {min} arguments, got {got}"
    ))
}

pub fn type_mismatch(name: &str, expected: &str, got: TypeTag) -> ErrorValue {
    ErrorValue::new(format!("{name} expects {expected}, got {got}"))
}

pub fn incompatible_operands(op: &str, left: TypeTag, right: TypeTag) -> ErrorValue {
    ErrorValue::new(format!("cannot {op} {left} and {right}"))
}

pub fn not_comparable(left: TypeTag, right: TypeTag) -> ErrorValue {
    ErrorValue::new(format!("cannot compare {left} with {right}"))
}

pub fn division_by_zero() -> ErrorValue {
    ErrorValue::new("division by zero")
}

pub fn modulo_by_zero() -> ErrorValue {
    ErrorValue::new("modulo by zero")
}

pub fn integer_overflow(op: &str) -> ErrorValue {
    ErrorValue::new(format!("integer overflow in {op}"))
}

pub fn non_finite_result(op: &str) -> ErrorValue {
    ErrorValue::new(format!("{op} produced a non-finite float"))
}

pub fn frozen_container(kind: &str) -> ErrorValue {
    ErrorValue::new(format!("cannot modify frozen {kind}"))
}

pub fn prototype_cycle() -> ErrorValue {
    ErrorValue::new("dictionary parent chain would form a cycle")
}

pub fn index_out_of_bounds(index: usize, len: usize) -> ErrorValue {
    ErrorValue::new(format!("index {index} out of bounds for length {len}"))
}

pub fn negative_index(index: i64) -> ErrorValue {
    ErrorValue::new(format!("index {index} is negative"))
}

pub fn missing_member(key: &str) -> ErrorValue {
    ErrorValue::new(format!("no member «{key}»"))
}

pub fn call_depth_exceeded(limit: usize) -> ErrorValue {
    ErrorValue::fatal(format!("maximum call depth of {limit} exceeded"))
}

pub fn expected_parameter_name(got: TypeTag) -> ErrorValue {
    ErrorValue::new(format!("func parameters must be names, got {got}"))
}

pub fn unknown_module(name: &str) -> ErrorValue {
    ErrorValue::new(format!("no module named «{name}»"))
}

pub fn unknown_type(name: &str) -> ErrorValue {
    ErrorValue::new(format!("unknown type «{name}»"))
}
