//! Arithmetic, comparison and logic.

use std::cmp::Ordering;

use super::{branch, expect_args, expect_min_args, Entry};
use crate::call::Argument;
use crate::context::RunContext;
use crate::errors::{integer_overflow, type_mismatch};
use crate::value::{ArithOp, ErrorValue, EvalResult, Value};

pub(super) const BUILTINS: &[Entry] = &[
    ("plus", plus, "plus a b...: sum, string or list concatenation"),
    ("minus", minus, "minus a [b...]: difference, or negation of one number"),
    ("times", times, "times a b...: product"),
    ("div", div, "div a b: quotient; division by zero is an error"),
    ("mod", mod_, "mod a b: remainder; modulo by zero is an error"),
    ("eq", eq, "eq a b: structural equality"),
    ("ne", ne, "ne a b: structural inequality"),
    ("lt", lt, "lt a b: a < b"),
    ("le", le, "le a b: a <= b"),
    ("gt", gt, "gt a b: a > b"),
    ("ge", ge, "ge a b: a >= b"),
    ("not", not, "not v: logical negation of truthiness"),
    ("and", and, "and a b...: true when every operand is truthy"),
    ("or", or, "or a b...: true when any operand is truthy"),
];

/// Left fold of `op` over at least one evaluated operand.
fn fold(ctx: &RunContext, name: &str, op: ArithOp, args: &[Argument]) -> EvalResult {
    expect_min_args(name, args, 1)?;
    let values = ctx.eval_all(args)?;
    let mut values = values.into_iter();
    let first = values.next().unwrap_or_else(Value::nil);
    values.try_fold(first, |acc, next| acc.arith(op, &next))
}

fn binary(ctx: &RunContext, name: &str, args: &[Argument]) -> Result<(Value, Value), ErrorValue> {
    expect_args(name, args, 2)?;
    let left = ctx.eval_checked(&args[0])?;
    let right = ctx.eval_checked(&args[1])?;
    Ok((left, right))
}

fn plus(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    fold(ctx, "plus", ArithOp::Add, args)
}

fn minus(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    if let [only] = args {
        return match ctx.eval_checked(only)? {
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::int)
                .ok_or_else(|| integer_overflow("negation")),
            Value::Float(f) => Ok(Value::float(-*f)),
            other => Err(type_mismatch("minus", "a number", other.type_tag())),
        };
    }
    fold(ctx, "minus", ArithOp::Sub, args)
}

fn times(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    fold(ctx, "times", ArithOp::Mul, args)
}

fn div(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let (left, right) = binary(ctx, "div", args)?;
    left.div(&right)
}

fn mod_(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let (left, right) = binary(ctx, "mod", args)?;
    left.rem(&right)
}

fn eq(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let (left, right) = binary(ctx, "eq", args)?;
    Ok(Value::boolean(left.equals(&right)))
}

fn ne(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let (left, right) = binary(ctx, "ne", args)?;
    Ok(Value::boolean(!left.equals(&right)))
}

fn ordered(
    ctx: &RunContext,
    name: &str,
    args: &[Argument],
    accept: impl Fn(Ordering) -> bool,
) -> EvalResult {
    let (left, right) = binary(ctx, name, args)?;
    Ok(Value::boolean(accept(left.compare(&right)?)))
}

fn lt(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    ordered(ctx, "lt", args, Ordering::is_lt)
}

fn le(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    ordered(ctx, "le", args, Ordering::is_le)
}

fn gt(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    ordered(ctx, "gt", args, Ordering::is_gt)
}

fn ge(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    ordered(ctx, "ge", args, Ordering::is_ge)
}

fn not(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("not", args, 1)?;
    let value = ctx.eval_checked(&args[0])?;
    Ok(Value::boolean(!value.is_truthy()))
}

/// Operands are evaluated left to right and only as far as needed.
fn and(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_min_args("and", args, 1)?;
    for arg in args {
        let value = branch(ctx, arg);
        if let Some(error) = value.halting_error() {
            return Err(error.clone());
        }
        if !value.is_truthy() {
            return Ok(Value::boolean(false));
        }
    }
    Ok(Value::boolean(true))
}

fn or(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_min_args("or", args, 1)?;
    for arg in args {
        let value = branch(ctx, arg);
        if let Some(error) = value.halting_error() {
            return Err(error.clone());
        }
        if value.is_truthy() {
            return Ok(Value::boolean(true));
        }
    }
    Ok(Value::boolean(false))
}
