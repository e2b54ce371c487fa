//! Conditionals, loops and error handling.
//!
//! Control-flow blocks run directly in the calling context: bindings made
//! inside a branch or loop body stay visible afterwards, and a `return`
//! inside them stops the enclosing function.

use super::{branch, expect_args, joined_text, Entry};
use crate::call::Argument;
use crate::context::RunContext;
use crate::errors::{expected_parameter_name, type_mismatch, wrong_arg_count};
use crate::value::{ErrorValue, EvalResult, Value};

pub(super) const BUILTINS: &[Entry] = &[
    ("if", if_, "if cond {then} [else] [{else}]: conditional"),
    ("while", while_, "while {cond} {body}: loop while cond is truthy"),
    ("each", each, "each items name {body}: run body with name bound to each item"),
    ("try", try_, "try {body} [handler]: recover from a runtime error"),
    ("fail", fail, "fail message...: a runtime error"),
    ("panic", panic, "panic message...: a fatal error that cannot be caught"),
    ("ignore", ignore, "ignore expr: mark an error result as ignorable"),
];

/// Whether a loop or branch has to stop after producing `value`.
fn must_halt(ctx: &RunContext, value: &Value) -> bool {
    value.halting_error().is_some() || ctx.is_stopped()
}

fn if_(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let (cond, then, otherwise) = match args {
        [cond, then] => (cond, then, None),
        [cond, then, keyword, otherwise] if keyword.literal_name().as_deref() == Some("else") => {
            (cond, then, Some(otherwise))
        }
        [cond, then, otherwise] => (cond, then, Some(otherwise)),
        _ => return Err(wrong_arg_count("if", 2, args.len())),
    };
    let cond = branch(ctx, cond);
    if must_halt(ctx, &cond) {
        return Ok(cond);
    }
    Ok(if cond.is_truthy() {
        branch(ctx, then)
    } else {
        otherwise.map_or_else(Value::nil, |arg| branch(ctx, arg))
    })
}

fn while_(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let [cond, body] = args else {
        return Err(wrong_arg_count("while", 2, args.len()));
    };
    let mut last = Value::nil();
    loop {
        let check = branch(ctx, cond);
        if must_halt(ctx, &check) {
            return Ok(check);
        }
        if !check.is_truthy() {
            return Ok(last);
        }
        last = branch(ctx, body);
        if must_halt(ctx, &last) {
            return Ok(last);
        }
    }
}

fn each(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let [items, name, body] = args else {
        return Err(wrong_arg_count("each", 3, args.len()));
    };
    let name = name
        .literal_name()
        .ok_or_else(|| expected_parameter_name(name.value().type_tag()))?;
    let items = match ctx.eval_checked(items)? {
        Value::List(list) => list.snapshot(),
        Value::Dictionary(dict) => dict.keys().into_iter().map(Value::string).collect(),
        Value::String(s) => s
            .text()
            .chars()
            .map(|c| Value::string(c.to_string()))
            .collect(),
        Value::Return(values) => (*values).clone(),
        other => {
            return Err(type_mismatch(
                "each",
                "a list, dictionary or string",
                other.type_tag(),
            ))
        }
    };
    let mut last = Value::nil();
    for item in items {
        ctx.set(name.as_str(), item);
        last = branch(ctx, body);
        if must_halt(ctx, &last) {
            break;
        }
    }
    Ok(last)
}

/// Run `body`; on a non-fatal error run the handler instead.
///
/// A block handler runs in a sub-context with `error` bound to the message,
/// a function handler is called with the error value, and any other
/// handler value is returned as a default. Without a handler the error is
/// swallowed and the result is nil.
fn try_(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let (body, handler) = match args {
        [body] => (body, None),
        [body, handler] => (body, Some(handler)),
        _ => return Err(wrong_arg_count("try", 2, args.len())),
    };
    let result = branch(ctx, body);
    let Value::Error(error) = &result else {
        return Ok(result);
    };
    if error.is_fatal() || ctx.is_stopped() {
        return Ok(result);
    }
    let Some(handler) = handler else {
        return Ok(Value::nil());
    };
    let handler = ctx.eval(handler);
    Ok(match &handler {
        Value::Block(block) => {
            let scope = ctx.create_sub_context();
            scope.set("error", Value::string(error.message()));
            scope.run(block)
        }
        Value::Native(_) => ctx.call_value(&handler, vec![result.clone()]),
        _ => handler.clone(),
    })
}

fn fail(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let message = joined_text(ctx, args)?;
    Err(ErrorValue::new(message))
}

fn panic(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let message = joined_text(ctx, args)?;
    Err(ErrorValue::fatal(message))
}

fn ignore(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("ignore", args, 1)?;
    Ok(match branch(ctx, &args[0]) {
        Value::Error(error) => Value::error((*error).clone().ignorable(true)),
        value => value,
    })
}
