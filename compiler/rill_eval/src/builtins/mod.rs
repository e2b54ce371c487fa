//! Core native library registered into every root context.

mod arith;
mod bindings;
mod containers;
mod control;
mod introspect;

use std::sync::OnceLock;

use crate::call::{Argument, NativeFunction};
use crate::context::RunContext;
use crate::errors::{too_few_args, type_mismatch, wrong_arg_count};
use crate::value::{ErrorValue, EvalResult, Heap, Identifier, Value};

/// Plain function pointer form of a builtin.
type Builtin = fn(&RunContext, &[Argument]) -> EvalResult;

/// Name, implementation and help text.
type Entry = (&'static str, Builtin, &'static str);

fn tables() -> impl Iterator<Item = &'static Entry> {
    bindings::BUILTINS
        .iter()
        .chain(control::BUILTINS)
        .chain(arith::BUILTINS)
        .chain(containers::BUILTINS)
        .chain(introspect::BUILTINS)
}

/// Bind the core library and the `true`/`false`/`nil` constants in `ctx`.
pub fn register(ctx: &RunContext) {
    for &(name, func, help) in tables() {
        ctx.set(
            name,
            Value::native(NativeFunction::new(name, func).with_help(help)),
        );
    }
    ctx.set("list", Value::Native(list_constructor()));
    ctx.set("true", Value::boolean(true));
    ctx.set("false", Value::boolean(false));
    ctx.set("nil", Value::nil());
}

/// Names of every core builtin, sorted.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = tables().map(|entry| entry.0).collect();
    names.push("list");
    names.sort_unstable();
    names
}

/// The native behind `[...]` literals and the `list` builtin.
pub(crate) fn list_constructor() -> Heap<NativeFunction> {
    static LIST: OnceLock<Heap<NativeFunction>> = OnceLock::new();
    LIST.get_or_init(|| {
        Heap::new(
            NativeFunction::new("list", containers::list)
                .with_help("list item...: a new list of the evaluated items"),
        )
    })
    .clone()
}

fn expect_args(name: &str, args: &[Argument], count: usize) -> Result<(), ErrorValue> {
    if args.len() == count {
        Ok(())
    } else {
        Err(wrong_arg_count(name, count, args.len()))
    }
}

fn expect_min_args(name: &str, args: &[Argument], min: usize) -> Result<(), ErrorValue> {
    if args.len() >= min {
        Ok(())
    } else {
        Err(too_few_args(name, min, args.len()))
    }
}

/// Name given either bare (`set a 1`) or as a value (`set "a" 1`).
fn path_arg(ctx: &RunContext, name: &str, arg: &Argument) -> Result<Identifier, ErrorValue> {
    if !arg.is_resolved() {
        if let Some(ident) = arg.value().as_identifier() {
            return Ok(ident.clone());
        }
    }
    let value = ctx.eval_checked(arg)?;
    match &value {
        Value::Identifier(ident) => Ok((**ident).clone()),
        Value::String(s) => Identifier::parse(s.text())
            .ok_or_else(|| ErrorValue::new(format!("{name}: «{}» is not a valid name", s.text()))),
        other => Err(type_mismatch(name, "a name", other.type_tag())),
    }
}

/// Evaluate and display every argument, separated by spaces.
fn joined_text(ctx: &RunContext, args: &[Argument]) -> Result<String, ErrorValue> {
    let values = ctx.eval_all(args)?;
    Ok(values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" "))
}

/// Run a block argument in place; evaluate anything else.
fn branch(ctx: &RunContext, arg: &Argument) -> Value {
    let value = ctx.eval(arg);
    match &value {
        Value::Block(block) => ctx.run(block),
        _ => value,
    }
}

#[cfg(test)]
mod tests;
