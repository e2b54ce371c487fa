//! Lists and dictionaries.

use super::{expect_args, expect_min_args, Entry};
use crate::call::Argument;
use crate::context::RunContext;
use crate::errors::{type_mismatch, wrong_arg_count};
use crate::exec::{access, member_key};
use crate::value::{EvalResult, Value};

pub(super) const BUILTINS: &[Entry] = &[
    ("dict", dict, "dict key value...: a new dictionary"),
    ("new", new, "new [parent]: an empty dictionary inheriting from parent"),
    ("len", len, "len v: element count of a list, dictionary or string"),
    ("push", push, "push list value...: append to a list"),
    ("at", at, "at container key [value]: read or write an element"),
    ("keys", keys, "keys [dict]: sorted keys of a dictionary or of the scope"),
    ("frozen?", frozen, "frozen? v: whether v rejects mutation"),
    ("freeze", freeze, "freeze v: make v and everything in it immutable"),
];

/// Backs both `[...]` literals and the `list` builtin.
pub(super) fn list(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    Ok(Value::list(ctx.eval_all(args)?))
}

fn dict(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    if args.len() % 2 != 0 {
        return Err(wrong_arg_count("dict", args.len() + 1, args.len()));
    }
    let result = Value::dict();
    if let Some(cell) = result.as_dict() {
        for pair in args.chunks_exact(2) {
            let key = member_key(ctx, &pair[0])?;
            let value = ctx.eval_checked(&pair[1])?;
            cell.insert(key, value)?;
        }
    }
    Ok(result)
}

fn new(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    match args {
        [] => Ok(Value::dict()),
        [parent] => match ctx.eval_checked(parent)? {
            Value::Dictionary(parent) => Ok(Value::dict_with_parent(parent)),
            other => Err(type_mismatch("new", "a dictionary parent", other.type_tag())),
        },
        _ => Err(wrong_arg_count("new", 1, args.len())),
    }
}

fn len(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("len", args, 1)?;
    let count = match ctx.eval_checked(&args[0])? {
        Value::List(list) => list.len(),
        Value::Dictionary(dict) => dict.len(),
        Value::String(s) => s.text().chars().count(),
        Value::Return(values) => values.len(),
        other => {
            return Err(type_mismatch(
                "len",
                "a list, dictionary or string",
                other.type_tag(),
            ))
        }
    };
    Ok(Value::int(i64::try_from(count).unwrap_or(i64::MAX)))
}

fn push(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_min_args("push", args, 2)?;
    let target = ctx.eval_checked(&args[0])?;
    let Some(list) = target.as_list() else {
        return Err(type_mismatch("push", "a list", target.type_tag()));
    };
    let values = ctx.eval_all(&args[1..])?;
    for value in values {
        list.push(value)?;
    }
    Ok(target)
}

fn at(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_min_args("at", args, 2)?;
    let container = ctx.eval_checked(&args[0])?;
    access(ctx, &container, &args[1..])
}

fn keys(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let names = match args {
        [] => ctx.keys(),
        [target] => match ctx.eval_checked(target)? {
            Value::Dictionary(dict) => dict.keys(),
            other => return Err(type_mismatch("keys", "a dictionary", other.type_tag())),
        },
        _ => return Err(wrong_arg_count("keys", 1, args.len())),
    };
    Ok(Value::list(names.into_iter().map(Value::string).collect()))
}

fn frozen(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("frozen?", args, 1)?;
    Ok(Value::boolean(ctx.eval_checked(&args[0])?.is_frozen()))
}

fn freeze(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("freeze", args, 1)?;
    let value = ctx.eval_checked(&args[0])?;
    value.freeze();
    Ok(value)
}
