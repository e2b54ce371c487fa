//! Bindings, functions, receivers and modules.

use super::{expect_args, expect_min_args, path_arg, Entry};
use crate::call::{Argument, Block, NativeFunction};
use crate::context::RunContext;
use crate::errors::{expected_parameter_name, type_mismatch, unknown_module, wrong_arg_count};
use crate::exec::{lookup_value, member_key, owning_dict, run_block};
use crate::value::{ErrorValue, EvalResult, Value};

pub(super) const BUILTINS: &[Entry] = &[
    ("set", set, "set name value: bind name; a.b sets key b of dictionary a"),
    ("get", get, "get name: the value bound to name"),
    ("unset", unset, "unset name: remove a binding from the current scope"),
    ("func", func, "func param... {body}: a function closing over this scope"),
    ("return", return_, "return value...: leave the current function"),
    ("this", this, "this: the dictionary the current method was called on"),
    ("import", import, "import name: content of a registered module"),
];

fn set(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let [name, value] = args else {
        return Err(wrong_arg_count("set", 2, args.len()));
    };
    let path = path_arg(ctx, "set", name)?;
    let value = ctx.eval_checked(value)?;
    if path.is_namespaced() {
        let dict = owning_dict(ctx, &path)
            .ok_or_else(|| ErrorValue::new(format!("cannot set «{path}»: no such dictionary")))?;
        let key = path.segments().last().cloned().unwrap_or_default();
        dict.insert(key, value.clone())?;
    } else {
        ctx.set(path.first(), value.clone());
    }
    Ok(value)
}

fn get(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("get", args, 1)?;
    let path = path_arg(ctx, "get", &args[0])?;
    Ok(lookup_value(ctx, &path))
}

fn unset(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("unset", args, 1)?;
    let path = path_arg(ctx, "unset", &args[0])?;
    let removed = if path.is_namespaced() {
        let dict = owning_dict(ctx, &path)
            .ok_or_else(|| ErrorValue::new(format!("cannot unset «{path}»: no such dictionary")))?;
        let key = path.segments().last().cloned().unwrap_or_default();
        dict.remove(&key)?
    } else {
        ctx.remove(path.first())
    };
    Ok(removed.unwrap_or_else(Value::nil))
}

fn func(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_min_args("func", args, 1)?;
    let Some((body, params)) = args.split_last() else {
        return Err(wrong_arg_count("func", 1, 0));
    };
    let params = params
        .iter()
        .map(|arg| {
            arg.literal_name()
                .filter(|name| !name.contains('.'))
                .ok_or_else(|| expected_parameter_name(arg.value().type_tag()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let body = match ctx.eval_checked(body)? {
        Value::Block(block) => block.capture(ctx.id()),
        other => return Err(type_mismatch("func", "a block body", other.type_tag())),
    };
    Ok(Value::native(user_function(params, body)))
}

/// A function value running `body` with `params` bound to its arguments.
///
/// Arguments are evaluated in the caller's context; the body runs in a
/// fresh call frame one level deeper, joined with the captured context.
fn user_function(params: Vec<String>, body: Block) -> NativeFunction {
    let arity = params.len();
    let names = params.clone();
    let code = body.clone();
    NativeFunction::new("func", move |caller: &RunContext, args: &[Argument]| {
        if args.len() != arity {
            return Err(wrong_arg_count("function", arity, args.len()));
        }
        let values = caller.eval_all(args)?;
        let frame = caller.enter_call()?;
        for (name, value) in names.iter().zip(values) {
            frame.set(name.as_str(), value);
        }
        Ok(run_block(&frame, &code, &[]))
    })
    .with_body(params, body)
}

fn return_(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let mut values = ctx.eval_all(args)?;
    ctx.stop();
    Ok(match values.len() {
        0 => Value::nil(),
        1 => values.pop().unwrap_or_else(Value::nil),
        _ => Value::returns(values),
    })
}

fn this(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("this", args, 0)?;
    Ok(ctx.this().unwrap_or_else(Value::nil))
}

fn import(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("import", args, 1)?;
    let name = member_key(ctx, &args[0])?;
    let slot = ctx.module(&name).ok_or_else(|| unknown_module(&name))?;
    slot.content(ctx)
}
