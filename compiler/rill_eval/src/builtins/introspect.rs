//! Types, help and output.

use super::{builtin_names, expect_args, joined_text, Entry};
use crate::call::Argument;
use crate::context::RunContext;
use crate::errors::{unknown_type, wrong_arg_count};
use crate::exec::member_key;
use crate::value::{EvalResult, TypeTag, Value};

pub(super) const BUILTINS: &[Entry] = &[
    ("type", type_, "type v: name of the type of v"),
    ("is", is, "is v typename: whether v has the named type"),
    ("help", help, "help [v]: help text of v, or the list of builtins"),
    ("print", print, "print v...: write values separated by spaces"),
    ("println", println, "println v...: print followed by a newline"),
];

fn type_(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("type", args, 1)?;
    let value = ctx.eval_checked(&args[0])?;
    Ok(Value::string(value.type_name()))
}

fn is(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    expect_args("is", args, 2)?;
    let value = ctx.eval(&args[0]);
    let name = member_key(ctx, &args[1])?;
    let tag = TypeTag::from_name(&name).ok_or_else(|| unknown_type(&name))?;
    Ok(Value::boolean(value.is_type(tag)))
}

fn help(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    match args {
        [] => Ok(Value::string(builtin_names().join(" "))),
        [subject] => Ok(Value::string(ctx.eval_checked(subject)?.help())),
        _ => Err(wrong_arg_count("help", 1, args.len())),
    }
}

fn print(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let text = joined_text(ctx, args)?;
    ctx.print_handler().print(&text);
    Ok(Value::nil())
}

fn println(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let text = joined_text(ctx, args)?;
    ctx.print_handler().println(&text);
    Ok(Value::nil())
}
