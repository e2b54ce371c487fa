//! Accessor invocation and string interpolation.

use crate::call::Argument;
use crate::context::RunContext;
use crate::errors::{
    index_out_of_bounds, missing_member, negative_index, type_mismatch, wrong_arg_count,
};
use crate::value::{ErrorValue, EvalResult, StringValue, Value};

use super::run_block;

/// Splice interpolation results into a string.
///
/// Each interpolation block runs in `ctx`; the first error aborts.
pub(crate) fn interpolate(ctx: &RunContext, s: &StringValue) -> EvalResult {
    let text = s.text();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for interpolation in s.interpolations() {
        out.push_str(text.get(last..interpolation.offset).unwrap_or(""));
        let value = run_block(ctx, &interpolation.block, &[]);
        if let Value::Error(error) = &value {
            return Err((**error).clone());
        }
        out.push_str(&value.to_string());
        last = interpolation.offset;
    }
    out.push_str(text.get(last..).unwrap_or(""));
    Ok(Value::string(out))
}

/// Read (or, for dictionaries, write) an element of a container.
///
/// - list: `l index`
/// - string: `s index` yields a one-character string
/// - dictionary: `d key` reads through parents, `d key value` writes
pub(crate) fn access(ctx: &RunContext, container: &Value, args: &[Argument]) -> EvalResult {
    match container {
        Value::List(list) => {
            let [index] = args else {
                return Err(wrong_arg_count("list access", 1, args.len()));
            };
            let len = list.len();
            let index = position(ctx, index, len)?;
            list.get(index).ok_or_else(|| index_out_of_bounds(index, len))
        }
        Value::String(s) => {
            let [index] = args else {
                return Err(wrong_arg_count("string access", 1, args.len()));
            };
            let len = s.text().chars().count();
            let index = position(ctx, index, len)?;
            s.text()
                .chars()
                .nth(index)
                .map(|c| Value::string(c.to_string()))
                .ok_or_else(|| index_out_of_bounds(index, len))
        }
        Value::Dictionary(dict) => match args {
            [key] => {
                let key = member_key(ctx, key)?;
                dict.resolve(&key).ok_or_else(|| missing_member(&key))
            }
            [key, value] => {
                let key = member_key(ctx, key)?;
                let value = ctx.eval_checked(value)?;
                dict.insert(key, value.clone())?;
                Ok(value)
            }
            _ => Err(wrong_arg_count("dictionary access", 1, args.len())),
        },
        other => Err(type_mismatch(
            "access",
            "list, string or dictionary",
            other.type_tag(),
        )),
    }
}

/// Element position; negative indices count from the end.
fn position(ctx: &RunContext, arg: &Argument, len: usize) -> Result<usize, ErrorValue> {
    let value = ctx.eval_checked(arg)?;
    let Some(index) = value.as_int() else {
        return Err(type_mismatch("index", "integer", value.type_tag()));
    };
    if index >= 0 {
        return usize::try_from(index).map_err(|_| index_out_of_bounds(usize::MAX, len));
    }
    let back = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
    len.checked_sub(back).ok_or_else(|| negative_index(index))
}

/// Dictionary key: a bare name is used as written, anything else is
/// evaluated and displayed.
pub(crate) fn member_key(ctx: &RunContext, arg: &Argument) -> Result<String, ErrorValue> {
    if let Some(name) = arg.literal_name() {
        return Ok(name);
    }
    let value = ctx.eval_checked(arg)?;
    Ok(value.to_string())
}
