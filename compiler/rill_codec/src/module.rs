//! Script access to the codec.
//!
//! ```text
//! codec: (import codec)
//! bytes: (codec.encode [1 2 3])
//! codec.decode bytes
//! ```

use rill_eval::value::TypeTag;
use rill_eval::{Argument, ErrorValue, EvalResult, Module, NativeFunction, RunContext, Value};

use crate::{from_bytes, to_bytes};

/// The `codec` module: `encode value` and `decode binary`.
#[derive(Debug, Default)]
pub struct CodecModule;

impl Module for CodecModule {
    fn name(&self) -> &str {
        "codec"
    }

    fn content(&self, _ctx: &RunContext) -> EvalResult {
        Ok(Value::dict_from([
            (
                "encode",
                Value::native(
                    NativeFunction::new("encode", encode)
                        .with_help("encode value: serialize value into a binary"),
                ),
            ),
            (
                "decode",
                Value::native(
                    NativeFunction::new("decode", decode)
                        .with_help("decode binary: rebuild a value written by encode"),
                ),
            ),
        ]))
    }
}

fn single<'a>(name: &str, args: &'a [Argument]) -> Result<&'a Argument, ErrorValue> {
    match args {
        [arg] => Ok(arg),
        _ => Err(ErrorValue::new(format!(
            "{name} expects 1 argument, got {}",
            args.len()
        ))),
    }
}

fn encode(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let value = ctx.eval_checked(single("encode", args)?)?;
    let bytes = to_bytes(&value)?;
    Ok(Value::binary(value.type_tag().code(), bytes))
}

fn decode(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let value = ctx.eval_checked(single("decode", args)?)?;
    let Value::Binary(binary) = &value else {
        return Err(ErrorValue::new(format!(
            "decode expects a {}, got {}",
            TypeTag::Binary,
            value.type_name()
        )));
    };
    Ok(from_bytes(&binary.bytes)?)
}
