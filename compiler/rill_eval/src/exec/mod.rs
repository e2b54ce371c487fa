//! Call resolution and evaluation.
//!
//! `eval_call` is the single entry point for running a `Call`:
//!
//! 1. A pre-bound native gets its arguments evaluated eagerly and runs.
//! 2. Otherwise the target expression is resolved: nested calls run (an
//!    `Identifier` result is looked up once more), identifiers are looked
//!    up segment by segment through dictionaries, strings are
//!    interpolated, anything else is taken literally.
//! 3. A failed lookup goes to the `?` handler of the owning dictionary or,
//!    failing that, of the context.
//! 4. Dictionary-owned targets run with `this` bound to the dictionary.
//! 5. Piped arguments come before the call's own arguments.
//! 6. A successful result is forwarded to the pipe target; `Return`
//!    results expand into one argument per value.
//! 7. Errors get the call's script position unless they already have one.

mod access;
mod args;
mod block;

use tracing::debug;

pub use block::run_block;
pub(crate) use access::{access, interpolate, member_key};

use crate::call::{Argument, Call, CallTarget};
use crate::context::RunContext;
use crate::errors::{not_callable, undefined_call, undefined_name};
use crate::stack::ensure_sufficient_stack;
use crate::value::{DictCell, EvalResult, Heap, Identifier, Value};

/// Name bound to the missing-function handler.
pub const FALLBACK_HANDLER: &str = "?";

/// Outcome of resolving a call target.
enum Target {
    Found {
        value: Value,
        owner: Option<Heap<DictCell>>,
    },
    Missing {
        segment: String,
        path: String,
        owner: Option<Heap<DictCell>>,
    },
    Failed(Value),
}

/// Evaluate `call` in `ctx` with `piped` arguments from an upstream call.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(target = %call.target_name(), line = call.line())
)]
pub fn eval_call(ctx: &RunContext, call: &Call, piped: &[Argument]) -> Value {
    ensure_sufficient_stack(|| {
        if ctx.config().debug {
            debug!(
                target_name = %call.target_name(),
                script = call.script().name(),
                line = call.line(),
                piped = piped.len(),
                "dispatch"
            );
        }
        let result = dispatch(ctx, call, piped);
        let result = match call.pipe() {
            Some(next) if !result.is_error() && !ctx.is_stopped() => {
                forward(ctx, call, &result, next)
            }
            _ => result,
        };
        enrich(result, call)
    })
}

fn dispatch(ctx: &RunContext, call: &Call, piped: &[Argument]) -> Value {
    match call.target() {
        CallTarget::Bound(native) => {
            let mut args = Vec::with_capacity(piped.len() + call.args().len());
            args.extend_from_slice(piped);
            for arg in call.args() {
                let value = ctx.eval(arg);
                if value.halting_error().is_some() {
                    return value;
                }
                args.push(Argument::resolved_at(
                    value,
                    arg.span(),
                    arg.script().clone(),
                ));
            }
            finish(native.invoke(ctx, &args))
        }
        CallTarget::Expr(target) => {
            let resolved = resolve_target(ctx, target);
            let args = merge_args(piped, call.args());
            match resolved {
                Target::Failed(error) => error,
                Target::Missing {
                    segment,
                    path,
                    owner,
                } => fallback(ctx, &segment, &path, owner, &args),
                Target::Found { value, owner } => {
                    with_receiver(ctx, owner, || invoke(ctx, &value, &args))
                }
            }
        }
    }
}

fn merge_args(piped: &[Argument], own: &[Argument]) -> Vec<Argument> {
    if piped.is_empty() {
        return own.to_vec();
    }
    let mut args = Vec::with_capacity(piped.len() + own.len());
    args.extend_from_slice(piped);
    args.extend_from_slice(own);
    args
}

fn resolve_target(ctx: &RunContext, target: &Argument) -> Target {
    if target.is_resolved() {
        return Target::Found {
            value: target.value().clone(),
            owner: None,
        };
    }
    match target.value() {
        Value::Call(inner) => {
            let result = eval_call(ctx, inner, &[]);
            if result.halting_error().is_some() {
                return Target::Failed(result);
            }
            if let Value::Identifier(ident) = &result {
                return lookup_path(ctx, ident);
            }
            Target::Found {
                value: result,
                owner: None,
            }
        }
        Value::Identifier(ident) => lookup_path(ctx, ident),
        Value::String(s) if !s.is_plain() => match interpolate(ctx, s) {
            Ok(value) => Target::Found { value, owner: None },
            Err(error) => Target::Failed(Value::error(error)),
        },
        literal => Target::Found {
            value: literal.clone(),
            owner: None,
        },
    }
}

/// Resolve a possibly namespaced identifier.
///
/// The first segment is looked up in the context (`this` yields the current
/// receiver when there is one); every further segment is resolved against
/// the dictionary found so far, parents included. Reaching a value that is
/// not a dictionary ends the walk: the remaining segments are ignored and
/// that value is the result, still owned by the last dictionary passed.
fn lookup_path(ctx: &RunContext, ident: &Identifier) -> Target {
    let first = ident.first();
    let Some(mut current) = lookup_head(ctx, first) else {
        return Target::Missing {
            segment: first.to_string(),
            path: ident.to_string(),
            owner: None,
        };
    };
    let mut owner = None;
    for segment in ident.rest() {
        let Value::Dictionary(dict) = &current else {
            break;
        };
        let dict = dict.clone();
        match dict.resolve(segment) {
            Some(next) => {
                current = next;
                owner = Some(dict);
            }
            None => {
                return Target::Missing {
                    segment: segment.clone(),
                    path: ident.to_string(),
                    owner: Some(dict),
                }
            }
        }
    }
    Target::Found {
        value: current,
        owner,
    }
}

/// First segment of a path; `this` names the current receiver if any.
fn lookup_head(ctx: &RunContext, first: &str) -> Option<Value> {
    if first == "this" {
        ctx.this().or_else(|| ctx.get(first))
    } else {
        ctx.get(first)
    }
}

/// Value bound to `ident`, or an "undefined" error.
pub(crate) fn lookup_value(ctx: &RunContext, ident: &Identifier) -> Value {
    match lookup_path(ctx, ident) {
        Target::Found { value, .. } => value,
        Target::Missing { path, .. } => Value::error(undefined_name(&path)),
        Target::Failed(error) => error,
    }
}

/// Dictionary owning the last segment of a namespaced identifier.
pub(crate) fn owning_dict(ctx: &RunContext, ident: &Identifier) -> Option<Heap<DictCell>> {
    let (_, parents) = ident.segments().split_last()?;
    let (first, rest) = parents.split_first()?;
    let mut current = lookup_head(ctx, first)?;
    for segment in rest {
        let next = current.as_dict()?.resolve(segment)?;
        current = next;
    }
    current.as_dict().cloned()
}

/// Dispatch to the `?` handler, or report the call as undefined.
///
/// The owning dictionary's handler takes precedence over the context's.
fn fallback(
    ctx: &RunContext,
    segment: &str,
    path: &str,
    owner: Option<Heap<DictCell>>,
    args: &[Argument],
) -> Value {
    let handler = owner
        .as_ref()
        .and_then(|dict| dict.resolve(FALLBACK_HANDLER))
        .or_else(|| ctx.get(FALLBACK_HANDLER));
    let Some(handler) = handler else {
        return Value::error(undefined_call(path));
    };
    debug!(name = segment, path, args = args.len(), "fallback handler");
    let literals = args.iter().map(|arg| arg.value().clone()).collect();
    let handler_args = [
        Argument::resolved(Value::string(segment)),
        Argument::resolved(Value::list(literals)),
    ];
    with_receiver(ctx, owner, || invoke(ctx, &handler, &handler_args))
}

/// Run `f` with `this` rebound to `owner`, restoring the old receiver.
fn with_receiver(
    ctx: &RunContext,
    owner: Option<Heap<DictCell>>,
    f: impl FnOnce() -> Value,
) -> Value {
    let Some(owner) = owner else {
        return f();
    };
    let previous = ctx.set_this(Some(Value::Dictionary(owner)));
    let result = f();
    ctx.set_this(previous);
    result
}

/// Invoke a resolved callee with arguments.
///
/// Natives always run. Other runnable values act as accessors when given
/// arguments and evaluate to themselves otherwise.
pub(crate) fn invoke(ctx: &RunContext, callee: &Value, args: &[Argument]) -> Value {
    match callee {
        Value::Native(native) => finish(native.invoke(ctx, args)),
        _ if args.is_empty() => callee.clone(),
        Value::Block(block) => run_block(ctx, block, args),
        Value::List(_) | Value::Dictionary(_) | Value::String(_) => {
            finish(access(ctx, callee, args))
        }
        other => Value::error(not_callable(other.type_name())),
    }
}

/// Feed `result` to the pipe target.
fn forward(ctx: &RunContext, call: &Call, result: &Value, next: &Call) -> Value {
    let piped =
        |value: &Value| Argument::resolved_at(value.clone(), call.span(), call.script().clone());
    let args: Vec<Argument> = match result {
        Value::Return(values) => values.iter().map(piped).collect(),
        other => vec![piped(other)],
    };
    eval_call(ctx, next, &args)
}

/// Attach the call's position to an untraced error.
fn enrich(result: Value, call: &Call) -> Value {
    let Value::Error(error) = &result else {
        return result;
    };
    if error.trace().is_some() {
        return result;
    }
    let traced = (**error)
        .clone()
        .with_trace(call.script().name(), call.line());
    if traced.is_fatal() {
        tracing::warn!(error = %traced, "fatal error");
    }
    Value::error(traced)
}

/// Convert a native's result into a value.
pub(crate) fn finish(result: EvalResult) -> Value {
    result.unwrap_or_else(Value::error)
}
