//! Block execution.

use crate::call::{Argument, Block};
use crate::context::RunContext;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

use super::eval_call;

/// Run `block` against `ctx`.
///
/// A closure joins its captured context with `ctx`. With `args`, the block
/// runs in a sub-context where `args` is bound to the evaluated arguments.
/// Execution halts after a call that stopped the running context (the stop
/// is passed on to `ctx`) or that produced a halting error. The last result
/// is the block's result; an empty block yields nil.
#[tracing::instrument(level = "debug", skip_all, fields(calls = block.calls().len()))]
pub fn run_block(ctx: &RunContext, block: &Block, args: &[Argument]) -> Value {
    ensure_sufficient_stack(|| {
        let scoped;
        let base = if args.is_empty() {
            ctx
        } else {
            let values = match ctx.eval_all(args) {
                Ok(values) => values,
                Err(error) => return Value::error(error),
            };
            scoped = ctx.create_sub_context();
            scoped.set("args", Value::list(values));
            &scoped
        };

        let joined;
        let run_ctx = match block.captured() {
            Some(captured) => {
                joined = base.join(captured);
                &joined
            }
            None => base,
        };

        let mut last = Value::nil();
        for call in block.calls() {
            last = eval_call(run_ctx, call, &[]);
            if run_ctx.is_stopped() {
                if run_ctx.id() != ctx.id() {
                    ctx.stop();
                }
                break;
            }
            if last.halting_error().is_some() {
                break;
            }
        }
        last
    })
}
