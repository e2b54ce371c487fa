//! Background evaluation for scripts.
//!
//! ```text
//! t: (import task)
//! job: (t.spawn {plus 1 2})
//! t.await job
//! ```
//!
//! `spawn` runs a block on a fresh sub-context of the caller in its own
//! thread. The sub-context handle keeps the frame pinned, and a background
//! guard holds off frame collection until the thread finishes. The result
//! comes back over a channel; the handle caches it so it can be awaited
//! more than once. Tasks share the caller's scope: scripts that mutate the
//! same bindings from two tasks get no isolation.

use crossbeam::channel::{bounded, Receiver};
use parking_lot::Mutex;
use rill_eval::value::InternalValue;
use rill_eval::{
    run_block, Argument, ErrorValue, EvalResult, Module, NativeFunction, RunContext, Value,
};
use tracing::debug;

const TASK_TYPE: &str = "task";

/// The `task` module: `spawn block args...`, `await task`, `done task`.
#[derive(Debug, Default)]
pub struct TaskModule;

impl Module for TaskModule {
    fn name(&self) -> &str {
        "task"
    }

    fn content(&self, _ctx: &RunContext) -> EvalResult {
        Ok(Value::dict_from([
            (
                "spawn",
                Value::native(
                    NativeFunction::new("spawn", spawn)
                        .with_help("spawn block args...: run block on another thread"),
                ),
            ),
            (
                "await",
                Value::native(
                    NativeFunction::new("await", await_task)
                        .with_help("await task: wait for a spawned block and return its result"),
                ),
            ),
            (
                "done",
                Value::native(
                    NativeFunction::new("done", done)
                        .with_help("done task: whether the spawned block has finished"),
                ),
            ),
        ]))
    }
}

/// Result side of a spawned evaluation.
pub struct TaskHandle {
    receiver: Receiver<Value>,
    result: Mutex<Option<Value>>,
}

impl TaskHandle {
    /// Block until the task finishes. A task whose thread died without
    /// sending reports an error.
    pub fn wait(&self) -> Value {
        let mut result = self.result.lock();
        if let Some(value) = result.as_ref() {
            return value.clone();
        }
        let value = self
            .receiver
            .recv()
            .unwrap_or_else(|_| Value::error_msg("task ended without a result"));
        *result = Some(value.clone());
        value
    }

    pub fn is_done(&self) -> bool {
        let mut result = self.result.lock();
        if result.is_some() {
            return true;
        }
        match self.receiver.try_recv() {
            Ok(value) => {
                *result = Some(value);
                true
            }
            Err(error) => error.is_disconnected(),
        }
    }
}

fn spawn(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let Some((first, rest)) = args.split_first() else {
        return Err(ErrorValue::new("spawn expects a block"));
    };
    let target = ctx.eval_checked(first)?;
    let Some(block) = target.as_block().cloned() else {
        return Err(ErrorValue::new(format!(
            "spawn expects a block, got {}",
            target.type_name()
        )));
    };
    let block_args: Vec<Argument> = ctx
        .eval_all(rest)?
        .into_iter()
        .map(Argument::resolved)
        .collect();

    let sub = ctx.create_sub_context();
    let guard = ctx.background_guard();
    let (sender, receiver) = bounded(1);
    debug!(context = ?sub.id(), "spawning task");

    std::thread::Builder::new()
        .name("rill-task".to_string())
        .spawn(move || {
            let _guard = guard;
            let value = run_block(&sub, &block, &block_args);
            // The handle may have been dropped; nobody is waiting then.
            let _ = sender.send(value);
        })
        .map_err(|e| ErrorValue::new(format!("cannot start task: {e}")))?;

    Ok(Value::internal(InternalValue::new(
        TASK_TYPE,
        TaskHandle {
            receiver,
            result: Mutex::new(None),
        },
    )))
}

fn handle_arg(ctx: &RunContext, name: &str, args: &[Argument]) -> Result<Value, ErrorValue> {
    let [arg] = args else {
        return Err(ErrorValue::new(format!(
            "{name} expects 1 argument, got {}",
            args.len()
        )));
    };
    ctx.eval_checked(arg)
}

fn as_task<'a>(name: &str, value: &'a Value) -> Result<&'a TaskHandle, ErrorValue> {
    if let Value::Internal(internal) = value {
        if internal.type_name() == TASK_TYPE {
            if let Some(handle) = internal.downcast_ref::<TaskHandle>() {
                return Ok(handle);
            }
        }
    }
    Err(ErrorValue::new(format!(
        "{name} expects a task, got {}",
        value.type_name()
    )))
}

fn await_task(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let value = handle_arg(ctx, "await", args)?;
    let result = as_task("await", &value)?.wait();
    match result.halting_error() {
        Some(error) => Err(error.clone()),
        None => Ok(result),
    }
}

fn done(ctx: &RunContext, args: &[Argument]) -> EvalResult {
    let value = handle_arg(ctx, "done", args)?;
    Ok(Value::boolean(as_task("done", &value)?.is_done()))
}
