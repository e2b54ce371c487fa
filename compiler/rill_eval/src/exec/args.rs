//! Evaluation helpers for natives.
//!
//! Natives receive raw arguments and decide what to evaluate and when.
//! These methods are how they do it.

use super::{
    eval_call, finish, interpolate, invoke, lookup_path, lookup_value, run_block, Target,
};
use crate::call::{Argument, Block, Call};
use crate::context::RunContext;
use crate::errors::undefined_name;
use crate::value::{ErrorValue, EvalResult, Value};

impl RunContext {
    /// Evaluate one argument.
    ///
    /// Identifiers are looked up, nested calls run and interpolated strings
    /// are rendered. Blocks and other literals evaluate to themselves.
    /// Resolved arguments are returned unchanged.
    pub fn eval(&self, arg: &Argument) -> Value {
        if arg.is_resolved() {
            return arg.value().clone();
        }
        self.eval_value(arg.value())
    }

    /// Evaluate a literal value as if it were an argument.
    pub fn eval_value(&self, value: &Value) -> Value {
        match value {
            Value::Identifier(ident) => lookup_value(self, ident),
            Value::Call(call) => eval_call(self, call, &[]),
            Value::String(s) if !s.is_plain() => finish(interpolate(self, s)),
            other => other.clone(),
        }
    }

    /// Evaluate one argument, turning a halting error into `Err`.
    ///
    /// Only errors raised while evaluating count: a resolved argument, or a
    /// name bound to an error value, is passed through as data so functions
    /// can take errors as arguments.
    pub fn eval_checked(&self, arg: &Argument) -> EvalResult {
        if arg.is_resolved() {
            return Ok(arg.value().clone());
        }
        let value = match arg.value() {
            Value::Identifier(ident) => match lookup_path(self, ident) {
                Target::Found { value, .. } => return Ok(value),
                Target::Missing { path, .. } => return Err(undefined_name(&path)),
                Target::Failed(value) => value,
            },
            literal => self.eval_value(literal),
        };
        match value.halting_error() {
            Some(error) => Err(error.clone()),
            None => Ok(value),
        }
    }

    /// Evaluate every argument in order, stopping at the first halting error.
    pub fn eval_all(&self, args: &[Argument]) -> Result<Vec<Value>, ErrorValue> {
        args.iter().map(|arg| self.eval_checked(arg)).collect()
    }

    /// Run a call in this context.
    pub fn eval_call(&self, call: &Call) -> Value {
        eval_call(self, call, &[])
    }

    /// Run a block in this context.
    pub fn run(&self, block: &Block) -> Value {
        run_block(self, block, &[])
    }

    /// Invoke `callee` with already-evaluated arguments.
    pub fn call_value(&self, callee: &Value, args: Vec<Value>) -> Value {
        let args: Vec<Argument> = args.into_iter().map(Argument::resolved).collect();
        invoke(self, callee, &args)
    }
}
