//! Host-supplied functions.

use std::fmt;
use std::sync::Arc;

use super::{Argument, Block};
use crate::context::RunContext;
use crate::value::EvalResult;

/// Signature of every native: the calling context and raw arguments.
pub type NativeFn = dyn Fn(&RunContext, &[Argument]) -> EvalResult + Send + Sync;

/// A callable registered by the host or created by `func`.
///
/// User-defined functions keep their body and parameter names so they can
/// be introspected with `help`.
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    func: Arc<NativeFn>,
    help: Option<String>,
    body: Option<Block>,
    params: Vec<String>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&RunContext, &[Argument]) -> EvalResult + Send + Sync + 'static,
    {
        NativeFunction {
            name: name.into(),
            func: Arc::new(func),
            help: None,
            body: None,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, params: Vec<String>, body: Block) -> Self {
        self.params = params;
        self.body = Some(body);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn body(&self) -> Option<&Block> {
        self.body.as_ref()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn invoke(&self, ctx: &RunContext, args: &[Argument]) -> EvalResult {
        (self.func)(ctx, args)
    }

    pub(crate) fn same_function(&self, other: &NativeFunction) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}
