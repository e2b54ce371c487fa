//! The executable call tree: arguments, calls and blocks.
//!
//! A `Block` is what the builder produces and what the engine runs. Calls
//! and arguments are immutable once built; blocks become closures by
//! recording the `ContextId` they were created in.

mod native;

use std::fmt;
use std::sync::{Arc, OnceLock};

use rill_ir::{ScriptInfo, SharedScript, Span};

pub use native::{NativeFn, NativeFunction};

use crate::context::ContextId;
use crate::value::{Heap, Value};

/// Script metadata for arguments synthesized by the host or the engine.
fn host_script() -> SharedScript {
    static HOST: OnceLock<SharedScript> = OnceLock::new();
    HOST.get_or_init(|| ScriptInfo::synthetic("<host>")).clone()
}

/// A value paired with the source span that produced it.
///
/// Literal arguments come from the builder and are evaluated when a native
/// asks for them. Resolved arguments already hold a final value (piped
/// results, values passed by natives) and evaluate to themselves.
#[derive(Clone)]
pub struct Argument {
    value: Value,
    span: Span,
    script: SharedScript,
    resolved: bool,
}

impl Argument {
    pub fn literal(value: Value, span: Span, script: SharedScript) -> Self {
        Argument {
            value,
            span,
            script,
            resolved: false,
        }
    }

    /// An already-evaluated value with no source position.
    pub fn resolved(value: Value) -> Self {
        Argument {
            value,
            span: Span::DUMMY,
            script: host_script(),
            resolved: true,
        }
    }

    /// An already-evaluated value attributed to `span`.
    pub fn resolved_at(value: Value, span: Span, script: SharedScript) -> Self {
        Argument {
            value,
            span,
            script,
            resolved: true,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn script(&self) -> &SharedScript {
        &self.script
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Bare name of an unevaluated identifier argument.
    pub fn literal_name(&self) -> Option<String> {
        if self.resolved {
            return None;
        }
        self.value.as_identifier().map(ToString::to_string)
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.value, self.span)
    }
}

/// What a call invokes.
#[derive(Clone, Debug)]
pub enum CallTarget {
    /// Native bound at build time (literal sugar such as `[a b]`).
    Bound(Heap<NativeFunction>),
    /// Expression resolved at run time.
    Expr(Argument),
}

/// One invocation: a target, its arguments and an optional pipe.
#[derive(Clone)]
pub struct Call {
    target: CallTarget,
    args: Vec<Argument>,
    pipe: Option<Box<Call>>,
    span: Span,
    script: SharedScript,
}

impl Call {
    pub fn new(target: Argument, args: Vec<Argument>, span: Span, script: SharedScript) -> Self {
        Call {
            target: CallTarget::Expr(target),
            args,
            pipe: None,
            span,
            script,
        }
    }

    pub fn bound(
        native: Heap<NativeFunction>,
        args: Vec<Argument>,
        span: Span,
        script: SharedScript,
    ) -> Self {
        Call {
            target: CallTarget::Bound(native),
            args,
            pipe: None,
            span,
            script,
        }
    }

    #[must_use]
    pub fn with_pipe(mut self, pipe: Call) -> Self {
        self.pipe = Some(Box::new(pipe));
        self
    }

    pub fn target(&self) -> &CallTarget {
        &self.target
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    pub fn pipe(&self) -> Option<&Call> {
        self.pipe.as_deref()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn script(&self) -> &SharedScript {
        &self.script
    }

    /// 1-based line the call starts on.
    pub fn line(&self) -> u32 {
        self.script.line_of(self.span.start)
    }

    /// Human-readable name of the target for logs and display.
    pub fn target_name(&self) -> String {
        match &self.target {
            CallTarget::Bound(native) => native.name().to_string(),
            CallTarget::Expr(arg) => match arg.value() {
                Value::Identifier(id) => id.to_string(),
                Value::Call(inner) => format!("({})", inner.target_name()),
                other => other.type_name().to_string(),
            },
        }
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("target", &self.target_name())
            .field("args", &self.args)
            .field("pipe", &self.pipe)
            .finish()
    }
}

/// Ordered calls, optionally closing over the context they were created in.
#[derive(Clone)]
pub struct Block {
    calls: Arc<[Call]>,
    captured: Option<ContextId>,
}

impl Block {
    pub fn new(calls: Vec<Call>) -> Self {
        Block {
            calls: calls.into(),
            captured: None,
        }
    }

    pub fn empty() -> Self {
        Block::new(Vec::new())
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn captured(&self) -> Option<ContextId> {
        self.captured
    }

    /// The same code closing over `context`.
    #[must_use]
    pub fn capture(&self, context: ContextId) -> Self {
        Block {
            calls: Arc::clone(&self.calls),
            captured: Some(context),
        }
    }

    /// Same calls and same captured context.
    pub fn same_code(&self, other: &Block) -> bool {
        Arc::ptr_eq(&self.calls, &other.calls) && self.captured == other.captured
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("calls", &self.calls.len())
            .field("captured", &self.captured)
            .finish()
    }
}
