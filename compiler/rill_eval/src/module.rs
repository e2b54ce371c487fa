//! Host modules.
//!
//! A module is a named value producer registered on a context. Its content
//! is built on first `import` and memoized; a failed initialisation is not
//! cached, so the next import retries.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::RunContext;
use crate::value::{EvalResult, Value};

/// A named unit of host functionality.
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    /// Build the module's content, usually a dictionary of natives.
    fn content(&self, ctx: &RunContext) -> EvalResult;
}

/// A registered module plus its memoized content.
pub struct ModuleSlot {
    module: Arc<dyn Module>,
    content: Mutex<Option<Value>>,
}

impl ModuleSlot {
    pub fn new(module: Arc<dyn Module>) -> Self {
        ModuleSlot {
            module,
            content: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    /// Content, initialising it on first use.
    ///
    /// The lock is not held while the module builds its content, so a
    /// module may import other modules (or itself) during initialisation.
    /// If two imports race, the first stored result wins.
    pub fn content(&self, ctx: &RunContext) -> EvalResult {
        if let Some(value) = self.cached() {
            return Ok(value);
        }
        tracing::debug!(module = self.name(), "initialising module");
        let value = self.module.content(ctx)?;
        let mut slot = self.content.lock();
        Ok(slot.get_or_insert(value).clone())
    }

    pub fn cached(&self) -> Option<Value> {
        self.content.lock().clone()
    }
}

impl std::fmt::Debug for ModuleSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSlot")
            .field("name", &self.name())
            .field("initialised", &self.cached().is_some())
            .finish()
    }
}

/// Module backed by a closure, for hosts that do not need a type.
pub struct FnModule<F> {
    name: String,
    build: F,
}

impl<F> FnModule<F>
where
    F: Fn(&RunContext) -> EvalResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, build: F) -> Self {
        FnModule {
            name: name.into(),
            build,
        }
    }
}

impl<F> Module for FnModule<F>
where
    F: Fn(&RunContext) -> EvalResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self, ctx: &RunContext) -> EvalResult {
        (self.build)(ctx)
    }
}
