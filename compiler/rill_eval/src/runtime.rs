//! The embedding surface: a runtime owning a root context.

use std::sync::Arc;

use rill_ir::{ScriptInfo, SharedScript};
use rill_parse::{parse, ParseError};
use tracing::debug;

use crate::builder::{build, BuildError};
use crate::builtins;
use crate::call::Block;
use crate::config::EvalConfig;
use crate::context::RunContext;
use crate::exec::run_block;
use crate::module::Module;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::value::{ErrorValue, Value};

/// Failure at the outermost script boundary.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("{script}:{line}: syntax error: {source}")]
    Parse {
        script: String,
        line: u32,
        #[source]
        source: ParseError,
    },
    /// The parser produced a tree the builder cannot use.
    #[error("internal error building {script}: {source}")]
    Build {
        script: String,
        #[source]
        source: BuildError,
    },
    #[error("{0}")]
    Runtime(ErrorValue),
}

/// A script runtime: configuration, output and the root scope.
pub struct Runtime {
    root: RunContext,
}

impl Runtime {
    /// Runtime with default configuration, stdout output and the core
    /// library.
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn root(&self) -> &RunContext {
        &self.root
    }

    pub fn config(&self) -> &EvalConfig {
        self.root.config()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        self.root.print_handler()
    }

    pub fn register_module(&self, module: impl Module + 'static) {
        self.root.register_module(Arc::new(module));
    }

    /// Parse and build a script without running it.
    pub fn compile(&self, name: &str, source: &str) -> Result<Block, ScriptError> {
        let script: SharedScript = ScriptInfo::shared(name, source);
        let tree = parse(source).map_err(|source| ScriptError::Parse {
            script: name.to_string(),
            line: script.line_of(source.span().start),
            source,
        })?;
        build(&tree, &script).map_err(|source| ScriptError::Build {
            script: name.to_string(),
            source,
        })
    }

    /// Run a block at the script boundary.
    ///
    /// A top-level `return` ends the script here and does not affect the
    /// next run. Frames are collected afterwards once the live count passes
    /// the configured threshold.
    pub fn run_block(&self, block: &Block) -> Value {
        let result = run_block(&self.root, block, &[]);
        self.root.clear_stop();
        if self.frame_count() > self.config().frame_gc_threshold {
            self.collect_frames(std::slice::from_ref(&result));
        }
        result
    }

    /// Compile and run; runtime errors come back as `Value::Error`.
    pub fn eval(&self, name: &str, source: &str) -> Result<Value, ScriptError> {
        let block = self.compile(name, source)?;
        Ok(self.run_block(&block))
    }

    /// Compile and run; a halting error result becomes `Err`.
    pub fn run_script(&self, name: &str, source: &str) -> Result<Value, ScriptError> {
        let value = self.eval(name, source)?;
        match value.halting_error() {
            Some(error) => Err(ScriptError::Runtime(error.clone())),
            None => Ok(value),
        }
    }

    /// Number of live frames.
    pub fn frame_count(&self) -> usize {
        self.root.frame_count()
    }

    /// Reclaim frames unreachable from live contexts and `roots`.
    ///
    /// Host code holding values across runs should pass them as roots, or
    /// keep them bound in the root context. Returns the number reclaimed.
    pub fn collect_frames(&self, roots: &[Value]) -> usize {
        let reclaimed = self.root.collect_frames(roots);
        debug!(reclaimed, live = self.frame_count(), "collected frames");
        reclaimed
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Runtime`.
pub struct RuntimeBuilder {
    config: EvalConfig,
    print_handler: Option<SharedPrintHandler>,
    modules: Vec<Arc<dyn Module>>,
    core_library: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        RuntimeBuilder {
            config: EvalConfig::default(),
            print_handler: None,
            modules: Vec::new(),
            core_library: true,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    #[must_use]
    pub fn frame_gc_threshold(mut self, threshold: usize) -> Self {
        self.config.frame_gc_threshold = threshold;
        self
    }

    /// Where `print` output goes. Defaults to stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    /// Leave the root context empty instead of binding the core library.
    #[must_use]
    pub fn without_core_library(mut self) -> Self {
        self.core_library = false;
        self
    }

    pub fn build(self) -> Runtime {
        let print = self.print_handler.unwrap_or_else(stdout_handler);
        let root = RunContext::root(self.config, print);
        if self.core_library {
            builtins::register(&root);
        }
        for module in self.modules {
            root.register_module(module);
        }
        Runtime { root }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
