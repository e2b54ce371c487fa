//! Execution contexts.
//!
//! A `RunContext` is a cheap handle onto a frame in the runtime's
//! `FrameArena`. Frames hold bindings, a `this` receiver, a module
//! registry and a stop flag, and chain to a parent frame. Closures join
//! their captured frame as a fallback, so their free variables stay
//! reachable after the defining call has returned.
//!
//! Handles pin their frame: while a `RunContext` exists its frame and
//! everything reachable from it survive collection.

mod arena;
mod gc;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

pub use arena::ContextId;
pub(crate) use arena::FrameArena;

use crate::config::EvalConfig;
use crate::errors::call_depth_exceeded;
use crate::module::{Module, ModuleSlot};
use crate::print_handler::SharedPrintHandler;
use crate::value::{ErrorValue, Value};

/// State shared by every context of one runtime.
pub(crate) struct Shared {
    pub(crate) frames: RwLock<FrameArena>,
    pub(crate) config: EvalConfig,
    pub(crate) print: SharedPrintHandler,
    /// Evaluations running on other threads; collection waits for zero.
    pub(crate) background: AtomicUsize,
}

/// Handle to one scope frame.
pub struct RunContext {
    shared: Arc<Shared>,
    id: ContextId,
    /// Nesting depth of user function calls.
    depth: usize,
}

impl RunContext {
    /// Root context of a new runtime.
    pub(crate) fn root(config: EvalConfig, print: SharedPrintHandler) -> Self {
        let mut frames = FrameArena::default();
        let id = frames.alloc(None, None);
        RunContext {
            shared: Arc::new(Shared {
                frames: RwLock::new(frames),
                config,
                print,
                background: AtomicUsize::new(0),
            }),
            id,
            depth: 0,
        }
    }

    fn spawn(&self, fallback: Option<ContextId>, depth: usize) -> RunContext {
        let id = self.shared.frames.write().alloc(Some(self.id), fallback);
        RunContext {
            shared: Arc::clone(&self.shared),
            id,
            depth,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn config(&self) -> &EvalConfig {
        &self.shared.config
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.shared.print
    }

    /// Whether both handles belong to the same runtime.
    pub fn same_runtime(&self, other: &RunContext) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Whether the frame still exists.
    pub fn is_alive(&self) -> bool {
        self.shared.frames.read().get(self.id).is_some()
    }

    /// Bind `key` in this frame, shadowing any ancestor binding.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let previous = self
            .shared
            .frames
            .write()
            .get_mut(self.id)
            .and_then(|frame| frame.bindings.insert(key.into(), value));
        drop(previous);
    }

    /// Remove an own binding. Ancestors are untouched.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.shared
            .frames
            .write()
            .get_mut(self.id)
            .and_then(|frame| frame.bindings.remove(key))
    }

    /// Look up `key` through own bindings, the parent chain and then the
    /// fallback chain of joined closures.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.shared.frames.read().lookup(self.id, key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shared
            .frames
            .read()
            .walk(self.id, |frame| frame.bindings.contains_key(key).then_some(()))
            .is_some()
    }

    /// Whether `key` is bound in this frame itself.
    pub fn contains_own(&self, key: &str) -> bool {
        self.shared
            .frames
            .read()
            .get(self.id)
            .is_some_and(|frame| frame.bindings.contains_key(key))
    }

    /// Own and inherited keys, sorted and deduplicated.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.shared.frames.read().walk(self.id, |frame| {
            keys.extend(frame.bindings.keys().cloned());
            None::<()>
        });
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// New frame whose parent is this one.
    pub fn create_sub_context(&self) -> RunContext {
        self.spawn(None, self.depth)
    }

    /// New frame whose parent is this one and whose fallback is `captured`.
    pub fn join(&self, captured: ContextId) -> RunContext {
        self.spawn(Some(captured), self.depth)
    }

    /// Sub-context for a user function call, one level deeper.
    pub fn enter_call(&self) -> Result<RunContext, ErrorValue> {
        let limit = self.shared.config.max_call_depth;
        if self.depth >= limit {
            return Err(call_depth_exceeded(limit));
        }
        Ok(self.spawn(None, self.depth + 1))
    }

    /// Replace this frame's own receiver, returning the previous one.
    pub fn set_this(&self, this: Option<Value>) -> Option<Value> {
        self.shared
            .frames
            .write()
            .get_mut(self.id)
            .and_then(|frame| std::mem::replace(&mut frame.this, this))
    }

    /// Nearest receiver along the lookup chain.
    pub fn this(&self) -> Option<Value> {
        self.shared
            .frames
            .read()
            .walk(self.id, |frame| frame.this.clone())
    }

    pub fn register_module(&self, module: Arc<dyn Module>) {
        let slot = Arc::new(ModuleSlot::new(module));
        let previous = self
            .shared
            .frames
            .write()
            .get_mut(self.id)
            .and_then(|frame| frame.modules.insert(slot.name().to_string(), slot));
        drop(previous);
    }

    pub fn module(&self, name: &str) -> Option<Arc<ModuleSlot>> {
        self.shared
            .frames
            .read()
            .walk(self.id, |frame| frame.modules.get(name).cloned())
    }

    /// Names of every visible module, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.shared.frames.read().walk(self.id, |frame| {
            names.extend(frame.modules.keys().cloned());
            None::<()>
        });
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Mark this frame as returned from. There is no way back.
    pub fn stop(&self) {
        if let Some(frame) = self.shared.frames.read().get(self.id) {
            frame.stopped.store(true, Ordering::Release);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared
            .frames
            .read()
            .get(self.id)
            .is_some_and(|frame| frame.stopped.load(Ordering::Acquire))
    }

    /// Consume a top-level `return` at the script boundary.
    pub(crate) fn clear_stop(&self) {
        if let Some(frame) = self.shared.frames.read().get(self.id) {
            frame.stopped.store(false, Ordering::Release);
        }
    }

    /// Keep frame collection off while work runs on another thread.
    pub fn background_guard(&self) -> BackgroundGuard {
        self.shared.background.fetch_add(1, Ordering::AcqRel);
        BackgroundGuard {
            shared: Arc::clone(&self.shared),
        }
    }

    pub(crate) fn frame_count(&self) -> usize {
        self.shared.frames.read().live()
    }

    /// Collect unreachable frames unless background work is running.
    pub(crate) fn collect_frames(&self, roots: &[Value]) -> usize {
        if self.shared.background.load(Ordering::Acquire) > 0 {
            return 0;
        }
        let released = self.shared.frames.write().collect(roots);
        let count = released.len();
        drop(released);
        count
    }
}

impl Clone for RunContext {
    fn clone(&self) -> Self {
        if let Some(frame) = self.shared.frames.read().get(self.id) {
            frame.handles.fetch_add(1, Ordering::AcqRel);
        }
        RunContext {
            shared: Arc::clone(&self.shared),
            id: self.id,
            depth: self.depth,
        }
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        if let Some(frame) = self.shared.frames.read().get(self.id) {
            frame.handles.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// Counts one background evaluation for as long as it lives.
pub struct BackgroundGuard {
    shared: Arc<Shared>,
}

impl Drop for BackgroundGuard {
    fn drop(&mut self) {
        self.shared.background.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests;
