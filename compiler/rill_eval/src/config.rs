//! Evaluation settings.
//!
//! Settings travel with the runtime that owns them; there is no
//! process-wide configuration.

/// Limits and switches for one runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Deepest nesting of user function calls before an error is raised.
    pub max_call_depth: usize,
    /// Log every dispatched call at `debug` level.
    pub debug: bool,
    /// Live frame count above which the script boundary collects frames.
    pub frame_gc_threshold: usize,
}

impl EvalConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;
    pub const DEFAULT_FRAME_GC_THRESHOLD: usize = 4096;
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            debug: false,
            frame_gc_threshold: Self::DEFAULT_FRAME_GC_THRESHOLD,
        }
    }
}
