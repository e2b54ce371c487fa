//! Stack growth for the recursive evaluator.
//!
//! Call evaluation and block execution recurse into each other once per
//! nesting level of the script. Both entry points go through
//! [`ensure_sufficient_stack`] so a deeply nested script grows the stack
//! instead of overflowing it; runaway recursion is then caught by the
//! configured call depth limit.

/// Free stack that must remain before the closure runs.
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
