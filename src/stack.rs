//! Stack safety for deep recursion
//!
//! Evaluation and parsing recurse once per nested call, block and sub-expression. On native
//! targets the `stacker` crate grows the stack on demand, so the interpreter's own limits
//! (such as `EvaluatorConfig::max_call_depth`) are reached before the thread's stack runs
//! out, whatever stack size the embedding thread was spawned with.

/// Runs `f`, first growing the stack if less than the red zone remains
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (128KB red zone)
    const RED_ZONE: usize = 128 * 1024;

    /// Stack space to allocate when growing (1MB)
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call directly
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
