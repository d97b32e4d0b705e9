//! Cooperative progress reporting and cancellation.
//!
//! Long-running kernels (all-pairs geodesic, permutation maps) call
//! [`Progress::check`] between sources or iterations. A check fails with
//! [`Cancelled`] once the [`CancelToken`] is set or the hook asks to stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Raised at a cooperative check after cancellation was requested.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Receives progress updates from a long-running kernel.
///
/// Returning `false` requests cancellation. Hooks may be called from
/// worker threads, so they must be `Sync`.
pub trait ProgressHook: Sync {
    /// Report that `completed` of `total` steps are done.
    fn report(&self, completed: usize, total: usize) -> bool;
}

impl<F> ProgressHook for F
where
    F: Fn(usize, usize) -> bool + Sync,
{
    fn report(&self, completed: usize, total: usize) -> bool {
        self(completed, total)
    }
}

/// Hook that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressHook for NoProgress {
    fn report(&self, _completed: usize, _total: usize) -> bool {
        true
    }
}

/// Shared cancellation flag.
///
/// Clones share the same flag, so a caller keeps one clone and hands
/// another to the kernel.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A hook and an optional token bound to a known number of steps.
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    hook: &'a dyn ProgressHook,
    cancel: Option<&'a CancelToken>,
    total: usize,
}

impl std::fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("cancel", &self.cancel)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl<'a> Progress<'a> {
    /// Bind a hook and token to `total` steps.
    #[must_use]
    pub fn new(hook: &'a dyn ProgressHook, cancel: Option<&'a CancelToken>, total: usize) -> Self {
        Self {
            hook,
            cancel,
            total,
        }
    }

    /// Progress that never reports and never cancels.
    #[must_use]
    pub fn silent(total: usize) -> Self {
        Self::new(&NoProgress, None, total)
    }

    /// Same hook and token, different step count.
    #[must_use]
    pub const fn with_total(self, total: usize) -> Self {
        Self { total, ..self }
    }

    /// Number of steps this progress covers.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Report `completed` steps and check for cancellation.
    ///
    /// # Errors
    ///
    /// [`Cancelled`] if the token is set or the hook returns `false`.
    pub fn check(&self, completed: usize) -> Result<(), Cancelled> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(Cancelled);
        }
        if self.hook.report(completed, self.total) {
            Ok(())
        } else {
            Err(Cancelled)
        }
    }
}
