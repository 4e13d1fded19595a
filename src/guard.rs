//! Cleanup guard used by `#[deferred]` expansions.
//!
//! Every registration becomes a [`Guard`] bound where the registration was
//! written. The guard runs its action when dropped; drop glue runs on normal
//! completion, on `return`/`?`/`break`, and while unwinding. Guards of one
//! block drop in reverse declaration order, which gives last-registered,
//! first-run. A guard stores the action inline, so it needs no allocation
//! and is `Send` exactly when the action is.

/// Runs its action when dropped.
#[must_use = "the action runs when the guard is dropped"]
pub struct Guard<F: FnOnce()> {
    action: Option<F>,
}

impl<F: FnOnce()> Guard<F> {
    #[inline]
    pub fn new(action: F) -> Self {
        Self {
            action: Some(action),
        }
    }
}

impl<F: FnOnce()> Drop for Guard<F> {
    #[inline]
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            invoke(action);
        }
    }
}

impl<F: FnOnce()> core::fmt::Debug for Guard<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Guard")
            .field("armed", &self.action.is_some())
            .finish()
    }
}

/// Guard `action` in place of a `defer(action)` registration.
///
/// `sentinel` is the callee as written. Taking it as `fn(F)` keeps imports
/// of it in use, and gives closures their `FnOnce()` signature.
#[inline]
pub fn register<F: FnOnce()>(sentinel: fn(F), action: F) -> Guard<F> {
    let _ = sentinel;
    Guard::new(action)
}

/// Invoke one action. A panicking action is logged and discarded so an
/// in-flight panic is not turned into an abort and later guards still run.
#[cfg(feature = "std")]
fn invoke<F: FnOnce()>(action: F) {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    if let Err(payload) = catch_unwind(AssertUnwindSafe(action)) {
        log::warn!(
            "deferred action panicked: {}",
            panic_message(payload.as_ref())
        );
    }
}

/// Without `std` there is no unwinding support to catch with.
#[cfg(not(feature = "std"))]
#[inline]
fn invoke<F: FnOnce()>(action: F) {
    action()
}

#[cfg(feature = "std")]
fn panic_message(payload: &(dyn core::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "Box<dyn Any>"
    }
}
