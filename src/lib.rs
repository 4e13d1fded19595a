//! deferred - Go-style `defer` for Rust blocks
//!
//! # Overview
//!
//! Annotate an item with [`#[deferred]`](deferred) and call [`defer`] as a
//! statement inside any of its blocks. The registered action runs when the
//! enclosing block exits: at the end of the block, on `return`, `?`,
//! `break` or `continue`, and while a panic unwinds through it. Actions of
//! one block run last-registered-first.
//!
//! # Quick Start
//!
//! ```
//! use std::cell::RefCell;
//! use deferred::{defer, deferred};
//!
//! #[deferred]
//! fn greet(log: &RefCell<Vec<&'static str>>) {
//!     defer(|| log.borrow_mut().push("World!"));
//!     log.borrow_mut().push("Hello");
//! }
//!
//! let log = RefCell::new(Vec::new());
//! greet(&log);
//! assert_eq!(*log.borrow(), ["Hello", "World!"]);
//! ```
//!
//! # Semantics
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | Block completes | Actions run after the tail value is computed |
//! | `return`, `?`, `break`, `continue` | Exit value computed first, then actions run |
//! | Panic in the block | Actions run, then the panic keeps unwinding |
//! | Panic in an action | Logged at `warn` level and discarded; remaining actions run |
//! | Nested block | Has its own actions, run at that block's exit |
//! | `defer` inside a deferred action | Runs when that action's body exits |
//!
//! A registration guards its action from the point where it is written.
//! The action captures names exactly as they are visible there, so it may
//! use locals declared earlier in the block, including ones that shadow an
//! outer name. A registration that is never reached (it follows an early
//! `return`, or the block panicked before it) registers nothing. Captures
//! follow closure rules: an action that borrows a local keeps it borrowed
//! until the block exits, so share mutable state through `Cell`/`RefCell`
//! or move values in.
//!
//! ```
//! use std::cell::{Cell, RefCell};
//! use deferred::{defer, deferred};
//!
//! #[deferred]
//! fn checkout(counter: &Cell<u32>, log: &RefCell<Vec<String>>) -> u32 {
//!     defer(|| counter.set(0));
//!     let ticket = format!("ticket-{}", counter.get() + 1);
//!     defer(move || log.borrow_mut().push(ticket));
//!     counter.set(counter.get() + 1);
//!     return counter.get();
//! }
//!
//! let counter = Cell::new(41);
//! let log = RefCell::new(Vec::new());
//! assert_eq!(checkout(&counter, &log), 42);
//! assert_eq!(counter.get(), 0);
//! assert_eq!(*log.borrow(), ["ticket-42"]);
//! ```
//!
//! # Recognition
//!
//! A statement is a registration when it calls the sentinel with exactly
//! one zero-argument action. The callee may be written `defer`,
//! `deferred::defer`, or any alias imported inside the annotated item
//! (`use deferred::defer as on_exit;`). Names that shadow the sentinel (a
//! local `let defer = ...`, a parameter, `use other::defer`) are ordinary
//! calls. Outside an annotated item, [`defer`] is an ordinary call that does
//! nothing.
//!
//! # Placement
//!
//! | Target | Effect |
//! |--------|--------|
//! | `fn` | Body and every nested block |
//! | `impl` / `trait` | Every method body |
//! | `mod name { ... }` | Every item of the module |
//!
//! `#[deferred(crate = "path")]` names the runtime when it is re-exported or
//! renamed. Attributes on a registration (`#[cfg(...)]`) apply to it.
//! Registrations in const contexts are compile errors.
//!
//! # Features
//!
//! - `std` (default): panics raised by actions are caught and logged.
//!   Without it the crate is `no_std`, and actions are called directly.

#![cfg_attr(not(feature = "std"), no_std)]

// ============================================================
// Modules
// ============================================================

mod guard;

// ============================================================
// Re-exports
// ============================================================

pub use deferred_macros::deferred;

/// Support items for generated code. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::guard::{register, Guard};
}

// ============================================================
// Sentinel
// ============================================================

/// Defer `action` until the enclosing block exits.
///
/// Only meaningful inside an item annotated with [`#[deferred]`](deferred),
/// which turns the call into a registration. The call itself never runs
/// `action`: outside an annotated item it is dropped unused.
///
/// ```
/// use std::cell::Cell;
///
/// let ran = Cell::new(false);
/// deferred::defer(|| ran.set(true));
/// assert!(!ran.get());
/// ```
#[inline]
pub fn defer<F: FnOnce()>(action: F) {
    let _ = action;
}
