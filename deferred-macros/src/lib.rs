//! Proc macros for the deferred crate.
//!
//! `#[deferred]` rewrites every block of the annotated item that contains
//! `defer(...)` registrations into a guarded block whose cleanup section runs
//! the registered actions in reverse order on block exit.
//!
//! ## Module Structure
//!
//! - `config` - attribute arguments
//! - `scope` - lexical name resolution for the sentinel
//! - `recognize` - classifies statements as registrations
//! - `rewrite` - builds the guarded block
//! - `driver` - walks the item and rewrites each block
//! - `expand` - entry point and error reporting

use proc_macro::TokenStream;

mod config;
mod driver;
mod expand;
mod recognize;
mod rewrite;
mod scope;

/// Run `defer(...)` registrations of every block in the item at block exit.
///
/// Applies to functions, impl blocks, traits and inline modules.
/// See the `deferred` crate for details.
#[proc_macro_attribute]
pub fn deferred(args: TokenStream, input: TokenStream) -> TokenStream {
    expand::expand(args.into(), input.into()).into()
}
