//! Block rewriting: turn each registration into a guard bound in place.
//!
//! ```text
//! {                                   {
//!     a();                                a();
//!     defer(|| first());                  let guard = register(defer, || first());
//!     b();                      =>        b();
//!     defer(|| second());                 let guard = register(defer, || second());
//!     c()                                 let result = c();
//! }                                       result
//!                                     }
//! ```
//!
//! A guard's drop glue runs its action on normal completion, early exit and
//! unwinding alike. Guards drop in reverse declaration order, so actions run
//! last-registered-first, and an action sees exactly the names in scope
//! where it was registered. A value-producing tail is bound before the
//! guards drop so its temporaries are released before any action runs.

use std::mem;

use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::{Block, Expr, Ident, Macro, Path, Result, Stmt};

use crate::recognize::{self, Registration};

/// Macros that never produce a value.
const DIVERGING_MACROS: &[&str] = &["panic", "unreachable", "todo", "unimplemented"];

/// Rewrite `block` in place if any statement is marked as a registration.
///
/// A block without registrations is left untouched.
pub fn rewrite(block: &mut Block, marks: &[bool], runtime: &Path) -> Result<()> {
    if !marks.contains(&true) {
        return Ok(());
    }

    let stmts = mem::take(&mut block.stmts);
    let last = stmts.len().saturating_sub(1);
    let mut rewritten: Vec<Stmt> = Vec::with_capacity(stmts.len() + 1);
    for (index, stmt) in stmts.into_iter().enumerate() {
        let stmt = if marks.get(index).copied().unwrap_or(false) {
            match recognize::into_registration(stmt) {
                Ok(registration) => {
                    rewritten.push(syn::parse2(guard(&registration, runtime))?);
                    continue;
                }
                Err(stmt) => stmt,
            }
        } else {
            stmt
        };
        match stmt {
            Stmt::Expr(expr, None) if index == last && needs_binding(&expr) => {
                bind_tail(expr, &mut rewritten)?;
            }
            stmt => rewritten.push(stmt),
        }
    }
    block.stmts = rewritten;
    Ok(())
}

/// The statement that replaces a registration.
///
/// The callee is passed along so imports of the sentinel stay in use and
/// rustc checks it has the sentinel's signature. Attributes such as `#[cfg]`
/// move onto the binding.
fn guard(registration: &Registration, runtime: &Path) -> TokenStream {
    let Registration {
        callee,
        action,
        attrs,
        span,
    } = registration;
    let guard = Ident::new("__deferred_guard", Span::mixed_site());
    quote_spanned! {*span=>
        #(#attrs)*
        let #guard = #runtime::__private::register(#callee, #action);
    }
}

/// `tail` becomes `let result = tail; result`.
fn bind_tail(tail: Expr, stmts: &mut Vec<Stmt>) -> Result<()> {
    let result = Ident::new("__deferred_result", Span::mixed_site());
    stmts.push(syn::parse2(quote!(let #result = #tail;))?);
    stmts.push(Stmt::Expr(syn::parse2(quote!(#result))?, None));
    Ok(())
}

/// Whether the tail has a value whose temporaries must be released before
/// the guards drop. Loops carry none, and diverging tails have no value.
fn needs_binding(tail: &Expr) -> bool {
    !matches!(tail, Expr::Loop(_)) && !diverges(tail)
}

/// Whether `expr` syntactically never completes.
fn diverges(expr: &Expr) -> bool {
    match expr {
        Expr::Return(_) | Expr::Break(_) | Expr::Continue(_) => true,
        Expr::Macro(expr) => is_diverging_macro(&expr.mac),
        Expr::Block(expr) => expr.label.is_none() && block_diverges(&expr.block),
        Expr::Unsafe(expr) => block_diverges(&expr.block),
        Expr::If(expr) => match &expr.else_branch {
            Some((_, else_branch)) => block_diverges(&expr.then_branch) && diverges(else_branch),
            None => false,
        },
        Expr::Match(expr) => !expr.arms.is_empty() && expr.arms.iter().all(|arm| diverges(&arm.body)),
        Expr::Paren(expr) => diverges(&expr.expr),
        Expr::Group(expr) => diverges(&expr.expr),
        _ => false,
    }
}

fn block_diverges(block: &Block) -> bool {
    match block.stmts.last() {
        Some(Stmt::Expr(expr, _)) => diverges(expr),
        Some(Stmt::Macro(stmt)) => is_diverging_macro(&stmt.mac),
        _ => false,
    }
}

fn is_diverging_macro(mac: &Macro) -> bool {
    mac.path
        .segments
        .last()
        .map_or(false, |segment| DIVERGING_MACROS.iter().any(|name| segment.ident == *name))
}
