//! Marker recognition: is this statement a `defer(...)` registration?
//!
//! A registration is an expression statement that calls the sentinel with
//! exactly one argument, that argument being a zero-argument action. Anything
//! else, including a malformed sentinel call, is an ordinary statement and
//! is left for rustc to type-check against the sentinel's signature.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprCall, ExprPath, ReturnType, Stmt, Type};

use crate::scope::{Binding, Scopes};

/// A recognized registration, taken apart for the rewriter.
pub struct Registration {
    /// The callee path as written, kept at the registration's position.
    pub callee: ExprPath,
    /// The deferred action.
    pub action: Expr,
    pub attrs: Vec<Attribute>,
    pub span: Span,
}

/// Whether the statement registers a deferred action.
pub fn is_registration(stmt: &Stmt, scopes: &Scopes) -> bool {
    let Some(call) = call_of(stmt) else {
        return false;
    };
    let Expr::Path(callee) = &*call.func else {
        return false;
    };
    if callee.qself.is_some() || scopes.resolve(&callee.path) != Binding::Sentinel {
        return false;
    }
    call.args.len() == 1 && call.args.first().map_or(false, is_action)
}

/// Take a statement already classified as a registration apart.
///
/// Returns the statement unchanged if it is not a single-argument path call.
pub fn into_registration(stmt: Stmt) -> Result<Registration, Stmt> {
    let span = stmt.span();
    match stmt {
        Stmt::Expr(Expr::Call(call), semi) => {
            split_call(call, span).map_err(|call| Stmt::Expr(Expr::Call(call), semi))
        }
        other => Err(other),
    }
}

fn split_call(call: ExprCall, span: Span) -> Result<Registration, ExprCall> {
    if call.args.len() != 1 || !matches!(&*call.func, Expr::Path(_)) {
        return Err(call);
    }
    let ExprCall {
        attrs,
        func,
        args,
        paren_token,
    } = call;
    let mut args = args.into_iter();
    match (*func, args.next()) {
        (Expr::Path(callee), Some(action)) => Ok(Registration {
            callee,
            action,
            attrs,
            span,
        }),
        (func, action) => Err(ExprCall {
            attrs,
            func: Box::new(func),
            args: action.into_iter().collect(),
            paren_token,
        }),
    }
}

fn call_of(stmt: &Stmt) -> Option<&ExprCall> {
    match stmt {
        Stmt::Expr(Expr::Call(call), _) => Some(call),
        _ => None,
    }
}

/// Whether an argument can be a zero-argument, unit-returning action.
///
/// Closures are checked syntactically. Other callable expressions (paths,
/// calls returning closures) are accepted and checked by rustc against the
/// guard's `FnOnce()` bound; literal shapes that can never be callable are
/// rejected here.
fn is_action(expr: &Expr) -> bool {
    match expr {
        Expr::Closure(closure) => {
            closure.inputs.is_empty()
                && closure.asyncness.is_none()
                && returns_unit(&closure.output)
        }
        Expr::Paren(expr) => is_action(&expr.expr),
        Expr::Group(expr) => is_action(&expr.expr),
        Expr::Lit(_)
        | Expr::Array(_)
        | Expr::Repeat(_)
        | Expr::Range(_)
        | Expr::Struct(_)
        | Expr::Tuple(_)
        | Expr::Binary(_)
        | Expr::Unary(_)
        | Expr::Async(_)
        | Expr::Assign(_) => false,
        _ => true,
    }
}

fn returns_unit(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => matches!(&**ty, Type::Tuple(tuple) if tuple.elems.is_empty()),
    }
}
