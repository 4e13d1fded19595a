//! Traversal driver: rewrite every block of an item.
//!
//! Blocks are visited depth-first and rewritten post-order: by the time a
//! block is rewritten, every block nested in it (loop bodies, closures,
//! match arms, deferred actions themselves) has already been visited and
//! rewritten. The rewriter only moves visited subtrees, so each block is
//! visited exactly once and inner blocks own their cleanup.

use smallvec::SmallVec;
use syn::visit_mut::{self, VisitMut};
use syn::{
    Arm, Attribute, Block, Error, Expr, ExprClosure, ExprConst, ExprForLoop, ExprIf, ExprWhile,
    FnArg, ImplItemConst, ImplItemFn, Item, ItemConst, ItemFn, ItemImpl, ItemMod, ItemStatic,
    ItemTrait, Result, Signature, Stmt, TraitItemConst, TraitItemFn,
};

use crate::config::Config;
use crate::recognize;
use crate::rewrite;
use crate::scope::Scopes;

/// Transform one annotated item in place.
pub fn transform_item(item: &mut Item, config: &Config) -> Result<()> {
    let mut driver = Driver::new(config);
    driver.visit_item_mut(item);
    driver.finish()
}

struct Driver<'a> {
    config: &'a Config,
    scopes: Scopes,
    /// Nesting depth of const contexts; registrations there are errors.
    const_depth: usize,
    errors: Option<Error>,
}

impl<'a> Driver<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            scopes: Scopes::new(&config.runtime),
            const_depth: 0,
            errors: None,
        }
    }

    fn finish(self) -> Result<()> {
        self.errors.map_or(Ok(()), Err)
    }

    fn error(&mut self, error: Error) {
        match &mut self.errors {
            Some(errors) => errors.combine(error),
            None => self.errors = Some(error),
        }
    }

    /// Run `visit` inside a const context.
    fn in_const(&mut self, visit: impl FnOnce(&mut Self)) {
        self.const_depth += 1;
        visit(self);
        self.const_depth -= 1;
    }

    /// Enter a function: parameters bind, enclosing locals become invisible.
    fn enter_fn(&mut self, sig: &Signature) {
        self.scopes.push_barrier();
        for input in &sig.inputs {
            if let FnArg::Typed(arg) = input {
                self.scopes.bind_pat(&arg.pat);
            }
        }
    }

    fn visit_fn(&mut self, sig: &mut Signature, block: &mut Block) {
        self.enter_fn(sig);
        if sig.constness.is_some() {
            self.in_const(|driver| driver.visit_block_mut(block));
        } else {
            self.visit_block_mut(block);
        }
        self.scopes.pop();
    }

    /// Bindings introduced by an `if let` / `while let` condition.
    fn bind_condition(&mut self, cond: &Expr) {
        match cond {
            Expr::Let(expr) => self.scopes.bind_pat(&expr.pat),
            Expr::Binary(expr) => {
                self.bind_condition(&expr.left);
                self.bind_condition(&expr.right);
            }
            Expr::Paren(expr) => self.bind_condition(&expr.expr),
            _ => {}
        }
    }
}

/// Items carrying their own `#[deferred]` are expanded by that attribute.
fn has_own_expansion(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .map_or(false, |segment| segment.ident == "deferred")
    })
}

impl VisitMut for Driver<'_> {
    fn visit_block_mut(&mut self, block: &mut Block) {
        self.scopes.push();
        self.scopes.declare_stmts(&block.stmts);

        let mut marks: SmallVec<[bool; 16]> = SmallVec::with_capacity(block.stmts.len());
        for stmt in &mut block.stmts {
            let registration = recognize::is_registration(stmt, &self.scopes);
            if registration && self.const_depth > 0 {
                self.error(Error::new_spanned(
                    &*stmt,
                    "`defer` cannot be used in a const context",
                ));
            }
            marks.push(registration);

            self.visit_stmt_mut(stmt);
            if let Stmt::Local(local) = stmt {
                self.scopes.bind_pat(&local.pat);
            }
        }
        self.scopes.pop();

        if self.const_depth > 0 {
            return;
        }
        if let Err(error) = rewrite::rewrite(block, &marks, &self.config.runtime) {
            self.error(error);
        }
    }

    // ============================================================
    // Functions and items
    // ============================================================

    fn visit_item_fn_mut(&mut self, item: &mut ItemFn) {
        if has_own_expansion(&item.attrs) {
            return;
        }
        self.visit_fn(&mut item.sig, &mut item.block);
    }

    fn visit_impl_item_fn_mut(&mut self, item: &mut ImplItemFn) {
        if has_own_expansion(&item.attrs) {
            return;
        }
        self.visit_fn(&mut item.sig, &mut item.block);
    }

    fn visit_trait_item_fn_mut(&mut self, item: &mut TraitItemFn) {
        if has_own_expansion(&item.attrs) {
            return;
        }
        if let Some(block) = &mut item.default {
            self.visit_fn(&mut item.sig, block);
        }
    }

    fn visit_item_impl_mut(&mut self, item: &mut ItemImpl) {
        if has_own_expansion(&item.attrs) {
            return;
        }
        self.scopes.push_barrier();
        visit_mut::visit_item_impl_mut(self, item);
        self.scopes.pop();
    }

    fn visit_item_trait_mut(&mut self, item: &mut ItemTrait) {
        if has_own_expansion(&item.attrs) {
            return;
        }
        self.scopes.push_barrier();
        visit_mut::visit_item_trait_mut(self, item);
        self.scopes.pop();
    }

    fn visit_item_mod_mut(&mut self, item: &mut ItemMod) {
        if has_own_expansion(&item.attrs) {
            return;
        }
        self.scopes.push_barrier();
        if let Some((_, items)) = &item.content {
            self.scopes.declare_items(items);
        }
        visit_mut::visit_item_mod_mut(self, item);
        self.scopes.pop();
    }

    // ============================================================
    // Const contexts
    // ============================================================

    fn visit_item_const_mut(&mut self, item: &mut ItemConst) {
        self.in_const(|driver| visit_mut::visit_item_const_mut(driver, item));
    }

    fn visit_item_static_mut(&mut self, item: &mut ItemStatic) {
        self.in_const(|driver| visit_mut::visit_item_static_mut(driver, item));
    }

    fn visit_impl_item_const_mut(&mut self, item: &mut ImplItemConst) {
        self.in_const(|driver| visit_mut::visit_impl_item_const_mut(driver, item));
    }

    fn visit_trait_item_const_mut(&mut self, item: &mut TraitItemConst) {
        self.in_const(|driver| visit_mut::visit_trait_item_const_mut(driver, item));
    }

    fn visit_expr_const_mut(&mut self, expr: &mut ExprConst) {
        self.in_const(|driver| visit_mut::visit_expr_const_mut(driver, expr));
    }

    // ============================================================
    // Expressions that introduce bindings
    // ============================================================

    fn visit_expr_closure_mut(&mut self, closure: &mut ExprClosure) {
        self.scopes.push();
        for input in &closure.inputs {
            self.scopes.bind_pat(input);
        }
        visit_mut::visit_expr_closure_mut(self, closure);
        self.scopes.pop();
    }

    fn visit_expr_for_loop_mut(&mut self, expr: &mut ExprForLoop) {
        self.visit_expr_mut(&mut expr.expr);
        self.scopes.push();
        self.scopes.bind_pat(&expr.pat);
        self.visit_block_mut(&mut expr.body);
        self.scopes.pop();
    }

    fn visit_expr_if_mut(&mut self, expr: &mut ExprIf) {
        self.visit_expr_mut(&mut expr.cond);
        self.scopes.push();
        self.bind_condition(&expr.cond);
        self.visit_block_mut(&mut expr.then_branch);
        self.scopes.pop();
        if let Some((_, else_branch)) = &mut expr.else_branch {
            self.visit_expr_mut(else_branch);
        }
    }

    fn visit_expr_while_mut(&mut self, expr: &mut ExprWhile) {
        self.visit_expr_mut(&mut expr.cond);
        self.scopes.push();
        self.bind_condition(&expr.cond);
        self.visit_block_mut(&mut expr.body);
        self.scopes.pop();
    }

    fn visit_arm_mut(&mut self, arm: &mut Arm) {
        self.scopes.push();
        self.scopes.bind_pat(&arm.pat);
        visit_mut::visit_arm_mut(self, arm);
        self.scopes.pop();
    }
}
