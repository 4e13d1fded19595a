//! Name resolution for sentinel recognition.
//!
//! A proc macro sees tokens, not resolved symbols. To tell the real
//! `deferred::defer` apart from an unrelated function that happens to share
//! the name, the driver keeps a stack of frames mirroring Rust's lexical
//! scopes and records every binding that can affect what a callee path
//! refers to:
//!
//! - `use` declarations (renames, groups, globs, `extern crate` aliases)
//! - local items (`fn defer() {}` shadows the sentinel)
//! - `let` bindings, function/closure parameters and pattern bindings
//!
//! The root frame binds `defer` to the sentinel: the annotated item cannot
//! observe its parent module's imports, so the attribute itself is taken as
//! the author's statement that the bare name means the sentinel.

use std::collections::HashMap;

use syn::ext::IdentExt;
use syn::{Ident, Item, Pat, Path, Stmt, UseTree};

/// Name of the sentinel function inside the runtime crate.
pub const SENTINEL: &str = "defer";

/// What a name refers to, as far as recognition is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// The sentinel function itself.
    Sentinel,
    /// The runtime crate (e.g. `use deferred as rt;`).
    Runtime,
    /// A local variable, parameter or pattern binding.
    Local,
    /// Any other item or import.
    Item,
}

#[derive(Debug, Default)]
struct Frame {
    names: HashMap<String, Binding>,
    /// Item boundary: locals of outer frames are not visible past it.
    barrier: bool,
}

/// Lexical scope stack.
#[derive(Debug)]
pub struct Scopes {
    frames: Vec<Frame>,
    /// Canonical segments of the runtime crate path, e.g. `["deferred"]`.
    runtime: Vec<String>,
}

impl Scopes {
    pub fn new(runtime: &Path) -> Self {
        let mut root = Frame::default();
        root.names.insert(SENTINEL.to_string(), Binding::Sentinel);
        Self {
            frames: vec![root],
            runtime: segments(runtime),
        }
    }

    /// Enter a block, closure or pattern scope.
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Enter an item (fn, mod, impl): enclosing locals become invisible.
    pub fn push_barrier(&mut self) {
        self.frames.push(Frame {
            barrier: true,
            ..Frame::default()
        });
    }

    pub fn pop(&mut self) {
        // The root frame is never popped.
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn bind(&mut self, ident: &Ident, binding: Binding) {
        if let Some(frame) = self.frames.last_mut() {
            frame.names.insert(ident.unraw().to_string(), binding);
        }
    }

    /// Bind only if the current frame has no explicit binding (glob imports).
    fn bind_weak(&mut self, name: &str, binding: Binding) {
        if let Some(frame) = self.frames.last_mut() {
            frame.names.entry(name.to_string()).or_insert(binding);
        }
    }

    /// Look a name up, innermost frame first.
    ///
    /// With `types_only`, local bindings are skipped: a `let` never shadows
    /// the first segment of a multi-segment path.
    fn lookup(&self, name: &str, types_only: bool) -> Option<Binding> {
        let mut past_barrier = false;
        for frame in self.frames.iter().rev() {
            if let Some(&binding) = frame.names.get(name) {
                let hidden = binding == Binding::Local && (types_only || past_barrier);
                if !hidden {
                    return Some(binding);
                }
            }
            if frame.barrier {
                past_barrier = true;
            }
        }
        None
    }

    /// Resolve a callee path to what it refers to.
    pub fn resolve(&self, path: &Path) -> Binding {
        let segs = segments(path);
        if path.leading_colon.is_some() {
            return self.classify(&segs);
        }
        match segs.as_slice() {
            [] => Binding::Item,
            [name] => self.lookup(name, false).unwrap_or(Binding::Item),
            [first, rest @ ..] => match self.lookup(first, true) {
                Some(Binding::Runtime) => {
                    let mut full = self.runtime.clone();
                    full.extend(rest.iter().cloned());
                    self.classify(&full)
                }
                Some(_) => Binding::Item,
                None => self.classify(&segs),
            },
        }
    }

    /// Classify an absolute path by comparing it with the runtime path.
    fn classify(&self, full: &[String]) -> Binding {
        match full.split_last() {
            Some((last, prefix)) if last == SENTINEL && prefix == self.runtime.as_slice() => {
                Binding::Sentinel
            }
            _ if full == self.runtime.as_slice() => Binding::Runtime,
            _ => Binding::Item,
        }
    }

    /// Expand a leading runtime alias (`rt::x` with `use deferred as rt`).
    fn canonicalize(&self, prefix: &[String]) -> Vec<String> {
        match prefix.split_first() {
            Some((first, rest)) if self.lookup(first, true) == Some(Binding::Runtime) => {
                let mut full = self.runtime.clone();
                full.extend(rest.iter().cloned());
                full
            }
            _ => prefix.to_vec(),
        }
    }

    // ============================================================
    // Declarations
    // ============================================================

    /// Declare the items of a block; items are visible in the whole block.
    pub fn declare_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Stmt::Item(item) = stmt {
                self.declare_item(item);
            }
        }
    }

    /// Declare the items of a module body.
    pub fn declare_items(&mut self, items: &[Item]) {
        for item in items {
            self.declare_item(item);
        }
    }

    fn declare_item(&mut self, item: &Item) {
        let ident = match item {
            Item::Use(item) => {
                self.declare_use(&item.tree, &mut Vec::new());
                return;
            }
            Item::ExternCrate(item) => {
                let name = item.ident.unraw().to_string();
                let binding = if self.runtime.len() == 1 && self.runtime[0] == name {
                    Binding::Runtime
                } else {
                    Binding::Item
                };
                match &item.rename {
                    Some((_, rename)) => self.bind(rename, binding),
                    None => self.bind(&item.ident, binding),
                }
                return;
            }
            Item::Fn(item) => &item.sig.ident,
            Item::Const(item) => &item.ident,
            Item::Static(item) => &item.ident,
            Item::Struct(item) => &item.ident,
            Item::Enum(item) => &item.ident,
            Item::Union(item) => &item.ident,
            Item::Mod(item) => &item.ident,
            Item::Trait(item) => &item.ident,
            Item::Type(item) => &item.ident,
            _ => return,
        };
        self.bind(ident, Binding::Item);
    }

    fn declare_use(&mut self, tree: &UseTree, prefix: &mut Vec<String>) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.unraw().to_string());
                self.declare_use(&path.tree, prefix);
                prefix.pop();
            }
            UseTree::Name(name) => {
                if name.ident == "self" {
                    // `use deferred::{self}` binds the last prefix segment.
                    if let Some(last) = prefix.last() {
                        let ident = Ident::new(last, name.ident.span());
                        let binding = self.use_binding(prefix);
                        self.bind(&ident, binding);
                    }
                } else {
                    let binding = self.use_binding_of(prefix, &name.ident);
                    self.bind(&name.ident, binding);
                }
            }
            UseTree::Rename(rename) => {
                if rename.rename == "_" {
                    return;
                }
                let binding = if rename.ident == "self" {
                    self.use_binding(prefix)
                } else {
                    self.use_binding_of(prefix, &rename.ident)
                };
                self.bind(&rename.rename, binding);
            }
            UseTree::Glob(_) => {
                if self.canonicalize(prefix) == self.runtime {
                    self.bind_weak(SENTINEL, Binding::Sentinel);
                }
            }
            UseTree::Group(group) => {
                for tree in &group.items {
                    self.declare_use(tree, prefix);
                }
            }
        }
    }

    fn use_binding_of(&self, prefix: &[String], ident: &Ident) -> Binding {
        let mut full = prefix.to_vec();
        full.push(ident.unraw().to_string());
        self.use_binding(&full)
    }

    fn use_binding(&self, full: &[String]) -> Binding {
        self.classify(&self.canonicalize(full))
    }

    /// Bind every identifier introduced by a pattern as a local.
    pub fn bind_pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(pat) => {
                self.bind(&pat.ident, Binding::Local);
                if let Some((_, sub)) = &pat.subpat {
                    self.bind_pat(sub);
                }
            }
            Pat::Tuple(pat) => pat.elems.iter().for_each(|p| self.bind_pat(p)),
            Pat::TupleStruct(pat) => pat.elems.iter().for_each(|p| self.bind_pat(p)),
            Pat::Slice(pat) => pat.elems.iter().for_each(|p| self.bind_pat(p)),
            Pat::Or(pat) => pat.cases.iter().for_each(|p| self.bind_pat(p)),
            Pat::Struct(pat) => pat.fields.iter().for_each(|f| self.bind_pat(&f.pat)),
            Pat::Reference(pat) => self.bind_pat(&pat.pat),
            Pat::Paren(pat) => self.bind_pat(&pat.pat),
            Pat::Type(pat) => self.bind_pat(&pat.pat),
            _ => {}
        }
    }
}

/// Path segments as strings, generic arguments ignored.
fn segments(path: &Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|seg| seg.ident.unraw().to_string())
        .collect()
}
