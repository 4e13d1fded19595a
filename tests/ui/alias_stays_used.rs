//! Imports of the sentinel stay in use after the rewrite

#![deny(unused_imports)]

use std::cell::RefCell;

use deferred::{defer, deferred};

#[deferred]
fn run(log: &RefCell<Vec<&'static str>>) {
    use deferred::defer as on_exit;
    on_exit(|| log.borrow_mut().push("on_exit"));
    defer(|| log.borrow_mut().push("defer"));
    log.borrow_mut().push("body");
}

fn main() {
    let log = RefCell::new(Vec::new());
    run(&log);
    assert_eq!(*log.borrow(), ["body", "defer", "on_exit"]);
}
