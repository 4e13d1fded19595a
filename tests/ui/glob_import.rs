//! Sentinel brought in by a glob import

use std::cell::RefCell;

use deferred::deferred;

#[deferred]
fn run(log: &RefCell<Vec<&'static str>>) {
    use deferred::*;
    defer(|| log.borrow_mut().push("cleanup"));
    log.borrow_mut().push("body");
}

fn main() {
    let log = RefCell::new(Vec::new());
    run(&log);
    assert_eq!(*log.borrow(), ["body", "cleanup"]);
}
