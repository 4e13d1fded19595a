//! A `defer` imported from elsewhere is an ordinary call

use std::cell::RefCell;

use deferred::deferred;

mod tasks {
    pub fn defer(action: impl FnOnce()) {
        action();
    }
}

#[deferred]
fn run(log: &RefCell<Vec<&'static str>>) {
    use tasks::defer;
    defer(|| log.borrow_mut().push("immediately"));
    log.borrow_mut().push("body");
}

fn main() {
    let log = RefCell::new(Vec::new());
    run(&log);
    assert_eq!(*log.borrow(), ["immediately", "body"]);
}
