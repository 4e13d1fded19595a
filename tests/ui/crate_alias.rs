//! Runtime crate reached through an `extern crate` alias

use std::cell::Cell;

#[deferred::deferred]
fn run(counter: &Cell<u32>) -> u32 {
    extern crate deferred as rt;
    rt::defer(|| counter.set(0));
    counter.set(counter.get() + 1);
    counter.get()
}

fn main() {
    let counter = Cell::new(1);
    assert_eq!(run(&counter), 2);
    assert_eq!(counter.get(), 0);
}
