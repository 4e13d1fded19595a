//! Diverging bodies compile without unreachable-code warnings

#![deny(unreachable_code, unused)]

use std::cell::RefCell;
use std::panic;

use deferred::{defer, deferred};

#[deferred]
fn fails(log: &RefCell<Vec<&'static str>>) {
    defer(|| log.borrow_mut().push("fails"));
    panic!("failed");
}

#[deferred]
fn early(log: &RefCell<Vec<&'static str>>) -> u32 {
    defer(|| log.borrow_mut().push("early"));
    return 7
}

#[deferred]
fn branches(log: &RefCell<Vec<&'static str>>, flag: bool) -> u32 {
    defer(|| log.borrow_mut().push("branches"));
    if flag {
        return 1
    } else {
        return 2
    }
}

#[deferred]
fn first_odd(log: &RefCell<Vec<&'static str>>, values: &[u32]) -> Option<u32> {
    for &value in values {
        defer(|| log.borrow_mut().push("next"));
        if value % 2 == 0 {
            continue;
        }
        return Some(value);
    }
    None
}

fn main() {
    let log = RefCell::new(Vec::new());
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| fails(&log)));
    assert!(result.is_err());
    assert_eq!(early(&log), 7);
    assert_eq!(branches(&log, false), 2);
    assert_eq!(first_odd(&log, &[2, 3]), Some(3));
    assert_eq!(
        *log.borrow(),
        ["fails", "early", "branches", "next", "next"]
    );
}
