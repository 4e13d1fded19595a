//! Futures of annotated async functions stay `Send`

use deferred::{defer, deferred};

#[deferred]
async fn work(value: u32) -> u32 {
    defer(move || println!("finished {}", value));
    tokio::task::yield_now().await;
    value * 2
}

fn main() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let handle = runtime.spawn(work(21));
    assert_eq!(runtime.block_on(handle).unwrap(), 42);
}
