//! Benchmarks for `#[deferred]` overhead.
//!
//! Compares annotated functions against hand-written equivalents.
//! Each benchmark pair does EQUIVALENT work - same state, same operations.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use deferred::{defer, deferred};
use std::cell::Cell;

// ============================================================
// Test helpers
// ============================================================

/// Hand-written scope guard, the usual pattern without the attribute.
struct Reset<'a>(&'a Cell<u64>);

impl Drop for Reset<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[inline(never)]
fn work(value: u64) -> u64 {
    value.wrapping_mul(31).wrapping_add(7)
}

// ============================================================
// 1. SINGLE ACTION
// ============================================================

#[deferred]
#[inline(never)]
fn single_deferred(counter: &Cell<u64>, value: u64) -> u64 {
    defer(|| counter.set(counter.get() + 1));
    work(value)
}

#[inline(never)]
fn single_manual(counter: &Cell<u64>, value: u64) -> u64 {
    let _reset = Reset(counter);
    work(value)
}

#[inline(never)]
fn single_plain(counter: &Cell<u64>, value: u64) -> u64 {
    let result = work(value);
    counter.set(counter.get() + 1);
    result
}

fn bench_single_deferred(c: &mut Criterion) {
    let counter = Cell::new(0);
    c.bench_function("single_deferred", |b| {
        b.iter(|| black_box(single_deferred(&counter, black_box(3))))
    });
}

fn bench_single_manual(c: &mut Criterion) {
    let counter = Cell::new(0);
    c.bench_function("single_manual", |b| {
        b.iter(|| black_box(single_manual(&counter, black_box(3))))
    });
}

fn bench_single_plain(c: &mut Criterion) {
    let counter = Cell::new(0);
    c.bench_function("single_plain", |b| {
        b.iter(|| black_box(single_plain(&counter, black_box(3))))
    });
}

// ============================================================
// 2. MANY ACTIONS: Several registrations in one block
// ============================================================

#[deferred]
#[inline(never)]
fn many_deferred(counter: &Cell<u64>, value: u64) -> u64 {
    defer(|| counter.set(counter.get() + 1));
    defer(|| counter.set(counter.get() + 2));
    defer(|| counter.set(counter.get() + 3));
    defer(|| counter.set(counter.get() + 4));
    work(value)
}

#[inline(never)]
fn many_manual(counter: &Cell<u64>, value: u64) -> u64 {
    let _first = Reset(counter);
    let _second = Reset(counter);
    let _third = Reset(counter);
    let _fourth = Reset(counter);
    work(value)
}

fn bench_many_deferred(c: &mut Criterion) {
    let counter = Cell::new(0);
    c.bench_function("many_deferred", |b| {
        b.iter(|| black_box(many_deferred(&counter, black_box(3))))
    });
}

fn bench_many_manual(c: &mut Criterion) {
    let counter = Cell::new(0);
    c.bench_function("many_manual", |b| {
        b.iter(|| black_box(many_manual(&counter, black_box(3))))
    });
}

// ============================================================
// 3. LOOP BODY: A guard per iteration
// ============================================================

#[deferred]
#[inline(never)]
fn loop_deferred(counter: &Cell<u64>, rounds: u64) -> u64 {
    let mut total = 0;
    for round in 0..rounds {
        defer(|| counter.set(counter.get() + 1));
        total += work(round);
    }
    total
}

#[inline(never)]
fn loop_manual(counter: &Cell<u64>, rounds: u64) -> u64 {
    let mut total = 0;
    for round in 0..rounds {
        let _reset = Reset(counter);
        total += work(round);
    }
    total
}

fn bench_loop_deferred(c: &mut Criterion) {
    let counter = Cell::new(0);
    c.bench_function("loop_deferred", |b| {
        b.iter(|| black_box(loop_deferred(&counter, black_box(64))))
    });
}

fn bench_loop_manual(c: &mut Criterion) {
    let counter = Cell::new(0);
    c.bench_function("loop_manual", |b| {
        b.iter(|| black_box(loop_manual(&counter, black_box(64))))
    });
}

criterion_group!(
    single,
    bench_single_deferred,
    bench_single_manual,
    bench_single_plain,
);

criterion_group!(many, bench_many_deferred, bench_many_manual);

criterion_group!(looped, bench_loop_deferred, bench_loop_manual);

criterion_main!(single, many, looped);
