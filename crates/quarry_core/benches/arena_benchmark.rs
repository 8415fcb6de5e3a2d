//! # Arena Benchmark
//!
//! Compares per-value heap allocation against bump allocation in an arena
//! that is reset between iterations.

#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quarry_core::{Arena, ArenaPool};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Default)]
struct User {
    id: u64,
    age: u32,
    rate: f64,
}

fn user(i: usize) -> User {
    User {
        id: i as u64,
        age: (i % 90) as u32,
        rate: i as f64 * 0.5,
    }
}

// =============================================================================
// TYPED VALUES
// =============================================================================

fn bench_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_users");

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("heap", count), &count, |b, &count| {
            b.iter(|| {
                let users: Vec<Box<User>> = (0..count).map(|i| Box::new(user(i))).collect();
                black_box(users.len())
            });
        });

        let mut arena = Arena::new(CHUNK_SIZE, 0).unwrap();
        group.bench_with_input(BenchmarkId::new("arena", count), &count, |b, &count| {
            b.iter(|| {
                arena.reset();
                let mut sum = 0_u64;
                for i in 0..count {
                    sum += arena.alloc(user(i)).unwrap().id;
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// SEQUENCES
// =============================================================================

fn bench_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_users");

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("heap", count), &count, |b, &count| {
            b.iter(|| {
                let mut users = Vec::with_capacity(1);
                for i in 0..count {
                    users.push(user(i));
                }
                black_box(users.len())
            });
        });

        let mut arena = Arena::new(CHUNK_SIZE, 0).unwrap();
        group.bench_with_input(BenchmarkId::new("arena", count), &count, |b, &count| {
            b.iter(|| {
                arena.reset();
                let mut users = arena.alloc_sequence::<User>(0, 1).unwrap();
                for i in 0..count {
                    users.push(&arena, user(i)).unwrap();
                }
                black_box(users.len())
            });
        });
    }

    group.finish();
}

// =============================================================================
// TEXT
// =============================================================================

fn bench_text(c: &mut Criterion) {
    let names: Vec<String> = (0..1_000).map(|i| format!("user-{i}@example.com")).collect();
    let mut group = c.benchmark_group("copy_strings_1K");

    group.bench_function("heap", |b| {
        b.iter(|| {
            let copies: Vec<String> = names.iter().cloned().collect();
            black_box(copies.len())
        });
    });

    let mut arena = Arena::new(CHUNK_SIZE, 0).unwrap();
    group.bench_function("arena", |b| {
        b.iter(|| {
            arena.reset();
            let mut total = 0;
            for name in &names {
                total += arena.alloc_str(name).unwrap().len();
            }
            black_box(total)
        });
    });

    group.finish();
}

// =============================================================================
// POOL
// =============================================================================

fn bench_pool_cycle(c: &mut Criterion) {
    let pool = ArenaPool::new(CHUNK_SIZE, 0).unwrap();

    c.bench_function("pool_acquire_release", |b| {
        b.iter(|| {
            let arena = pool.acquire().unwrap();
            black_box(arena.alloc(user(7)).unwrap().id);
            pool.release(arena);
        });
    });
}

criterion_group!(
    benches,
    bench_values,
    bench_sequences,
    bench_text,
    bench_pool_cycle
);

criterion_main!(benches);
