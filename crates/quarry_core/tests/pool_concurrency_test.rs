//! Pool tests with several threads sharing one pool.

use std::sync::Arc;
use std::thread;

use quarry_core::{ArenaPool, PoolConfig};

const THREADS: usize = 8;
const ROUNDS: usize = 50;

#[test]
fn test_threads_never_observe_each_others_data() {
    let pool = Arc::new(ArenaPool::new(512, 0).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for round in 0..ROUNDS {
                    let arena = pool.acquire().unwrap();
                    assert_eq!(arena.offset(), 0);
                    assert_eq!(arena.active_chunk(), 0);

                    let tag = (worker * ROUNDS + round) as u64;
                    let mut values = Vec::new();
                    for i in 0..64 {
                        values.push(&*arena.alloc(tag * 1000 + i).unwrap());
                    }
                    let label = arena.alloc_str(&format!("worker-{worker}-{round}")).unwrap();

                    for (i, value) in (0..64).zip(&values) {
                        assert_eq!(**value, tag * 1000 + i);
                    }
                    assert_eq!(label, format!("worker-{worker}-{round}"));

                    drop(values);
                    pool.release(arena);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = pool.stats();
    assert_eq!(stats.released, THREADS * ROUNDS);
    assert_eq!(stats.created + stats.reused, THREADS * ROUNDS);
    assert!(stats.created <= THREADS);
    assert_eq!(stats.idle, stats.created);
}

#[test]
fn test_scoped_guards_across_threads() {
    let pool = Arc::new(ArenaPool::new(1024, 0).unwrap());

    thread::scope(|scope| {
        for worker in 0..THREADS {
            let pool = &pool;
            scope.spawn(move || {
                for _ in 0..ROUNDS {
                    let arena = pool.acquire_scoped().unwrap();
                    let seq = arena
                        .append(arena.alloc_sequence::<usize>(0, 2).unwrap(), 0..worker)
                        .unwrap();
                    assert!(seq.iter().copied().eq(0..worker));
                }
            });
        }
    });

    let stats = pool.stats();
    assert_eq!(stats.released, THREADS * ROUNDS);
    assert!(stats.idle <= THREADS);
}

#[test]
fn test_idle_limit_holds_under_contention() {
    let config = PoolConfig::from_toml_str(
        r#"
        max_idle = 2

        [arena]
        chunk_size = 256
        "#,
    )
    .unwrap();
    let pool = Arc::new(ArenaPool::with_config(config).unwrap());

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let pool = &pool;
            scope.spawn(move || {
                let arenas: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
                for arena in arenas {
                    arena.alloc([7_u8; 100]).unwrap();
                    pool.release(arena);
                }
            });
        }
    });

    let stats = pool.stats();
    assert!(stats.idle <= 2);
    assert_eq!(stats.released, THREADS * 4);
    assert_eq!(stats.idle + stats.discarded, stats.created);
}
