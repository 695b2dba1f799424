//! Event log append throughput under steady-state (no wrap) and
//! wrap-heavy workloads.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tickstore_core::log::messages::QuTransfer;
use tickstore_core::{Passcode, TickStore, TickStoreConfig};

fn bench_msg() -> QuTransfer {
    QuTransfer {
        source_public_key: [7u8; 32],
        destination_public_key: [8u8; 32],
        amount: 1_000,
    }
}

fn config_with_buffer(log_buffer_size: u64) -> TickStoreConfig {
    TickStoreConfig {
        log_buffer_size,
        ..TickStoreConfig::small()
    }
}

fn bench_append_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_append_steady_state");
    for &buffer_size in &[64 * 1024u64, 1024 * 1024] {
        group.bench_with_input(BenchmarkId::new("append", buffer_size), &buffer_size, |b, &size| {
            let store = TickStore::new(config_with_buffer(size), Passcode([1, 2, 3, 4])).unwrap();
            store.begin_epoch(1, 0);
            let msg = bench_msg();
            b.iter(|| {
                criterion::black_box(store.log(0, &msg).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_append_with_wrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_append_with_wrap");
    // A buffer barely larger than one record forces every append past the
    // first to wrap, exercising the tail-reset branch on every call.
    group.bench_function("wrap_every_append", |b| {
        let store = TickStore::new(config_with_buffer(256), Passcode([1, 2, 3, 4])).unwrap();
        store.begin_epoch(1, 0);
        let msg = bench_msg();
        b.iter(|| {
            criterion::black_box(store.log(0, &msg).unwrap());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_append_steady_state, bench_append_with_wrap);
criterion_main!(benches);
