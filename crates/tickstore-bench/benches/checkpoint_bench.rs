//! Checkpoint save/load throughput at a scale representative of a few
//! thousand ticks of history.

use criterion::{criterion_group, criterion_main, Criterion};
use tickstore_core::checkpoint::CheckpointDir;
use tickstore_core::log::messages::QuTransfer;
use tickstore_core::{Passcode, TickStore, TickStoreConfig};

fn populated_store() -> TickStore {
    let config = TickStoreConfig {
        max_ticks_per_epoch: 256,
        ticks_to_keep_from_prior_epoch: 16,
        transactions_per_tick: 8,
        ..TickStoreConfig::small()
    };
    let store = TickStore::new(config, Passcode([1, 2, 3, 4])).unwrap();
    store.begin_epoch(1, 0);
    let msg = QuTransfer {
        source_public_key: [1u8; 32],
        destination_public_key: [2u8; 32],
        amount: 3,
    };
    for tick in 0..256u32 {
        store.log(tick, &msg).unwrap();
    }
    store
}

fn scratch_dir() -> CheckpointDir {
    let dir = std::env::temp_dir()
        .join("tickstore-bench-scratch")
        .join(std::process::id().to_string());
    CheckpointDir::new(dir)
}

fn bench_save(c: &mut Criterion) {
    let store = populated_store();
    let dir = scratch_dir();
    c.bench_function("checkpoint_save", |b| {
        b.iter(|| {
            criterion::black_box(store.save_to_file(&dir));
        });
    });
}

fn bench_load(c: &mut Criterion) {
    let store = populated_store();
    let dir = scratch_dir();
    store.save_to_file(&dir);
    c.bench_function("checkpoint_load", |b| {
        b.iter(|| {
            criterion::black_box(store.load_from_file(&dir, 1));
        });
    });
}

criterion_group!(benches, bench_save, bench_load);
criterion_main!(benches);
