//! CLI entrypoint driving the tick storage and event log core end to
//! end, for manual inspection and as a smoke test.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tickstore_core::checkpoint::CheckpointDir;
use tickstore_core::log::messages::QuTransfer;
use tickstore_core::tick::{Tick, TickData};
use tickstore_core::{Passcode, TickStore, TickStoreConfig};
use tickstore_wire::sink::ResponseSink;
use tickstore_wire::{process_request_log, process_request_tx_log_info, RequestLog, RequestLogIdRangeFromTx};

/// Demo driver for the tick storage and event log core.
#[derive(Debug, Parser)]
#[command(name = "tickstore-demo")]
#[command(about = "Drives the tick storage core through a full lifecycle")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs several epochs of synthetic activity, optionally checkpointing
    /// and reloading between them.
    Run {
        /// Number of epochs to simulate.
        #[arg(long, default_value_t = 3)]
        epochs: u32,
        /// Ticks per epoch.
        #[arg(long, default_value_t = 8)]
        ticks_per_epoch: u32,
        /// If set, checkpoints are written here after every epoch and
        /// reloaded into a fresh store to verify the round trip.
        #[arg(long)]
        checkpoint_dir: Option<PathBuf>,
    },
    /// Prints the capacity constants of a named configuration.
    Inspect {
        /// `small` (test-scale) or `production`.
        #[arg(long, default_value = "small")]
        scale: String,
    },
}

/// A fixed demo passcode; a real deployment reads this from its own
/// configuration, never a constant.
const DEMO_PASSCODE: Passcode = Passcode([0xDEAD, 0xBEEF, 0xCAFE, 0xF00D]);

struct PrintingSink;

impl ResponseSink for PrintingSink {
    fn enqueue_response(&mut self, message_type: u8, dejavu: u32, payload: &[u8]) {
        println!(
            "  -> response type={message_type} dejavu={dejavu} bytes={}",
            payload.len()
        );
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            epochs,
            ticks_per_epoch,
            checkpoint_dir,
        } => run(epochs, ticks_per_epoch, checkpoint_dir),
        Command::Inspect { scale } => inspect(&scale),
    }
}

fn inspect(scale: &str) {
    let config = match scale {
        "production" => TickStoreConfig::production(),
        "small" => TickStoreConfig::small(),
        other => {
            eprintln!("unknown scale {other:?}, expected \"small\" or \"production\"");
            process::exit(2);
        }
    };
    println!("{config:#?}");
    println!("tx_arena_size = {} bytes", config.tx_arena_size());
    println!("total_tick_slots = {}", config.total_tick_slots());
    println!("log_id_index_slots = {}", config.log_id_index_slots());
}

fn run(epochs: u32, ticks_per_epoch: u32, checkpoint_dir: Option<PathBuf>) {
    let config = TickStoreConfig {
        max_ticks_per_epoch: ticks_per_epoch,
        ticks_to_keep_from_prior_epoch: (ticks_per_epoch / 4).max(1),
        ..TickStoreConfig::small()
    };

    let store = TickStore::new(config, DEMO_PASSCODE).unwrap_or_else(|err| {
        eprintln!("fatal: failed to initialize tick store: {err}");
        process::exit(1);
    });

    let mut tick_begin = 0u32;
    for epoch in 1..=epochs {
        println!("== epoch {epoch}: beginning at tick {tick_begin} ==");
        store.begin_epoch(epoch, tick_begin);
        populate_epoch(&store, epoch, tick_begin, ticks_per_epoch);

        if let Some(dir) = &checkpoint_dir {
            checkpoint_round_trip(&store, dir, epoch, tick_begin, ticks_per_epoch);
        }

        tick_begin += ticks_per_epoch;
    }

    demonstrate_queries(&store, epochs, tick_begin.saturating_sub(ticks_per_epoch));
}

fn populate_epoch(store: &TickStore, epoch: u32, tick_begin: u32, ticks_per_epoch: u32) {
    for offset in 0..ticks_per_epoch {
        let tick = tick_begin + offset;
        let hash = tx_hash_for(epoch, tick);
        store.register_new_tx(tick, hash);

        let transfer = QuTransfer {
            source_public_key: [epoch as u8; 32],
            destination_public_key: [offset as u8; 32],
            amount: i64::from(offset) * 10,
        };
        store.log(tick, &transfer).unwrap();

        let digest = tx_hash_for(epoch, tick);
        store.append_transaction(
            tick,
            0,
            &tickstore_core::Transaction {
                source_public_key: [epoch as u8; 32],
                destination_public_key: [offset as u8; 32],
                amount: i64::from(offset) * 10,
                tick,
                input_type: 0,
                input: Vec::new(),
            },
        );

        store.set_tick_data(
            tick,
            TickData {
                epoch,
                tick,
                timestamp_millis: u64::from(tick) * 1_000,
                content_digest: digest,
            },
        );
        store.set_quorum_vote(
            0,
            tick,
            Tick {
                epoch,
                tick,
                computor_index: 0,
                content_digest: digest,
            },
        );
    }
    println!("  populated {ticks_per_epoch} ticks with transactions, votes, and log entries");
}

fn tx_hash_for(epoch: u32, tick: u32) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash[0..4].copy_from_slice(&epoch.to_le_bytes());
    hash[4..8].copy_from_slice(&tick.to_le_bytes());
    hash
}

fn checkpoint_round_trip(store: &TickStore, dir: &PathBuf, epoch: u32, tick_begin: u32, ticks_per_epoch: u32) {
    let checkpoint_dir = CheckpointDir::new(dir.clone());
    let code = store.save_to_file(&checkpoint_dir);
    println!("  checkpoint save -> {code:?} (code {})", code.as_code());
    if !code.is_ok() {
        return;
    }

    let reload_config = TickStoreConfig {
        max_ticks_per_epoch: ticks_per_epoch,
        ticks_to_keep_from_prior_epoch: (ticks_per_epoch / 4).max(1),
        ..TickStoreConfig::small()
    };
    let reloaded = TickStore::new(reload_config, DEMO_PASSCODE).unwrap_or_else(|err| {
        eprintln!("fatal: failed to initialize reload store: {err}");
        process::exit(1);
    });
    let code = reloaded.load_from_file(&checkpoint_dir, epoch);
    println!("  checkpoint load  -> {code:?} (code {})", code.as_code());
    if code.is_ok() {
        let sample_tick = tick_begin;
        let matches = reloaded.tick_data_in_current_epoch(sample_tick) == store.tick_data_in_current_epoch(sample_tick);
        println!("  tick {sample_tick} data matches after reload: {matches}");
    }
}

fn demonstrate_queries(store: &TickStore, last_epoch: u32, last_epoch_tick_begin: u32) {
    println!("== peer queries against the final epoch ==");
    let mut sink = PrintingSink;

    let hash = tx_hash_for(last_epoch, last_epoch_tick_begin);
    let lookup = RequestLogIdRangeFromTx {
        passcode: DEMO_PASSCODE,
        tick: last_epoch_tick_begin,
        tx_hash: hash,
    };
    process_request_tx_log_info(store, &mut sink, 1, &lookup.to_bytes());

    let fetch = RequestLog {
        passcode: DEMO_PASSCODE,
        from_id: 0,
        to_id: 0,
    };
    process_request_log(store, &mut sink, 2, &fetch.to_bytes(), 1 << 16);
}
