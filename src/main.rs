use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use mirsync::logging::{ColorMode, SyncEvent, SyncLogger};
use mirsync::sync::{capture_replica_state, MirrorEngine};

/// Periodically mirror a source folder into a replica folder
#[derive(Debug, Parser)]
#[command(name = "mirsync", version, about)]
struct Args {
    /// Path to the source folder
    source: PathBuf,

    /// Path to the replica folder, must differ from the source
    replica: PathBuf,

    /// Path to the log file
    log_file: PathBuf,

    /// Seconds to wait between synchronization passes
    interval: u64,

    /// Don't mirror log lines to standard output
    #[arg(short, long)]
    silent: bool,

    /// When to colorize standard output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let logger = SyncLogger::new(&args.log_file, args.silent, args.color)?;

    if paths_coincide(&args.source, &args.replica) {
        logger.log(&SyncEvent::PathsCoincide {
            dir: args.replica.clone(),
        });
        std::process::exit(1);
    }

    let engine = MirrorEngine::new(&args.source, &args.replica);
    loop {
        let started = Instant::now();
        let mut state = capture_replica_state(&args.replica, &logger)?;
        let stats = engine.reconcile(&mut state, &logger)?;
        logger.log(&SyncEvent::PassCompleted {
            source: args.source.clone(),
            replica: args.replica.clone(),
            stats,
            elapsed_ms: started.elapsed().as_millis(),
            next_pass_secs: args.interval,
        });
        thread::sleep(Duration::from_secs(args.interval));
    }
}

/// Two arguments denote the same directory when their canonical forms match;
/// paths that don't resolve yet fall back to literal comparison.
fn paths_coincide(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
