// Sync event logging
// The engine hands structured events to the logger; rendering to text happens
// here and only here. Every event becomes one line in the log file (always
// plain) and one line on stdout (colored per the configured mode).

use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use clap::ValueEnum;
use colored::{Color, Colorize};

use crate::sync::engine::SyncStats;

/// When to colorize standard output. Resolved once at logger construction;
/// nothing downstream reads the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Colorize when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// One discrete event per completed operation or observed condition.
/// Paths are relative to the tree they belong to.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    ReplicaCreated {
        dir: PathBuf,
    },
    SourceMissing {
        dir: PathBuf,
    },
    SourceCreated {
        dir: PathBuf,
    },
    SourceEmpty {
        dir: PathBuf,
    },
    FileCreated {
        path: PathBuf,
    },
    FileUpdated {
        path: PathBuf,
    },
    FileRemoved {
        path: PathBuf,
    },
    DirCreated {
        path: PathBuf,
    },
    DirRemoved {
        path: PathBuf,
    },
    PathsCoincide {
        dir: PathBuf,
    },
    PassCompleted {
        source: PathBuf,
        replica: PathBuf,
        stats: SyncStats,
        elapsed_ms: u128,
        next_pass_secs: u64,
    },
}

/// Line-oriented logger writing to a log file and standard output.
pub struct SyncLogger {
    file: Mutex<BufWriter<File>>,
    silent: bool,
    use_color: bool,
}

impl SyncLogger {
    /// Create (truncating) the log file and resolve the color mode.
    pub fn new(log_path: &Path, silent: bool, color: ColorMode) -> Result<Self> {
        let file = File::create(log_path)
            .with_context(|| format!("failed to create log file {}", log_path.display()))?;
        let use_color = match color {
            ColorMode::Auto => std::io::stdout().is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        };
        // colored consults NO_COLOR and tty state on its own; pin it to the
        // resolved mode so rendering stays deterministic.
        colored::control::set_override(use_color);
        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
            silent,
            use_color,
        })
    }

    /// Record one event: a plain line appended to the log file, a colored
    /// line on stdout unless running silent. The file is flushed per line so
    /// the log stays current while the process sleeps between passes.
    pub fn log(&self, event: &SyncEvent) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        if let Ok(mut file) = self.file.lock() {
            let line = format!("[{}] {}\n", stamp, render(event, false));
            if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
                eprintln!("Warning: failed to write log entry: {}", e);
            }
        }
        if !self.silent {
            println!("[{}] {}", stamp, render(event, self.use_color));
        }
    }
}

/// Render an event as a single line, identically worded with and without
/// color so the log file and stdout stay line-for-line comparable.
fn render(event: &SyncEvent, color: bool) -> String {
    let paint = |text: String, c: Color| -> String {
        if color {
            text.color(c).to_string()
        } else {
            text
        }
    };

    match event {
        SyncEvent::ReplicaCreated { dir } => paint(
            format!("Created replica folder {}", dir.display()),
            Color::Blue,
        ),
        SyncEvent::SourceMissing { dir } => paint(
            format!("Source folder {} does not exist", dir.display()),
            Color::Yellow,
        ),
        SyncEvent::SourceCreated { dir } => paint(
            format!("Created source folder {}", dir.display()),
            Color::Blue,
        ),
        SyncEvent::SourceEmpty { dir } => paint(
            format!(
                "Source folder {} is empty, nothing to synchronize",
                dir.display()
            ),
            Color::Yellow,
        ),
        SyncEvent::FileCreated { path } => {
            paint(format!("Created file {}", path.display()), Color::Blue)
        }
        SyncEvent::FileUpdated { path } => {
            paint(format!("Updated file {}", path.display()), Color::Blue)
        }
        SyncEvent::FileRemoved { path } => {
            paint(format!("Removed file {}", path.display()), Color::Blue)
        }
        SyncEvent::DirCreated { path } => {
            paint(format!("Created directory {}", path.display()), Color::Blue)
        }
        SyncEvent::DirRemoved { path } => {
            paint(format!("Removed directory {}", path.display()), Color::Blue)
        }
        SyncEvent::PathsCoincide { dir } => paint(
            format!(
                "Source and replica folders must differ, got {} for both",
                dir.display()
            ),
            Color::Red,
        ),
        SyncEvent::PassCompleted {
            source,
            replica,
            stats,
            elapsed_ms,
            next_pass_secs,
        } => {
            let summary = paint(
                format!(
                    "Synchronized {} -> {}: {} files updated, {} files created, {} files removed, \
                     {} directories created, {} directories removed in {} ms",
                    source.display(),
                    replica.display(),
                    stats.files_updated,
                    stats.files_created,
                    stats.files_removed,
                    stats.dirs_created,
                    stats.dirs_removed,
                    elapsed_ms,
                ),
                Color::Green,
            );
            let next = paint(
                format!(", next pass in {} s", next_pass_secs),
                Color::Blue,
            );
            format!("{}{}", summary, next)
        }
    }
}
