//! Reconciliation engine.
//!
//! Converges the replica onto the source in two phases: a source-driven walk
//! that creates and updates entries, then a replica-driven sweep that removes
//! everything the walk did not confirm.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::fingerprint::fingerprint;
use super::state::{walk_tree, EntryKind, ReplicaEntry, ReplicaState};
use crate::logging::{SyncEvent, SyncLogger};

/// Operation counters accumulated over one reconciliation pass.
///
/// Reset each pass and returned to the caller for reporting only. Counters
/// record operations attempted and completed; a deletion whose target was
/// already gone still counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub files_updated: usize,
    pub files_created: usize,
    pub files_removed: usize,
    pub dirs_created: usize,
    pub dirs_removed: usize,
}

impl SyncStats {
    /// True when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.files_updated == 0
            && self.files_created == 0
            && self.files_removed == 0
            && self.dirs_created == 0
            && self.dirs_removed == 0
    }
}

/// One-way mirror engine: the source is authoritative, the replica derived.
pub struct MirrorEngine {
    source: PathBuf,
    replica: PathBuf,
}

impl MirrorEngine {
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
        }
    }

    /// Run one reconciliation pass.
    ///
    /// Walks the source tree, marking every live path as checked in `state`
    /// and copying files whose fingerprint differs from the snapshot, then
    /// removes whatever was left unchecked. Content hashes are the sole
    /// change signal; timestamps and sizes are never consulted.
    ///
    /// A missing source is recreated empty rather than treated as an error,
    /// so an accidentally deleted source degrades to an emptied replica and
    /// the sync loop keeps running. I/O failures during hashing or copying
    /// propagate and abort the pass.
    pub fn reconcile(&self, state: &mut ReplicaState, logger: &SyncLogger) -> Result<SyncStats> {
        let mut stats = SyncStats::default();

        if !self.source.is_dir() {
            logger.log(&SyncEvent::SourceMissing {
                dir: self.source.clone(),
            });
            fs::create_dir_all(&self.source).with_context(|| {
                format!("failed to create source folder {}", self.source.display())
            })?;
            logger.log(&SyncEvent::SourceCreated {
                dir: self.source.clone(),
            });
        } else if dir_is_empty(&self.source)? {
            logger.log(&SyncEvent::SourceEmpty {
                dir: self.source.clone(),
            });
        } else {
            self.converge_from_source(state, logger, &mut stats)?;
        }

        self.remove_unchecked(state, logger, &mut stats)?;

        Ok(stats)
    }

    /// Phase 1: walk the source tree and bring the replica up to date.
    fn converge_from_source(
        &self,
        state: &mut ReplicaState,
        logger: &SyncLogger,
        stats: &mut SyncStats,
    ) -> Result<()> {
        for entry in walk_tree(&self.source) {
            let entry = entry.with_context(|| {
                format!("failed to walk source folder {}", self.source.display())
            })?;
            let path = entry.path();
            let rel = match path.strip_prefix(&self.source) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
                _ => continue, // the root itself
            };
            let file_type = entry.file_type();

            if let Some(known) = state.get_mut(&rel) {
                if file_type.is_file() {
                    // A snapshot directory entry carries no digest and so
                    // always compares unequal, forcing a copy attempt.
                    let digest = fingerprint(&path)?;
                    if known.content_hash.as_deref() != Some(digest.as_str()) {
                        self.copy_file(&path, &rel)?;
                        logger.log(&SyncEvent::FileUpdated { path: rel.clone() });
                        stats.files_updated += 1;
                    }
                }
                known.checked = true;
            } else if file_type.is_file() {
                self.create_missing_parents(&rel, logger, stats)?;
                self.copy_file(&path, &rel)?;
                logger.log(&SyncEvent::FileCreated { path: rel });
                stats.files_created += 1;
            } else if file_type.is_dir() {
                let dest = self.replica.join(&rel);
                fs::create_dir_all(&dest)
                    .with_context(|| format!("failed to create directory {}", dest.display()))?;
                logger.log(&SyncEvent::DirCreated { path: rel });
                stats.dirs_created += 1;
            }
        }
        Ok(())
    }

    /// Phase 2: delete every replica entry the source walk never matched.
    ///
    /// Entries are processed in path order so a directory is dropped before
    /// the snapshot entries beneath it; the individual removals that follow
    /// then find their target already gone, which counts as success.
    fn remove_unchecked(
        &self,
        state: &ReplicaState,
        logger: &SyncLogger,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let mut doomed: Vec<(&PathBuf, &ReplicaEntry)> =
            state.iter().filter(|(_, entry)| !entry.checked).collect();
        doomed.sort_by_key(|(rel, _)| *rel);

        for (rel, entry) in doomed {
            let dest = self.replica.join(rel);
            match entry.kind {
                EntryKind::File => {
                    match fs::remove_file(&dest) {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => {
                            return Err(e).with_context(|| {
                                format!("failed to remove file {}", dest.display())
                            })
                        }
                    }
                    logger.log(&SyncEvent::FileRemoved { path: rel.clone() });
                    stats.files_removed += 1;
                }
                EntryKind::Directory => {
                    // Best effort: parts of the subtree may already be gone.
                    let _ = fs::remove_dir_all(&dest);
                    logger.log(&SyncEvent::DirRemoved { path: rel.clone() });
                    stats.dirs_removed += 1;
                }
            }
        }
        Ok(())
    }

    /// Make sure every ancestor directory of `rel` exists in the replica.
    ///
    /// The sorted walk visits directories before the files inside them, so
    /// this is a safety net for parents that were never walked, not the
    /// primary creation path.
    fn create_missing_parents(
        &self,
        rel: &Path,
        logger: &SyncLogger,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let Some(parent) = rel.parent() else {
            return Ok(());
        };
        let mut dir = self.replica.clone();
        let mut dir_rel = PathBuf::new();
        for component in parent.components() {
            dir.push(component);
            dir_rel.push(component);
            if dir.is_dir() {
                continue;
            }
            match fs::create_dir(&dir) {
                Ok(()) => {
                    logger.log(&SyncEvent::DirCreated {
                        path: dir_rel.clone(),
                    });
                    stats.dirs_created += 1;
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to create directory {}", dir.display()))
                }
            }
        }
        Ok(())
    }

    /// Copy a source file over its replica destination. `fs::copy` truncates
    /// an existing target and carries permission bits across.
    fn copy_file(&self, src: &Path, rel: &Path) -> Result<()> {
        let dest = self.replica.join(rel);
        fs::copy(src, &dest)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))?;
        Ok(())
    }
}

fn dir_is_empty(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path)
        .with_context(|| format!("failed to read source folder {}", path.display()))?;
    Ok(entries.next().is_none())
}
