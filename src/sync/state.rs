// Replica snapshot module
// Builds the per-pass map of what the replica looked like before reconciliation

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::{Parallelism, WalkDir};

use super::fingerprint::fingerprint;
use crate::logging::{SyncEvent, SyncLogger};

/// Kind of filesystem entry recorded in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One previously observed replica path
#[derive(Debug, Clone)]
pub struct ReplicaEntry {
    pub kind: EntryKind,
    /// Set true by the reconciler once the matching source path is seen live
    pub checked: bool,
    /// Content digest captured at snapshot time, present for files only
    pub content_hash: Option<String>,
}

/// Snapshot of the replica tree, keyed by path relative to the replica root.
///
/// Built fresh before every pass, mutated in place by the reconciler (the
/// `checked` flags), discarded afterwards. Never persisted across passes.
pub type ReplicaState = HashMap<PathBuf, ReplicaEntry>;

/// Walk the replica directory and capture a fresh snapshot of its contents.
///
/// If the replica directory does not exist yet it is created (with parents)
/// and an empty snapshot is returned.
pub fn capture_replica_state(replica: &Path, logger: &SyncLogger) -> Result<ReplicaState> {
    let mut state = ReplicaState::new();

    if !replica.is_dir() {
        fs::create_dir_all(replica)
            .with_context(|| format!("failed to create replica folder {}", replica.display()))?;
        logger.log(&SyncEvent::ReplicaCreated {
            dir: replica.to_path_buf(),
        });
        return Ok(state);
    }

    for entry in walk_tree(replica) {
        let entry = entry
            .with_context(|| format!("failed to walk replica folder {}", replica.display()))?;
        let path = entry.path();
        let rel = match path.strip_prefix(replica) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => continue, // the root itself
        };

        let file_type = entry.file_type();
        if file_type.is_file() {
            state.insert(
                rel,
                ReplicaEntry {
                    kind: EntryKind::File,
                    checked: false,
                    content_hash: Some(fingerprint(&path)?),
                },
            );
        } else if file_type.is_dir() {
            state.insert(
                rel,
                ReplicaEntry {
                    kind: EntryKind::Directory,
                    checked: false,
                    content_hash: None,
                },
            );
        }
    }

    Ok(state)
}

/// Serial, sorted walk shared by the snapshot and the source-driven phase.
/// Sorted order visits a directory before anything inside it. Symlinks are
/// dereferenced transparently; a link cycle surfaces as a walk error.
pub(crate) fn walk_tree(root: &Path) -> impl Iterator<Item = jwalk::Result<jwalk::DirEntry<((), ())>>> {
    WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .sort(true)
        .skip_hidden(false)
        .follow_links(true)
        .into_iter()
}
