//! One-way folder mirroring.
//!
//! A pass snapshots the replica, walks the source to create and update
//! entries, then removes whatever the walk did not confirm is still live.

pub mod engine;
pub mod fingerprint;
pub mod state;

pub use engine::{MirrorEngine, SyncStats};
pub use fingerprint::fingerprint;
pub use state::{capture_replica_state, EntryKind, ReplicaEntry, ReplicaState};
