//! Durable state: gzip JSON snapshots with staged writes, a shrink
//! guard against suspiciously small rewrites, and hour-stamped backups.

mod error;
mod snapshot;

pub use error::Error;
pub use snapshot::{SnapshotStore, WriteOutcome};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Live dictionary file name under the data directory.
pub const DICTIONARY_FILE: &str = "dict.json.gz";
/// Account database file name under the data directory.
pub const ACCOUNTS_FILE: &str = "accounts.json.gz";
