//! Shared library for the relay lifecycle manager.
//!
//! Non-negotiable guarantees of the update flow:
//! 1. Backup creation strictly precedes artifact replacement
//! 2. Atomic installs - never half-written binaries
//! 3. Hard filesystem locking - only one lifecycle operation at a time
//! 4. Correct restart semantics with verification
//! 5. Automatic rollback on failure, last-known-good retained on disk

pub mod artifact;
pub mod config;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod lock;
pub mod platform;
pub mod preflight;
pub mod settings;
pub mod state;
pub mod systemd;

pub use error::{FetchError, LifecycleError, UpdateOutcome};
pub use lifecycle::LifecycleManager;
pub use settings::{AgentSettings, HubSettings, Role, Settings};

use std::fs;
use std::io;
use std::path::Path;

/// Write a file via temp-then-rename so readers never observe a partial write.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}
