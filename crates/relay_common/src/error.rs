//! Error taxonomy for lifecycle operations.
//!
//! Everything is surfaced to the operator with a readable message and a
//! non-zero exit; idempotent no-ops (stopping a stopped service) are
//! treated as success and never appear here.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors from install / update / uninstall.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("this operation requires root privileges (re-run with sudo)")]
    Permission,

    #[error("unsupported platform: {arch} (supported: x86_64, aarch64)")]
    UnsupportedPlatform { arch: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("service {unit} failed to start; inspect `journalctl -u {unit}`")]
    ServiceStart { unit: String },

    #[error("no installation found; run `relayctl {role} install` first")]
    NotInstalled { role: String },

    #[error("another lifecycle operation is in progress: {holder}")]
    LockHeld { holder: String },

    #[error("installation record is unusable: {0}")]
    State(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Artifact transfer failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("downloaded artifact is empty: {}", .0.display())]
    EmptyPayload(PathBuf),

    #[error("artifact missing after transfer: {}", .0.display())]
    MissingPayload(PathBuf),
}

/// Terminal outcome of an update attempt.
///
/// Only `Updated` maps to exit code 0. `FetchFailed` means the update was
/// aborted before the active artifact was touched. `RolledBack` means the
/// new artifact failed to start and the prior version is running again.
/// `Unrecovered` is the single non-self-healing outcome: the operator must
/// restore the backup by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated {
        version: String,
    },
    FetchFailed {
        reason: String,
    },
    RolledBack {
        reason: String,
    },
    Unrecovered {
        reason: String,
        backup: PathBuf,
        active: PathBuf,
        unit: String,
    },
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}
