//! Artifact store: the active executable, its staging file, and at most one
//! backup copy.
//!
//! Invariants:
//! - the backup is created and verified on disk before the active artifact
//!   is ever overwritten;
//! - replacement is rename-based, never a partial in-place write;
//! - the backup is not deleted on success, it stays as last-known-good.

use crate::error::FetchError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix of the retained last-known-good copy.
pub const BACKUP_SUFFIX: &str = "bak";

/// Suffix of the in-flight download.
pub const STAGING_SUFFIX: &str = "staging";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    active: PathBuf,
}

impl ArtifactStore {
    pub fn new(active: PathBuf) -> Self {
        Self { active }
    }

    pub fn active_path(&self) -> &Path {
        &self.active
    }

    pub fn backup_path(&self) -> PathBuf {
        self.active.with_extension(BACKUP_SUFFIX)
    }

    pub fn staging_path(&self) -> PathBuf {
        self.active.with_extension(STAGING_SUFFIX)
    }

    pub fn has_active(&self) -> bool {
        self.active.exists()
    }

    pub fn has_backup(&self) -> bool {
        self.backup_path().exists()
    }

    /// Copy the active artifact to the backup path and verify the copy
    /// landed with the same length. Must complete before any destructive
    /// step of an update.
    pub fn create_backup(&self) -> io::Result<PathBuf> {
        let backup = self.backup_path();
        fs::copy(&self.active, &backup)?;

        let active_len = fs::metadata(&self.active)?.len();
        let backup_len = fs::metadata(&backup)?.len();
        if active_len != backup_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "backup size mismatch: active {} bytes, backup {} bytes",
                    active_len, backup_len
                ),
            ));
        }
        Ok(backup)
    }

    /// Restore the backup over the active artifact.
    pub fn restore_backup(&self) -> io::Result<()> {
        fs::copy(self.backup_path(), &self.active)?;
        set_executable(&self.active)
    }

    /// Promote the staged download to active: chmod first, then a single
    /// rename so the active path never holds a half-written file.
    pub fn promote_staged(&self) -> io::Result<()> {
        let staging = self.staging_path();
        set_executable(&staging)?;
        fs::rename(&staging, &self.active)
    }

    /// Drop an aborted download; missing file is fine.
    pub fn discard_staged(&self) {
        let _ = fs::remove_file(self.staging_path());
    }

    /// Reject a transfer that left nothing (or an empty file) behind.
    pub fn verify_payload(path: &Path) -> Result<(), FetchError> {
        match fs::metadata(path) {
            Ok(meta) if meta.len() == 0 => Err(FetchError::EmptyPayload(path.to_path_buf())),
            Ok(_) => Ok(()),
            Err(_) => Err(FetchError::MissingPayload(path.to_path_buf())),
        }
    }

    /// Mark the active artifact executable after a direct install fetch.
    pub fn mark_active_executable(&self) -> io::Result<()> {
        set_executable(&self.active)
    }
}

fn set_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}
