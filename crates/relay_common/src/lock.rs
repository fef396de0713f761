//! Exclusive lifecycle lock.
//!
//! One lock file per installation directory, holding PID and timestamp.
//! Stale locks (old, or held by a dead process) are recovered automatically.
//! Released on drop.

use crate::error::LifecycleError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

/// Lock file name inside the installation directory.
pub const LOCK_FILE: &str = "lifecycle.lock";

/// A lock older than this is considered abandoned.
const MAX_LOCK_AGE_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    /// Unix epoch seconds at acquisition.
    pub acquired_at: u64,
    pub hostname: String,
    /// Which lifecycle operation took the lock.
    pub operation: String,
}

impl LockInfo {
    fn new(operation: &str) -> Self {
        let hostname = fs::read_to_string("/etc/hostname")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            pid: process::id(),
            acquired_at: now_epoch(),
            hostname,
            operation: operation.to_string(),
        }
    }

    fn age_secs(&self) -> u64 {
        now_epoch().saturating_sub(self.acquired_at)
    }

    fn is_stale(&self) -> bool {
        self.age_secs() > MAX_LOCK_AGE_SECS
    }

    fn process_exists(&self) -> bool {
        Path::new(&format!("/proc/{}", self.pid)).exists()
    }

    fn describe(&self) -> String {
        format!(
            "pid {} on {} running `{}` for {}s",
            self.pid, self.hostname, self.operation, self.age_secs()
        )
    }
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Lock handle; removing the file on drop releases the lock.
#[derive(Debug)]
pub struct LifecycleLock {
    path: PathBuf,
}

impl LifecycleLock {
    /// Acquire the lock for an installation directory.
    pub fn acquire(install_dir: &Path, operation: &str) -> Result<Self, LifecycleError> {
        let path = install_dir.join(LOCK_FILE);
        fs::create_dir_all(install_dir)?;

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<LockInfo>(&content) {
                Ok(holder) => {
                    if holder.is_stale() {
                        tracing::warn!(pid = holder.pid, age = holder.age_secs(), "recovering stale lock");
                        fs::remove_file(&path)?;
                    } else if !holder.process_exists() {
                        tracing::warn!(pid = holder.pid, "recovering lock from dead process");
                        fs::remove_file(&path)?;
                    } else {
                        return Err(LifecycleError::LockHeld {
                            holder: holder.describe(),
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "recovering corrupted lock file");
                    fs::remove_file(&path)?;
                }
            }
        }

        let info = LockInfo::new(operation);
        let content = serde_json::to_string_pretty(&info)
            .map_err(|e| LifecycleError::State(e.to_string()))?;
        let mut file = fs::File::create(&path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;

        tracing::debug!(pid = info.pid, operation, "lifecycle lock acquired");
        Ok(Self { path })
    }

    fn is_owned(&self) -> bool {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|c| serde_json::from_str::<LockInfo>(&c).ok())
            .map(|info| info.pid == process::id())
            .unwrap_or(false)
    }
}

impl Drop for LifecycleLock {
    fn drop(&mut self) {
        // The uninstall path removes the whole directory, lock included.
        if self.is_owned() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(error = %e, "failed to release lifecycle lock");
            }
        }
    }
}
