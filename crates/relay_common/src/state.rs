//! Persisted installation record.
//!
//! "Is it installed?" is answered by this record, not by probing for files.
//! Written atomically; one record per installation directory.

use crate::settings::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Record file name inside the installation directory.
pub const RECORD_FILE: &str = "install_record.json";

/// Current schema version.
pub const RECORD_SCHEMA: u32 = 1;

/// Lifecycle states of an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Absent,
    Installing,
    Installed,
    Updating,
    RolledBack,
    Failed,
    Uninstalling,
}

/// The one installation record per service on this host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallRecord {
    pub schema_version: u32,
    pub role: Role,
    pub install_dir: PathBuf,
    pub config_path: PathBuf,
    pub unit_name: String,
    /// Opaque marker for the active artifact, the RFC3339 fetch timestamp.
    pub version_marker: String,
    pub state: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstallRecord {
    pub fn new(role: Role, install_dir: &Path, config_path: &Path, unit_name: &str) -> Self {
        let now = Utc::now();
        Self {
            schema_version: RECORD_SCHEMA,
            role,
            install_dir: install_dir.to_path_buf(),
            config_path: config_path.to_path_buf(),
            unit_name: unit_name.to_string(),
            version_marker: String::new(),
            state: LifecycleState::Installing,
            created_at: now,
            updated_at: now,
        }
    }

    fn record_path(dir: &Path) -> PathBuf {
        dir.join(RECORD_FILE)
    }

    /// Load the record for an installation directory, `None` when absent.
    pub fn load(dir: &Path) -> io::Result<Option<Self>> {
        let path = Self::record_path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let record = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(record))
    }

    pub fn save(&self) -> io::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        crate::atomic_write(&Self::record_path(&self.install_dir), &content)
    }

    pub fn set_state(&mut self, state: LifecycleState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    pub fn set_version_marker(&mut self, marker: String) {
        self.version_marker = marker;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record_in(dir: &Path) -> InstallRecord {
        InstallRecord::new(
            Role::Agent,
            dir,
            &dir.join("config.yml"),
            "relay-agent",
        )
    }

    #[test]
    fn test_load_absent_record() {
        let dir = TempDir::new().unwrap();
        assert!(InstallRecord::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut record = record_in(dir.path());
        record.set_state(LifecycleState::Installed);
        record.set_version_marker("2026-08-25T00:00:00Z".to_string());
        record.save().unwrap();

        let loaded = InstallRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.state, LifecycleState::Installed);
        assert_eq!(loaded.version_marker, "2026-08-25T00:00:00Z");
        assert_eq!(loaded.unit_name, "relay-agent");
        assert_eq!(loaded.role, Role::Agent);
    }

    #[test]
    fn test_corrupt_record_is_an_error_not_a_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(RECORD_FILE), "{not json").unwrap();
        assert!(InstallRecord::load(dir.path()).is_err());
    }
}
