//! Lifecycle manager: install / update / uninstall as guarded, reversible
//! steps over the artifact store and the service controller.
//!
//! Update ordering invariant: the backup is created and verified on disk
//! before any destructive step. A fetch failure aborts before the active
//! artifact is touched; a start failure after replacement triggers restore
//! from backup. The only non-self-healing outcome is a rollback whose
//! restart also fails.

use crate::artifact::ArtifactStore;
use crate::config::ServiceConfig;
use crate::error::{LifecycleError, UpdateOutcome};
use crate::fetch::ArtifactFetcher;
use crate::lock::LifecycleLock;
use crate::platform::Arch;
use crate::settings::{Role, Settings};
use crate::state::{InstallRecord, LifecycleState};
use crate::systemd::{ServiceController, UnitDescriptor};
use chrono::Utc;
use std::fs;
use std::io;
use std::thread;

pub struct LifecycleManager<'a, C, F>
where
    C: ServiceController,
    F: ArtifactFetcher,
{
    settings: Settings,
    arch: Arch,
    controller: &'a C,
    fetcher: &'a F,
    store: ArtifactStore,
}

impl<'a, C, F> LifecycleManager<'a, C, F>
where
    C: ServiceController,
    F: ArtifactFetcher,
{
    pub fn new(settings: Settings, arch: Arch, controller: &'a C, fetcher: &'a F) -> Self {
        let store = ArtifactStore::new(settings.artifact_path());
        Self {
            settings,
            arch,
            controller,
            fetcher,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Install: fetch the artifact, generate configuration, register the
    /// unit, enable and start. No rollback on failure, there is nothing to
    /// roll back to yet.
    ///
    /// Privilege and platform checks run in the CLI before this is called.
    pub fn install(&self) -> Result<InstallRecord, LifecycleError> {
        // Idempotent: a second install with the same settings reuses the
        // directories.
        fs::create_dir_all(&self.settings.install_dir)?;
        fs::create_dir_all(self.settings.instances_dir())?;
        let _lock = LifecycleLock::acquire(&self.settings.install_dir, "install")?;

        let unit = self.settings.unit_name();

        // A prior installation may still be running the binary we are about
        // to overwrite.
        if self.controller.has_unit(unit) {
            self.controller.stop(unit)?;
        }

        let mut record = InstallRecord::new(
            self.settings.role(),
            &self.settings.install_dir,
            &self.settings.config_path(),
            unit,
        );
        record.save()?;

        let url = self.settings.artifact_url(self.arch);
        tracing::info!(url, "fetching artifact");
        self.fetcher.fetch(&url, self.store.active_path())?;
        ArtifactStore::verify_payload(self.store.active_path())?;
        self.store.mark_active_executable()?;

        ServiceConfig::from_settings(&self.settings).write_to(&self.settings.config_path())?;

        self.controller.register_unit(&self.unit_descriptor())?;
        self.controller.reload_units()?;
        self.controller.enable(unit)?;
        self.controller.start(unit)?;

        if !self.wait_until_active(unit) {
            return Err(LifecycleError::ServiceStart {
                unit: unit.to_string(),
            });
        }

        record.set_version_marker(Utc::now().to_rfc3339());
        record.set_state(LifecycleState::Installed);
        record.save()?;
        tracing::info!(unit, "install complete");
        Ok(record)
    }

    /// Update: replace the active artifact while never leaving the host
    /// without a startable service when a last-known-good copy exists.
    ///
    /// Configuration is not regenerated here; only install writes it.
    pub fn update(&self) -> Result<UpdateOutcome, LifecycleError> {
        let mut record = InstallRecord::load(&self.settings.install_dir)?.ok_or_else(|| {
            LifecycleError::NotInstalled {
                role: self.settings.role().to_string(),
            }
        })?;
        match record.state {
            LifecycleState::Installed => {}
            other => {
                return Err(LifecycleError::State(format!(
                    "cannot update an installation in state {:?}; reinstall instead",
                    other
                )))
            }
        }
        if !self.store.has_active() {
            return Err(LifecycleError::State(
                "active artifact missing from disk; reinstall".to_string(),
            ));
        }

        let _lock = LifecycleLock::acquire(&self.settings.install_dir, "update")?;
        let unit = self.settings.unit_name();

        record.set_state(LifecycleState::Updating);
        record.save()?;

        // Backup strictly precedes every destructive step. Never reorder.
        let backup = self.store.create_backup()?;
        tracing::info!(backup = %backup.display(), "backup created");

        let was_running = self.controller.is_active(unit);
        if was_running {
            self.controller.stop(unit)?;
        }

        let url = self.settings.artifact_url(self.arch);
        let staging = self.store.staging_path();
        let fetched = self
            .fetcher
            .fetch(&url, &staging)
            .and_then(|_| ArtifactStore::verify_payload(&staging));

        if let Err(e) = fetched {
            // Active artifact was never touched; abort, restart, report.
            self.store.discard_staged();
            if was_running {
                if let Err(restart_err) = self.controller.start(unit) {
                    tracing::warn!(error = %restart_err, "restart after aborted fetch failed");
                }
            }
            record.set_state(LifecycleState::Installed);
            record.save()?;
            return Ok(UpdateOutcome::FetchFailed {
                reason: e.to_string(),
            });
        }

        self.store.promote_staged()?;

        if was_running && !self.start_and_verify(unit) {
            return self.rollback(record, unit);
        }

        record.set_version_marker(Utc::now().to_rfc3339());
        record.set_state(LifecycleState::Installed);
        record.save()?;
        tracing::info!(unit, "update complete");
        Ok(UpdateOutcome::Updated {
            version: record.version_marker,
        })
    }

    /// Restore the backup over the freshly installed artifact and try to
    /// bring the old version back up.
    fn rollback(
        &self,
        mut record: InstallRecord,
        unit: &str,
    ) -> Result<UpdateOutcome, LifecycleError> {
        let reason = format!("service {} did not become active after update", unit);
        tracing::warn!(unit, "new artifact failed to start, rolling back");

        self.controller.stop(unit)?;
        self.store.restore_backup()?;

        if self.start_and_verify(unit) {
            record.set_state(LifecycleState::RolledBack);
            record.save()?;
            // Recovered: the prior version is running again.
            record.set_state(LifecycleState::Installed);
            record.save()?;
            tracing::warn!(unit, "rolled back to previous artifact");
            return Ok(UpdateOutcome::RolledBack { reason });
        }

        record.set_state(LifecycleState::Failed);
        record.save()?;
        tracing::error!(unit, "rollback restart failed; manual recovery required");
        Ok(UpdateOutcome::Unrecovered {
            reason,
            backup: self.store.backup_path(),
            active: self.store.active_path().to_path_buf(),
            unit: unit.to_string(),
        })
    }

    /// Uninstall: every sub-step idempotent; succeeds even when the service
    /// never ran. Confirmation is collected by the caller before this runs.
    pub fn uninstall(&self) -> Result<(), LifecycleError> {
        let unit = self.settings.unit_name();
        let _lock = LifecycleLock::acquire(&self.settings.install_dir, "uninstall")?;

        // A corrupt record must not block removal.
        if let Ok(Some(mut record)) = InstallRecord::load(&self.settings.install_dir) {
            record.set_state(LifecycleState::Uninstalling);
            let _ = record.save();
        }

        self.controller.stop(unit)?;
        self.controller.disable(unit)?;
        self.controller.remove_unit(unit)?;
        self.controller.reload_units()?;

        match fs::remove_dir_all(&self.settings.install_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(unit, "uninstall complete");
        Ok(())
    }

    /// Human-readable removal plan for dry runs.
    pub fn removal_plan(&self) -> Vec<String> {
        let unit = self.settings.unit_name();
        vec![
            format!("stop and disable service {}", unit),
            format!("remove unit file for {} and reload units", unit),
            format!(
                "remove installation directory {}",
                self.settings.install_dir.display()
            ),
        ]
    }

    fn unit_descriptor(&self) -> UnitDescriptor {
        let description = match self.settings.role() {
            Role::Hub => "Relay hub dashboard",
            Role::Agent => "Relay agent",
        };
        UnitDescriptor {
            unit_name: self.settings.unit_name().to_string(),
            description: description.to_string(),
            exec_path: self.store.active_path().to_path_buf(),
            args: self.settings.exec_args(),
            working_dir: self.settings.install_dir.clone(),
            restart: self.settings.role().restart_policy(),
            restart_sec: 5,
            limit_nofile: 65535,
        }
    }

    /// `systemctl start` plus health verification under the configured
    /// grace/retry policy. A failed start command counts as inactive.
    fn start_and_verify(&self, unit: &str) -> bool {
        if let Err(e) = self.controller.start(unit) {
            tracing::warn!(unit, error = %e, "start command failed");
            return false;
        }
        self.wait_until_active(unit)
    }

    fn wait_until_active(&self, unit: &str) -> bool {
        let health = self.settings.health;
        thread::sleep(health.grace);
        for attempt in 0..health.retries {
            if self.controller.is_active(unit) {
                return true;
            }
            if attempt + 1 < health.retries {
                thread::sleep(health.poll_interval);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::settings::{AgentSettings, HealthPolicy};
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::path::Path;
    use tempfile::TempDir;

    // ------------------------------------------------------------------
    // Mocks
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct MockController {
        active: Cell<bool>,
        enabled: Cell<bool>,
        /// Number of upcoming starts after which the unit dies immediately.
        start_failures: Cell<u32>,
        units: RefCell<HashSet<String>>,
        calls: RefCell<Vec<String>>,
    }

    impl MockController {
        fn log(&self, call: &str) {
            self.calls.borrow_mut().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ServiceController for MockController {
        fn stop(&self, _unit: &str) -> io::Result<()> {
            self.log("stop");
            self.active.set(false);
            Ok(())
        }

        fn start(&self, _unit: &str) -> io::Result<()> {
            self.log("start");
            let failures = self.start_failures.get();
            if failures > 0 {
                self.start_failures.set(failures - 1);
                self.active.set(false);
            } else {
                self.active.set(true);
            }
            Ok(())
        }

        fn enable(&self, _unit: &str) -> io::Result<()> {
            self.log("enable");
            self.enabled.set(true);
            Ok(())
        }

        fn disable(&self, _unit: &str) -> io::Result<()> {
            self.log("disable");
            self.enabled.set(false);
            Ok(())
        }

        fn is_active(&self, _unit: &str) -> bool {
            self.active.get()
        }

        fn has_unit(&self, unit: &str) -> bool {
            self.units.borrow().contains(unit)
        }

        fn register_unit(&self, descriptor: &UnitDescriptor) -> io::Result<()> {
            self.log("register_unit");
            self.units.borrow_mut().insert(descriptor.unit_name.clone());
            Ok(())
        }

        fn remove_unit(&self, unit: &str) -> io::Result<()> {
            self.log("remove_unit");
            self.units.borrow_mut().remove(unit);
            Ok(())
        }

        fn reload_units(&self) -> io::Result<()> {
            self.log("reload_units");
            Ok(())
        }
    }

    enum FetchPlan {
        Payload(&'static [u8]),
        Empty,
        Fail,
    }

    struct MockFetcher {
        plan: FetchPlan,
        on_fetch: Option<Box<dyn Fn(&Path)>>,
    }

    impl MockFetcher {
        fn payload(bytes: &'static [u8]) -> Self {
            Self {
                plan: FetchPlan::Payload(bytes),
                on_fetch: None,
            }
        }

        fn empty() -> Self {
            Self {
                plan: FetchPlan::Empty,
                on_fetch: None,
            }
        }

        fn failing() -> Self {
            Self {
                plan: FetchPlan::Fail,
                on_fetch: None,
            }
        }

        fn observing(bytes: &'static [u8], on_fetch: Box<dyn Fn(&Path)>) -> Self {
            Self {
                plan: FetchPlan::Payload(bytes),
                on_fetch: Some(on_fetch),
            }
        }
    }

    impl ArtifactFetcher for MockFetcher {
        fn fetch(&self, _url: &str, dest: &Path) -> Result<(), FetchError> {
            if let Some(cb) = &self.on_fetch {
                cb(dest);
            }
            match self.plan {
                FetchPlan::Payload(bytes) => {
                    fs::write(dest, bytes).map_err(|e| FetchError::Transfer(e.to_string()))
                }
                FetchPlan::Empty => {
                    fs::write(dest, b"").map_err(|e| FetchError::Transfer(e.to_string()))
                }
                FetchPlan::Fail => Err(FetchError::Transfer("connection reset".to_string())),
            }
        }
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    fn test_settings(dir: &Path) -> Settings {
        Settings::agent(AgentSettings::new(
            "1.2.3.4:13001".to_string(),
            "K1".to_string(),
            vec![],
        ))
        .with_install_dir(dir.to_path_buf())
        .with_health(HealthPolicy::immediate())
    }

    fn manager<'a>(
        settings: &Settings,
        controller: &'a MockController,
        fetcher: &'a MockFetcher,
    ) -> LifecycleManager<'a, MockController, MockFetcher> {
        LifecycleManager::new(settings.clone(), Arch::X86_64, controller, fetcher)
    }

    /// Install v1 so update tests start from a running installation.
    fn installed(settings: &Settings, controller: &MockController) -> InstallRecord {
        let fetcher = MockFetcher::payload(b"v1");
        let record = manager(settings, controller, &fetcher).install().unwrap();
        controller.calls.borrow_mut().clear();
        record
    }

    fn read_artifact(settings: &Settings) -> Vec<u8> {
        fs::read(settings.artifact_path()).unwrap()
    }

    // ------------------------------------------------------------------
    // Install
    // ------------------------------------------------------------------

    #[test]
    fn test_install_generates_config_and_starts_service() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        let fetcher = MockFetcher::payload(b"v1");

        let record = manager(&settings, &controller, &fetcher).install().unwrap();

        assert_eq!(record.state, LifecycleState::Installed);
        assert!(!record.version_marker.is_empty());
        assert!(controller.is_active("relay-agent"));
        assert!(controller.enabled.get());
        assert!(controller.has_unit("relay-agent"));
        assert!(settings.instances_dir().is_dir());

        let config = fs::read_to_string(settings.config_path()).unwrap();
        assert!(config.contains("223.5.5.5:53"));
        assert!(config.contains("119.29.29.29:53"));
        assert_eq!(read_artifact(&settings), b"v1");
    }

    #[test]
    fn test_install_twice_is_idempotent_on_directories() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        let fetcher = MockFetcher::payload(b"v1");

        manager(&settings, &controller, &fetcher).install().unwrap();
        let second = manager(&settings, &controller, &fetcher).install();

        assert!(second.is_ok());
        // The prior unit was registered, so the rerun stops before
        // overwriting the binary.
        assert!(controller.calls().contains(&"stop".to_string()));
    }

    #[test]
    fn test_install_start_failure_is_fatal_without_rollback() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        controller.start_failures.set(10);
        let fetcher = MockFetcher::payload(b"v1");

        let err = manager(&settings, &controller, &fetcher)
            .install()
            .unwrap_err();

        assert!(matches!(err, LifecycleError::ServiceStart { .. }));
        // No backup exists on a first install; nothing was rolled back.
        let store = ArtifactStore::new(settings.artifact_path());
        assert!(!store.has_backup());
        let record = InstallRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(record.state, LifecycleState::Installing);
    }

    // ------------------------------------------------------------------
    // Update: abort paths (active artifact untouched)
    // ------------------------------------------------------------------

    #[test]
    fn test_update_fetch_failure_leaves_artifact_untouched() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        let record = installed(&settings, &controller);

        let fetcher = MockFetcher::failing();
        let outcome = manager(&settings, &controller, &fetcher).update().unwrap();

        assert!(matches!(outcome, UpdateOutcome::FetchFailed { .. }));
        assert_eq!(read_artifact(&settings), b"v1");
        assert!(!settings.artifact_path().with_extension("staging").exists());
        // Service was running before, so it is running again.
        assert!(controller.is_active("relay-agent"));

        let after = InstallRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(after.state, LifecycleState::Installed);
        assert_eq!(after.version_marker, record.version_marker);
    }

    #[test]
    fn test_update_empty_payload_aborts() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        let record = installed(&settings, &controller);

        let fetcher = MockFetcher::empty();
        let outcome = manager(&settings, &controller, &fetcher).update().unwrap();

        assert!(matches!(outcome, UpdateOutcome::FetchFailed { .. }));
        assert_eq!(read_artifact(&settings), b"v1");
        assert!(controller.is_active("relay-agent"));
        let after = InstallRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(after.version_marker, record.version_marker);
    }

    #[test]
    fn test_update_without_install_fails() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        let fetcher = MockFetcher::payload(b"v2");

        let err = manager(&settings, &controller, &fetcher)
            .update()
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotInstalled { .. }));
    }

    // ------------------------------------------------------------------
    // Update: success
    // ------------------------------------------------------------------

    #[test]
    fn test_update_success_retains_backup() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        let record = installed(&settings, &controller);

        let fetcher = MockFetcher::payload(b"v2");
        let outcome = manager(&settings, &controller, &fetcher).update().unwrap();

        assert!(outcome.is_success());
        assert_eq!(read_artifact(&settings), b"v2");
        let backup = settings.artifact_path().with_extension("bak");
        assert_eq!(fs::read(backup).unwrap(), b"v1");
        assert!(controller.is_active("relay-agent"));

        let after = InstallRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(after.state, LifecycleState::Installed);
        assert_ne!(after.version_marker, record.version_marker);
    }

    #[test]
    fn test_backup_exists_before_replacement() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        installed(&settings, &controller);

        let backup = settings.artifact_path().with_extension("bak");
        let active = settings.artifact_path();
        let fetcher = MockFetcher::observing(
            b"v2",
            Box::new(move |_dest| {
                // Fetch runs before replacement; the backup must already be
                // complete on disk and the active artifact still the old one.
                assert_eq!(fs::read(&backup).unwrap(), b"v1");
                assert_eq!(fs::read(&active).unwrap(), b"v1");
            }),
        );

        let outcome = manager(&settings, &controller, &fetcher).update().unwrap();
        assert!(outcome.is_success());
    }

    #[test]
    fn test_update_of_stopped_service_skips_restart() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        installed(&settings, &controller);
        controller.active.set(false);
        controller.calls.borrow_mut().clear();

        let fetcher = MockFetcher::payload(b"v2");
        let outcome = manager(&settings, &controller, &fetcher).update().unwrap();

        assert!(outcome.is_success());
        assert_eq!(read_artifact(&settings), b"v2");
        assert!(!controller.calls().contains(&"start".to_string()));
        assert!(!controller.is_active("relay-agent"));
    }

    // ------------------------------------------------------------------
    // Update: rollback paths
    // ------------------------------------------------------------------

    #[test]
    fn test_update_start_failure_rolls_back() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        let record = installed(&settings, &controller);

        // First start (the new artifact) dies; the rollback start succeeds.
        controller.start_failures.set(1);
        let fetcher = MockFetcher::payload(b"v2-broken");
        let outcome = manager(&settings, &controller, &fetcher).update().unwrap();

        assert!(matches!(outcome, UpdateOutcome::RolledBack { .. }));
        assert_eq!(read_artifact(&settings), b"v1");
        assert!(controller.is_active("relay-agent"));

        let after = InstallRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(after.state, LifecycleState::Installed);
        // Still the pre-update version.
        assert_eq!(after.version_marker, record.version_marker);
    }

    #[test]
    fn test_update_rollback_failure_is_unrecovered() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        installed(&settings, &controller);

        // Every restart fails: new artifact and restored one alike.
        controller.start_failures.set(10);
        let fetcher = MockFetcher::payload(b"v2-broken");
        let outcome = manager(&settings, &controller, &fetcher).update().unwrap();

        match outcome {
            UpdateOutcome::Unrecovered { backup, active, .. } => {
                // Backup untouched on disk for manual restore; an artifact
                // is still present at the active path.
                assert_eq!(fs::read(backup).unwrap(), b"v1");
                assert!(active.exists());
            }
            other => panic!("expected Unrecovered, got {:?}", other),
        }

        let after = InstallRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(after.state, LifecycleState::Failed);
    }

    #[test]
    fn test_update_from_failed_state_requires_reinstall() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        installed(&settings, &controller);

        controller.start_failures.set(10);
        let fetcher = MockFetcher::payload(b"v2-broken");
        manager(&settings, &controller, &fetcher).update().unwrap();

        controller.start_failures.set(0);
        let fetcher = MockFetcher::payload(b"v3");
        let err = manager(&settings, &controller, &fetcher)
            .update()
            .unwrap_err();
        assert!(matches!(err, LifecycleError::State(_)));
    }

    #[test]
    fn test_update_does_not_regenerate_configuration() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        installed(&settings, &controller);

        // Operator-edited configuration must survive updates.
        fs::write(settings.config_path(), "edited: true\n").unwrap();

        let fetcher = MockFetcher::payload(b"v2");
        manager(&settings, &controller, &fetcher).update().unwrap();

        assert_eq!(
            fs::read_to_string(settings.config_path()).unwrap(),
            "edited: true\n"
        );
    }

    // ------------------------------------------------------------------
    // Uninstall
    // ------------------------------------------------------------------

    #[test]
    fn test_uninstall_removes_unit_and_directory() {
        let dir = TempDir::new().unwrap();
        let install_dir = dir.path().join("agent");
        let settings = test_settings(&install_dir);
        let controller = MockController::default();
        installed(&settings, &controller);

        let fetcher = MockFetcher::payload(b"unused");
        manager(&settings, &controller, &fetcher).uninstall().unwrap();

        assert!(!install_dir.exists());
        assert!(!controller.has_unit("relay-agent"));
        let calls = controller.calls();
        assert!(calls.contains(&"stop".to_string()));
        assert!(calls.contains(&"disable".to_string()));
        assert!(calls.contains(&"reload_units".to_string()));
    }

    #[test]
    fn test_uninstall_is_idempotent_when_absent() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir.path().join("never-installed"));
        let controller = MockController::default();
        let fetcher = MockFetcher::payload(b"unused");

        assert!(manager(&settings, &controller, &fetcher).uninstall().is_ok());
    }

    // ------------------------------------------------------------------
    // Locking
    // ------------------------------------------------------------------

    #[test]
    fn test_concurrent_operation_is_rejected() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(dir.path());
        let controller = MockController::default();
        installed(&settings, &controller);

        let _held = LifecycleLock::acquire(dir.path(), "update").unwrap();
        let fetcher = MockFetcher::payload(b"v2");
        let err = manager(&settings, &controller, &fetcher)
            .update()
            .unwrap_err();
        assert!(matches!(err, LifecycleError::LockHeld { .. }));
    }
}
