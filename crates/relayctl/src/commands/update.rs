//! Update command.
//!
//! Exit code 0 only when the new artifact is running. A rolled-back update
//! leaves the host healthy on the prior version but still exits non-zero so
//! operators and scripts notice.

use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use relay_common::fetch::HttpFetcher;
use relay_common::platform::{self, Arch};
use relay_common::systemd::SystemdController;
use relay_common::{LifecycleManager, Settings, UpdateOutcome};

pub fn run(settings: Settings) -> Result<()> {
    println!();
    println!("{}", format!("  Relay {} update", settings.role()).bold());
    println!("------------------------------------------------------------");
    println!();

    platform::require_root()?;
    let arch = Arch::detect()?;

    let controller = SystemdController::new();
    let fetcher = HttpFetcher::new();
    let manager = LifecycleManager::new(settings, arch, &controller, &fetcher);

    println!("{}", "Updating...".cyan());
    let outcome = manager.update()?;
    println!();

    match outcome {
        UpdateOutcome::Updated { version } => {
            println!("{}", "Update complete.".green().bold());
            println!("  version: {}", version);
            println!();
            Ok(())
        }
        UpdateOutcome::FetchFailed { reason } => {
            println!("{}", "Update aborted.".yellow().bold());
            println!("  {}", reason);
            println!("  The previous version was left untouched and is still in place.");
            println!();
            bail!("artifact fetch failed");
        }
        UpdateOutcome::RolledBack { reason } => {
            println!("{}", "Update failed; rolled back.".yellow().bold());
            println!("  {}", reason);
            println!("  The previous version was restored and is running again.");
            println!();
            bail!("update rolled back to previous version");
        }
        UpdateOutcome::Unrecovered {
            reason,
            backup,
            active,
            unit,
        } => {
            println!("{}", "Update failed and rollback did not recover.".red().bold());
            println!("  {}", reason);
            println!();
            println!("Manual recovery:");
            println!("  cp {} {}", backup.display(), active.display());
            println!("  systemctl restart {}", unit);
            println!("  journalctl -u {} -e", unit);
            println!();
            bail!("update unrecovered; manual intervention required");
        }
    }
}
