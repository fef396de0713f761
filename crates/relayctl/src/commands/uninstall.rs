//! Uninstall command.
//!
//! The directory removal is irreversible, so it is gated behind a typed
//! confirmation phrase unless --force is given. --dry-run prints the plan
//! and changes nothing. A cancelled uninstall exits 0.

use crate::confirm;
use anyhow::Result;
use owo_colors::OwoColorize;
use relay_common::fetch::HttpFetcher;
use relay_common::platform::{self, Arch};
use relay_common::systemd::SystemdController;
use relay_common::{LifecycleManager, Settings};

pub fn run(settings: Settings, force: bool, dry_run: bool) -> Result<()> {
    println!();
    println!("{}", format!("  Relay {} uninstall", settings.role()).bold());
    println!("------------------------------------------------------------");
    println!();

    platform::require_root()?;
    let arch = Arch::detect()?;

    let controller = SystemdController::new();
    let fetcher = HttpFetcher::new();
    let manager = LifecycleManager::new(settings, arch, &controller, &fetcher);

    println!("{}", "This will:".yellow());
    for step in manager.removal_plan() {
        println!("  - {}", step);
    }
    println!();

    if dry_run {
        println!("{}", "[DRY RUN] No changes made.".cyan().bold());
        println!();
        return Ok(());
    }

    if !force {
        println!(
            "{}",
            "This will completely remove the installation from this host.".red()
        );
        if !confirm::prompt_typed_confirmation()? {
            println!();
            println!("Uninstall cancelled.");
            println!();
            return Ok(());
        }
    }

    println!();
    println!("{}", "Uninstalling...".cyan());
    manager.uninstall()?;

    println!();
    println!("{}", "Uninstall complete.".green().bold());
    println!();
    Ok(())
}
