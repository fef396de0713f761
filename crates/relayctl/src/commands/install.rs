//! Install command.

use crate::confirm;
use anyhow::Result;
use owo_colors::OwoColorize;
use relay_common::fetch::HttpFetcher;
use relay_common::platform::{self, Arch};
use relay_common::preflight;
use relay_common::systemd::SystemdController;
use relay_common::{LifecycleManager, Settings};

pub fn run(settings: Settings) -> Result<()> {
    println!();
    println!("{}", format!("  Relay {} install", settings.role()).bold());
    println!("------------------------------------------------------------");
    println!();

    platform::require_root()?;
    let arch = Arch::detect()?;

    // Advisory only: a listener here might be stale or unrelated.
    let busy = preflight::busy_ports(&settings.listen_ports());
    if !busy.is_empty() {
        let list = busy
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{} port(s) already in use: {}",
            "Warning:".yellow().bold(),
            list
        );
        if !confirm::prompt_yes_no("Continue anyway?")? {
            println!();
            println!("Install cancelled.");
            return Ok(());
        }
        println!();
    }

    let controller = SystemdController::new();
    let fetcher = HttpFetcher::new();
    let manager = LifecycleManager::new(settings, arch, &controller, &fetcher);

    println!("{}", "Installing...".cyan());
    let record = manager.install()?;

    println!();
    println!("{}", "Install complete.".green().bold());
    println!("  service: {}", record.unit_name);
    println!("  version: {}", record.version_marker);
    println!();
    Ok(())
}
