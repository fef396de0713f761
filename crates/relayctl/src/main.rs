//! relayctl - deploy, update, and remove the relay service under systemd.

mod cli;
mod commands;
mod confirm;

use anyhow::Result;
use clap::Parser;
use cli::{AgentAction, Cli, HubAction, RoleCommand};
use relay_common::settings::{AgentSettings, HubSettings, Role, Settings};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        RoleCommand::Hub { action } => match action {
            HubAction::Install {
                web_port,
                agent_port,
                data_dir,
            } => {
                let hub = HubSettings {
                    web_port,
                    agent_port,
                    data_dir: data_dir.unwrap_or_else(|| HubSettings::default().data_dir),
                };
                commands::install::run(Settings::hub(hub))
            }
            HubAction::Update => commands::update::run(Settings::maintenance(Role::Hub)),
            HubAction::Uninstall { force, dry_run } => {
                commands::uninstall::run(Settings::maintenance(Role::Hub), force, dry_run)
            }
        },
        RoleCommand::Agent { action } => match action {
            AgentAction::Install {
                server,
                api_key,
                dns,
            } => {
                let agent = AgentSettings::new(server, api_key, dns);
                commands::install::run(Settings::agent(agent))
            }
            AgentAction::Update => commands::update::run(Settings::maintenance(Role::Agent)),
            AgentAction::Uninstall { force, dry_run } => {
                commands::uninstall::run(Settings::maintenance(Role::Agent), force, dry_run)
            }
        },
    }
}
