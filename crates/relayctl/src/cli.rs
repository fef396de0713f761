//! Command-line argument parsing.
//!
//! Kept separate from execution logic; each role mirrors one of the two
//! historical install scripts.

use clap::{Parser, Subcommand};
use relay_common::settings::{DEFAULT_AGENT_PORT, DEFAULT_WEB_PORT};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relayctl")]
#[command(about = "Deploy, update, and remove the relay service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: RoleCommand,
}

#[derive(Subcommand)]
pub enum RoleCommand {
    /// Manage the hub (web dashboard) installation
    Hub {
        #[command(subcommand)]
        action: HubAction,
    },
    /// Manage the agent (relay endpoint) installation
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },
}

#[derive(Subcommand)]
pub enum HubAction {
    /// Install and start the hub
    Install {
        /// Dashboard listening port
        #[arg(long, default_value_t = DEFAULT_WEB_PORT)]
        web_port: u16,

        /// Agent-facing RPC port
        #[arg(long, default_value_t = DEFAULT_AGENT_PORT)]
        agent_port: u16,

        /// Dashboard state directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Replace the hub binary with the latest release
    Update,

    /// Remove the hub installation
    Uninstall {
        /// Skip interactive confirmation
        #[arg(long, short = 'f')]
        force: bool,

        /// Show what would be removed without changing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum AgentAction {
    /// Install and start the agent
    Install {
        /// Hub address, host:port
        #[arg(long)]
        server: String,

        /// Credential presented to the hub
        #[arg(long)]
        api_key: String,

        /// Comma-separated nameserver list (host:port)
        #[arg(long, value_delimiter = ',')]
        dns: Vec<String>,
    },

    /// Replace the agent binary with the latest release
    Update,

    /// Remove the agent installation
    Uninstall {
        /// Skip interactive confirmation
        #[arg(long, short = 'f')]
        force: bool,

        /// Show what would be removed without changing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_install_requires_server_and_key() {
        assert!(Cli::try_parse_from(["relayctl", "agent", "install"]).is_err());
        assert!(Cli::try_parse_from([
            "relayctl", "agent", "install", "--server", "1.2.3.4:13001", "--api-key", "K1",
        ])
        .is_ok());
    }

    #[test]
    fn test_dns_list_is_comma_separated() {
        let cli = Cli::try_parse_from([
            "relayctl",
            "agent",
            "install",
            "--server",
            "1.2.3.4:13001",
            "--api-key",
            "K1",
            "--dns",
            "9.9.9.9:53,8.8.8.8:53",
        ])
        .unwrap();
        match cli.command {
            RoleCommand::Agent {
                action: AgentAction::Install { dns, .. },
            } => assert_eq!(dns, vec!["9.9.9.9:53", "8.8.8.8:53"]),
            _ => panic!("expected agent install"),
        }
    }

    #[test]
    fn test_hub_install_defaults() {
        let cli = Cli::try_parse_from(["relayctl", "hub", "install"]).unwrap();
        match cli.command {
            RoleCommand::Hub {
                action:
                    HubAction::Install {
                        web_port,
                        agent_port,
                        data_dir,
                    },
            } => {
                assert_eq!(web_port, DEFAULT_WEB_PORT);
                assert_eq!(agent_port, DEFAULT_AGENT_PORT);
                assert!(data_dir.is_none());
            }
            _ => panic!("expected hub install"),
        }
    }
}
