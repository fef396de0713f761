//! Typed installation settings.
//!
//! One immutable `Settings` value is built by the CLI from flags and handed
//! to the lifecycle manager; nothing reads configuration from globals.

use crate::platform::Arch;
use crate::systemd::RestartPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Release download base.
pub const ARTIFACT_BASE_URL: &str = "https://dl.relay-net.dev/release";

/// Default nameservers written into a fresh agent configuration.
pub const DEFAULT_NAMESERVERS: [&str; 2] = ["223.5.5.5:53", "119.29.29.29:53"];

pub const DEFAULT_WEB_PORT: u16 = 8008;
pub const DEFAULT_AGENT_PORT: u16 = 5555;

/// Which of the two deployable processes an installation manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Web dashboard plus agent-facing RPC listener.
    Hub,
    /// Relay endpoint reporting to a hub.
    Agent,
}

impl Role {
    pub fn unit_name(&self) -> &'static str {
        match self {
            Role::Hub => "relay-hub",
            Role::Agent => "relay-agent",
        }
    }

    pub fn artifact_name(&self) -> &'static str {
        match self {
            Role::Hub => "relay-hub",
            Role::Agent => "relay-agent",
        }
    }

    pub fn default_install_dir(&self) -> PathBuf {
        match self {
            Role::Hub => PathBuf::from("/opt/relay/hub"),
            Role::Agent => PathBuf::from("/opt/relay/agent"),
        }
    }

    /// The hub supervises agents and must always come back; the agent is
    /// allowed to stay down after a clean exit.
    pub fn restart_policy(&self) -> RestartPolicy {
        match self {
            Role::Hub => RestartPolicy::Always,
            Role::Agent => RestartPolicy::OnFailure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hub => "hub",
            Role::Agent => "agent",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hub (dashboard) settings.
#[derive(Debug, Clone)]
pub struct HubSettings {
    pub web_port: u16,
    pub agent_port: u16,
    pub data_dir: PathBuf,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            web_port: DEFAULT_WEB_PORT,
            agent_port: DEFAULT_AGENT_PORT,
            data_dir: PathBuf::from("/opt/relay/hub/data"),
        }
    }
}

/// Agent (relay endpoint) settings.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Hub address, `host:port`.
    pub server: String,
    /// Credential presented to the hub.
    pub api_key: String,
    /// Nameservers for the generated configuration; defaults applied when
    /// the operator passes none.
    pub nameservers: Vec<String>,
}

impl AgentSettings {
    pub fn new(server: String, api_key: String, nameservers: Vec<String>) -> Self {
        let nameservers = if nameservers.is_empty() {
            DEFAULT_NAMESERVERS.iter().map(|s| s.to_string()).collect()
        } else {
            nameservers
        };
        Self {
            server,
            api_key,
            nameservers,
        }
    }
}

/// Role-specific half of the settings.
#[derive(Debug, Clone)]
pub enum RoleSettings {
    Hub(HubSettings),
    Agent(AgentSettings),
}

/// Post-start health verification policy.
#[derive(Debug, Clone, Copy)]
pub struct HealthPolicy {
    /// Grace period before the first status probe.
    pub grace: Duration,
    /// Number of status probes before declaring the start failed.
    pub retries: u32,
    /// Delay between probes after the grace period.
    pub poll_interval: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(3),
            retries: 3,
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl HealthPolicy {
    /// Zero-wait policy for tests.
    pub fn immediate() -> Self {
        Self {
            grace: Duration::ZERO,
            retries: 1,
            poll_interval: Duration::ZERO,
        }
    }
}

/// Complete, immutable settings for one lifecycle invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub role_settings: RoleSettings,
    pub install_dir: PathBuf,
    pub health: HealthPolicy,
}

impl Settings {
    pub fn hub(hub: HubSettings) -> Self {
        Self {
            install_dir: Role::Hub.default_install_dir(),
            role_settings: RoleSettings::Hub(hub),
            health: HealthPolicy::default(),
        }
    }

    pub fn agent(agent: AgentSettings) -> Self {
        Self {
            install_dir: Role::Agent.default_install_dir(),
            role_settings: RoleSettings::Agent(agent),
            health: HealthPolicy::default(),
        }
    }

    /// Settings for update and uninstall, which never read the
    /// role-specific install flags.
    pub fn maintenance(role: Role) -> Self {
        match role {
            Role::Hub => Self::hub(HubSettings::default()),
            Role::Agent => Self::agent(AgentSettings::new(
                String::new(),
                String::new(),
                Vec::new(),
            )),
        }
    }

    pub fn with_install_dir(mut self, dir: PathBuf) -> Self {
        self.install_dir = dir;
        self
    }

    pub fn with_health(mut self, health: HealthPolicy) -> Self {
        self.health = health;
        self
    }

    pub fn role(&self) -> Role {
        match self.role_settings {
            RoleSettings::Hub(_) => Role::Hub,
            RoleSettings::Agent(_) => Role::Agent,
        }
    }

    pub fn unit_name(&self) -> &'static str {
        self.role().unit_name()
    }

    pub fn artifact_url(&self, arch: Arch) -> String {
        format!(
            "{}/{}-{}",
            ARTIFACT_BASE_URL,
            self.role().artifact_name(),
            arch.artifact_suffix()
        )
    }

    /// Path of the active executable.
    pub fn artifact_path(&self) -> PathBuf {
        self.install_dir.join(self.role().artifact_name())
    }

    /// Path of the generated configuration document.
    pub fn config_path(&self) -> PathBuf {
        self.install_dir.join("config.yml")
    }

    /// Per-endpoint runtime data.
    pub fn instances_dir(&self) -> PathBuf {
        self.install_dir.join("instances")
    }

    /// Ports the service will bind, probed by preflight.
    pub fn listen_ports(&self) -> Vec<u16> {
        match &self.role_settings {
            RoleSettings::Hub(h) => vec![h.web_port, h.agent_port],
            RoleSettings::Agent(_) => Vec::new(),
        }
    }

    /// Argument list baked into the unit descriptor.
    pub fn exec_args(&self) -> Vec<String> {
        match &self.role_settings {
            RoleSettings::Hub(h) => vec![
                "--web-port".to_string(),
                h.web_port.to_string(),
                "--agent-port".to_string(),
                h.agent_port.to_string(),
                "--data-dir".to_string(),
                h.data_dir.display().to_string(),
            ],
            RoleSettings::Agent(a) => vec![
                "--server".to_string(),
                a.server.clone(),
                "--api-key".to_string(),
                a.api_key.clone(),
                "--config".to_string(),
                self.config_path().display().to_string(),
            ],
        }
    }
}
