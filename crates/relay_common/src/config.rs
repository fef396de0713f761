//! Configuration document generation.
//!
//! Rendered from settings at install time and persisted as YAML next to the
//! artifact. Update never regenerates it; a changed configuration requires a
//! fresh install.

use crate::settings::{RoleSettings, Settings};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// DNS resolution strategy for the relay process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsMode {
    /// Plain UDP upstreams.
    Udp,
    /// Force TCP upstreams.
    Tcp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsSection {
    pub mode: DnsMode,
    pub nameservers: Vec<String>,
    pub cache_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSection {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub tcp_fast_open: bool,
    pub reuse_port: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub address: String,
}

/// The persisted configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub dns: DnsSection,
    pub net: NetSection,
    pub endpoints: Vec<Endpoint>,
}

impl ServiceConfig {
    /// Derive the document from install-time settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let (nameservers, endpoints) = match &settings.role_settings {
            RoleSettings::Hub(_) => (
                crate::settings::DEFAULT_NAMESERVERS
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<String>>(),
                Vec::new(),
            ),
            RoleSettings::Agent(a) => (
                a.nameservers.clone(),
                vec![Endpoint {
                    name: "primary".to_string(),
                    address: a.server.clone(),
                }],
            ),
        };

        Self {
            dns: DnsSection {
                mode: DnsMode::Udp,
                nameservers,
                cache_size: 4096,
            },
            net: NetSection {
                connect_timeout_secs: 5,
                read_timeout_secs: 30,
                tcp_fast_open: true,
                reuse_port: true,
            },
            endpoints,
        }
    }

    pub fn render(&self) -> String {
        // Struct is always serializable; serde_yaml only fails on map keys
        // it cannot represent.
        serde_yaml::to_string(self).unwrap_or_default()
    }

    /// Persist, overwriting any prior document unconditionally.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        crate::atomic_write(path, &self.render())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
