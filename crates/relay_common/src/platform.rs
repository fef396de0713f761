//! Privilege and platform checks run before any mutation.

use crate::error::LifecycleError;

/// Check if running as root.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Fail early when not running with root privileges.
pub fn require_root() -> Result<(), LifecycleError> {
    if is_root() {
        Ok(())
    } else {
        Err(LifecycleError::Permission)
    }
}

/// CPU architectures with published artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    /// Detect the host architecture, rejecting anything without a
    /// published artifact.
    pub fn detect() -> Result<Self, LifecycleError> {
        Self::from_name(std::env::consts::ARCH)
    }

    pub fn from_name(name: &str) -> Result<Self, LifecycleError> {
        match name {
            "x86_64" => Ok(Arch::X86_64),
            "aarch64" => Ok(Arch::Aarch64),
            other => Err(LifecycleError::UnsupportedPlatform {
                arch: other.to_string(),
            }),
        }
    }

    /// Suffix used in release artifact names.
    pub fn artifact_suffix(&self) -> &'static str {
        match self {
            Arch::X86_64 => "linux-amd64",
            Arch::Aarch64 => "linux-arm64",
        }
    }
}
