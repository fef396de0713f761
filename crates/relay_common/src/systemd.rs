//! Service controller: the supervisor's control surface.
//!
//! The trait is the seam the lifecycle manager is tested through; the
//! production implementation shells out to systemctl. Stop and disable are
//! idempotent no-ops when the unit is already in the target state (or
//! absent), so their exit codes are intentionally ignored.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Restart policy in the rendered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Always,
    OnFailure,
}

impl RestartPolicy {
    pub fn as_unit_value(&self) -> &'static str {
        match self {
            RestartPolicy::Always => "always",
            RestartPolicy::OnFailure => "on-failure",
        }
    }
}

/// Everything needed to render a service unit.
#[derive(Debug, Clone)]
pub struct UnitDescriptor {
    pub unit_name: String,
    pub description: String,
    pub exec_path: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub restart: RestartPolicy,
    pub restart_sec: u32,
    pub limit_nofile: u64,
}

impl UnitDescriptor {
    pub fn render(&self) -> String {
        let mut exec_start = self.exec_path.display().to_string();
        for arg in &self.args {
            exec_start.push(' ');
            exec_start.push_str(arg);
        }

        format!(
            "[Unit]\n\
             Description={description}\n\
             After=network-online.target\n\
             Wants=network-online.target\n\
             \n\
             [Service]\n\
             Type=simple\n\
             WorkingDirectory={workdir}\n\
             ExecStart={exec_start}\n\
             Restart={restart}\n\
             RestartSec={restart_sec}\n\
             LimitNOFILE={limit_nofile}\n\
             StandardOutput=journal\n\
             StandardError=journal\n\
             \n\
             [Install]\n\
             WantedBy=multi-user.target\n",
            description = self.description,
            workdir = self.working_dir.display(),
            exec_start = exec_start,
            restart = self.restart.as_unit_value(),
            restart_sec = self.restart_sec,
            limit_nofile = self.limit_nofile,
        )
    }
}

/// Control surface of the process supervisor.
pub trait ServiceController {
    /// Idempotent: success when already stopped or absent.
    fn stop(&self, unit: &str) -> io::Result<()>;
    fn start(&self, unit: &str) -> io::Result<()>;
    fn enable(&self, unit: &str) -> io::Result<()>;
    /// Idempotent: success when already disabled or absent.
    fn disable(&self, unit: &str) -> io::Result<()>;
    fn is_active(&self, unit: &str) -> bool;
    fn has_unit(&self, unit: &str) -> bool;
    fn register_unit(&self, descriptor: &UnitDescriptor) -> io::Result<()>;
    /// Idempotent: success when the unit file is already gone.
    fn remove_unit(&self, unit: &str) -> io::Result<()>;
    fn reload_units(&self) -> io::Result<()>;
}

/// systemctl-backed controller.
pub struct SystemdController {
    unit_dir: PathBuf,
}

impl SystemdController {
    pub fn new() -> Self {
        Self {
            unit_dir: PathBuf::from("/etc/systemd/system"),
        }
    }

    pub fn with_unit_dir(unit_dir: PathBuf) -> Self {
        Self { unit_dir }
    }

    fn unit_path(&self, unit: &str) -> PathBuf {
        self.unit_dir.join(format!("{}.service", unit))
    }

    fn systemctl(args: &[&str]) -> io::Result<std::process::Output> {
        Command::new("systemctl").args(args).output()
    }

    fn systemctl_checked(args: &[&str]) -> io::Result<()> {
        let output = Self::systemctl(args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "systemctl {} failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ))
        }
    }
}

impl Default for SystemdController {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceController for SystemdController {
    fn stop(&self, unit: &str) -> io::Result<()> {
        // Non-zero for an absent or already-stopped unit is not a failure.
        let _ = Self::systemctl(&["stop", unit])?;
        Ok(())
    }

    fn start(&self, unit: &str) -> io::Result<()> {
        Self::systemctl_checked(&["start", unit])
    }

    fn enable(&self, unit: &str) -> io::Result<()> {
        Self::systemctl_checked(&["enable", unit])
    }

    fn disable(&self, unit: &str) -> io::Result<()> {
        let _ = Self::systemctl(&["disable", unit])?;
        Ok(())
    }

    fn is_active(&self, unit: &str) -> bool {
        Self::systemctl(&["is-active", "--quiet", unit])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn has_unit(&self, unit: &str) -> bool {
        self.unit_path(unit).exists()
    }

    fn register_unit(&self, descriptor: &UnitDescriptor) -> io::Result<()> {
        fs::create_dir_all(&self.unit_dir)?;
        crate::atomic_write(&self.unit_path(&descriptor.unit_name), &descriptor.render())
    }

    fn remove_unit(&self, unit: &str) -> io::Result<()> {
        let path = self.unit_path(unit);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn reload_units(&self) -> io::Result<()> {
        let _ = Self::systemctl(&["daemon-reload"])?;
        Ok(())
    }
}
