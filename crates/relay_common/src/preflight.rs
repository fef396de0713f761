//! Preflight checks run before install.
//!
//! The port probe is advisory: a bound listener might be a stale or
//! unrelated process, so conflicts prompt rather than block.

use std::net::TcpListener;

/// True when something already listens on the port.
pub fn port_in_use(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_err()
}

/// Subset of `ports` that already have a listener.
pub fn busy_ports(ports: &[u16]) -> Vec<u16> {
    ports.iter().copied().filter(|p| port_in_use(*p)).collect()
}
