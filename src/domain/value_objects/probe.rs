//! Results of read-only probes against the remote host

use std::fmt;

/// Whether something is listening on a TCP/UDP port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Available,
    InUse,
    /// The probe printed neither a matching socket nor the free marker
    Unknown,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PortStatus::Available => "free",
            PortStatus::InUse => "in use",
            PortStatus::Unknown => "unknown",
        })
    }
}

/// State of the supervised service as reported by `systemctl is-active`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Active,
    Inactive,
    /// Anything else, including "no such unit"
    Unknown,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceState::Active => "active",
            ServiceState::Inactive => "inactive",
            ServiceState::Unknown => "unknown",
        })
    }
}
