//! Read-only probes and their output classification
//!
//! Classification is a pattern match on captured text, not a parser. Output
//! that matches no known marker falls into the "unknown" bucket; it is never
//! an error.

use crate::domain::value_objects::{PortStatus, ServiceState};

/// Printed by the port probe when nothing matched
pub const PORT_FREE_MARKER: &str = "PORT_FREE";

pub fn port_probe_command(port: u16) -> String {
    format!(
        "netstat -tuln | grep ':{} ' || echo '{}'",
        port, PORT_FREE_MARKER
    )
}

/// Socket listing for the post-deploy check, `ss` as fallback
pub fn listening_probe_command(port: u16) -> String {
    format!(
        "netstat -tuln | grep ':{port}' || ss -tuln | grep ':{port}'",
        port = port
    )
}

pub fn service_status_command(service_name: &str) -> String {
    format!(
        "systemctl is-active {} 2>/dev/null || echo 'inactive'",
        service_name
    )
}

/// Any line with a `:<port>` socket wins over the free marker.
pub fn classify_port_probe(output: &str, port: u16) -> PortStatus {
    if output.lines().any(|line| mentions_port(line, port)) {
        PortStatus::InUse
    } else if output.contains(PORT_FREE_MARKER) {
        PortStatus::Available
    } else {
        PortStatus::Unknown
    }
}

/// `systemctl is-active` prints one state word per unit; the `|| echo`
/// fallback may append a second line. Only the first one counts.
pub fn classify_service_status(output: &str) -> ServiceState {
    match output.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some("active") => ServiceState::Active,
        Some("inactive") | Some("failed") => ServiceState::Inactive,
        _ => ServiceState::Unknown,
    }
}

/// True when `line` has `:<port>` not followed by another digit.
fn mentions_port(line: &str, port: u16) -> bool {
    let needle = format!(":{}", port);
    line.match_indices(&needle).any(|(idx, _)| {
        !line[idx + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}
