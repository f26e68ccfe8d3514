//! Final report of a completed deployment

use super::{PortStatus, ServiceState, StageId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub host: String,
    pub app_port: u16,
    pub domain: String,
    pub service_name: String,
    pub service_state: ServiceState,
    pub port_status: PortStatus,
    pub certificate_issued: bool,
    /// Advisory stages that failed along the way
    pub degraded: Vec<StageId>,
}

impl DeploySummary {
    pub fn access_urls(&self) -> Vec<String> {
        let mut urls = Vec::with_capacity(3);
        if self.certificate_issued {
            urls.push(format!("https://{}", self.domain));
        }
        urls.push(format!("http://{}", self.domain));
        urls.push(format!("http://{}:{}", self.host, self.app_port));
        urls
    }

    pub fn operator_hints(&self) -> Vec<String> {
        vec![
            format!("systemctl status {}", self.service_name),
            format!("journalctl -u {} -f", self.service_name),
            format!("systemctl restart {}", self.service_name),
        ]
    }
}
