//! Display data describing this instance.

use std::fs;

use serde::Serialize;

/// Identity of the instance as shown on the index page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub hostname: String,
    pub zone: String,
    pub template: String,
    pub machine_type: String,
}

/// Hostname from `HOSTNAME`, then `/etc/hostname`, else `"unknown"`.
pub fn local_hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| {
            fs::read_to_string("/etc/hostname")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
