//! Host OS detection and metadata.

use sysinfo::System;

/// Closed set of operating systems the probes know how to inspect.
/// Anything else routes every probe to an unknown result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    MacOs,
    Windows,
    Linux,
    Unsupported,
}

impl HostOs {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else if cfg!(target_os = "windows") {
            HostOs::Windows
        } else if cfg!(target_os = "linux") {
            HostOs::Linux
        } else {
            HostOs::Unsupported
        }
    }

    /// Short family name, used in the reporting User-Agent.
    pub fn family(self) -> &'static str {
        match self {
            HostOs::MacOs => "macos",
            HostOs::Windows => "windows",
            HostOs::Linux => "linux",
            HostOs::Unsupported => "unknown",
        }
    }
}

/// OS name and version as reported by the running system.
pub fn os_release() -> (String, String) {
    let name = System::name().unwrap_or_else(|| HostOs::detect().family().to_string());
    let version = System::os_version().unwrap_or_else(|| "unknown".to_string());
    (name, version)
}
