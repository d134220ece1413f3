//! Full-disk encryption probe.

use super::{command, ProbeResult};
use crate::platform::HostOs;
use tracing::warn;

pub fn probe(os: HostOs) -> ProbeResult {
    match os {
        HostOs::MacOs => macos(),
        HostOs::Windows => windows(),
        HostOs::Linux => linux(),
        HostOs::Unsupported => ProbeResult::Unknown,
    }
}

fn macos() -> ProbeResult {
    match command::run("diskutil", &["apfs", "list"]) {
        Ok(out) => ProbeResult::from_flag(out.stdout.contains("Encrypted")),
        Err(e) => {
            warn!(error = %e, "disk encryption query failed");
            ProbeResult::Unknown
        }
    }
}

fn windows() -> ProbeResult {
    match command::run("manage-bde", &["-status"]) {
        Ok(out) => ProbeResult::from_flag(out.stdout.contains("Protection On")),
        Err(e) => {
            warn!(error = %e, "disk encryption query failed");
            ProbeResult::Unknown
        }
    }
}

fn linux() -> ProbeResult {
    match command::run("lsblk", &["-f"]) {
        // LUKS containers show up in the filesystem column
        Ok(out) => ProbeResult::from_flag(out.stdout.contains("LUKS") || out.stdout.contains("crypto")),
        Err(e) => {
            warn!(error = %e, "disk encryption query failed");
            ProbeResult::Unknown
        }
    }
}
