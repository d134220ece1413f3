//! Pending OS update probe.

use super::{command, ProbeResult};
use crate::platform::HostOs;
use std::time::Duration;
use tracing::warn;

/// Cap on the apt package-index refresh so an unreachable mirror cannot hang
/// a cycle indefinitely.
const APT_REFRESH_TIMEOUT: Duration = Duration::from_secs(60);

const WINDOWS_PENDING_QUERY: &str =
    "(New-Object -ComObject Microsoft.Update.AutoUpdate).Results.UpdateCount -eq 0";

pub fn probe(os: HostOs) -> ProbeResult {
    match os {
        HostOs::MacOs => macos(),
        HostOs::Windows => windows(),
        HostOs::Linux => linux(),
        HostOs::Unsupported => ProbeResult::Unknown,
    }
}

fn macos() -> ProbeResult {
    match command::run("softwareupdate", &["-l"]) {
        Ok(out) => ProbeResult::from_flag(out.stdout.contains("No new software available")),
        Err(e) => {
            warn!(error = %e, "update check failed");
            ProbeResult::Unknown
        }
    }
}

fn windows() -> ProbeResult {
    match command::run("powershell", &["-Command", WINDOWS_PENDING_QUERY]) {
        // An empty answer from a query that ran reads as updates pending,
        // matching the update agent's own silence on locked-down systems.
        Ok(out) => ProbeResult::from_flag(out.stdout.contains("True")),
        Err(e) => {
            warn!(error = %e, "update check failed");
            ProbeResult::Unknown
        }
    }
}

fn linux() -> ProbeResult {
    match apt_upgrades_pending() {
        Some(pending) => ProbeResult::from_flag(!pending),
        // Not an apt system (or apt failed); yum exits 0 when nothing is
        // pending and 100 when updates are available.
        None => match command::run("yum", &["check-update", "--quiet"]) {
            Ok(out) => ProbeResult::from_flag(out.exit_code == 0),
            Err(e) => {
                warn!(error = %e, "update check failed");
                ProbeResult::Unknown
            }
        },
    }
}

/// Refresh the package index, then dry-run an upgrade and look for the
/// "nothing to do" marker. `None` means apt could not answer.
fn apt_upgrades_pending() -> Option<bool> {
    let refresh =
        command::run_with_timeout("apt-get", &["update", "-qq"], APT_REFRESH_TIMEOUT).ok()?;
    if refresh.exit_code != 0 {
        return None;
    }
    let sim = command::run("apt-get", &["-s", "upgrade"]).ok()?;
    if sim.exit_code != 0 {
        return None;
    }
    Some(!sim.stdout.contains("0 upgraded, 0 newly installed"))
}
