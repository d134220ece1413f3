//! Antivirus presence probe.

use super::{command, ProbeResult};
use crate::platform::HostOs;
use tracing::warn;

const DEFENDER_QUERY: &str =
    "Get-MpComputerStatus | Select-Object AntivirusEnabled -ExpandProperty AntivirusEnabled";

const WMI_AV_QUERY: &str = "Get-WmiObject -Namespace root/SecurityCenter2 -Class AntiVirusProduct \
     | ForEach-Object { $_.displayName }";

/// Scanners recognized on Linux; presence of any one counts.
const LINUX_SCANNERS: &[&str] = &["clamav", "freshclam", "rkhunter", "chkrootkit"];

pub fn probe(os: HostOs) -> ProbeResult {
    match os {
        // XProtect ships with the OS
        HostOs::MacOs => ProbeResult::Compliant,
        HostOs::Windows => windows(),
        HostOs::Linux => linux(),
        HostOs::Unsupported => ProbeResult::Unknown,
    }
}

fn windows() -> ProbeResult {
    match command::run("powershell", &["-Command", DEFENDER_QUERY]) {
        Ok(out) if out.stdout.contains("True") => return ProbeResult::Compliant,
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "antivirus query failed");
            return ProbeResult::Unknown;
        }
    }
    // Defender reports disabled; fall back to third-party products
    // registered with the Security Center.
    match command::run("powershell", &["-Command", WMI_AV_QUERY]) {
        Ok(out) => ProbeResult::from_flag(!out.stdout.trim().is_empty()),
        Err(e) => {
            warn!(error = %e, "antivirus query failed");
            ProbeResult::Unknown
        }
    }
}

fn linux() -> ProbeResult {
    for scanner in LINUX_SCANNERS {
        if let Ok(out) = command::run(scanner, &["--version"]) {
            if out.exit_code == 0 {
                return ProbeResult::Compliant;
            }
        }
    }
    // Absence of every known scanner is the finding itself, not an
    // inconclusive probe.
    ProbeResult::NonCompliant
}
