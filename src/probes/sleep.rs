//! Idle display-sleep timeout probe.

use super::{command, ProbeResult};
use crate::platform::HostOs;
use tracing::warn;

const MAX_SLEEP_MINUTES: u32 = 10;
const MAX_SLEEP_SECONDS: u32 = 600;

/// Display sleep AC setting under the video power-scheme GUID.
const WINDOWS_SLEEP_QUERY: &str = r"(Get-ItemProperty -Path 'HKLM:\SYSTEM\CurrentControlSet\Control\Power\PowerSettings\238C9FA8-0AAD-41ED-83F4-97BE242C8F20\7bc4a2f9-d8fc-4469-b07b-33eb785aaca0' -Name 'ACSettingIndex').ACSettingIndex / 60";

pub fn probe(os: HostOs) -> ProbeResult {
    match os {
        HostOs::MacOs => macos(),
        HostOs::Windows => windows(),
        HostOs::Linux => linux(),
        HostOs::Unsupported => ProbeResult::Unknown,
    }
}

fn macos() -> ProbeResult {
    match command::run("pmset", &["-g"]) {
        Ok(out) => {
            for line in out.stdout.lines() {
                if line.contains("displaysleep") {
                    return match line.split_whitespace().nth(1).and_then(|v| v.parse::<u32>().ok())
                    {
                        Some(minutes) => ProbeResult::from_flag(minutes <= MAX_SLEEP_MINUTES),
                        None => ProbeResult::Unknown,
                    };
                }
            }
            // No displaysleep entry means the display never sleeps.
            ProbeResult::NonCompliant
        }
        Err(e) => {
            warn!(error = %e, "sleep settings query failed");
            ProbeResult::Unknown
        }
    }
}

fn windows() -> ProbeResult {
    match command::run("powershell", &["-Command", WINDOWS_SLEEP_QUERY]) {
        Ok(out) => {
            let text = out.stdout.trim().to_string();
            if text.is_empty() {
                return ProbeResult::NonCompliant;
            }
            match text.parse::<f64>() {
                Ok(minutes) => ProbeResult::from_flag(minutes <= f64::from(MAX_SLEEP_MINUTES)),
                Err(_) => ProbeResult::Unknown,
            }
        }
        Err(e) => {
            warn!(error = %e, "sleep settings query failed");
            ProbeResult::Unknown
        }
    }
}

fn linux() -> ProbeResult {
    // GNOME first; desktops without gsettings fall through to X11 DPMS.
    if let Ok(out) = command::run(
        "gsettings",
        &[
            "get",
            "org.gnome.settings-daemon.plugins.power",
            "sleep-inactive-ac-timeout",
        ],
    ) {
        if out.exit_code == 0 {
            if let Ok(seconds) = out.stdout.trim().parse::<u32>() {
                return ProbeResult::from_flag(seconds <= MAX_SLEEP_SECONDS);
            }
        }
    }

    match command::run("xset", &["q"]) {
        Ok(out) => {
            for line in out.stdout.lines() {
                if line.contains("timeout:") && line.contains("DPMS is") {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if let Some(idx) = parts.iter().position(|p| *p == "timeout:") {
                        if let Some(seconds) =
                            parts.get(idx + 1).and_then(|v| v.parse::<u32>().ok())
                        {
                            return ProbeResult::from_flag(seconds <= MAX_SLEEP_SECONDS);
                        }
                    }
                }
            }
            ProbeResult::Unknown
        }
        Err(e) => {
            warn!(error = %e, "sleep settings query failed");
            ProbeResult::Unknown
        }
    }
}
