//! Posture probes: disk encryption, OS updates, antivirus, idle sleep.
//! Each probe dispatches on the host OS and runs one diagnostic command;
//! anything a probe cannot substantiate comes back as [`ProbeResult::Unknown`].

mod antivirus;
mod command;
mod disk_encryption;
mod os_update;
mod sleep;

use crate::platform::HostOs;
use serde::{Deserialize, Serialize};

/// Tri-state outcome of a single posture probe. `Unknown` covers a missing
/// diagnostic tool, an unrecognized OS, and any execution failure; it is
/// distinct from a substantiated negative finding.
///
/// On the wire a result is `true`, `false`, or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum ProbeResult {
    Compliant,
    NonCompliant,
    Unknown,
}

impl ProbeResult {
    pub(crate) fn from_flag(ok: bool) -> Self {
        if ok {
            ProbeResult::Compliant
        } else {
            ProbeResult::NonCompliant
        }
    }
}

impl From<Option<bool>> for ProbeResult {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => ProbeResult::Compliant,
            Some(false) => ProbeResult::NonCompliant,
            None => ProbeResult::Unknown,
        }
    }
}

impl From<ProbeResult> for Option<bool> {
    fn from(value: ProbeResult) -> Self {
        match value {
            ProbeResult::Compliant => Some(true),
            ProbeResult::NonCompliant => Some(false),
            ProbeResult::Unknown => None,
        }
    }
}

/// Results for every recognized check, serialized as a JSON object keyed by
/// check name. A fixed struct keeps the set of names closed: a report can
/// neither drop a check nor grow a fifth one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSet {
    pub disk_encryption: ProbeResult,
    pub os_updated: ProbeResult,
    pub antivirus_active: ProbeResult,
    pub sleep_settings_ok: ProbeResult,
}

/// Run every probe for the given host. Probes run sequentially and are
/// independent; a failure in one never aborts the others.
pub fn run_all(os: HostOs) -> CheckSet {
    CheckSet {
        disk_encryption: disk_encryption::probe(os),
        os_updated: os_update::probe(os),
        antivirus_active: antivirus::probe(os),
        sleep_settings_ok: sleep::probe(os),
    }
}
