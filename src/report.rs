//! Health report assembly and change gating.

use crate::identity::IdentityStore;
use crate::platform::{self, HostOs};
use crate::probes::{self, CheckSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One snapshot of the machine's security posture. Immutable once built;
/// the most recently delivered report serves as the comparison baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub machine_id: String,
    pub timestamp: DateTime<Utc>,
    pub os_name: String,
    pub os_version: String,
    pub checks: CheckSet,
}

/// Assembles reports: machine identity resolved once up front, OS metadata
/// and probe results read fresh on every build.
pub struct ReportBuilder {
    machine_id: String,
    os: HostOs,
}

impl ReportBuilder {
    pub fn new(identity: &IdentityStore, os: HostOs) -> Self {
        Self {
            machine_id: identity.get_or_create(),
            os,
        }
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    /// Build a report for the current instant. Never fails: a probe that
    /// cannot answer contributes `Unknown` rather than an error.
    pub fn build(&self) -> HealthReport {
        let (os_name, os_version) = platform::os_release();
        HealthReport {
            machine_id: self.machine_id.clone(),
            timestamp: Utc::now(),
            os_name,
            os_version,
            checks: probes::run_all(self.os),
        }
    }
}

/// A report is worth sending when no baseline has been delivered yet, or when
/// any check differs from the baseline. Timestamp and OS metadata do not
/// count as change; a flip to or from `Unknown` does.
pub fn should_report(candidate: &HealthReport, baseline: Option<&HealthReport>) -> bool {
    match baseline {
        None => true,
        Some(prev) => candidate.checks != prev.checks,
    }
}
