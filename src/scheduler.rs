//! Periodic check cycle: probe, gate on change, deliver.

use crate::report::{self, HealthReport, ReportBuilder};
use crate::reporter::{DeliveryError, Reporter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// A cycle can only fail at the delivery step; probes degrade to `Unknown`
/// and report assembly always succeeds.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Posture changed (or first run) and the endpoint accepted the report.
    Delivered,
    /// Posture matches the delivered baseline; nothing was sent.
    Unchanged,
}

/// Owns the check loop and the delivered-report baseline. Cycles are strictly
/// serialized; the baseline advances only on a confirmed 200.
pub struct Scheduler {
    builder: ReportBuilder,
    reporter: Reporter,
    interval: Duration,
    last_delivered: Option<HealthReport>,
}

impl Scheduler {
    pub fn new(builder: ReportBuilder, reporter: Reporter, interval_secs: u64) -> Self {
        Self {
            builder,
            reporter,
            interval: Duration::from_secs(interval_secs),
            last_delivered: None,
        }
    }

    pub fn baseline(&self) -> Option<&HealthReport> {
        self.last_delivered.as_ref()
    }

    /// One checking cycle: build a report, compare against the baseline,
    /// deliver if it differs. A failed delivery leaves the baseline alone so
    /// the next cycle re-attempts the undelivered posture.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        info!("collecting posture checks");
        let report = self.builder.build();
        if !report::should_report(&report, self.last_delivered.as_ref()) {
            info!("posture unchanged, skipping report");
            return Ok(CycleOutcome::Unchanged);
        }
        self.reporter.deliver(&report)?;
        self.last_delivered = Some(report);
        Ok(CycleOutcome::Delivered)
    }

    /// Run until `stop` flips: an immediate first cycle, then one per
    /// interval. Failures are logged and contained per cycle. The wait is
    /// sliced into seconds so a stop request takes effect promptly.
    pub fn run(&mut self, stop: &AtomicBool) {
        let mut cycle: u64 = 0;
        while !stop.load(Ordering::Relaxed) {
            cycle += 1;
            match self.run_cycle() {
                Ok(CycleOutcome::Delivered) => info!(cycle, "report delivered"),
                Ok(CycleOutcome::Unchanged) => info!(cycle, "no report needed"),
                Err(e) => warn!(cycle, error = %e, "cycle failed"),
            }
            for _ in 0..self.interval.as_secs() {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                std::thread::sleep(Duration::from_secs(1));
            }
        }
    }
}
