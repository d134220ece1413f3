//! Report delivery to the collection endpoint.

use crate::platform::HostOs;
use crate::report::HealthReport;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Delivers reports over HTTP. One POST per call, no retry here; the
/// scheduler's next cycle is the retry path.
pub struct Reporter {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl Reporter {
    pub fn new(endpoint: impl Into<String>, os: HostOs) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("{}/{}", env!("CARGO_PKG_NAME"), os.family()))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// POST the report as JSON. Success is a 200 exactly; any other status
    /// is a rejection with the body preserved for the log.
    pub fn deliver(&self, report: &HealthReport) -> Result<(), DeliveryError> {
        info!(endpoint = %self.endpoint, "sending health report");
        let res = self.client.post(&self.endpoint).json(report).send()?;
        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }
        info!(status = %status, "report accepted");
        Ok(())
    }
}
