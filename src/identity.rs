//! Durable per-machine identifier.

use std::fs;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// Resolves or creates the machine UUID backing every report.
///
/// The id lives in a single file; once written it is stable across process
/// restarts. A host where the write fails gets a fresh id each start instead
/// of an aborted agent.
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Platform-default location for the identity file: under the local
    /// app-data directory on Windows, a dot-file in the home directory
    /// elsewhere.
    pub fn default_path() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("PostureAgent")
                .join(".machine_id")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".posture_agent_id")
        }
    }

    /// Read the persisted id, or mint and best-effort persist a new one.
    pub fn get_or_create(&self) -> String {
        if let Ok(existing) = fs::read_to_string(&self.path) {
            let trimmed = existing.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }

        let id = Uuid::new_v4().to_string();
        if let Some(dir) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(error = %e, dir = %dir.display(), "machine id directory create failed");
            }
        }
        if let Err(e) = fs::write(&self.path, &id) {
            warn!(error = %e, path = %self.path.display(), "machine id persist failed");
        }
        id
    }
}
