//! JSON snapshot persistence for the in-memory gateway.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clinic_core::{Appointment, Consultation, Patient};
use clinic_storage::StorageResult;
use serde::{Deserialize, Serialize};

/// Full contents of the store, including identifier counters so that
/// identifiers keep increasing across process runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub consultations: Vec<Consultation>,
    #[serde(default = "first_id")]
    pub next_appointment_id: u64,
    #[serde(default = "first_id")]
    pub next_consultation_id: u64,
}

fn first_id() -> u64 {
    1
}

/// Location of a snapshot on disk.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot. A missing file is an empty store.
    pub(crate) async fn load(&self) -> StorageResult<Option<Snapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the snapshot to a sibling temp file and renames it over the
    /// target, so readers never observe a half-written file.
    pub(crate) async fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
