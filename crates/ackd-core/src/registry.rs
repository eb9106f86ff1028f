use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pagerduty_api::{Incident, IncidentStatus};
use serde::{Deserialize, Serialize};

use crate::control::{incident_id_from_control_id, AckControl};
use crate::error::Result;
use crate::io::atomic_write;

// ---------------------------------------------------------------------------
// ControlRecord
// ---------------------------------------------------------------------------

/// Persisted marker for a control that existed in some process lifetime.
/// One YAML file per control under the scope's registry directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRecord {
    pub control_id: String,
    pub scope: String,
    pub incident_number: u64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Orphan sweep (pure)
// ---------------------------------------------------------------------------

/// Select the records left behind by a prior process lifetime whose
/// incidents are no longer triggered in `initial_snapshot`.
///
/// Records with a foreign id prefix belong to another object class and are
/// never selected. Uses the same triggered-set derivation as the
/// reconciler, so a record survives exactly when a live control is about to
/// be created for it.
pub fn sweep_orphans(records: &[ControlRecord], initial_snapshot: &[Incident]) -> Vec<ControlRecord> {
    let triggered_ids: HashSet<&str> = initial_snapshot
        .iter()
        .filter(|i| i.status == IncidentStatus::Triggered && !i.id.is_empty())
        .map(|i| i.id.as_str())
        .collect();

    records
        .iter()
        .filter(|record| {
            matches!(
                incident_id_from_control_id(&record.control_id),
                Some(incident_id) if !triggered_ids.contains(incident_id)
            )
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// On-disk registry of control records for one scope.
pub struct Registry {
    dir: PathBuf,
    scope: String,
}

impl Registry {
    pub fn new(dir: impl Into<PathBuf>, scope: impl Into<String>) -> Self {
        Registry {
            dir: dir.into(),
            scope: scope.into(),
        }
    }

    /// Read all records in this scope. Invalid or unreadable files are
    /// skipped — a corrupt record must not take the registry down.
    pub fn list(&self) -> Result<Vec<ControlRecord>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let data = match std::fs::read_to_string(&path) {
                Ok(d) => d,
                Err(_) => continue,
            };
            if let Ok(record) = serde_yaml::from_str::<ControlRecord>(&data) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Atomically persist a record for `control`.
    pub fn record(&self, control: &AckControl) -> Result<()> {
        let record = ControlRecord {
            control_id: control.control_id.clone(),
            scope: self.scope.clone(),
            incident_number: control.incident_number,
            created_at: control.created_at,
        };
        let data = serde_yaml::to_string(&record)?;
        atomic_write(&self.path(&record.control_id), data.as_bytes())
    }

    /// Remove the record for `control_id`. Silently succeeds if the file is
    /// already gone.
    pub fn remove(&self, control_id: &str) -> Result<()> {
        let path = self.path(control_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// One-time startup pass: purge records whose incidents resolved or were
    /// acknowledged while the process was not running. Returns the removed
    /// control ids. Run before the first reconciliation pass.
    pub fn sweep(&self, initial_snapshot: &[Incident]) -> Result<Vec<String>> {
        let records = self.list()?;
        let mut removed = Vec::new();
        for orphan in sweep_orphans(&records, initial_snapshot) {
            tracing::debug!(
                control_id = %orphan.control_id,
                "removing orphaned control record from previous session"
            );
            self.remove(&orphan.control_id)?;
            removed.push(orphan.control_id);
        }
        Ok(removed)
    }

    fn path(&self, control_id: &str) -> PathBuf {
        self.dir.join(format!("{control_id}.yaml"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
