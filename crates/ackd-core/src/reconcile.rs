use std::collections::{HashMap, HashSet};

use pagerduty_api::{Incident, IncidentStatus};

use crate::control::AckControl;

// ---------------------------------------------------------------------------
// ReconcileOutcome
// ---------------------------------------------------------------------------

/// Effects of one reconciliation pass. `destroyed` controls have already
/// been detached from the tracked set by the time the pass returns; the
/// caller releases their external registrations afterwards.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub created: Vec<AckControl>,
    pub destroyed: Vec<AckControl>,
}

impl ReconcileOutcome {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Owns the mapping from incident id to live acknowledge control and keeps
/// it equal to the triggered subset of the most recent snapshot.
///
/// Not a process-wide singleton: the supervisor holds the one instance and
/// is the only writer, so passes are serialized by construction. Tests can
/// drive an instance directly with fabricated snapshots.
#[derive(Debug, Default)]
pub struct Reconciler {
    controls: HashMap<String, AckControl>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `snapshot` against the tracked set and apply the difference.
    ///
    /// Invariant on return: the tracked key set equals the set of non-empty
    /// incident ids in `snapshot` with status `triggered`. Malformed entries
    /// (empty id) are skipped without aborting the pass. Duplicate ids are
    /// collapsed — the first triggered occurrence wins and exactly one
    /// control exists per id.
    ///
    /// Controls already tracked are left untouched: their display fields
    /// keep their creation-time values. Removal is unconditional — an
    /// incident absent from the snapshot is treated the same as one whose
    /// status left `triggered`.
    pub fn reconcile(&mut self, snapshot: &[Incident]) -> ReconcileOutcome {
        let triggered_ids: HashSet<&str> = snapshot
            .iter()
            .filter(|i| i.status == IncidentStatus::Triggered && !i.id.is_empty())
            .map(|i| i.id.as_str())
            .collect();

        let mut outcome = ReconcileOutcome::default();

        for incident in snapshot {
            if incident.status != IncidentStatus::Triggered || incident.id.is_empty() {
                continue;
            }
            if self.controls.contains_key(&incident.id) {
                continue;
            }
            let control = AckControl::from_incident(incident);
            tracing::debug!(
                incident_id = %incident.id,
                control_id = %control.control_id,
                "added acknowledge control"
            );
            self.controls.insert(incident.id.clone(), control.clone());
            outcome.created.push(control);
        }

        let stale: Vec<String> = self
            .controls
            .keys()
            .filter(|id| !triggered_ids.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(control) = self.controls.remove(&id) {
                tracing::debug!(
                    incident_id = %id,
                    control_id = %control.control_id,
                    "removed acknowledge control"
                );
                outcome.destroyed.push(control);
            }
        }

        outcome
    }

    /// Look up a live control by its `ack_…` control id.
    pub fn find_by_control_id(&self, control_id: &str) -> Option<&AckControl> {
        crate::control::incident_id_from_control_id(control_id)
            .and_then(|incident_id| self.controls.get(incident_id))
    }

    /// All live controls, ordered by incident number for stable listings.
    pub fn controls(&self) -> Vec<&AckControl> {
        let mut all: Vec<&AckControl> = self.controls.values().collect();
        all.sort_by_key(|c| (c.incident_number, c.incident_id.clone()));
        all
    }

    pub fn tracked_incident_ids(&self) -> HashSet<String> {
        self.controls.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
