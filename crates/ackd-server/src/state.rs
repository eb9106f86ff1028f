use std::sync::Arc;

use ackd_core::reconcile::Reconciler;
use ackd_core::registry::Registry;
use chrono::{DateTime, Utc};
use pagerduty_api::poller::{Snapshot, SnapshotSub};
use pagerduty_api::{PdClient, Poller};
use tokio::sync::{broadcast, RwLock};

/// Shared application state passed to all route handlers.
///
/// The reconciler is mutated only by the supervisor task, which consumes the
/// single snapshot subscription — passes are serialized by construction.
/// Handlers take read locks.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<RwLock<Reconciler>>,
    pub client: PdClient,
    pub poller: Poller,
    pub registry: Arc<Registry>,
    pub scope: String,
    pub event_tx: broadcast::Sender<()>,
    last_pass_at: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Build the state and spawn the reconciliation supervisor.
    ///
    /// Must be called from within a tokio runtime. The supervisor runs the
    /// startup orphan sweep, applies an initial pass from the first
    /// snapshot, then re-reconciles on every snapshot notification until
    /// the poller shuts down.
    pub fn new(client: PdClient, poller: Poller, registry: Registry, scope: String) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let state = Self {
            reconciler: Arc::new(RwLock::new(Reconciler::new())),
            client,
            poller: poller.clone(),
            registry: Arc::new(registry),
            scope,
            event_tx,
            last_pass_at: Arc::new(RwLock::new(None)),
        };

        let sub = poller.subscribe();
        tokio::spawn(supervise(state.clone(), sub));

        state
    }

    pub async fn last_pass_at(&self) -> Option<DateTime<Utc>> {
        *self.last_pass_at.read().await
    }

    /// Run one reconciliation pass against `snapshot`.
    ///
    /// Two-phase destroy: controls leave the tracked map inside the pass
    /// (synchronous, authoritative); their persisted registry records are
    /// released afterwards on a blocking thread. A control is therefore
    /// never observable as "tracked but already removed".
    async fn apply_pass(&self, snapshot: &Snapshot) {
        let outcome = {
            let mut reconciler = self.reconciler.write().await;
            reconciler.reconcile(snapshot)
        };

        if !outcome.is_empty() {
            tracing::info!(
                created = outcome.created.len(),
                destroyed = outcome.destroyed.len(),
                "reconciliation pass applied"
            );

            let registry = self.registry.clone();
            let result = tokio::task::spawn_blocking(move || {
                for control in &outcome.created {
                    registry.record(control)?;
                }
                for control in &outcome.destroyed {
                    registry.remove(&control.control_id)?;
                }
                Ok::<_, ackd_core::AckdError>(())
            })
            .await;
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::warn!(error = %err, "registry update failed"),
                Err(err) => tracing::warn!(error = %err, "registry task join error"),
            }

            let _ = self.event_tx.send(());
        }

        *self.last_pass_at.write().await = Some(Utc::now());
    }
}

async fn supervise(state: AppState, mut sub: SnapshotSub) {
    // Make sure the first snapshot is in before sweeping, so the sweep
    // compares against live data rather than an empty default.
    if let Err(err) = state.poller.request_refresh().await {
        tracing::warn!(error = %err, "initial snapshot fetch failed");
    }
    let snapshot = state.poller.current_snapshot();

    let registry = state.registry.clone();
    let sweep_snapshot = snapshot.clone();
    match tokio::task::spawn_blocking(move || registry.sweep(&sweep_snapshot)).await {
        Ok(Ok(removed)) if !removed.is_empty() => {
            tracing::info!(count = removed.len(), "swept orphaned control records");
        }
        Ok(Ok(_)) => {}
        Ok(Err(err)) => tracing::warn!(error = %err, "startup sweep failed"),
        Err(err) => tracing::warn!(error = %err, "startup sweep join error"),
    }

    state.apply_pass(&snapshot).await;

    while sub.changed().await.is_ok() {
        let snapshot = sub.snapshot();
        state.apply_pass(&snapshot).await;
    }
    tracing::debug!("snapshot source closed; supervisor exiting");
}
