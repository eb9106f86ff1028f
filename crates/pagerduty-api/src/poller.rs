use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::AbortHandle;

use crate::client::PdClient;
use crate::error::PdError;
use crate::types::Incident;
use crate::Result;

/// A point-in-time listing of all open incidents.
pub type Snapshot = Arc<Vec<Incident>>;

type RefreshReply = oneshot::Sender<Result<()>>;

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Background snapshot source: fetches the incident listing on a fixed
/// interval and on demand, publishing the latest snapshot through a `watch`
/// channel and change notifications through a `broadcast` channel.
///
/// A failed fetch keeps the previous snapshot and emits no notification;
/// subscribers only ever wake up for a snapshot that actually refreshed.
///
/// Cheap to clone; all clones talk to the same background task.
#[derive(Debug, Clone)]
pub struct Poller {
    latest: watch::Receiver<Snapshot>,
    notify_tx: broadcast::Sender<()>,
    cmd_tx: mpsc::Sender<RefreshReply>,
    abort: AbortHandle,
}

impl Poller {
    /// Spawn the poll task. The first fetch happens immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(client: PdClient, interval: Duration) -> Self {
        let (latest_tx, latest_rx) = watch::channel(Snapshot::default());
        let (notify_tx, _) = broadcast::channel(64);
        let (cmd_tx, cmd_rx) = mpsc::channel::<RefreshReply>(16);

        let task = tokio::spawn(poll_loop(
            client,
            interval,
            latest_tx,
            notify_tx.clone(),
            cmd_rx,
        ));

        Poller {
            latest: latest_rx,
            notify_tx,
            cmd_tx,
            abort: task.abort_handle(),
        }
    }

    /// The most recently fetched snapshot (empty until the first successful
    /// fetch completes).
    pub fn current_snapshot(&self) -> Snapshot {
        self.latest.borrow().clone()
    }

    /// Register a subscriber. Dropping the returned handle unsubscribes.
    pub fn subscribe(&self) -> SnapshotSub {
        SnapshotSub {
            notify_rx: self.notify_tx.subscribe(),
            latest: self.latest.clone(),
        }
    }

    /// Force one fetch+notify cycle now, ahead of the poll interval, and
    /// wait for it to complete. Returns the fetch outcome.
    pub async fn request_refresh(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(done_tx)
            .await
            .map_err(|_| PdError::PollerClosed)?;
        done_rx.await.map_err(|_| PdError::PollerClosed)?
    }

    /// Stop the background task. Subsequent refresh requests fail with
    /// [`PdError::PollerClosed`].
    pub fn shutdown(&self) {
        self.abort.abort();
    }
}

async fn poll_loop(
    client: PdClient,
    interval: Duration,
    latest_tx: watch::Sender<Snapshot>,
    notify_tx: broadcast::Sender<()>,
    mut cmd_rx: mpsc::Receiver<RefreshReply>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        let reply = tokio::select! {
            _ = ticker.tick() => None,
            cmd = cmd_rx.recv() => match cmd {
                Some(reply) => Some(reply),
                // All Poller handles dropped; stop polling.
                None => break,
            },
        };

        let outcome = match client.list_incidents().await {
            Ok(incidents) => {
                tracing::debug!(count = incidents.len(), "snapshot refreshed");
                latest_tx.send_replace(Arc::new(incidents));
                let _ = notify_tx.send(());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "snapshot fetch failed; keeping previous");
                Err(err)
            }
        };

        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }
}

// ---------------------------------------------------------------------------
// SnapshotSub
// ---------------------------------------------------------------------------

/// Subscription handle delivering "new snapshot available" wake-ups.
///
/// The reconciliation supervisor holds exactly one of these, which is what
/// serializes passes: a notification arriving mid-pass sits in the channel
/// until the consumer comes back around.
#[derive(Debug)]
pub struct SnapshotSub {
    notify_rx: broadcast::Receiver<()>,
    latest: watch::Receiver<Snapshot>,
}

impl SnapshotSub {
    /// Wait until a fresh snapshot is available. A lagged receiver collapses
    /// the missed notifications into one wake-up — the consumer reads the
    /// latest snapshot either way.
    pub async fn changed(&mut self) -> Result<()> {
        match self.notify_rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => Ok(()),
            Err(broadcast::error::RecvError::Closed) => Err(PdError::PollerClosed),
        }
    }

    /// The snapshot current as of now.
    pub fn snapshot(&self) -> Snapshot {
        self.latest.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
