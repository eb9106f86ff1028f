//! `pagerduty-api` — async driver for the PagerDuty REST v2 API.
//!
//! This crate owns everything that talks to PagerDuty over the wire so the
//! `ackd` workspace never touches raw HTTP: a typed incident model, the
//! authenticated client session, and the snapshot poller that the
//! reconciliation engine subscribes to.
//!
//! # Architecture
//!
//! ```text
//! PdClient        ← reqwest session with Token auth
//!     │              list_incidents / acknowledge_incident
//!     ▼
//! Poller          ← background task: fetch on interval + on demand
//!     │              watch (latest snapshot) + broadcast (change notify)
//!     ▼
//! SnapshotSub     ← per-consumer subscription handle; dropping it
//!                    unsubscribes
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use pagerduty_api::{PdClient, Poller};
//!
//! let client = PdClient::new("https://api.pagerduty.com", "token", None);
//! let poller = Poller::spawn(client.clone(), Duration::from_secs(30));
//!
//! let mut sub = poller.subscribe();
//! loop {
//!     sub.changed().await?;
//!     let snapshot = poller.current_snapshot();
//!     // diff snapshot against live state …
//! }
//! ```

pub mod client;
pub mod error;
pub mod poller;
pub mod types;

pub use client::PdClient;
pub use error::PdError;
pub use poller::{Poller, SnapshotSub};
pub use types::{Incident, IncidentStatus, ServiceRef};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, PdError>;
