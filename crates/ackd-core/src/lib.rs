pub mod config;
pub mod control;
pub mod error;
pub mod io;
pub mod paths;
pub mod reconcile;
pub mod registry;

pub use error::{AckdError, Result};
