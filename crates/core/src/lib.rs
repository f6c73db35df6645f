//! Core types for converge.
//!
//! - **Status**: per-kind lifecycle enumerations ([`NodeStatus`], [`ImageStatus`])
//! - **Snapshot**: identity-bearing observations of a resource
//! - **Config**: the validated `(target, invalid)` pair a wait is built from
//!
//! Polling itself lives in `converge-poller`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod config;
pub mod error;
pub mod snapshot;
pub mod status;

pub use config::PredicateConfig;
pub use error::{Error, Result};
pub use snapshot::{Image, NodeMetadata, Snapshot};
pub use status::{ImageStatus, NodeStatus, Status};
