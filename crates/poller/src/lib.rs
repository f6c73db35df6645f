//! Status-convergence polling for remote resources.
//!
//! Waiting for a resource to reach a status naively ("poll until
//! `status == target`") reacts to stale reads and keeps polling resources
//! that have already failed for good. This crate provides the predicate an
//! external retry driver calls on every tick:
//!
//! - **Decidable input**: a snapshot at the target passes, one in the invalid
//!   set fails, with no remote call
//! - **Second opinion**: anything else is refreshed once by identity before
//!   answering, and the fresh snapshot is remembered for the next tick
//! - **Inconclusive reads**: a missing resource or a transport failure is
//!   never mistaken for failure
//!
//! # Example
//!
//! ```ignore
//! use converge_core::{NodeMetadata, NodeStatus};
//! use converge_poller::{node_predicate, Decision};
//!
//! let mut predicate = node_predicate(NodeStatus::Running, client)?;
//! let mut seen = Some(NodeMetadata::new("node-1", NodeStatus::Pending));
//!
//! loop {
//!     match predicate.evaluate(seen.as_ref()).await {
//!         Decision::Retry => {
//!             seen = predicate.last_seen().cloned();
//!             tokio::time::sleep(backoff.next()).await;
//!         }
//!         decision => break decision,
//!     }
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod adapters;
pub mod error;
pub mod predicate;
pub mod refresher;

// Re-export main types
pub use adapters::{
    image_predicate, image_predicate_with, node_predicate, node_predicate_with, ImageClient,
    ImageRefresher, NodeClient, NodeRefresher,
};
pub use error::{Error, Result};
pub use predicate::{Decision, PredicateBuilder, StatusConvergencePredicate};
pub use refresher::{InMemoryRefresher, SnapshotRefresher, TracingRefresher};
