//! Per-resource-kind refreshers over narrow fetch capabilities.
//!
//! A remote client only has to answer "give me resource `id`". The adapters
//! turn that into a [`SnapshotRefresher`] and pick sensible default invalid
//! statuses for their kind.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use converge_core::{Image, ImageStatus, NodeMetadata, NodeStatus, PredicateConfig, Status};

use crate::error::Result;
use crate::predicate::StatusConvergencePredicate;
use crate::refresher::SnapshotRefresher;

/// Fetches compute nodes by identity.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fetch node `id`; `Ok(None)` if it does not exist.
    async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>>;
}

#[async_trait]
impl<C: NodeClient + ?Sized> NodeClient for Arc<C> {
    async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        (**self).get_node(id).await
    }
}

/// Fetches disk images by identity.
#[async_trait]
pub trait ImageClient: Send + Sync {
    /// Fetch image `id`; `Ok(None)` if it does not exist.
    async fn get_image(&self, id: &str) -> Result<Option<Image>>;
}

#[async_trait]
impl<C: ImageClient + ?Sized> ImageClient for Arc<C> {
    async fn get_image(&self, id: &str) -> Result<Option<Image>> {
        (**self).get_image(id).await
    }
}

/// Refreshes node snapshots through a [`NodeClient`].
pub struct NodeRefresher<C> {
    client: C,
}

impl<C: NodeClient> NodeRefresher<C> {
    /// Wrap a node client.
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// The wrapped client.
    pub const fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: NodeClient> SnapshotRefresher<NodeMetadata> for NodeRefresher<C> {
    async fn refresh(&self, id: &str) -> Result<Option<NodeMetadata>> {
        self.client.get_node(id).await
    }
}

/// Refreshes image snapshots through an [`ImageClient`].
pub struct ImageRefresher<C> {
    client: C,
}

impl<C: ImageClient> ImageRefresher<C> {
    /// Wrap an image client.
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// The wrapped client.
    pub const fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: ImageClient> SnapshotRefresher<Image> for ImageRefresher<C> {
    async fn refresh(&self, id: &str) -> Result<Option<Image>> {
        self.client.get_image(id).await
    }
}

/// Predicate waiting for a node to reach `target`, failing on `ERROR`.
///
/// # Errors
///
/// Returns a configuration error if `target` is `ERROR` or `UNRECOGNIZED`.
pub fn node_predicate<C: NodeClient>(
    target: NodeStatus,
    client: C,
) -> Result<StatusConvergencePredicate<NodeMetadata, NodeRefresher<C>>> {
    node_predicate_with(target, NodeStatus::default_invalid(), client)
}

/// Predicate waiting for a node to reach `target` with explicit invalid statuses.
///
/// # Errors
///
/// Returns a configuration error if `target` is in `invalid`.
pub fn node_predicate_with<C: NodeClient>(
    target: NodeStatus,
    invalid: HashSet<NodeStatus>,
    client: C,
) -> Result<StatusConvergencePredicate<NodeMetadata, NodeRefresher<C>>> {
    let config = PredicateConfig::new(target, invalid)?;
    Ok(StatusConvergencePredicate::new(
        config,
        NodeRefresher::new(client),
    ))
}

/// Predicate waiting for an image to reach `target`, failing on `ERROR`.
///
/// # Errors
///
/// Returns a configuration error if `target` is `ERROR` or `UNRECOGNIZED`.
pub fn image_predicate<C: ImageClient>(
    target: ImageStatus,
    client: C,
) -> Result<StatusConvergencePredicate<Image, ImageRefresher<C>>> {
    image_predicate_with(target, ImageStatus::default_invalid(), client)
}

/// Predicate waiting for an image to reach `target` with explicit invalid statuses.
///
/// # Errors
///
/// Returns a configuration error if `target` is in `invalid`.
pub fn image_predicate_with<C: ImageClient>(
    target: ImageStatus,
    invalid: HashSet<ImageStatus>,
    client: C,
) -> Result<StatusConvergencePredicate<Image, ImageRefresher<C>>> {
    let config = PredicateConfig::new(target, invalid)?;
    Ok(StatusConvergencePredicate::new(
        config,
        ImageRefresher::new(client),
    ))
}
