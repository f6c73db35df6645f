//! Point-in-time observations of remote resources.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::{ImageStatus, NodeStatus, Status};

/// What we last observed about one resource.
///
/// The identity is optional because a provider may hand back a resource
/// before it has been assigned one. A refresh of the same resource must
/// never change a present identity.
pub trait Snapshot: Clone + fmt::Debug + Send + Sync + 'static {
    /// Status enumeration for this resource kind.
    type Status: Status;

    /// Identity of the resource, if known.
    fn id(&self) -> Option<&str>;

    /// Reported status.
    fn status(&self) -> Self::Status;
}

/// Observed state of a compute node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    id: Option<String>,
    name: Option<String>,
    hostname: Option<String>,
    status: NodeStatus,
    #[serde(default)]
    tags: BTreeSet<String>,
}

impl NodeMetadata {
    /// Create a node snapshot with the given identity and status.
    pub fn new(id: impl Into<String>, status: NodeStatus) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
            hostname: None,
            status,
            tags: BTreeSet::new(),
        }
    }

    /// Create a node snapshot that has no identity yet.
    pub fn unidentified(status: NodeStatus) -> Self {
        Self {
            id: None,
            name: None,
            hostname: None,
            status,
            tags: BTreeSet::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the hostname.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the tags. The input is copied.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Same node, new status.
    #[must_use]
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Hostname, if assigned.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Tags attached to the node.
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

impl Snapshot for NodeMetadata {
    type Status = NodeStatus;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn status(&self) -> NodeStatus {
        self.status
    }
}

/// Observed state of a disk image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    status: ImageStatus,
}

impl Image {
    /// Create an image snapshot with the given identity and status.
    pub fn new(id: impl Into<String>, status: ImageStatus) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
            description: None,
            status,
        }
    }

    /// Create an image snapshot that has no identity yet.
    pub const fn unidentified(status: ImageStatus) -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            status,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Same image, new status.
    #[must_use]
    pub fn with_status(mut self, status: ImageStatus) -> Self {
        self.status = status;
        self
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Free-form description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Snapshot for Image {
    type Status = ImageStatus;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn status(&self) -> ImageStatus {
        self.status
    }
}
