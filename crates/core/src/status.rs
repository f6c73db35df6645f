//! Lifecycle statuses reported by remote resources.
//!
//! Each resource kind owns a closed enumeration. Every enumeration carries an
//! `Unrecognized` catch-all so a newer provider reporting a status we do not
//! know about yet still deserializes.

use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// A comparable lifecycle status for one resource kind.
pub trait Status:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The catch-all value for statuses unknown to this build.
    fn unrecognized() -> Self;

    /// Statuses from which no useful target can be reached.
    fn default_invalid() -> HashSet<Self>;

    /// Check if this is the catch-all value.
    fn is_unrecognized(&self) -> bool {
        *self == Self::unrecognized()
    }
}

/// Lifecycle status of a compute node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    /// The node is in transition.
    Pending,
    /// The node is visible, and in the process of being deleted.
    Terminated,
    /// The node is deployed, but suspended or stopped.
    Suspended,
    /// The node is available for requests.
    Running,
    /// There is an error on the node.
    Error,
    /// The status reported for the node is unknown to us.
    #[serde(other)]
    Unrecognized,
}

impl NodeStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Terminated,
        Self::Suspended,
        Self::Running,
        Self::Error,
        Self::Unrecognized,
    ];

    /// Wire spelling of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Terminated => "TERMINATED",
            Self::Suspended => "SUSPENDED",
            Self::Running => "RUNNING",
            Self::Error => "ERROR",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Strict parse that refuses unknown values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStatus`] if `value` names no node status.
    pub fn parse_strict(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| Error::unknown_status(value))
    }
}

impl Status for NodeStatus {
    fn unrecognized() -> Self {
        Self::Unrecognized
    }

    fn default_invalid() -> HashSet<Self> {
        HashSet::from([Self::Error])
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse_strict(s).unwrap_or_else(|_| {
            debug!(value = s, "Unknown node status, treating as unrecognized");
            Self::Unrecognized
        }))
    }
}

/// Lifecycle status of a disk image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageStatus {
    /// The image is in transition.
    Pending,
    /// The image is visible, and in the process of being deleted.
    Deleted,
    /// The image is available.
    Available,
    /// There is an error on the image.
    Error,
    /// The status reported for the image is unknown to us.
    #[serde(other)]
    Unrecognized,
}

impl ImageStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Deleted,
        Self::Available,
        Self::Error,
        Self::Unrecognized,
    ];

    /// Wire spelling of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Deleted => "DELETED",
            Self::Available => "AVAILABLE",
            Self::Error => "ERROR",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Strict parse that refuses unknown values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStatus`] if `value` names no image status.
    pub fn parse_strict(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| Error::unknown_status(value))
    }
}

impl Status for ImageStatus {
    fn unrecognized() -> Self {
        Self::Unrecognized
    }

    fn default_invalid() -> HashSet<Self> {
        HashSet::from([Self::Error])
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse_strict(s).unwrap_or_else(|_| {
            debug!(value = s, "Unknown image status, treating as unrecognized");
            Self::Unrecognized
        }))
    }
}
