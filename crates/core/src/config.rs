//! Predicate configuration: the status to wait for and the statuses that end
//! the wait early.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::status::Status;

/// Immutable `(target, invalid)` pair, validated at construction.
///
/// Loadable from TOML:
///
/// ```toml
/// target = "RUNNING"
/// invalid = ["ERROR", "TERMINATED"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawPredicateConfig<St>",
    bound(
        serialize = "St: Serialize",
        deserialize = "St: Status + Deserialize<'de>"
    )
)]
pub struct PredicateConfig<St: Status> {
    target: St,
    invalid: HashSet<St>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "St: Eq + std::hash::Hash + Deserialize<'de>"))]
struct RawPredicateConfig<St: Eq + std::hash::Hash> {
    target: St,
    #[serde(default)]
    invalid: HashSet<St>,
}

impl<St: Status> PredicateConfig<St> {
    /// Build a configuration, copying `invalid`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `target` is in `invalid` or is the
    /// unrecognized catch-all.
    pub fn new<I>(target: St, invalid: I) -> Result<Self>
    where
        I: IntoIterator<Item = St>,
    {
        let invalid: HashSet<St> = invalid.into_iter().collect();

        if target.is_unrecognized() {
            return Err(Error::invalid_config(format!(
                "target status {target} can never be waited for"
            )));
        }
        if invalid.contains(&target) {
            return Err(Error::invalid_config(format!(
                "target status {target} is also listed as invalid"
            )));
        }

        Ok(Self { target, invalid })
    }

    /// Configuration using the kind's default invalid set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `target` is in the default set.
    pub fn with_default_invalid(target: St) -> Result<Self> {
        Self::new(target, St::default_invalid())
    }

    /// The status being waited for.
    pub const fn target(&self) -> St {
        self.target
    }

    /// Statuses that end the wait with failure.
    pub const fn invalid(&self) -> &HashSet<St> {
        &self.invalid
    }

    /// Check if `status` is the target.
    pub fn is_target(&self, status: St) -> bool {
        status == self.target
    }

    /// Check if `status` is terminal-invalid.
    pub fn is_invalid(&self, status: St) -> bool {
        self.invalid.contains(&status)
    }
}

impl<St: Status + DeserializeOwned> PredicateConfig<St> {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParseFailed`] for malformed TOML and
    /// [`Error::InvalidConfig`] when the document parses but fails
    /// validation.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let raw: RawPredicateConfig<St> =
            toml::from_str(input).map_err(|e| Error::config_parse_failed(e.to_string()))?;
        Self::new(raw.target, raw.invalid)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl<St: Status> TryFrom<RawPredicateConfig<St>> for PredicateConfig<St> {
    type Error = Error;

    fn try_from(raw: RawPredicateConfig<St>) -> Result<Self> {
        Self::new(raw.target, raw.invalid)
    }
}
