//! Status-convergence predicate.
//!
//! Decides, once per poll tick, whether a resource has reached its target
//! status, can never reach it, or needs another look. When the snapshot in
//! hand is inconclusive the predicate asks the refresher for one fresh read
//! before answering, and remembers that read for the next tick.

use std::collections::HashSet;
use std::fmt;

use converge_core::{PredicateConfig, Snapshot, Status};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::refresher::SnapshotRefresher;

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The resource reached the target status.
    Pass,
    /// The resource reached a status from which the target is unreachable.
    Fail,
    /// Not decided yet; poll again.
    Retry,
}

impl Decision {
    /// Check if the wait is over.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Pass | Self::Fail)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Retry => write!(f, "retry"),
        }
    }
}

/// Waits for one resource to reach a target status.
///
/// Construct one per wait and call [`evaluate`](Self::evaluate) from a
/// single driver. The predicate never loops or sleeps; cadence and timeout
/// belong to the caller.
pub struct StatusConvergencePredicate<S: Snapshot, R> {
    config: PredicateConfig<S::Status>,
    refresher: R,
    last_seen: Option<S>,
    refresh_attempted: bool,
    evaluations: u64,
    refreshes: u64,
}

impl<S, R> StatusConvergencePredicate<S, R>
where
    S: Snapshot,
    R: SnapshotRefresher<S>,
{
    /// Create a predicate from a validated configuration.
    pub const fn new(config: PredicateConfig<S::Status>, refresher: R) -> Self {
        Self {
            config,
            refresher,
            last_seen: None,
            refresh_attempted: false,
            evaluations: 0,
            refreshes: 0,
        }
    }

    /// Start building a predicate.
    pub fn builder() -> PredicateBuilder<S, R> {
        PredicateBuilder::new()
    }

    /// Evaluate the resource once.
    ///
    /// The subject is `snapshot` if it carries an identity, otherwise the
    /// snapshot remembered from the previous call. With no subject at all the
    /// answer is `Retry` until a refresh has been attempted and `Fail` after,
    /// since the only way to lose the remembered snapshot is a refresh that
    /// found the resource gone.
    ///
    /// A subject already at the target passes, and one in the invalid set
    /// fails, without any remote call. Anything else gets exactly one
    /// refresh. A missing resource, a transport failure or an answer about
    /// another resource all yield `Retry`; none of them prove failure.
    pub async fn evaluate(&mut self, snapshot: Option<&S>) -> Decision {
        self.evaluations = self.evaluations.saturating_add(1);

        let subject = snapshot
            .filter(|s| s.id().is_some())
            .or_else(|| self.last_seen.as_ref().filter(|s| s.id().is_some()))
            .cloned();

        let Some(subject) = subject else {
            return self.decide_without_subject();
        };

        if let Some(decision) = self.classify(&subject) {
            self.last_seen = Some(subject);
            return decision;
        }

        self.double_check(subject).await
    }

    /// PASS / FAIL when decidable from `snapshot` alone.
    fn classify(&self, snapshot: &S) -> Option<Decision> {
        let status = snapshot.status();
        let id = snapshot.id().unwrap_or_default();

        if self.config.is_target(status) {
            info!(id = %id, %status, "Resource reached target status");
            Some(Decision::Pass)
        } else if self.config.is_invalid(status) {
            info!(
                id = %id,
                %status,
                target_status = %self.config.target(),
                "Resource reached invalid status"
            );
            Some(Decision::Fail)
        } else {
            None
        }
    }

    fn decide_without_subject(&self) -> Decision {
        if self.refresh_attempted {
            info!(
                target_status = %self.config.target(),
                "Resource is gone and never reached target status"
            );
            Decision::Fail
        } else {
            debug!("No snapshot with identity to evaluate yet");
            Decision::Retry
        }
    }

    /// Second opinion for a transitional subject.
    async fn double_check(&mut self, stale: S) -> Decision {
        let Some(id) = stale.id().map(str::to_owned) else {
            self.last_seen = Some(stale);
            return Decision::Retry;
        };

        debug!(id = %id, status = %stale.status(), "Status inconclusive, refreshing");
        self.refresh_attempted = true;
        self.refreshes = self.refreshes.saturating_add(1);

        match SnapshotRefresher::<S>::refresh(&self.refresher, &id).await {
            Ok(Some(fresh)) if fresh.id() == Some(id.as_str()) => {
                let decision = self.classify(&fresh).unwrap_or(Decision::Retry);
                if decision == Decision::Retry {
                    debug!(id = %id, status = %fresh.status(), "Resource still in transition");
                }
                self.last_seen = Some(fresh);
                decision
            }
            Ok(Some(fresh)) => {
                let err = Error::identity_mismatch(id, fresh.id().unwrap_or("<none>"));
                warn!(error = %err, "Ignoring refreshed snapshot");
                self.last_seen = Some(stale);
                Decision::Retry
            }
            Ok(None) => {
                debug!(id = %id, "Resource not found on refresh");
                self.last_seen = None;
                Decision::Retry
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Refresh inconclusive");
                self.last_seen = Some(stale);
                Decision::Retry
            }
        }
    }

    /// The snapshot the most recent decision was based on.
    pub const fn last_seen(&self) -> Option<&S> {
        self.last_seen.as_ref()
    }

    /// Consume the predicate, keeping the last observed snapshot.
    pub fn into_last_seen(self) -> Option<S> {
        self.last_seen
    }

    /// The validated target and invalid statuses.
    pub const fn config(&self) -> &PredicateConfig<S::Status> {
        &self.config
    }

    /// The refresher used for second-opinion reads.
    pub const fn refresher(&self) -> &R {
        &self.refresher
    }

    /// Whether any evaluation has reached the refresher.
    pub const fn refresh_attempted(&self) -> bool {
        self.refresh_attempted
    }

    /// Number of `evaluate` calls.
    pub const fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Number of refresh round trips made.
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

/// Builder for [`StatusConvergencePredicate`].
pub struct PredicateBuilder<S: Snapshot, R> {
    target: Option<S::Status>,
    invalid: Option<HashSet<S::Status>>,
    config: Option<PredicateConfig<S::Status>>,
    refresher: Option<R>,
}

impl<S, R> PredicateBuilder<S, R>
where
    S: Snapshot,
    R: SnapshotRefresher<S>,
{
    /// Create a new builder.
    pub const fn new() -> Self {
        Self {
            target: None,
            invalid: None,
            config: None,
            refresher: None,
        }
    }

    /// Set the target status.
    #[must_use]
    pub fn with_target(mut self, target: S::Status) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the invalid statuses. Defaults to the kind's own set.
    #[must_use]
    pub fn with_invalid<I>(mut self, invalid: I) -> Self
    where
        I: IntoIterator<Item = S::Status>,
    {
        self.invalid = Some(invalid.into_iter().collect());
        self
    }

    /// Use a prebuilt configuration, e.g. one loaded from TOML.
    #[must_use]
    pub fn with_config(mut self, config: PredicateConfig<S::Status>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the refresher.
    #[must_use]
    pub fn with_refresher(mut self, refresher: R) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Build the predicate.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the refresher or target is missing,
    /// if both a config and a target/invalid set were given, or if the
    /// target is in the invalid set.
    pub fn build(self) -> Result<StatusConvergencePredicate<S, R>> {
        let refresher = self
            .refresher
            .ok_or_else(|| Error::invalid_config("Refresher is required"))?;

        let config = match (self.config, self.target) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid_config(
                    "Target given both directly and through a config",
                ));
            }
            (Some(config), None) if self.invalid.is_some() => {
                return Err(Error::invalid_config(format!(
                    "Invalid statuses given both directly and through a config targeting {}",
                    config.target()
                )));
            }
            (Some(config), None) => config,
            (None, Some(target)) => PredicateConfig::new(
                target,
                self.invalid.unwrap_or_else(<S::Status as Status>::default_invalid),
            )?,
            (None, None) => return Err(Error::invalid_config("Target status is required")),
        };

        Ok(StatusConvergencePredicate::new(config, refresher))
    }
}

impl<S, R> Default for PredicateBuilder<S, R>
where
    S: Snapshot,
    R: SnapshotRefresher<S>,
{
    fn default() -> Self {
        Self::new()
    }
}
