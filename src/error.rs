use std::fmt::Display;

use crate::Timestamp;

/// Errors raised while configuring indicators or feeding them bars.
///
/// Insufficient history is never an error: indicators return `None` until
/// they have converged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter is out of range. Raised by config builders and the
    /// registry, never while computing.
    #[error("invalid configuration for {indicator}: {reason}")]
    Configuration {
        indicator: String,
        reason: String,
    },

    /// A bar arrived with an `open_time` earlier than the last bar seen by
    /// `indicator`. The offending bar is rejected and state is unchanged.
    #[error("{indicator}: bar at open_time {got} arrived after bar at {last}")]
    OrderingViolation {
        indicator: String,
        last: Timestamp,
        got: Timestamp,
    },

    /// Writing the output table failed.
    #[error("failed to export table: {0}")]
    Export(#[from] csv::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn configuration(indicator: impl Display, reason: impl Into<String>) -> Self {
        Self::Configuration {
            indicator: indicator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn ordering(indicator: impl Display, last: Timestamp, got: Timestamp) -> Self {
        Self::OrderingViolation {
            indicator: indicator.to_string(),
            last,
            got,
        }
    }

    /// `true` for [`Error::OrderingViolation`].
    #[must_use]
    pub fn is_ordering_violation(&self) -> bool {
        matches!(self, Self::OrderingViolation { .. })
    }

    /// `true` for [`Error::Configuration`].
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
