use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
    num::NonZero,
};

use crate::{Error, Result};

/// Real-valued indicator parameter (multiplier, factor, offset).
///
/// Implements `Eq` and `Hash` via bit-level comparison so configs stay
/// hashable. Builders only construct it from finite values, which makes the
/// bit comparison sound.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Param(f64);

impl Param {
    /// Finite value strictly above zero.
    pub fn positive(indicator: &str, name: &str, value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::configuration(
                indicator,
                format!("{name} must be a positive finite number, got {value}"),
            ))
        }
    }

    /// Finite value in `[low, high]`.
    pub fn in_range(indicator: &str, name: &str, value: f64, low: f64, high: f64) -> Result<Self> {
        if value.is_finite() && (low..=high).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::configuration(
                indicator,
                format!("{name} must be within [{low}, {high}], got {value}"),
            ))
        }
    }

    /// Wraps a compile-time default known to satisfy its constraint.
    pub const fn from_validated(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unwraps a builder field, failing with a configuration error when unset.
pub(crate) fn required<T>(value: Option<T>, indicator: &str, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::configuration(indicator, format!("{name} is required")))
}

/// Converts a raw length (e.g. from a deserialized spec) into a window length.
pub(crate) fn length(indicator: &str, name: &str, value: usize) -> Result<NonZero<usize>> {
    NonZero::new(value)
        .ok_or_else(|| Error::configuration(indicator, format!("{name} must be positive")))
}

/// Fails unless `fast < slow`.
pub(crate) fn ordered_lengths(indicator: &str, fast: usize, slow: usize) -> Result<()> {
    if fast < slow {
        Ok(())
    } else {
        Err(Error::configuration(
            indicator,
            format!("fast length ({fast}) must be below slow length ({slow})"),
        ))
    }
}
