use crate::{Bar, Ohlcv, Price, Result, Timestamp};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a technical [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its parameters
/// (lengths, price source, multipliers). Configs are value types: cheap to
/// clone, compare, and hash. A config that exists is valid: builders check
/// every parameter in [`build`](IndicatorConfigBuilder::build).
pub trait IndicatorConfig: Sized + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Validates the parameters and builds the config.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`](crate::Error::Configuration) when a required
    /// field is missing or a parameter is out of range.
    fn build(self) -> Result<Config>;
}

/// A streaming technical indicator.
///
/// Indicators maintain internal state and update incrementally on each call to
/// [`compute`](Indicator::compute). Output is `None` until enough data has been
/// received for convergence.
///
/// # Example
///
/// ```
/// use quantedge_ta::{Bar, Indicator, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::close(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.compute(&Bar::from_value(10.0, 1))?, None);
/// assert_eq!(sma.compute(&Bar::from_value(20.0, 2))?, None);
/// assert_eq!(sma.compute(&Bar::from_value(30.0, 3))?, Some(20.0));
/// # Ok::<(), quantedge_ta::Error>(())
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Computed output type. `f64` for simple indicators,
    /// a struct for multi-output ones (e.g. Bollinger Bands).
    type Output: Copy + Send + Sync + Display + Debug + OutputFields;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Feeds a bar and returns the updated indicator value,
    /// or `None` if not yet converged.
    ///
    /// # Errors
    ///
    /// [`Error::OrderingViolation`](crate::Error::OrderingViolation) when the
    /// bar's `open_time` precedes the last bar seen. State is unchanged.
    fn compute(&mut self, kline: &impl Ohlcv) -> Result<Option<Self::Output>>;

    /// Returns the last computed indicator value without advancing state,
    /// or `None` if not yet converged.
    ///
    /// Cached field read, O(1).
    fn value(&self) -> Option<Self::Output>;
}

/// Named scalar fields of an indicator output.
///
/// Lets multi-output indicators be handled uniformly (tables, export,
/// chaining) without reflection: field names are fixed at compile time.
pub trait OutputFields {
    /// Field names, in the order [`write_fields`](Self::write_fields) emits them.
    const NAMES: &'static [&'static str];

    /// Appends one cell per field. `None` (not yet converged) writes
    /// `None` for every field.
    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>);
}

impl OutputFields for Price {
    const NAMES: &'static [&'static str] = &["value"];

    #[inline]
    fn write_fields(value: Option<&Self>, out: &mut Vec<Option<Price>>) {
        out.push(value.copied());
    }
}

/// Object-safe view of an [`Indicator`].
///
/// Implemented for every indicator; used by the [`Engine`](crate::Engine)
/// and [`Chain`](crate::Chain) to drive heterogeneous indicators over the
/// same bar stream.
pub trait DynIndicator: Send + Display + Debug {
    /// Output field names.
    fn fields(&self) -> &'static [&'static str];

    /// Feeds one bar.
    ///
    /// # Errors
    ///
    /// Same as [`Indicator::compute`].
    fn step(&mut self, bar: &Bar) -> Result<()>;

    /// Appends the latest value, one cell per field.
    fn write_latest(&self, out: &mut Vec<Option<Price>>);
}

impl<I> DynIndicator for I
where
    I: Indicator + Send,
{
    fn fields(&self) -> &'static [&'static str] {
        I::Output::NAMES
    }

    fn step(&mut self, bar: &Bar) -> Result<()> {
        self.compute(bar).map(|_| ())
    }

    fn write_latest(&self, out: &mut Vec<Option<Price>>) {
        I::Output::write_fields(self.value().as_ref(), out);
    }
}

/// Feeds an upstream output to `downstream` as a synthetic bar stamped with
/// the upstream bar's `open_time`, so repaints propagate.
///
/// `None` is "no input yet": `downstream` is not fed and stays where it is.
#[inline]
pub(crate) fn feed<I: Indicator>(
    downstream: &mut I,
    value: Option<Price>,
    open_time: Timestamp,
) -> Result<Option<I::Output>> {
    match value {
        Some(value) => downstream.compute(&Bar::from_value(value, open_time)),
        None => Ok(None),
    }
}

/// Generates a config and builder for indicators parameterised by a single
/// window length and a price source.
macro_rules! length_config {
    (
        $(#[$meta:meta])*
        $config:ident, $builder:ident, $label:literal, $default_source:expr
        $(, min_length = $min:literal)?
    ) => {
        $(#[$meta])*
        #[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
        pub struct $config {
            length: usize,
            source: $crate::PriceSource,
        }

        impl $crate::IndicatorConfig for $config {
            type Builder = $builder;

            #[inline]
            fn builder() -> Self::Builder {
                $builder::new()
            }
        }

        impl $config {
            /// Window length (number of bars).
            #[inline]
            #[must_use]
            pub fn length(&self) -> usize {
                self.length
            }

            /// Price source extracted from each bar.
            #[inline]
            #[must_use]
            pub fn source(&self) -> $crate::PriceSource {
                self.source
            }
        }

        impl ::std::fmt::Display for $config {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!(stringify!($config), "({}, {})"), self.length, self.source)
            }
        }

        #[doc = concat!("Builder for [`", stringify!($config), "`].")]
        ///
        /// Length must be set before calling
        /// [`build`](crate::IndicatorConfigBuilder::build).
        pub struct $builder {
            length: Option<usize>,
            source: $crate::PriceSource,
        }

        impl $builder {
            fn new() -> Self {
                Self {
                    length: None,
                    source: $default_source,
                }
            }

            /// Sets the indicator window length.
            #[inline]
            #[must_use]
            pub fn length(mut self, length: ::std::num::NonZero<usize>) -> Self {
                self.length = Some(length.get());
                self
            }

            /// Sets the price source.
            #[inline]
            #[must_use]
            pub fn source(mut self, source: $crate::PriceSource) -> Self {
                self.source = source;
                self
            }
        }

        impl $crate::IndicatorConfigBuilder<$config> for $builder {
            fn build(self) -> $crate::Result<$config> {
                let length = $crate::param::required(self.length, $label, "length")?;
                $(
                    if length < $min {
                        return Err($crate::Error::configuration(
                            $label,
                            format!("length must be at least {}, got {length}", $min),
                        ));
                    }
                )?

                Ok($config {
                    length,
                    source: self.source,
                })
            }
        }
    };
}

/// Like `length_config!` for indicators that read high, low and close
/// directly and take no price source.
macro_rules! period_config {
    (
        $(#[$meta:meta])*
        $config:ident, $builder:ident, $label:literal
    ) => {
        $(#[$meta])*
        #[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
        pub struct $config {
            length: usize,
        }

        impl $crate::IndicatorConfig for $config {
            type Builder = $builder;

            #[inline]
            fn builder() -> Self::Builder {
                $builder { length: None }
            }
        }

        impl $config {
            /// Window length (number of bars).
            #[inline]
            #[must_use]
            pub fn length(&self) -> usize {
                self.length
            }

            #[doc = concat!("Creates a ", $label, " config with the given length.")]
            #[must_use]
            pub fn new(length: ::std::num::NonZero<usize>) -> Self {
                Self {
                    length: length.get(),
                }
            }
        }

        impl ::std::fmt::Display for $config {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!(stringify!($config), "({})"), self.length)
            }
        }

        #[doc = concat!("Builder for [`", stringify!($config), "`].")]
        pub struct $builder {
            length: Option<usize>,
        }

        impl $builder {
            /// Sets the indicator window length.
            #[inline]
            #[must_use]
            pub fn length(mut self, length: ::std::num::NonZero<usize>) -> Self {
                self.length = Some(length.get());
                self
            }
        }

        impl $crate::IndicatorConfigBuilder<$config> for $builder {
            fn build(self) -> $crate::Result<$config> {
                Ok($config {
                    length: $crate::param::required(self.length, $label, "length")?,
                })
            }
        }
    };
}

pub(crate) use length_config;
pub(crate) use period_config;
