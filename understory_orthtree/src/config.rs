// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable tree configuration and its builder.

use core::cmp::Ordering;
use core::fmt;

use crate::types::{Aabb, Scalar};

/// Immutable configuration of an [`Orthtree`](crate::Orthtree).
///
/// Built with [`ConfigBuilder`]; see [`Config::builder`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config<T, const N: usize> {
    bounds: Aabb<T, N>,
    minimum_span: [T; N],
    trim_on_remove: bool,
}

impl<T: Scalar, const N: usize> Config<T, N> {
    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder<T, N> {
        ConfigBuilder::new()
    }

    /// Shorthand for a configuration with the given root box and defaults otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `bounds` is malformed.
    pub fn with_bounds(bounds: Aabb<T, N>) -> Self {
        match Self::builder().set_bounds(bounds).build() {
            Ok(config) => config,
            Err(err) => panic!("invalid orthtree bounds: {err}"),
        }
    }

    /// The root box. Items must lie entirely inside it.
    #[inline]
    pub fn bounds(&self) -> &Aabb<T, N> {
        &self.bounds
    }

    /// Per-axis minimum span of a node.
    ///
    /// A leaf only splits while the halves it would produce are at least this
    /// large on every axis.
    #[inline]
    pub fn minimum_span(&self) -> &[T; N] {
        &self.minimum_span
    }

    /// Whether empty subtrees are collapsed after every removal.
    #[inline]
    pub fn trim_on_remove(&self) -> bool {
        self.trim_on_remove
    }
}

/// Builder for [`Config`].
///
/// ```
/// use understory_orthtree::{Aabb, Config};
///
/// let config = Config::builder()
///     .set_bounds(Aabb::new([0, 0, 0], [100, 100, 100]))
///     .set_trim_on_remove(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.minimum_span(), &[2, 2, 2]);
///
/// // The root box is required.
/// assert!(Config::<i64, 3>::builder().build().is_err());
/// ```
#[derive(Copy, Clone, Debug)]
pub struct ConfigBuilder<T, const N: usize> {
    bounds: Option<Aabb<T, N>>,
    minimum_span: [T; N],
    trim_on_remove: bool,
}

impl<T: Scalar, const N: usize> Default for ConfigBuilder<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, const N: usize> ConfigBuilder<T, N> {
    /// Create a builder with the default minimum span and trimming disabled.
    pub fn new() -> Self {
        Self {
            bounds: None,
            minimum_span: [T::DEFAULT_MIN_SPAN; N],
            trim_on_remove: false,
        }
    }

    /// Set the root box.
    pub fn set_bounds(mut self, bounds: Aabb<T, N>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the minimum node span for each axis.
    pub fn set_minimum_span(mut self, minimum_span: [T; N]) -> Self {
        self.minimum_span = minimum_span;
        self
    }

    /// Set the same minimum node span on every axis.
    pub fn set_uniform_minimum_span(mut self, minimum_span: T) -> Self {
        self.minimum_span = [minimum_span; N];
        self
    }

    /// Collapse empty subtrees after each removal.
    pub fn set_trim_on_remove(mut self, trim_on_remove: bool) -> Self {
        self.trim_on_remove = trim_on_remove;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<Config<T, N>, ConfigError> {
        let bounds = self.bounds.ok_or(ConfigError::MissingBounds)?;
        if !bounds.is_well_formed() {
            return Err(ConfigError::MalformedBounds);
        }
        if let Some(axis) = (0..N)
            .find(|&a| self.minimum_span[a].partial_cmp(&T::zero()) != Some(Ordering::Greater))
        {
            return Err(ConfigError::InvalidMinimumSpan { axis });
        }
        Ok(Config {
            bounds,
            minimum_span: self.minimum_span,
            trim_on_remove: self.trim_on_remove,
        })
    }
}

/// Reasons a [`ConfigBuilder`] can fail to build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No root box was set.
    MissingBounds,
    /// The root box has `min > max` on some axis.
    MalformedBounds,
    /// The minimum span on `axis` is not strictly positive.
    InvalidMinimumSpan {
        /// Offending axis.
        axis: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBounds => f.write_str("root bounds were never set"),
            Self::MalformedBounds => f.write_str("root bounds have min > max on some axis"),
            Self::InvalidMinimumSpan { axis } => {
                write!(f, "minimum span on axis {axis} must be strictly positive")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
