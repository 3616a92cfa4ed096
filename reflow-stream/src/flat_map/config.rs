// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflow_core::demand::UNBOUNDED;
use reflow_core::{ReflowError, Result};

/// Default cap on simultaneously active inner publishers.
pub const DEFAULT_MAX_CONCURRENCY: usize = 32;

/// Default number of items requested up front from each inner publisher.
pub const DEFAULT_PREFETCH: usize = 32;

/// How many inner publishers may be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxConcurrency {
    /// At most this many.
    Bounded(usize),
    /// No cap: every outer item is mapped as soon as it arrives.
    Unbounded,
}

impl MaxConcurrency {
    /// Demand to request from the outer publisher up front.
    pub(crate) const fn initial_request(self) -> u64 {
        match self {
            Self::Bounded(limit) => limit as u64,
            Self::Unbounded => UNBOUNDED,
        }
    }

    /// Returns `true` while `active` inners leave room for one more.
    pub(crate) const fn admits(self, active: usize) -> bool {
        match self {
            Self::Bounded(limit) => active < limit,
            Self::Unbounded => true,
        }
    }

    pub(crate) const fn is_bounded(self) -> bool {
        matches!(self, Self::Bounded(_))
    }
}

impl Default for MaxConcurrency {
    fn default() -> Self {
        Self::Bounded(DEFAULT_MAX_CONCURRENCY)
    }
}

/// Tuning of a flat-map merge.
///
/// ```ignore
/// use reflow_stream::{FlatMapConfig, MaxConcurrency};
///
/// let config = FlatMapConfig::default()
///     .max_concurrency(MaxConcurrency::Bounded(4))
///     .prefetch(8)
///     .delay_errors(true);
///
/// assert!(config.validate().is_ok());
/// assert!(FlatMapConfig::default().prefetch(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlatMapConfig {
    max_concurrency: MaxConcurrency,
    prefetch: usize,
    delay_errors: bool,
}

impl Default for FlatMapConfig {
    fn default() -> Self {
        Self {
            max_concurrency: MaxConcurrency::default(),
            prefetch: DEFAULT_PREFETCH,
            delay_errors: false,
        }
    }
}

impl FlatMapConfig {
    /// Set the cap on simultaneously active inner publishers.
    #[must_use]
    pub const fn max_concurrency(mut self, max_concurrency: MaxConcurrency) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set how many items each inner publisher may buffer ahead of demand.
    #[must_use]
    pub const fn prefetch(mut self, prefetch: usize) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Keep sibling inners running after a failure and report every failure
    /// at the end.
    #[must_use]
    pub const fn delay_errors(mut self, delay_errors: bool) -> Self {
        self.delay_errors = delay_errors;
        self
    }

    /// The configured concurrency cap.
    #[must_use]
    pub const fn concurrency(&self) -> MaxConcurrency {
        self.max_concurrency
    }

    /// The configured per-inner prefetch.
    #[must_use]
    pub const fn prefetch_size(&self) -> usize {
        self.prefetch
    }

    /// Returns `true` when failures are deferred.
    #[must_use]
    pub const fn delays_errors(&self) -> bool {
        self.delay_errors
    }

    /// Consumed-item count after which an inner publisher is asked for more.
    pub(crate) const fn replenish_threshold(&self) -> usize {
        let limit = self.prefetch - self.prefetch / 4;
        if limit == 0 {
            1
        } else {
            limit
        }
    }

    /// Reject a zero concurrency cap or prefetch.
    ///
    /// # Errors
    /// Returns [`ReflowError::InvalidArgument`] naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == MaxConcurrency::Bounded(0) {
            return Err(ReflowError::invalid_argument(
                "max_concurrency",
                "must be greater than zero",
            ));
        }
        if self.prefetch == 0 {
            return Err(ReflowError::invalid_argument(
                "prefetch",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
