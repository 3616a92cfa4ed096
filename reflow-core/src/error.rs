// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the reflow reactive streaming library
//!
//! This module defines the root [`ReflowError`] type. Every failure that
//! crosses a subscriber boundary through `on_error` is a `ReflowError`, so
//! the variants cover both protocol misuse and failures raised by producers
//! or user callbacks.
//!
//! # Examples
//!
//! ```
//! use reflow_core::{ReflowError, Result};
//!
//! fn validate_prefetch(prefetch: usize) -> Result<usize> {
//!     if prefetch == 0 {
//!         return Err(ReflowError::invalid_argument("prefetch", "must be greater than zero"));
//!     }
//!     Ok(prefetch)
//! }
//!
//! assert!(validate_prefetch(0).is_err());
//! ```

use std::sync::Arc;

/// Root error type for all reflow operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReflowError {
    /// An argument handed to an operator or builder was out of range.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A subscriber requested a non-positive number of items.
    ///
    /// Raised in place of item delivery; the subscription is cancelled.
    #[error("Invalid demand: requested {requested}, demand must be positive")]
    InvalidDemand {
        /// The rejected request amount
        requested: u64,
    },

    /// The protocol was violated by a producer or a subscriber.
    ///
    /// Examples are subscribing twice to a single-subscription producer or a
    /// producer emitting more items than were requested.
    #[error("Illegal state: {message}")]
    IllegalState {
        /// Description of the violation
        message: String,
    },

    /// User-provided callback function panicked
    ///
    /// Panics raised by side-effect hooks and mappers are caught and
    /// converted to this variant.
    #[error("User callback failed: {context}")]
    CallbackFailure {
        /// Information about the panic cause
        context: String,
    },

    /// A producer signalled a failure described by a message.
    #[error("Upstream failure: {context}")]
    Upstream {
        /// Description of what went wrong upstream
        context: String,
    },

    /// Custom error from user code
    ///
    /// This wraps errors produced by user-provided producers and mappers,
    /// allowing them to be propagated as a `ReflowError`.
    #[error("User error: {0}")]
    UserError(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// Multiple errors were collected while errors were deferred.
    ///
    /// The individual errors keep the order in which they were encountered.
    #[error("Multiple errors occurred: {count} errors")]
    Composite {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors in encounter order
        errors: Vec<ReflowError>,
    },

    /// An error that carries further failures raised while it was handled.
    #[error("{error} ({} suppressed)", suppressed.len())]
    Suppressed {
        /// The primary error
        error: Box<ReflowError>,
        /// Failures raised by callbacks observing the primary error
        suppressed: Vec<ReflowError>,
    },
}

impl ReflowError {
    /// Create an invalid argument error
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Create an invalid demand error for the rejected amount
    #[must_use]
    pub const fn invalid_demand(requested: u64) -> Self {
        Self::InvalidDemand { requested }
    }

    /// Create an illegal state error with the given message
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Create a callback failure with the given context
    pub fn callback_failure(context: impl Into<String>) -> Self {
        Self::CallbackFailure {
            context: context.into(),
        }
    }

    /// Create an upstream failure with the given context
    pub fn upstream(context: impl Into<String>) -> Self {
        Self::Upstream {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Arc::new(error))
    }

    /// Collapse deferred errors into the error delivered downstream.
    ///
    /// A single error is returned as is; several are wrapped in
    /// [`ReflowError::Composite`] preserving their order. Returns `None` for
    /// an empty collection.
    ///
    /// ```
    /// use reflow_core::ReflowError;
    ///
    /// let single = ReflowError::composite(vec![ReflowError::upstream("a")]).unwrap();
    /// assert!(matches!(single, ReflowError::Upstream { .. }));
    ///
    /// let many = ReflowError::composite(vec![
    ///     ReflowError::upstream("a"),
    ///     ReflowError::upstream("b"),
    /// ])
    /// .unwrap();
    /// assert!(matches!(many, ReflowError::Composite { count: 2, .. }));
    /// ```
    #[must_use]
    pub fn composite(mut errors: Vec<ReflowError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            count => Some(Self::Composite { count, errors }),
        }
    }

    /// Attach a failure raised while this error was being handled.
    #[must_use]
    pub fn with_suppressed(self, other: ReflowError) -> Self {
        match self {
            Self::Suppressed {
                error,
                mut suppressed,
            } => {
                suppressed.push(other);
                Self::Suppressed { error, suppressed }
            }
            error => Self::Suppressed {
                error: Box::new(error),
                suppressed: vec![other],
            },
        }
    }

    /// Returns the error itself, or the primary error of a `Suppressed` wrapper.
    #[must_use]
    pub fn primary(&self) -> &ReflowError {
        match self {
            Self::Suppressed { error, .. } => error.primary(),
            other => other,
        }
    }

    /// Failures attached through [`with_suppressed`](Self::with_suppressed).
    #[must_use]
    pub fn suppressed(&self) -> &[ReflowError] {
        match self {
            Self::Suppressed { suppressed, .. } => suppressed,
            _ => &[],
        }
    }

    /// Check if this error was caused by misuse of the protocol rather than by
    /// a failing producer or callback
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::InvalidDemand { .. } | Self::IllegalState { .. }
        )
    }
}

/// Specialized Result type for reflow operations
pub type Result<T> = std::result::Result<T, ReflowError>;

/// Extension trait for converting errors into `ReflowError`
///
/// Implemented for all types that implement
/// `std::error::Error + Send + Sync + 'static`.
pub trait IntoReflowError {
    /// Convert this error into a `ReflowError`
    fn into_reflow_error(self) -> ReflowError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoReflowError for E {
    fn into_reflow_error(self) -> ReflowError {
        ReflowError::user_error(self)
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Replace a user error with an upstream failure carrying the given context
    ///
    /// # Errors
    /// Returns `Err(ReflowError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ReflowError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let context = context.into();
            match e.into() {
                ReflowError::UserError(inner) => ReflowError::Upstream {
                    context: format!("{context}: {inner}"),
                },
                other => other,
            }
        })
    }
}

/// Render a caught panic payload as a [`ReflowError::CallbackFailure`].
pub(crate) fn panic_to_error(payload: &(dyn std::any::Any + Send)) -> ReflowError {
    let context = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "callback panicked".to_string()
    };
    ReflowError::callback_failure(context)
}

/// Run a user callback, converting a panic into a [`ReflowError::CallbackFailure`].
///
/// # Errors
/// Returns `CallbackFailure` if `f` panics.
pub fn catch_callback<R>(f: impl FnOnce() -> R) -> Result<R> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .map_err(|payload| panic_to_error(payload.as_ref()))
}
