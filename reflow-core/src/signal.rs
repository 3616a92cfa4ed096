// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::ReflowError;
use crate::protocol::Subscription;
use std::fmt;
use std::sync::Arc;

/// Discriminant of a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// `on_subscribe`
    Subscribe,
    /// `on_next`
    Next,
    /// `on_error`
    Error,
    /// `on_complete`
    Complete,
    /// `Subscription::request`
    Request,
    /// `Subscription::cancel`
    Cancel,
}

impl SignalKind {
    /// Returns `true` for the two terminal signals.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Complete)
    }
}

/// Every lifecycle event that crosses a publisher/subscriber link.
///
/// The first four travel downstream, `Request` and `Cancel` travel upstream.
pub enum Signal<T> {
    /// A subscription was handed to the subscriber
    Subscribe(Arc<dyn Subscription>),
    /// An item
    Next(T),
    /// The terminal failure
    Error(ReflowError),
    /// The terminal completion
    Complete,
    /// Demand granted by the subscriber
    Request(u64),
    /// The subscriber gave up
    Cancel,
}

impl<T> Signal<T> {
    /// The kind of this signal.
    #[must_use]
    pub const fn kind(&self) -> SignalKind {
        match self {
            Self::Subscribe(_) => SignalKind::Subscribe,
            Self::Next(_) => SignalKind::Next,
            Self::Error(_) => SignalKind::Error,
            Self::Complete => SignalKind::Complete,
            Self::Request(_) => SignalKind::Request,
            Self::Cancel => SignalKind::Cancel,
        }
    }

    /// The item carried by a `Next` signal.
    pub fn into_next(self) -> Option<T> {
        match self {
            Self::Next(item) => Some(item),
            _ => None,
        }
    }

    /// The error carried by an `Error` signal.
    pub fn into_error(self) -> Option<ReflowError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscribe(_) => f.write_str("Subscribe"),
            Self::Next(item) => f.debug_tuple("Next").field(item).finish(),
            Self::Error(error) => f.debug_tuple("Error").field(error).finish(),
            Self::Complete => f.write_str("Complete"),
            Self::Request(n) => f.debug_tuple("Request").field(n).finish(),
            Self::Cancel => f.write_str("Cancel"),
        }
    }
}
