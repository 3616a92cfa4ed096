// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflow_core::{CallbackChain, ReflowError, Result, Signal, Subscription};
use std::fmt;
use std::sync::Arc;

/// The six side-effect chains run by a [`TapPublisher`](super::TapPublisher).
///
/// Registering a hook returns a new value sharing the existing callbacks;
/// the receiver is left untouched, so one set of hooks can seed several
/// differently-tapped pipelines.
pub struct TapHooks<T> {
    on_subscribe: CallbackChain<Arc<dyn Subscription>>,
    on_next: CallbackChain<T>,
    on_error: CallbackChain<ReflowError>,
    on_complete: CallbackChain<()>,
    on_request: CallbackChain<u64>,
    on_cancel: CallbackChain<()>,
}

impl<T> TapHooks<T> {
    /// Hooks that do nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_subscribe: CallbackChain::new(),
            on_next: CallbackChain::new(),
            on_error: CallbackChain::new(),
            on_complete: CallbackChain::new(),
            on_request: CallbackChain::new(),
            on_cancel: CallbackChain::new(),
        }
    }

    /// Add a hook observing the upstream subscription.
    #[must_use]
    pub fn on_subscribe<F>(&self, f: F) -> Self
    where
        F: Fn(&Arc<dyn Subscription>) + Send + Sync + 'static,
    {
        Self {
            on_subscribe: self.on_subscribe.combine(f),
            ..self.clone()
        }
    }

    /// Add a hook observing every item.
    #[must_use]
    pub fn on_next<F>(&self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            on_next: self.on_next.combine(f),
            ..self.clone()
        }
    }

    /// Add a hook observing the terminal error.
    #[must_use]
    pub fn on_error<F>(&self, f: F) -> Self
    where
        F: Fn(&ReflowError) + Send + Sync + 'static,
    {
        Self {
            on_error: self.on_error.combine(f),
            ..self.clone()
        }
    }

    /// Add a hook run on completion.
    #[must_use]
    pub fn on_complete<F>(&self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            on_complete: self.on_complete.combine_action(f),
            ..self.clone()
        }
    }

    /// Add a hook run on either terminal signal.
    ///
    /// The action joins the error chain and the completion chain, after the
    /// hooks already registered on each.
    #[must_use]
    pub fn on_terminate<F>(&self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let action = Arc::new(f);
        let on_error = Arc::clone(&action);
        Self {
            on_error: self.on_error.combine(move |_: &ReflowError| on_error()),
            on_complete: self.on_complete.combine_action(move || action()),
            ..self.clone()
        }
    }

    /// Add a hook observing demand granted downstream.
    #[must_use]
    pub fn on_request<F>(&self, f: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        Self {
            on_request: self.on_request.combine(move |n: &u64| f(*n)),
            ..self.clone()
        }
    }

    /// Add a hook run when downstream cancels.
    #[must_use]
    pub fn on_cancel<F>(&self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            on_cancel: self.on_cancel.combine_action(f),
            ..self.clone()
        }
    }

    /// Run the chain matching `signal`.
    ///
    /// # Errors
    /// Returns the [`ReflowError::CallbackFailure`] of the first hook that
    /// panicked; the hooks after it in the chain are skipped.
    pub fn fire(&self, signal: &Signal<T>) -> Result<()> {
        match signal {
            Signal::Subscribe(subscription) => self.on_subscribe.invoke(subscription),
            Signal::Next(item) => self.on_next.invoke(item),
            Signal::Error(error) => self.on_error.invoke(error),
            Signal::Complete => self.on_complete.run(),
            Signal::Request(n) => self.on_request.invoke(n),
            Signal::Cancel => self.on_cancel.run(),
        }
    }

    /// Returns `true` when no hook is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on_subscribe.is_empty()
            && self.on_next.is_empty()
            && self.on_error.is_empty()
            && self.on_complete.is_empty()
            && self.on_request.is_empty()
            && self.on_cancel.is_empty()
    }
}

impl<T> Clone for TapHooks<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: self.on_subscribe.clone(),
            on_next: self.on_next.clone(),
            on_error: self.on_error.clone(),
            on_complete: self.on_complete.clone(),
            on_request: self.on_request.clone(),
            on_cancel: self.on_cancel.clone(),
        }
    }
}

impl<T> Default for TapHooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TapHooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapHooks")
            .field("on_subscribe", &self.on_subscribe.len())
            .field("on_next", &self.on_next.len())
            .field("on_error", &self.on_error.len())
            .field("on_complete", &self.on_complete.len())
            .field("on_request", &self.on_request.len())
            .field("on_cancel", &self.on_cancel.len())
            .finish()
    }
}
