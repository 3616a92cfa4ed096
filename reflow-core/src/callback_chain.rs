// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Ordered, immutable sequences of side-effect callbacks.
//!
//! A [`CallbackChain`] is built once when a pipeline is assembled and invoked
//! by iteration for every signal. Adding a callback never mutates the
//! receiver: [`combine`](CallbackChain::combine) returns a new chain that
//! shares the existing handles, so a base chain can be extended in several
//! directions independently.
//!
//! ```
//! use reflow_core::CallbackChain;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let first = Arc::clone(&seen);
//! let second = Arc::clone(&seen);
//!
//! let base = CallbackChain::<i32>::new().combine(move |v| first.lock().unwrap().push(("a", *v)));
//! let extended = base.combine(move |v| second.lock().unwrap().push(("b", *v)));
//!
//! extended.invoke(&1).unwrap();
//! base.invoke(&2).unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![("a", 1), ("b", 1), ("a", 2)]);
//! ```

use crate::error::{catch_callback, Result};
use std::fmt;
use std::sync::Arc;

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Callbacks of one signal kind, invoked in registration order.
pub struct CallbackChain<A: ?Sized> {
    callbacks: Arc<[Callback<A>]>,
}

impl<A: ?Sized> CallbackChain<A> {
    /// The identity chain: invoking it does nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            callbacks: Arc::from(Vec::new()),
        }
    }

    /// Returns a chain that runs `self` and then `callback`.
    #[must_use]
    pub fn combine<F>(&self, callback: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let callback: Callback<A> = Arc::new(callback);
        if self.callbacks.is_empty() {
            return Self {
                callbacks: Arc::from(vec![callback]),
            };
        }
        let mut callbacks = Vec::with_capacity(self.callbacks.len() + 1);
        callbacks.extend(self.callbacks.iter().cloned());
        callbacks.push(callback);
        Self {
            callbacks: Arc::from(callbacks),
        }
    }

    /// Invoke every callback with `arg`, in order.
    ///
    /// Stops at the first callback that panics; callbacks that already ran
    /// are not undone.
    ///
    /// # Errors
    /// Returns [`ReflowError::CallbackFailure`](crate::ReflowError::CallbackFailure)
    /// describing the panic.
    pub fn invoke(&self, arg: &A) -> Result<()> {
        for callback in self.callbacks.iter() {
            catch_callback(|| (**callback)(arg))?;
        }
        Ok(())
    }

    /// Returns `true` for the identity chain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl CallbackChain<()> {
    /// Returns a chain that runs `self` and then the argument-less `action`.
    #[must_use]
    pub fn combine_action<F>(&self, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.combine(move |_: &()| action())
    }

    /// Invoke every action, in order.
    ///
    /// # Errors
    /// Returns [`ReflowError::CallbackFailure`](crate::ReflowError::CallbackFailure)
    /// if an action panics.
    pub fn run(&self) -> Result<()> {
        self.invoke(&())
    }
}

impl<A: ?Sized> Clone for CallbackChain<A> {
    fn clone(&self) -> Self {
        Self {
            callbacks: Arc::clone(&self.callbacks),
        }
    }
}

impl<A: ?Sized> Default for CallbackChain<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for CallbackChain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackChain")
            .field("len", &self.callbacks.len())
            .finish()
    }
}
