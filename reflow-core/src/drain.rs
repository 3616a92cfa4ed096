// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Serialized execution of emission logic.
//!
//! A [`DrainCoordinator`] guarantees that at most one thread runs the
//! emission pass of a subscription at any instant. Threads that signal work
//! while a pass is running return immediately; the running thread (the
//! *executor*) performs another pass on their behalf before it leaves.
//!
//! Because re-entrant calls only bump the counter, a subscriber that calls
//! `request` from inside `on_next` does not recurse into the producer: the
//! extra work is picked up by the executor's loop. This keeps the stack flat
//! for synchronous sources of any length.
//!
//! ```
//! use reflow_core::DrainCoordinator;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let coordinator = DrainCoordinator::new();
//! let passes = AtomicUsize::new(0);
//!
//! coordinator.drain(|| {
//!     passes.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! assert_eq!(passes.load(Ordering::Relaxed), 1);
//! assert!(!coordinator.is_draining());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

/// Trampoline guard around a "work in progress" counter.
#[derive(Debug, Default)]
pub struct DrainCoordinator {
    wip: AtomicUsize,
}

impl DrainCoordinator {
    /// Create an idle coordinator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wip: AtomicUsize::new(0),
        }
    }

    /// Register one unit of work.
    ///
    /// Returns `true` when the caller became the executor and must call
    /// [`leave`](Self::leave) after each pass until it returns `0`.
    /// Prefer [`drain`](Self::drain), which runs that loop.
    #[must_use]
    pub fn enter(&self) -> bool {
        self.wip.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Retire the `missed` units of work observed by the executor.
    ///
    /// Returns the number of units signalled meanwhile; `0` means the
    /// executor role has been released.
    #[must_use]
    pub fn leave(&self, missed: usize) -> usize {
        self.wip.fetch_sub(missed, Ordering::AcqRel) - missed
    }

    /// Signal work and, if no other thread is draining, run `pass` until no
    /// more work has been signalled.
    pub fn drain(&self, mut pass: impl FnMut()) {
        if !self.enter() {
            return;
        }
        let mut missed = 1;
        loop {
            pass();
            missed = self.leave(missed);
            if missed == 0 {
                break;
            }
        }
    }

    /// Returns `true` while an executor is inside its loop.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.wip.load(Ordering::Acquire) != 0
    }
}
