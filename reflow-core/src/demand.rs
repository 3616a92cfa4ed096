// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Outstanding-demand arithmetic on atomic counters.
//!
//! Demand is a `u64` that saturates at [`UNBOUNDED`]. Once a counter reaches
//! `UNBOUNDED` it stays there: emission no longer decrements it.

use crate::error::{ReflowError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel for "emit without limit".
pub const UNBOUNDED: u64 = u64::MAX;

/// Reject non-positive requests.
///
/// # Errors
/// Returns [`ReflowError::InvalidDemand`] when `n` is zero.
pub const fn validate(n: u64) -> Result<u64> {
    if n == 0 {
        return Err(ReflowError::InvalidDemand { requested: n });
    }
    Ok(n)
}

/// Saturating addition of two demand amounts.
#[must_use]
pub const fn saturating_add(current: u64, n: u64) -> u64 {
    if current == UNBOUNDED {
        return UNBOUNDED;
    }
    match current.checked_add(n) {
        Some(total) if total < UNBOUNDED => total,
        _ => UNBOUNDED,
    }
}

/// Add `n` to `requested`, saturating at [`UNBOUNDED`].
///
/// Returns the value held before the addition, so callers can tell whether
/// demand went from zero to positive.
pub fn add(requested: &AtomicU64, n: u64) -> u64 {
    let mut current = requested.load(Ordering::Acquire);
    loop {
        if current == UNBOUNDED {
            return UNBOUNDED;
        }
        let next = saturating_add(current, n);
        match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(previous) => return previous,
            Err(actual) => current = actual,
        }
    }
}

/// Subtract `n` emitted items from `requested` unless it is [`UNBOUNDED`].
///
/// Returns the remaining demand.
pub fn produced(requested: &AtomicU64, n: u64) -> u64 {
    let mut current = requested.load(Ordering::Acquire);
    loop {
        if current == UNBOUNDED {
            return UNBOUNDED;
        }
        let next = current.saturating_sub(n);
        match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return next,
            Err(actual) => current = actual,
        }
    }
}
