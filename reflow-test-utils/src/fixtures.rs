// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared fixtures for operator tests.

use reflow_core::{IntoReflowError, ReflowError};

/// Arithmetic failure raised by [`six_over_one_minus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("division by zero")]
pub struct DivideByZero;

/// Computes `6 / (1 - v)`, failing with [`DivideByZero`] for `v == 1`.
///
/// # Errors
/// Returns a user error wrapping [`DivideByZero`] when `v == 1`.
pub fn six_over_one_minus(v: i32) -> Result<i32, ReflowError> {
    6_i32
        .checked_div(1 - v)
        .ok_or_else(|| DivideByZero.into_reflow_error())
}

/// Returns `true` if `error` wraps a [`DivideByZero`].
#[must_use]
pub fn is_divide_by_zero(error: &ReflowError) -> bool {
    match error.primary() {
        ReflowError::UserError(inner) => inner.downcast_ref::<DivideByZero>().is_some(),
        _ => false,
    }
}
