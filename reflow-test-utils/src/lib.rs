// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the reflow workspace.
//!
//! - [`TestSubscriber`] records every signal and lets the test grant demand
//!   step by step.
//! - [`ManualPublisher`] is a hot publisher the test pushes items into, and
//!   which reports whether anyone is still subscribed.
//! - [`fixtures`] holds shared mapping functions and error types.
//!
//! These types are meant for tests and benchmarks, not production code.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod fixtures;
pub mod manual_publisher;
pub mod test_subscriber;

pub use fixtures::{is_divide_by_zero, six_over_one_minus, DivideByZero};
pub use manual_publisher::ManualPublisher;
pub use test_subscriber::TestSubscriber;
