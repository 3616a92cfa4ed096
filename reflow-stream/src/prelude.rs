// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting the commonly used traits and types.
//!
//! ```ignore
//! use reflow_stream::prelude::*;
//!
//! let pipeline = from_iter(0..10)
//!     .map(|v| v * 2)
//!     .peek(|v| println!("{v}"))
//!     .flat_map(|v| just(v));
//! ```
//!
//! # Contents
//!
//! - [`PublisherExt`] - `map`, `try_map`, `flat_map`, the tap hooks, `boxed`
//! - [`IntoStream`] - consume a publisher as a `futures::Stream`
//! - Sources: [`from_iter`], [`from_once`], [`just`], [`empty`], [`error()`]
//! - Protocol: [`Publisher`], [`Subscriber`], [`Subscription`]
//! - Configuration: [`FlatMapConfig`], [`MaxConcurrency`], [`TapHooks`]

pub use crate::flat_map::{FlatMapConfig, MaxConcurrency};
pub use crate::from_iter::{empty, error, from_iter, from_once, just};
pub use crate::publisher_ext::{BoxPublisher, PublisherExt};
pub use crate::tap::TapHooks;
pub use reflow_core::{
    IntoStream, Publisher, ReflowError, StreamItem, Subscriber, Subscription,
};
