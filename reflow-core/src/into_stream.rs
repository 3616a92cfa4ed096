// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consume a [`Publisher`] as a `futures::Stream`.
//!
//! The bridge subscribes immediately, requests an initial batch and tops the
//! demand up as items are polled, so a slow async consumer still exerts
//! backpressure on the publisher. Dropping the stream cancels the
//! subscription.

use crate::error::ReflowError;
use crate::protocol::{Publisher, Subscriber, Subscription};
use crate::stream_item::StreamItem;
use crate::subscription_slot::SubscriptionSlot;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use pin_project::{pin_project, pinned_drop};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Items requested up front by [`IntoStream::into_stream`].
pub const DEFAULT_BATCH: u64 = 32;

/// Conversion of a publisher into a pull-based stream.
pub trait IntoStream: Publisher + Sized {
    /// Subscribe and expose the items as a stream of [`StreamItem`].
    fn into_stream(self) -> PublisherStream<Self::Item>
    where
        Self::Item: Send + 'static,
    {
        self.into_stream_with_batch(DEFAULT_BATCH)
    }

    /// Like [`into_stream`](Self::into_stream) with a custom request batch.
    ///
    /// A zero batch is raised to one.
    fn into_stream_with_batch(self, batch: u64) -> PublisherStream<Self::Item>
    where
        Self::Item: Send + 'static,
    {
        PublisherStream::subscribe(&self, batch.max(1))
    }
}

impl<P: Publisher> IntoStream for P {}

struct ChannelSubscriber<T> {
    sender: UnboundedSender<StreamItem<T>>,
    slot: Arc<SubscriptionSlot>,
}

impl<T: Send> Subscriber<T> for ChannelSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        self.slot.set(subscription);
    }

    fn on_next(&self, item: T) {
        if self.sender.unbounded_send(StreamItem::Value(item)).is_err() {
            self.slot.cancel();
        }
    }

    fn on_error(&self, error: ReflowError) {
        self.slot.release();
        let _ = self.sender.unbounded_send(StreamItem::Error(error));
        self.sender.close_channel();
    }

    fn on_complete(&self) {
        self.slot.release();
        self.sender.close_channel();
    }
}

/// Stream returned by [`IntoStream::into_stream`].
#[pin_project(PinnedDrop)]
pub struct PublisherStream<T> {
    #[pin]
    receiver: UnboundedReceiver<StreamItem<T>>,
    slot: Arc<SubscriptionSlot>,
    limit: u64,
    consumed: u64,
}

impl<T: Send + 'static> PublisherStream<T> {
    fn subscribe<P>(publisher: &P, batch: u64) -> Self
    where
        P: Publisher<Item = T> + ?Sized,
    {
        let (sender, receiver) = mpsc::unbounded();
        let slot = Arc::new(SubscriptionSlot::new());
        slot.request(batch);
        publisher.subscribe(Arc::new(ChannelSubscriber {
            sender,
            slot: Arc::clone(&slot),
        }));
        Self {
            receiver,
            slot,
            limit: batch - batch / 4,
            consumed: 0,
        }
    }
}

impl<T> Stream for PublisherStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let polled = this.receiver.poll_next(cx);
        if let Poll::Ready(Some(StreamItem::Value(_))) = &polled {
            *this.consumed += 1;
            if *this.consumed == *this.limit {
                *this.consumed = 0;
                this.slot.request(*this.limit);
            }
        }
        polled
    }
}

#[pinned_drop]
impl<T> PinnedDrop for PublisherStream<T> {
    fn drop(self: Pin<&mut Self>) {
        self.slot.cancel();
    }
}
