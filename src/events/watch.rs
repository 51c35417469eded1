//! # Cancellable watch stream.
//!
//! [`WatchStream`] wraps a [`Subscription`] with an optional
//! [`CancellationToken`]. The stream is lazy and infinite: it yields every
//! event published after it was created and ends only when the token fires
//! or the notifier is dropped. Ending (or dropping) the stream frees its
//! subscriber slot right away.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures::stream::FusedStream;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use super::bus::Subscription;
use super::event::ResourceEvent;

/// Stream of every resource event, in publish order.
pub struct WatchStream {
    sub: Subscription,
    cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    done: bool,
}

impl WatchStream {
    pub(crate) fn new(sub: Subscription, token: Option<CancellationToken>) -> Self {
        Self {
            sub,
            cancelled: token.map(|t| Box::pin(t.cancelled_owned())),
            done: false,
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.cancelled = None;
        self.sub.close();
    }
}

impl Stream for WatchStream {
    type Item = ResourceEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.done {
            return Poll::Ready(None);
        }

        if let Some(cancelled) = this.cancelled.as_mut() {
            if cancelled.as_mut().poll(cx).is_ready() {
                this.finish();
                return Poll::Ready(None);
            }
        }

        match this.sub.poll_recv(cx) {
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl FusedStream for WatchStream {
    fn is_terminated(&self) -> bool {
        self.done
    }
}
