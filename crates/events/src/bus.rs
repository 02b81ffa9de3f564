//! Broadcast bus carrying notifications from host hooks to listeners.
//!
//! Every subscriber that exists when a message is published receives its
//! own copy. Nothing is stored: a subscriber created afterwards never sees
//! the message, and `publish` returns as soon as the copies are queued.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Receiving end handed out by [`EventBus::subscribe`].
///
/// Owned by one consumer thread. Dropping it unsubscribes; the bus prunes
/// the dead sender on its next publish.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Publish side of the bus, shared between the host hooks and the API.
///
/// A failed publish is returned to the hook that called it and never retried.
pub trait EventBus<M>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
