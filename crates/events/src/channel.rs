//! Channel-filtered view over a notification subscription.
//!
//! A raw [`Subscription`] sees everything published on the bus. Clients
//! instead register the channels they care about and, optionally, a single
//! message type; everything else is skipped on receive.

use std::collections::BTreeSet;
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crate::bus::Subscription;
use crate::notification::Notification;

#[derive(Debug)]
pub struct ChannelSubscription {
    inner: Subscription<Notification>,
    channels: BTreeSet<String>,
    message_type: Option<String>,
}

impl ChannelSubscription {
    pub fn new(inner: Subscription<Notification>) -> Self {
        Self {
            inner,
            channels: BTreeSet::new(),
            message_type: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.add_channel(channel);
        self
    }

    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    pub fn add_channel(&mut self, channel: impl Into<String>) {
        self.channels.insert(channel.into());
    }

    pub fn delete_channel(&mut self, channel: &str) -> bool {
        self.channels.remove(channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    /// Whether `notification` passes the channel and message-type filters.
    ///
    /// With no channels added nothing matches.
    pub fn accepts(&self, notification: &Notification) -> bool {
        if !self.channels.contains(&notification.channel) {
            return false;
        }
        match &self.message_type {
            Some(t) => *t == notification.message_type,
            None => true,
        }
    }

    /// Next matching notification already queued, if any.
    pub fn try_recv(&self) -> Result<Notification, TryRecvError> {
        loop {
            let n = self.inner.try_recv()?;
            if self.accepts(&n) {
                return Ok(n);
            }
        }
    }

    /// Block for up to `timeout` waiting for a matching notification.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Notification, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let n = self.inner.recv_timeout(remaining)?;
            if self.accepts(&n) {
                return Ok(n);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventBus, InMemoryEventBus};

    fn bus() -> InMemoryEventBus<Notification> {
        InMemoryEventBus::new()
    }

    #[test]
    fn skips_other_channels_and_types() {
        let bus = bus();
        let sub = ChannelSubscription::new(bus.subscribe())
            .with_channel("handle_sale_update")
            .with_message_type("notification");

        bus.publish(Notification::new("other", "notification", 1)).unwrap();
        bus.publish(Notification::new("handle_sale_update", "presence", 2)).unwrap();
        bus.publish(Notification::new("handle_sale_update", "notification", 3)).unwrap();

        let got = sub.try_recv().unwrap();
        assert_eq!(got.payload, serde_json::json!(3));
        assert!(matches!(sub.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn no_channels_means_nothing_matches() {
        let bus = bus();
        let sub = ChannelSubscription::new(bus.subscribe());
        bus.publish(Notification::new("a", "notification", 1)).unwrap();

        assert!(matches!(
            sub.recv_timeout(Duration::from_millis(20)),
            Err(RecvTimeoutError::Timeout)
        ));
    }

    #[test]
    fn deleted_channel_stops_matching() {
        let bus = bus();
        let mut sub = ChannelSubscription::new(bus.subscribe()).with_channel("a");
        assert!(sub.delete_channel("a"));
        assert!(!sub.delete_channel("a"));

        bus.publish(Notification::new("a", "notification", 1)).unwrap();
        assert!(sub.try_recv().is_err());
        assert_eq!(sub.channels().count(), 0);
    }
}
