//! Real-time notifications pushed from host transitions to connected clients.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::bus::EventBus;

/// A transient bus message: which channel, what kind, and a payload.
///
/// Notifications are never persisted. Whether one is delivered at all is up
/// to the bus carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub channel: String,
    pub message_type: String,
    pub payload: JsonValue,
}

impl Notification {
    pub fn new(
        channel: impl Into<String>,
        message_type: impl Into<String>,
        payload: impl Into<JsonValue>,
    ) -> Self {
        Self {
            channel: channel.into(),
            message_type: message_type.into(),
            payload: payload.into(),
        }
    }
}

/// "Send one message" on a notification bus.
///
/// The only operation the event hooks need. Returns once the bus accepted
/// the message; delivery and ordering are the bus's business.
pub trait NotificationPublisher: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send_one(
        &self,
        channel: &str,
        message_type: &str,
        payload: JsonValue,
    ) -> Result<(), Self::Error>;
}

impl<B> NotificationPublisher for B
where
    B: EventBus<Notification>,
{
    type Error = B::Error;

    fn send_one(
        &self,
        channel: &str,
        message_type: &str,
        payload: JsonValue,
    ) -> Result<(), Self::Error> {
        tracing::debug!(channel, message_type, %payload, "publishing notification");
        self.publish(Notification::new(channel, message_type, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryEventBus;
    use std::sync::Arc;

    #[test]
    fn send_one_publishes_a_single_notification() {
        let bus = Arc::new(InMemoryEventBus::<Notification>::new());
        let sub = bus.subscribe();

        bus.send_one("handle_sale_update", "notification", JsonValue::from(42))
            .unwrap();

        let got = sub.try_recv().unwrap();
        assert_eq!(got, Notification::new("handle_sale_update", "notification", 42));
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn notification_wire_format_is_flat() {
        let n = Notification::new("ch", "notification", 7);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"channel": "ch", "message_type": "notification", "payload": 7})
        );
    }
}
