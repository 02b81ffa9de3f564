//! `saledash-events`: events, the notification bus and its subscriptions.
//!
//! The bus here is the real-time channel between host transactions and the
//! live dashboard. It carries transient [`Notification`]s only; nothing that
//! passes through it is persisted.

pub mod bus;
pub mod channel;
pub mod event;
pub mod handler;
pub mod in_memory_bus;
pub mod notification;

pub use bus::{EventBus, Subscription};
pub use channel::ChannelSubscription;
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use notification::{Notification, NotificationPublisher};
