//! Live refresh: reload dashboard data when a sale update arrives.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use saledash_events::{ChannelSubscription, EventBus, Notification};

/// Handle to control and join the refresher thread.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Background subscriber that calls `reload` for every sale update.
///
/// Only notifications on the given channels with the given message type
/// reach `reload`. A failing reload is logged and the worker keeps going.
#[derive(Debug)]
pub struct DashboardRefresher;

impl DashboardRefresher {
    pub fn spawn<B, I, H>(
        name: &'static str,
        bus: &B,
        channels: I,
        message_type: &str,
        mut reload: H,
    ) -> std::io::Result<WorkerHandle>
    where
        B: EventBus<Notification> + ?Sized,
        I: IntoIterator,
        I::Item: Into<String>,
        H: FnMut(Notification) -> anyhow::Result<()> + Send + 'static,
    {
        let mut sub = ChannelSubscription::new(bus.subscribe()).with_message_type(message_type);
        for channel in channels {
            sub.add_channel(channel);
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || refresh_loop(name, sub, shutdown_rx, &mut reload))?;

        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn refresh_loop<H>(
    name: &'static str,
    sub: ChannelSubscription,
    shutdown_rx: mpsc::Receiver<()>,
    reload: &mut H,
) where
    H: FnMut(Notification) -> anyhow::Result<()>,
{
    let tick = Duration::from_millis(250);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(notification) => {
                debug!(worker = name, channel = %notification.channel, "sale update received");
                if let Err(err) = reload(notification) {
                    warn!(worker = name, error = %err, "dashboard reload failed");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
