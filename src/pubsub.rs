//! Channel registry for SUBSCRIBE / UNSUBSCRIBE / PUBLISH.
//!
//! Maps a channel name to the ordered list of subscriber connections. A
//! subscriber is identified by its client address and carries a shared
//! handle to the connection's writer half so PUBLISH can push message
//! frames directly. Channels with no subscribers are dropped from the map.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::RwLock;
use tracing::debug;

use crate::resp::RespValue;

pub type SubscriberWriter = Arc<RwLock<OwnedWriteHalf>>;

#[derive(Debug)]
struct Subscriber {
    client_address: String,
    writer: SubscriberWriter,
}

#[derive(Debug, Default)]
pub struct PubSubRegistry {
    channels: HashMap<String, Vec<Subscriber>>,
}

impl PubSubRegistry {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Adds the client to the channel, keeping membership idempotent, and
    /// returns the client's total subscription count after the add. The
    /// count is what the subscribe push frame reports.
    pub fn subscribe(
        &mut self,
        channel: &str,
        client_address: &str,
        writer: SubscriberWriter,
    ) -> usize {
        let subscribers = self.channels.entry(channel.to_string()).or_default();

        let already_member = subscribers
            .iter()
            .any(|subscriber| subscriber.client_address == client_address);

        if !already_member {
            subscribers.push(Subscriber {
                client_address: client_address.to_string(),
                writer,
            });
        }

        self.subscription_count(client_address)
    }

    /// Removes the client from the channel (a no-op when it was never
    /// subscribed) and returns the remaining subscription count.
    pub fn unsubscribe(&mut self, channel: &str, client_address: &str) -> usize {
        if let Some(subscribers) = self.channels.get_mut(channel) {
            subscribers.retain(|subscriber| subscriber.client_address != client_address);

            if subscribers.is_empty() {
                self.channels.remove(channel);
            }
        }

        self.subscription_count(client_address)
    }

    /// Channels the client is currently subscribed to, used by the
    /// no-argument UNSUBSCRIBE form and by connection teardown.
    pub fn channels_for_client(&self, client_address: &str) -> Vec<String> {
        self.channels
            .iter()
            .filter(|(_, subscribers)| {
                subscribers
                    .iter()
                    .any(|subscriber| subscriber.client_address == client_address)
            })
            .map(|(channel, _)| channel.clone())
            .collect()
    }

    /// Number of channels the client is subscribed to.
    pub fn subscription_count(&self, client_address: &str) -> usize {
        self.channels
            .values()
            .filter(|subscribers| {
                subscribers
                    .iter()
                    .any(|subscriber| subscriber.client_address == client_address)
            })
            .count()
    }

    /// Pushes a message frame to every subscriber of the channel, in
    /// subscription order, and returns the number of successful deliveries.
    /// A subscriber whose socket write fails is a terminated session and is
    /// dropped from the channel.
    pub async fn publish(&mut self, channel: &str, message: &str) -> usize {
        let Some(subscribers) = self.channels.get_mut(channel) else {
            return 0;
        };

        let frame = RespValue::Array(vec![
            RespValue::BulkString("message".to_string()),
            RespValue::BulkString(channel.to_string()),
            RespValue::BulkString(message.to_string()),
        ])
        .encode();

        let mut delivered = 0;
        let mut dead_subscribers = Vec::new();

        for subscriber in subscribers.iter() {
            let mut writer_guard = subscriber.writer.write().await;

            let write_result = async {
                writer_guard.write_all(frame.as_bytes()).await?;
                writer_guard.flush().await
            }
            .await;

            match write_result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    debug!(
                        "dropping subscriber {} of channel {}: {}",
                        subscriber.client_address, channel, e
                    );
                    dead_subscribers.push(subscriber.client_address.clone());
                }
            }
        }

        subscribers.retain(|subscriber| !dead_subscribers.contains(&subscriber.client_address));

        if subscribers.is_empty() {
            self.channels.remove(channel);
        }

        delivered
    }
}
