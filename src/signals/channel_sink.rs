use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::base::CredentialSink;

/// A `CredentialSink` backed by a tokio broadcast channel. The host
/// application subscribes once and observes every credential rotation.
pub struct ChannelSink {
    tx: broadcast::Sender<String>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        ChannelSink { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl CredentialSink for ChannelSink {
    async fn publish(&self, access_token: &str) {
        // A send error only means nobody is subscribed yet.
        if self.tx.send(access_token.to_string()).is_err() {
            debug!("no subscribers for refreshed credential broadcast");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_sees_published_credential() {
        let sink = ChannelSink::new(4);
        let mut rx = sink.subscribe();
        sink.publish("t2").await;
        assert_eq!(rx.recv().await.expect("credential expected"), "t2");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let sink = ChannelSink::new(4);
        sink.publish("t2").await;
    }
}
