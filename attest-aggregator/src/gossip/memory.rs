use std::collections::{HashMap, VecDeque};

use slog::{Logger, debug, warn};
use tokio::sync::{Mutex, broadcast};

use attest_common::StdResult;
use attest_common::logging::LoggerExtensions;

use super::{GossipPublisher, GossipSubscriber, GossipSubscription};

const DEFAULT_TOPIC_CAPACITY: usize = 1024;

/// A gossip network living in memory, each topic being a [broadcast] channel.
///
/// The last `capacity` messages published on a topic are kept in its history.
pub struct InMemoryGossipNetwork {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>,
    history: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
    logger: Logger,
}

impl InMemoryGossipNetwork {
    /// Create a network whose topics buffer up to 1024 messages per subscriber.
    pub fn new(logger: Logger) -> Self {
        Self::with_capacity(DEFAULT_TOPIC_CAPACITY, logger)
    }

    /// Create a network whose topics buffer up to `capacity` messages per subscriber.
    pub fn with_capacity(capacity: usize, logger: Logger) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            logger: logger.new_with_component_name::<Self>(),
        }
    }

    async fn sender(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Latest messages published on a topic, in publication order
    pub async fn published_messages(&self, topic: &str) -> Vec<Vec<u8>> {
        self.history
            .lock()
            .await
            .get(topic)
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of live subscriptions on a topic
    pub async fn subscribers_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .await
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl GossipPublisher for InMemoryGossipNetwork {
    async fn publish(&self, topic: &str, message: Vec<u8>) -> StdResult<()> {
        {
            let mut history = self.history.lock().await;
            let messages = history.entry(topic.to_string()).or_default();
            if messages.len() == self.capacity {
                messages.pop_front();
            }
            messages.push_back(message.clone());
        }

        let sender = self.sender(topic).await;
        match sender.send(message) {
            Ok(receivers) => {
                debug!(self.logger, "Message published"; "topic" => topic, "receivers" => receivers);
            }
            Err(_) => {
                debug!(self.logger, "Message published without any subscriber"; "topic" => topic);
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl GossipSubscriber for InMemoryGossipNetwork {
    async fn subscribe(&self, topic: &str) -> StdResult<Box<dyn GossipSubscription>> {
        let receiver = self.sender(topic).await.subscribe();
        debug!(self.logger, "New subscription"; "topic" => topic);

        Ok(Box::new(InMemoryGossipSubscription {
            topic: topic.to_string(),
            receiver: Some(receiver),
            logger: self.logger.clone(),
        }))
    }
}

/// Subscription to a topic of an [InMemoryGossipNetwork].
pub struct InMemoryGossipSubscription {
    topic: String,
    receiver: Option<broadcast::Receiver<Vec<u8>>>,
    logger: Logger,
}

#[async_trait::async_trait]
impl GossipSubscription for InMemoryGossipSubscription {
    async fn next_message(&mut self) -> Option<Vec<u8>> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        self.logger, "Subscription lagging, messages dropped";
                        "topic" => &self.topic, "skipped" => skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn unsubscribe(&mut self) {
        if self.receiver.take().is_some() {
            debug!(self.logger, "Unsubscribed"; "topic" => &self.topic);
        }
    }
}
