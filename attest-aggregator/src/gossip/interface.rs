use attest_common::StdResult;

/// Publication of messages on a gossip topic.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GossipPublisher: Sync + Send {
    /// Publish the given message on a topic.
    ///
    /// Delivery is not guaranteed: a message published while nobody listens is lost.
    async fn publish(&self, topic: &str, message: Vec<u8>) -> StdResult<()>;
}

/// Subscription to gossip topics.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GossipSubscriber: Sync + Send {
    /// Subscribe to a topic, only the messages published after the subscription are received.
    async fn subscribe(&self, topic: &str) -> StdResult<Box<dyn GossipSubscription>>;
}

/// A live subscription to a gossip topic.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GossipSubscription: Send {
    /// Wait for the next message of the topic.
    ///
    /// Returns `None` once the subscription is closed.
    async fn next_message(&mut self) -> Option<Vec<u8>>;

    /// Stop receiving messages, pending and future messages are dropped.
    fn unsubscribe(&mut self);
}
