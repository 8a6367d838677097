//! Gossip module
//!
//! Publish/subscribe seams used by the collection sessions, with an in-memory implementation.

mod interface;
mod memory;
mod topics;

pub use interface::{GossipPublisher, GossipSubscriber, GossipSubscription};
pub use memory::{InMemoryGossipNetwork, InMemoryGossipSubscription};
pub use topics::{GossipTopicKind, GossipTopics};

#[cfg(test)]
pub use interface::{MockGossipPublisher, MockGossipSubscriber, MockGossipSubscription};
