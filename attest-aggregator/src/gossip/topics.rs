use strum::{Display, EnumIter, IntoEnumIterator};

/// Kinds of gossip topics used by the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum GossipTopicKind {
    /// Collection requests
    FileUploadRequest,
    /// Raw bytes of the requested content
    FileUploadRequestData,
    /// Validators responses and proofs
    FileUploadResponse,
}

/// Names of the gossip topics of a network: `<network>-<kind>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GossipTopics {
    network: String,
}

impl GossipTopics {
    /// GossipTopics factory
    pub fn new<T: Into<String>>(network: T) -> Self {
        Self {
            network: network.into(),
        }
    }

    /// Network identifier
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Name of the topic of the given kind
    pub fn topic(&self, kind: GossipTopicKind) -> String {
        format!("{}-{kind}", self.network)
    }

    /// Topic of the collection requests
    pub fn request(&self) -> String {
        self.topic(GossipTopicKind::FileUploadRequest)
    }

    /// Topic of the requested content bytes
    pub fn request_data(&self) -> String {
        self.topic(GossipTopicKind::FileUploadRequestData)
    }

    /// Topic of the responses
    pub fn response(&self) -> String {
        self.topic(GossipTopicKind::FileUploadResponse)
    }

    /// Every topic of the network
    pub fn all(&self) -> Vec<String> {
        GossipTopicKind::iter().map(|kind| self.topic(kind)).collect()
    }
}
