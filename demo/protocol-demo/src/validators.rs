use std::sync::Arc;

use anyhow::{Context, anyhow};
use slog::{Logger, debug, info};
use tokio::task::JoinHandle;

use attest_aggregator::gossip::{
    GossipPublisher, GossipSubscriber, GossipSubscription, GossipTopics, InMemoryGossipNetwork,
};
use attest_bls::BlsKeyPair;
use attest_common::StdResult;
use attest_common::entities::ContentIdentifier;
use attest_common::logging::LoggerExtensions;
use attest_common::messages::{
    CollectionRequestMessage, CollectionResponseMessage, SignatureEnvelopeMessage,
};
use attest_common::protocol::SingleSigner;

/// How a simulated validator answers a collection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorBehavior {
    /// Sign the claim once the published content matches the requested cid
    Honest,
    /// Answer with an error
    Decline,
    /// Sign something else than the claim
    Byzantine,
}

/// A validator answering a single collection request on the in-memory network.
pub struct SimulatedValidator {
    behavior: ValidatorBehavior,
    key_pair: BlsKeyPair,
    signer: SingleSigner,
    topics: GossipTopics,
    network: Arc<InMemoryGossipNetwork>,
    logger: Logger,
}

impl SimulatedValidator {
    /// SimulatedValidator factory
    pub fn new(
        behavior: ValidatorBehavior,
        key_pair: BlsKeyPair,
        topics: GossipTopics,
        network: Arc<InMemoryGossipNetwork>,
        logger: &Logger,
    ) -> StdResult<Self> {
        let signer = SingleSigner::new(key_pair.clone())
            .with_context(|| "Simulated validator requires a signing key")?;
        let logger = logger
            .new_with_component_name::<Self>()
            .new(slog::o!("validator" => signer.identity().to_string()));

        Ok(Self {
            behavior,
            key_pair,
            signer,
            topics,
            network,
            logger,
        })
    }

    /// Subscribe to the request topics then wait for a request in a background task.
    pub async fn spawn(self) -> StdResult<JoinHandle<StdResult<()>>> {
        let requests = self.network.subscribe(&self.topics.request()).await?;
        let data = self.network.subscribe(&self.topics.request_data()).await?;

        Ok(tokio::spawn(self.answer(requests, data)))
    }

    async fn answer(
        self,
        mut requests: Box<dyn GossipSubscription>,
        mut data: Box<dyn GossipSubscription>,
    ) -> StdResult<()> {
        let request = requests
            .next_message()
            .await
            .ok_or_else(|| anyhow!("Request subscription closed"))?;
        requests.unsubscribe();
        let request: CollectionRequestMessage =
            serde_json::from_slice(&request).with_context(|| "Invalid collection request")?;
        let cid = request
            .cid
            .parse::<ContentIdentifier>()
            .with_context(|| format!("Invalid cid in collection request: '{}'", request.cid))?;
        debug!(self.logger, "Collection request received"; "cid" => %cid, "behavior" => ?self.behavior);

        let response = match self.behavior {
            ValidatorBehavior::Honest => {
                let content = data.next_message().await;
                match content.map(|bytes| ContentIdentifier::for_binary(&bytes)) {
                    Some(Ok(content_cid)) if content_cid == cid => {
                        self.signer.respond_to_request(&request)?
                    }
                    _ => self.signer.decline(&cid, "content not available"),
                }
            }
            ValidatorBehavior::Decline => self.signer.decline(&cid, "content not found"),
            ValidatorBehavior::Byzantine => {
                let signature = self.key_pair.sign(b"not the claim")?;
                CollectionResponseMessage::Success {
                    cid: cid.to_string(),
                    signature: SignatureEnvelopeMessage::new(&signature, self.signer.identity())?,
                }
            }
        };
        data.unsubscribe();

        info!(self.logger, "Answering collection request"; "response" => response.message_type());
        self.network
            .publish(&self.topics.response(), response.to_bytes()?)
            .await
    }
}
