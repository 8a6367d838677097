use std::sync::Arc;

use slog::{Logger, debug, info, warn};
use strum::Display;
use thiserror::Error;

use attest_bls::{
    CircuitCodec, CodecError, MemberDirectory, QuorumCircuit, SignatureCandidate,
    SignatureRejection, SignedDigest,
};
use attest_common::entities::{
    ContentIdentifier, ContentIdentifierError, DataAvailabilityClaim, DataAvailabilityProof,
};
use attest_common::logging::LoggerExtensions;
use attest_common::messages::{CollectionRequestMessage, CollectionResponseMessage};
use attest_common::{StdError, StdResult};

use crate::gossip::{GossipPublisher, GossipSubscriber, GossipTopics};
use crate::{CollectionParameters, ConfigurationError};

/// Terminal failures of a [CollectionSession].
#[derive(Error, Debug)]
pub enum CollectionError {
    /// Enough validators declined to make the quorum unreachable
    #[error("quorum unreachable: {errors} validators declined, last error: '{last_error}'")]
    QuorumUnreachable {
        /// Number of declined responses
        errors: usize,
        /// Reason of the last declined response
        last_error: String,
    },

    /// The quorum was not reached in time
    #[error("collection timed out with {collected} of the {required} required signatures")]
    Timeout {
        /// Number of accepted signatures
        collected: usize,
        /// Quorum threshold
        required: usize,
    },

    /// The response topic could not be followed
    #[error("subscription to the responses failed")]
    Subscription(#[source] StdError),

    /// A proof was requested from a circuit without any signature
    #[error("cannot build a proof without any signature")]
    EmptyCircuit,

    /// The session has already been run
    #[error("collection session already started")]
    AlreadyStarted,

    /// The parameters can not lead to a proof
    #[error("invalid collection parameters")]
    InvalidParameters(#[from] ConfigurationError),

    /// The claim of the content could not be resolved to a digest
    #[error("could not compute the digest of the claim")]
    ClaimDigest(#[source] ContentIdentifierError),

    /// The circuit could not be encoded against the directory
    #[error("could not encode the proof")]
    ProofEncoding(#[source] CodecError),
}

/// States of a [CollectionSession].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    /// Created, nothing published yet
    Init,
    /// Waiting for signatures
    Collecting,
    /// Quorum reached, the proof was built
    Finalized,
    /// Error threshold or timeout reached
    Failed,
}

impl SessionState {
    /// No message is processed in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }
}

/// Counts of the messages processed by a [CollectionSession].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Signatures folded into the circuit
    pub accepted: usize,
    /// Signatures of already accepted signers
    pub duplicate: usize,
    /// Signatures that do not verify
    pub invalid: usize,
    /// Signatures of identities outside of the directory
    pub unknown: usize,
    /// Unparsable messages, messages of other contents, proofs, or messages received in a
    /// terminal state
    pub ignored: usize,
    /// Responses of validators declining to sign
    pub declined: usize,
}

/// Outcome of the processing of one message.
#[derive(Debug)]
pub enum SessionStep {
    /// The message has no effect on the session
    Ignored,
    /// The signature was accepted, the quorum is not reached yet
    Accepted {
        /// Number of accepted signatures
        collected: usize,
    },
    /// The signature was rejected
    Rejected(SignatureRejection),
    /// A validator declined to sign, the error threshold is not reached yet
    Declined {
        /// Number of declined responses
        errors: usize,
    },
    /// The quorum is reached
    Finalized(DataAvailabilityProof),
    /// The session failed
    Failed(CollectionError),
}

/// Collection of the signatures of the data availability claim of one content.
///
/// The session owns its [QuorumCircuit]: messages are processed one at a time, in arrival
/// order, by [Self::handle_message].
pub struct CollectionSession {
    cid: ContentIdentifier,
    directory: Arc<MemberDirectory>,
    parameters: CollectionParameters,
    topics: GossipTopics,
    publisher: Arc<dyn GossipPublisher>,
    subscriber: Arc<dyn GossipSubscriber>,
    payload: Option<Vec<u8>>,
    circuit: QuorumCircuit,
    state: SessionState,
    errors: usize,
    last_error: Option<String>,
    report: SessionReport,
    logger: Logger,
}

impl CollectionSession {
    /// Create a session, failing if its parameters can not lead to a proof against the
    /// directory.
    pub fn new(
        cid: ContentIdentifier,
        directory: Arc<MemberDirectory>,
        parameters: CollectionParameters,
        topics: GossipTopics,
        publisher: Arc<dyn GossipPublisher>,
        subscriber: Arc<dyn GossipSubscriber>,
        logger: Logger,
    ) -> Result<Self, CollectionError> {
        parameters.validate(directory.len())?;
        let digest = DataAvailabilityClaim::new(cid)
            .to_message()
            .compute_digest()
            .map_err(CollectionError::ClaimDigest)?;

        Ok(Self {
            cid,
            directory,
            parameters,
            topics,
            publisher,
            subscriber,
            payload: None,
            circuit: QuorumCircuit::new(digest),
            state: SessionState::Init,
            errors: 0,
            last_error: None,
            report: SessionReport::default(),
            logger: logger
                .new_with_component_name::<Self>()
                .new_with_cid(&cid.to_string()),
        })
    }

    /// Publish the given content bytes on the request data topic after the request.
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Content the session collects signatures for
    pub fn cid(&self) -> ContentIdentifier {
        self.cid
    }

    /// Digest every validator signs
    pub fn digest(&self) -> &SignedDigest {
        self.circuit.digest()
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Counts of the processed messages
    pub fn report(&self) -> SessionReport {
        self.report
    }

    /// Circuit holding the accepted signatures
    pub fn circuit(&self) -> &QuorumCircuit {
        &self.circuit
    }

    /// Process one message received on the response topic.
    ///
    /// A session fed directly, without [Self::run], starts collecting on its first message.
    pub fn handle_message(&mut self, message: &[u8]) -> SessionStep {
        if self.state.is_terminal() {
            debug!(self.logger, "Message dropped, session is over"; "state" => %self.state);
            return self.ignore();
        }
        self.state = SessionState::Collecting;

        let response = match CollectionResponseMessage::try_from_bytes(message) {
            Ok(response) => response,
            Err(error) => {
                debug!(self.logger, "Unparsable message ignored"; "error" => %error);
                return self.ignore();
            }
        };
        if response.cid() != self.cid.to_string() {
            return self.ignore();
        }

        match response {
            CollectionResponseMessage::Success { signature, .. } => {
                match signature.to_candidate() {
                    Ok(candidate) => self.add_candidate(candidate),
                    Err(error) => {
                        debug!(self.logger, "Malformed signature ignored"; "error" => %error);
                        self.ignore()
                    }
                }
            }
            CollectionResponseMessage::Error { error, .. } => self.decline(error),
            CollectionResponseMessage::Proof { .. } => {
                debug!(self.logger, "Proof message ignored");
                self.ignore()
            }
        }
    }

    fn ignore(&mut self) -> SessionStep {
        self.report.ignored += 1;
        SessionStep::Ignored
    }

    fn add_candidate(&mut self, candidate: SignatureCandidate) -> SessionStep {
        let identity = candidate.identity.clone();
        match self.circuit.add_with_directory(candidate, &self.directory) {
            Ok(()) => {
                self.report.accepted += 1;
                let collected = self.circuit.quorum_size();
                debug!(
                    self.logger, "Signature accepted";
                    "signer" => %identity, "collected" => collected,
                    "required" => self.parameters.quorum_threshold
                );

                if collected >= self.parameters.quorum_threshold {
                    self.finalize()
                } else {
                    SessionStep::Accepted { collected }
                }
            }
            Err(rejection) => {
                match &rejection {
                    SignatureRejection::DuplicateSigner(_) => self.report.duplicate += 1,
                    SignatureRejection::UnknownSigner(_) => self.report.unknown += 1,
                    SignatureRejection::InvalidSignature(_) => self.report.invalid += 1,
                }
                warn!(self.logger, "Signature rejected"; "reason" => %rejection);

                SessionStep::Rejected(rejection)
            }
        }
    }

    fn decline(&mut self, error: String) -> SessionStep {
        self.report.declined += 1;
        self.errors += 1;
        warn!(
            self.logger, "Validator declined to sign";
            "error" => &error, "errors" => self.errors,
            "error_threshold" => self.parameters.error_threshold
        );
        self.last_error = Some(error);

        if self.errors >= self.parameters.error_threshold {
            self.state = SessionState::Failed;
            SessionStep::Failed(CollectionError::QuorumUnreachable {
                errors: self.errors,
                last_error: self.last_error.clone().unwrap_or_default(),
            })
        } else {
            SessionStep::Declined {
                errors: self.errors,
            }
        }
    }

    fn finalize(&mut self) -> SessionStep {
        match self.build_proof() {
            Ok(proof) => {
                self.state = SessionState::Finalized;
                SessionStep::Finalized(proof)
            }
            Err(error) => {
                self.state = SessionState::Failed;
                SessionStep::Failed(error)
            }
        }
    }

    fn build_proof(&self) -> Result<DataAvailabilityProof, CollectionError> {
        self.circuit
            .verify()
            .map_err(|e| CollectionError::ProofEncoding(CodecError::InvalidProof(e)))?;
        let signature =
            CircuitCodec::encode(&self.circuit, &self.directory).map_err(|e| match e {
                CodecError::EmptyCircuit => CollectionError::EmptyCircuit,
                e => CollectionError::ProofEncoding(e),
            })?;

        DataAvailabilityProof::new(self.cid, signature, self.directory.epoch())
            .map_err(CollectionError::ClaimDigest)
    }

    async fn publish(&self, topic: String, message: StdResult<Vec<u8>>) {
        let result = match message {
            Ok(message) => self.publisher.publish(&topic, message).await,
            Err(error) => Err(error),
        };
        if let Err(error) = result {
            warn!(self.logger, "Publication failed"; "topic" => topic, "error" => ?error);
        }
    }

    /// Subscribe to the responses, publish the request then collect signatures until the
    /// quorum is reached, the error threshold is reached or the timeout expires.
    pub async fn run(&mut self) -> Result<DataAvailabilityProof, CollectionError> {
        if self.state != SessionState::Init {
            return Err(CollectionError::AlreadyStarted);
        }
        self.state = SessionState::Collecting;

        let result = self.collect().await;
        if result.is_err() {
            self.state = SessionState::Failed;
        }

        match &result {
            Ok(proof) => info!(
                self.logger, "Collection finalized";
                "signers" => proof.signers_count(), "report" => ?self.report
            ),
            Err(error) => warn!(
                self.logger, "Collection failed";
                "error" => %error, "report" => ?self.report
            ),
        }

        result
    }

    async fn collect(&mut self) -> Result<DataAvailabilityProof, CollectionError> {
        let mut subscription = self
            .subscriber
            .subscribe(&self.topics.response())
            .await
            .map_err(CollectionError::Subscription)?;

        info!(
            self.logger, "Collection started";
            "quorum_threshold" => self.parameters.quorum_threshold,
            "error_threshold" => self.parameters.error_threshold,
            "timeout_ms" => self.parameters.timeout.as_millis() as u64,
            "directory_size" => self.directory.len(),
            "epoch" => %self.directory.epoch()
        );
        let request = serde_json::to_vec(&CollectionRequestMessage::new(&self.cid))
            .map_err(anyhow::Error::from);
        self.publish(self.topics.request(), request).await;
        if let Some(payload) = self.payload.clone() {
            self.publish(self.topics.request_data(), Ok(payload)).await;
        }

        let deadline = tokio::time::sleep(self.parameters.timeout);
        tokio::pin!(deadline);

        let result = loop {
            tokio::select! {
                _ = &mut deadline => {
                    break Err(CollectionError::Timeout {
                        collected: self.circuit.quorum_size(),
                        required: self.parameters.quorum_threshold,
                    });
                }
                message = subscription.next_message() => {
                    let Some(message) = message else {
                        break Err(CollectionError::Subscription(anyhow::anyhow!(
                            "response subscription closed"
                        )));
                    };
                    match self.handle_message(&message) {
                        SessionStep::Finalized(proof) => break Ok(proof),
                        SessionStep::Failed(error) => break Err(error),
                        _ => {}
                    }
                }
            }
        };
        subscription.unsubscribe();

        result
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::anyhow;

    use attest_bls::{BlsKeyPair, DirectoryEpoch};
    use attest_common::messages::SignatureEnvelopeMessage;
    use attest_common::test_utils::{AttestFixture, AttestFixtureBuilder, TestLogger};

    use crate::gossip::{
        InMemoryGossipNetwork, MockGossipPublisher, MockGossipSubscriber, MockGossipSubscription,
    };

    use super::*;

    fn fixture() -> AttestFixture {
        AttestFixtureBuilder::default().with_members(4).build()
    }

    fn session_with(
        fixture: &AttestFixture,
        quorum_threshold: usize,
        error_threshold: usize,
    ) -> CollectionSession {
        let network = Arc::new(InMemoryGossipNetwork::new(TestLogger::stdout()));

        CollectionSession::new(
            fixture.content(),
            Arc::new(fixture.directory()),
            CollectionParameters::new(
                quorum_threshold,
                error_threshold,
                Duration::from_secs(60),
            ),
            GossipTopics::new("devnet"),
            network.clone(),
            network,
            TestLogger::stdout(),
        )
        .unwrap()
    }

    fn outsider_response(fixture: &AttestFixture, seed: u8) -> Vec<u8> {
        let outsider = BlsKeyPair::from_seed(&[seed; 32]).unwrap();
        let signature = outsider.sign(fixture.signed_digest().as_bytes()).unwrap();

        CollectionResponseMessage::Success {
            cid: fixture.content().to_string(),
            signature: SignatureEnvelopeMessage::new(&signature, &outsider.identity()).unwrap(),
        }
        .to_bytes()
        .unwrap()
    }

    fn forged_response(fixture: &AttestFixture, position: usize) -> Vec<u8> {
        let member = fixture.member(position);
        let signature = member.key_pair.sign(b"another digest").unwrap();

        CollectionResponseMessage::Success {
            cid: fixture.content().to_string(),
            signature: SignatureEnvelopeMessage::new(&signature, member.identity()).unwrap(),
        }
        .to_bytes()
        .unwrap()
    }

    #[test]
    fn invalid_parameters_are_rejected_before_anything_is_published() {
        let fixture = fixture();
        let mut publisher = MockGossipPublisher::new();
        publisher.expect_publish().never();
        let mut subscriber = MockGossipSubscriber::new();
        subscriber.expect_subscribe().never();

        let result = CollectionSession::new(
            fixture.content(),
            Arc::new(fixture.directory()),
            CollectionParameters::new(5, 1, Duration::from_secs(1)),
            GossipTopics::new("devnet"),
            Arc::new(publisher),
            Arc::new(subscriber),
            TestLogger::stdout(),
        );

        assert!(matches!(
            result,
            Err(CollectionError::InvalidParameters(
                ConfigurationError::QuorumAboveDirectorySize {
                    quorum_threshold: 5,
                    directory_size: 4
                }
            ))
        ));
    }

    #[test]
    fn session_digest_is_the_claim_digest() {
        let fixture = fixture();
        let session = session_with(&fixture, 2, 1);

        assert_eq!(&fixture.signed_digest(), session.digest());
        assert_eq!(SessionState::Init, session.state());
    }

    #[test]
    fn quorum_of_b_and_d_builds_bitmask_0101() {
        let fixture = fixture();
        let mut session = session_with(&fixture, 2, 1);

        let step = session.handle_message(&fixture.success_response_bytes(1));
        assert!(matches!(step, SessionStep::Accepted { collected: 1 }));
        assert_eq!(SessionState::Collecting, session.state());

        let SessionStep::Finalized(proof) =
            session.handle_message(&fixture.success_response_bytes(3))
        else {
            panic!("Session should be finalized on the second distinct signature");
        };

        assert_eq!(SessionState::Finalized, session.state());
        assert_eq!("0101", proof.signature.bitmask.to_bit_string(4));
        assert_eq!(vec![0x50u8], proof.signature.bitmask.as_bytes());
        assert_eq!(fixture.content(), proof.cid);
        assert_eq!(fixture.epoch(), proof.epoch);
        assert_eq!(
            DataAvailabilityClaim::new(fixture.content())
                .claim_identifier()
                .unwrap(),
            proof.data
        );
    }

    #[test]
    fn quorum_is_reached_on_the_third_distinct_valid_signature_only() {
        let fixture = fixture();
        let mut session = session_with(&fixture, 3, 3);

        let noise = [
            fixture.success_response_bytes(0),
            fixture.success_response_bytes(0),
            forged_response(&fixture, 1),
            outsider_response(&fixture, 42),
            fixture.decline_response_bytes(2, "not found"),
            fixture.success_response_bytes(1),
            b"garbage".to_vec(),
            fixture.success_response_bytes(1),
            fixture.decline_response_bytes(3, "not found"),
        ];
        for message in &noise {
            let step = session.handle_message(message);
            assert!(
                !matches!(step, SessionStep::Finalized(_) | SessionStep::Failed(_)),
                "Unexpected terminal step {step:?}"
            );
        }
        assert_eq!(2, session.circuit().quorum_size());

        let step = session.handle_message(&fixture.success_response_bytes(2));

        assert!(matches!(step, SessionStep::Finalized(_)));
        assert_eq!(
            SessionReport {
                accepted: 3,
                duplicate: 2,
                invalid: 1,
                unknown: 1,
                ignored: 1,
                declined: 2,
            },
            session.report()
        );
    }

    #[test]
    fn error_threshold_makes_the_quorum_unreachable() {
        let fixture = fixture();
        let mut session = session_with(&fixture, 3, 2);

        let step = session.handle_message(&fixture.decline_response_bytes(0, "not found"));
        assert!(matches!(step, SessionStep::Declined { errors: 1 }));

        let step = session.handle_message(&fixture.decline_response_bytes(1, "disk full"));

        match step {
            SessionStep::Failed(CollectionError::QuorumUnreachable { errors, last_error }) => {
                assert_eq!(2, errors);
                assert_eq!("disk full", last_error);
            }
            step => panic!("Expected QuorumUnreachable, got {step:?}"),
        }
        assert_eq!(SessionState::Failed, session.state());
    }

    #[test]
    fn rejections_do_not_count_as_errors() {
        let fixture = fixture();
        let mut session = session_with(&fixture, 2, 1);

        assert!(matches!(
            session.handle_message(&outsider_response(&fixture, 7)),
            SessionStep::Rejected(SignatureRejection::UnknownSigner(_))
        ));
        assert!(matches!(
            session.handle_message(&forged_response(&fixture, 0)),
            SessionStep::Rejected(SignatureRejection::InvalidSignature(_))
        ));
        assert_eq!(SessionState::Collecting, session.state());
    }

    #[test]
    fn messages_of_other_contents_and_proofs_are_ignored() {
        let fixture = fixture();
        let other = AttestFixtureBuilder::default()
            .with_members(4)
            .with_content("another contract")
            .build();
        let mut session = session_with(&fixture, 2, 1);

        let messages = [
            other.success_response_bytes(0),
            other.decline_response_bytes(0, "not found"),
            br#"{"type":"proof","cid":"x","data":"y","signature":{"sig":"","bv":""}}"#.to_vec(),
        ];
        for message in &messages {
            assert!(matches!(
                session.handle_message(message),
                SessionStep::Ignored
            ));
        }

        let proof = CollectionResponseMessage::Proof {
            cid: fixture.content().to_string(),
            data: fixture.content().to_string(),
            signature: attest_common::messages::ProofMessage {
                sig: String::new(),
                bv: String::new(),
            },
            epoch: None,
        };
        assert!(matches!(
            session.handle_message(&proof.to_bytes().unwrap()),
            SessionStep::Ignored
        ));
        assert_eq!(4, session.report().ignored);
        assert_eq!(0, session.report().declined);
    }

    #[test]
    fn terminal_session_drops_every_message() {
        let fixture = fixture();
        let mut session = session_with(&fixture, 1, 1);
        assert!(matches!(
            session.handle_message(&fixture.success_response_bytes(0)),
            SessionStep::Finalized(_)
        ));

        for message in [
            fixture.success_response_bytes(1),
            fixture.decline_response_bytes(2, "not found"),
        ] {
            assert!(matches!(
                session.handle_message(&message),
                SessionStep::Ignored
            ));
        }
        assert_eq!(1, session.circuit().quorum_size());
        assert_eq!(SessionState::Finalized, session.state());
    }

    #[tokio::test(start_paused = true)]
    async fn session_times_out_without_qualifying_message() {
        let fixture = fixture();
        let mut session = session_with(&fixture, 2, 1);

        let error = session.run().await.expect_err("Session should time out");

        assert!(matches!(
            error,
            CollectionError::Timeout {
                collected: 0,
                required: 2
            }
        ));
        assert_eq!(SessionState::Failed, session.state());
    }

    #[tokio::test(start_paused = true)]
    async fn run_cannot_be_called_twice() {
        let fixture = fixture();
        let mut session = session_with(&fixture, 2, 1);
        session.run().await.expect_err("Session should time out");

        let error = session.run().await.expect_err("Session can only run once");

        assert!(matches!(error, CollectionError::AlreadyStarted));
    }

    #[tokio::test]
    async fn subscription_failure_fails_the_session() {
        let fixture = fixture();
        let mut subscriber = MockGossipSubscriber::new();
        subscriber
            .expect_subscribe()
            .returning(|_| Err(anyhow!("network down")))
            .times(1);
        let mut publisher = MockGossipPublisher::new();
        publisher.expect_publish().never();
        let mut session = CollectionSession::new(
            fixture.content(),
            Arc::new(fixture.directory()),
            CollectionParameters::new(2, 1, Duration::from_secs(1)),
            GossipTopics::new("devnet"),
            Arc::new(publisher),
            Arc::new(subscriber),
            TestLogger::stdout(),
        )
        .unwrap();

        let error = session.run().await.expect_err("Session should fail");

        assert!(matches!(error, CollectionError::Subscription(_)));
        assert_eq!(SessionState::Failed, session.state());
    }

    #[tokio::test]
    async fn publication_failure_does_not_fail_the_session() {
        let fixture = fixture();
        let responses = vec![
            fixture.success_response_bytes(0),
            fixture.success_response_bytes(2),
        ];
        let mut subscriber = MockGossipSubscriber::new();
        subscriber
            .expect_subscribe()
            .withf(|topic| topic.to_string() == "devnet-file-upload-response")
            .returning(move |_| {
                let mut responses = responses.clone().into_iter();
                let mut subscription = MockGossipSubscription::new();
                subscription
                    .expect_next_message()
                    .returning(move || responses.next());
                subscription.expect_unsubscribe().times(1).return_const(());
                Ok(Box::new(subscription))
            })
            .times(1);
        let mut publisher = MockGossipPublisher::new();
        publisher
            .expect_publish()
            .withf(|topic, _| topic.to_string() == "devnet-file-upload-request")
            .returning(|_, _| Err(anyhow!("publication failed")))
            .times(1);
        let mut session = CollectionSession::new(
            fixture.content(),
            Arc::new(fixture.directory()),
            CollectionParameters::new(2, 1, Duration::from_secs(1)),
            GossipTopics::new("devnet"),
            Arc::new(publisher),
            Arc::new(subscriber),
            TestLogger::stdout(),
        )
        .unwrap();

        let proof = session.run().await.expect("Session should be finalized");

        assert_eq!("1010", proof.signature.bitmask.to_bit_string(4));
    }

    #[tokio::test]
    async fn payload_is_published_after_the_request() {
        let fixture = AttestFixtureBuilder::default()
            .with_members(1)
            .with_epoch(DirectoryEpoch(2))
            .build();
        let response = fixture.success_response_bytes(0);
        let mut subscriber = MockGossipSubscriber::new();
        subscriber.expect_subscribe().returning(move |_| {
            let mut responses = vec![response.clone()].into_iter();
            let mut subscription = MockGossipSubscription::new();
            subscription
                .expect_next_message()
                .returning(move || responses.next());
            subscription.expect_unsubscribe().return_const(());
            Ok(Box::new(subscription))
        });
        let mut sequence = mockall::Sequence::new();
        let mut publisher = MockGossipPublisher::new();
        let expected_request =
            serde_json::to_vec(&CollectionRequestMessage::new(&fixture.content())).unwrap();
        publisher
            .expect_publish()
            .withf(move |topic, message| {
                topic.to_string() == "devnet-file-upload-request" && message == &expected_request
            })
            .returning(|_, _| Ok(()))
            .times(1)
            .in_sequence(&mut sequence);
        let expected_payload = fixture.content_bytes().to_vec();
        publisher
            .expect_publish()
            .withf(move |topic, message| {
                topic.to_string() == "devnet-file-upload-request-data" && message == &expected_payload
            })
            .returning(|_, _| Ok(()))
            .times(1)
            .in_sequence(&mut sequence);
        let mut session = CollectionSession::new(
            fixture.content(),
            Arc::new(fixture.directory()),
            CollectionParameters::new(1, 1, Duration::from_secs(1)),
            GossipTopics::new("devnet"),
            Arc::new(publisher),
            Arc::new(subscriber),
            TestLogger::stdout(),
        )
        .unwrap()
        .with_payload(fixture.content_bytes().to_vec());

        let proof = session.run().await.unwrap();

        assert_eq!(DirectoryEpoch(2), proof.epoch);
    }

    #[tokio::test]
    async fn closed_subscription_fails_the_session() {
        let fixture = fixture();
        let mut subscriber = MockGossipSubscriber::new();
        subscriber.expect_subscribe().returning(|_| {
            let mut subscription = MockGossipSubscription::new();
            subscription.expect_next_message().returning(|| None);
            subscription.expect_unsubscribe().return_const(());
            Ok(Box::new(subscription))
        });
        let mut publisher = MockGossipPublisher::new();
        publisher.expect_publish().returning(|_, _| Ok(()));
        let mut session = CollectionSession::new(
            fixture.content(),
            Arc::new(fixture.directory()),
            CollectionParameters::new(2, 1, Duration::from_secs(1)),
            GossipTopics::new("devnet"),
            Arc::new(publisher),
            Arc::new(subscriber),
            TestLogger::stdout(),
        )
        .unwrap();

        let error = session.run().await.expect_err("Session should fail");

        assert!(matches!(error, CollectionError::Subscription(_)));
    }
}
