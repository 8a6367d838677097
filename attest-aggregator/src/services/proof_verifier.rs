use std::sync::Arc;

use slog::{Logger, debug, warn};
use thiserror::Error;

use attest_bls::{
    CircuitCodec, CodecError, DirectoryEpoch, Identity, MalformedProofError, MemberDirectory,
};
use attest_common::StdError;
use attest_common::entities::{ContentIdentifier, ContentIdentifierError, DataAvailabilityProof};
use attest_common::logging::LoggerExtensions;
use attest_common::messages::{CollectionResponseMessage, MessageError};

use super::MemberDirectoryProvider;

/// Reasons for rejecting a whole proof.
#[derive(Error, Debug)]
pub enum ProofVerificationError {
    /// The proof message can not be read
    #[error("invalid proof message")]
    InvalidMessage(#[source] MessageError),

    /// The bitmask does not fit the directory
    #[error("malformed proof")]
    Malformed(#[source] MalformedProofError),

    /// The aggregate signature does not verify against the signers keys
    #[error("invalid aggregate signature")]
    InvalidAggregate(#[source] CodecError),

    /// Fewer signers than the quorum threshold
    #[error("proof has {signers} signers, {required} required")]
    NotEnoughSigners {
        /// Number of signers of the proof
        signers: usize,
        /// Quorum threshold
        required: usize,
    },

    /// The signed data is not the claim of the attested content
    #[error("proof data '{actual}' is not the claim of its cid, expected '{expected}'")]
    DigestMismatch {
        /// Identifier of the claim of the attested content
        expected: ContentIdentifier,
        /// Identifier carried by the proof
        actual: ContentIdentifier,
    },

    /// The directory of the proof epoch is not known
    #[error("no member directory for epoch {0}")]
    UnknownEpoch(DirectoryEpoch),

    /// The proof was not produced against the given directory
    #[error("proof epoch {proof} differs from the directory epoch {directory}")]
    EpochMismatch {
        /// Epoch of the proof
        proof: DirectoryEpoch,
        /// Epoch of the directory
        directory: DirectoryEpoch,
    },

    /// The directory provider failed
    #[error("could not get the member directory")]
    Directory(#[source] StdError),

    /// The claim of the content could not be resolved to a digest
    #[error("could not compute the digest of the claim")]
    ClaimDigest(#[source] ContentIdentifierError),
}

/// Verification of data availability proofs received from other nodes.
pub struct ProofVerifier {
    directory_provider: Arc<dyn MemberDirectoryProvider>,
    quorum_threshold: usize,
    logger: Logger,
}

impl ProofVerifier {
    /// ProofVerifier factory
    pub fn new(
        directory_provider: Arc<dyn MemberDirectoryProvider>,
        quorum_threshold: usize,
        logger: Logger,
    ) -> Self {
        Self {
            directory_provider,
            quorum_threshold,
            logger: logger.new_with_component_name::<Self>(),
        }
    }

    /// Verify a proof against the directory of its epoch, returning its signers in directory
    /// order.
    pub async fn verify(
        &self,
        proof: &DataAvailabilityProof,
    ) -> Result<Vec<Identity>, ProofVerificationError> {
        let directory = self
            .directory_provider
            .directory_at(proof.epoch)
            .await
            .map_err(ProofVerificationError::Directory)?
            .ok_or(ProofVerificationError::UnknownEpoch(proof.epoch))?;

        self.verify_against(proof, &directory)
    }

    /// Verify a `proof` message received from the gossip network.
    pub async fn verify_message(
        &self,
        message: &[u8],
    ) -> Result<(DataAvailabilityProof, Vec<Identity>), ProofVerificationError> {
        let message = CollectionResponseMessage::try_from_bytes(message)
            .map_err(ProofVerificationError::InvalidMessage)?;
        let proof = DataAvailabilityProof::try_from(&message).map_err(|e| match e {
            MessageError::MalformedProof(e) => ProofVerificationError::Malformed(e),
            e => ProofVerificationError::InvalidMessage(e),
        })?;
        let signers = self.verify(&proof).await?;

        Ok((proof, signers))
    }

    /// Verify a proof against the given directory.
    pub fn verify_against(
        &self,
        proof: &DataAvailabilityProof,
        directory: &MemberDirectory,
    ) -> Result<Vec<Identity>, ProofVerificationError> {
        let result = self.check(proof, directory);
        match &result {
            Ok(signers) => {
                debug!(self.logger, "Proof verified"; "cid" => %proof.cid, "signers" => signers.len());
            }
            Err(error) => {
                warn!(self.logger, "Proof rejected"; "cid" => %proof.cid, "error" => %error);
            }
        }

        result
    }

    fn check(
        &self,
        proof: &DataAvailabilityProof,
        directory: &MemberDirectory,
    ) -> Result<Vec<Identity>, ProofVerificationError> {
        if proof.epoch != directory.epoch() {
            return Err(ProofVerificationError::EpochMismatch {
                proof: proof.epoch,
                directory: directory.epoch(),
            });
        }

        let claim = proof.claim();
        let expected = claim
            .claim_identifier()
            .map_err(ProofVerificationError::ClaimDigest)?;
        if expected != proof.data {
            return Err(ProofVerificationError::DigestMismatch {
                expected,
                actual: proof.data,
            });
        }

        let digest = claim
            .to_message()
            .compute_digest()
            .map_err(ProofVerificationError::ClaimDigest)?;
        let circuit = CircuitCodec::decode_and_verify(&proof.signature, directory, digest)
            .map_err(|e| match e {
                CodecError::MalformedProof(e) => ProofVerificationError::Malformed(e),
                e => ProofVerificationError::InvalidAggregate(e),
            })?;

        if circuit.quorum_size() < self.quorum_threshold {
            return Err(ProofVerificationError::NotEnoughSigners {
                signers: circuit.quorum_size(),
                required: self.quorum_threshold,
            });
        }

        CircuitCodec::signers(&proof.signature.bitmask, directory)
            .map_err(ProofVerificationError::Malformed)
    }
}
