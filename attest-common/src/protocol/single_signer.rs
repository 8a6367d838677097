use anyhow::Context;
use thiserror::Error;

use attest_bls::{BlsKeyPair, BlsSignature, BlsSignatureError, Identity, SignedDigest};

use crate::StdResult;
use crate::entities::{
    AttestationMessage, ContentIdentifier, ContentIdentifierError, DataAvailabilityClaim,
};
use crate::messages::{CollectionRequestMessage, CollectionResponseMessage, SignatureEnvelopeMessage};

/// Errors raised by a [SingleSigner].
#[derive(Error, Debug)]
pub enum SignerError {
    /// The key pair has no signing key
    #[error("a single signer requires a signing key")]
    MissingSigningKey,

    /// The message could not be resolved to a digest
    #[error("could not compute the digest of the message")]
    Digest(#[from] ContentIdentifierError),

    /// The signing key could not sign the digest
    #[error("could not sign the digest")]
    Signature(#[source] BlsSignatureError),
}

/// The SingleSigner is the structure responsible for issuing the signature of a validator.
#[cfg_attr(test, derive(Debug))]
pub struct SingleSigner {
    identity: Identity,
    key_pair: BlsKeyPair,
}

impl SingleSigner {
    /// Build a signer from a key pair holding a signing key.
    pub fn new(key_pair: BlsKeyPair) -> Result<Self, SignerError> {
        if !key_pair.can_sign() {
            return Err(SignerError::MissingSigningKey);
        }

        Ok(Self {
            identity: key_pair.identity(),
            key_pair,
        })
    }

    /// Identity of the signer
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Canonicalize the message then sign its digest.
    pub fn sign(&self, message: &AttestationMessage) -> Result<BlsSignature, SignerError> {
        let digest = message.compute_digest()?;

        self.sign_raw(&digest)
    }

    /// Sign already computed digest bytes.
    pub fn sign_raw(&self, digest: &SignedDigest) -> Result<BlsSignature, SignerError> {
        self.key_pair.sign(digest.as_bytes()).map_err(|e| match e {
            BlsSignatureError::MissingSigningKey => SignerError::MissingSigningKey,
            e => SignerError::Signature(e),
        })
    }

    /// Sign the message and wrap the signature in a `success` response for the given content.
    pub fn build_response(
        &self,
        cid: &ContentIdentifier,
        message: &AttestationMessage,
    ) -> StdResult<CollectionResponseMessage> {
        let signature = self
            .sign(message)
            .with_context(|| format!("Signer '{}' could not sign cid '{cid}'", self.identity))?;

        Ok(CollectionResponseMessage::Success {
            cid: cid.to_string(),
            signature: SignatureEnvelopeMessage::new(&signature, &self.identity)?,
        })
    }

    /// Build the `error` response of a signer refusing to sign the given content.
    pub fn decline<T: Into<String>>(
        &self,
        cid: &ContentIdentifier,
        reason: T,
    ) -> CollectionResponseMessage {
        CollectionResponseMessage::Error {
            cid: cid.to_string(),
            error: reason.into(),
        }
    }

    /// Answer a collection request by signing the data availability claim of its content.
    pub fn respond_to_request(
        &self,
        request: &CollectionRequestMessage,
    ) -> StdResult<CollectionResponseMessage> {
        let cid = request
            .cid
            .parse::<ContentIdentifier>()
            .with_context(|| format!("Invalid cid in collection request: '{}'", request.cid))?;
        let claim = DataAvailabilityClaim::new(cid);

        self.build_response(&cid, &claim.to_message())
    }
}
