use attest_bls::SignedDigest;

use crate::entities::{ContentIdentifier, ContentIdentifierError};

/// The message a collection session is bound to.
///
/// It is resolved once to the exact bytes every validator signs.
#[derive(Debug, Clone, PartialEq)]
pub enum AttestationMessage {
    /// An already computed digest, signed as is
    Hash(Vec<u8>),

    /// A structured payload, signed through the binary form of its content identifier
    Payload(serde_json::Value),
}

impl AttestationMessage {
    /// Resolve the message to the bytes to sign.
    pub fn compute_digest(&self) -> Result<SignedDigest, ContentIdentifierError> {
        match self {
            Self::Hash(bytes) => Ok(SignedDigest::new(bytes.clone())),
            Self::Payload(payload) => {
                let cid = ContentIdentifier::for_payload(payload)?;
                Ok(SignedDigest::new(cid.to_bytes()))
            }
        }
    }
}

impl From<serde_json::Value> for AttestationMessage {
    fn from(payload: serde_json::Value) -> Self {
        Self::Payload(payload)
    }
}
