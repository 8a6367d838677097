use anyhow::Context;
use serde::{Deserialize, Serialize};

use attest_bls::{DirectoryEpoch, WireProof};

use crate::StdResult;
use crate::entities::{ContentIdentifier, DataAvailabilityProof};
use crate::messages::{MessageError, ProofMessage, SignatureEnvelopeMessage};

/// Message published on the response topic, by a validator or by the requester once the
/// quorum is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CollectionResponseMessage {
    /// A validator signed the claim of the content
    Success {
        /// Text form of the content identifier
        cid: String,
        /// Signature of the validator
        signature: SignatureEnvelopeMessage,
    },

    /// A validator declined to sign
    Error {
        /// Text form of the content identifier
        cid: String,
        /// Reason given by the validator
        error: String,
    },

    /// Aggregated proof published by the requester
    Proof {
        /// Text form of the content identifier
        cid: String,
        /// Text form of the identifier of the signed claim
        data: String,
        /// Aggregate signature and signers bitmask
        signature: ProofMessage,
        /// Epoch of the member directory the bitmask refers to
        #[serde(default, skip_serializing_if = "Option::is_none")]
        epoch: Option<u64>,
    },
}

impl CollectionResponseMessage {
    /// Content identifier the message refers to, in its text form
    pub fn cid(&self) -> &str {
        match self {
            Self::Success { cid, .. } | Self::Error { cid, .. } | Self::Proof { cid, .. } => cid,
        }
    }

    /// Value of the `type` tag
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
            Self::Proof { .. } => "proof",
        }
    }

    /// Parse a message received from the gossip network.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        serde_json::from_slice(bytes).map_err(|e| MessageError::InvalidJson(e.to_string()))
    }

    /// Serialize the message for publication.
    pub fn to_bytes(&self) -> StdResult<Vec<u8>> {
        serde_json::to_vec(self).with_context(|| {
            format!(
                "Could not serialize '{}' response message for cid '{}'",
                self.message_type(),
                self.cid()
            )
        })
    }
}

impl From<&DataAvailabilityProof> for CollectionResponseMessage {
    fn from(proof: &DataAvailabilityProof) -> Self {
        Self::Proof {
            cid: proof.cid.to_string(),
            data: proof.data.to_string(),
            signature: ProofMessage::from(&proof.signature),
            epoch: Some(proof.epoch.0),
        }
    }
}

impl TryFrom<&CollectionResponseMessage> for DataAvailabilityProof {
    type Error = MessageError;

    fn try_from(message: &CollectionResponseMessage) -> Result<Self, Self::Error> {
        let CollectionResponseMessage::Proof {
            cid,
            data,
            signature,
            epoch,
        } = message
        else {
            return Err(MessageError::UnexpectedMessageType {
                expected: "proof",
                actual: message.message_type(),
            });
        };

        let parse_cid = |field: &'static str, value: &str| {
            value
                .parse::<ContentIdentifier>()
                .map_err(|e| MessageError::InvalidContentIdentifier {
                    field,
                    reason: e.to_string(),
                })
        };

        Ok(Self {
            cid: parse_cid("cid", cid)?,
            data: parse_cid("data", data)?,
            signature: WireProof::try_from(signature)?,
            epoch: epoch.map(DirectoryEpoch).unwrap_or_default(),
        })
    }
}
