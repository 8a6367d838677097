use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::entities::{AttestationMessage, ContentIdentifier, ContentIdentifierError};

/// Kind of claim a validator signs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ClaimType {
    /// The content is stored and retrievable
    DataAvailability,
}

/// Claim that a content is available: `{ "type": "data-availability", "cid": <cid> }`.
///
/// Validators sign the binary form of the identifier of this claim, not the content itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataAvailabilityClaim {
    /// Attested content
    pub cid: ContentIdentifier,

    /// Kind of claim
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
}

impl DataAvailabilityClaim {
    /// DataAvailabilityClaim factory
    pub fn new(cid: ContentIdentifier) -> Self {
        Self {
            cid,
            claim_type: ClaimType::DataAvailability,
        }
    }

    /// Structured payload of the claim
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.claim_type.to_string(),
            "cid": self.cid.to_string(),
        })
    }

    /// Identifier of the claim payload, published as the `data` of a proof
    pub fn claim_identifier(&self) -> Result<ContentIdentifier, ContentIdentifierError> {
        ContentIdentifier::for_payload(&self.to_payload())
    }

    /// Message to sign for this claim
    pub fn to_message(&self) -> AttestationMessage {
        AttestationMessage::Payload(self.to_payload())
    }
}
