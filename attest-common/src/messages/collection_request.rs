use serde::{Deserialize, Serialize};

use crate::entities::ContentIdentifier;

/// Request published by the requester to ask validators for their signature on a content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRequestMessage {
    /// Text form of the content identifier
    pub cid: String,
}

impl CollectionRequestMessage {
    /// CollectionRequestMessage factory
    pub fn new(cid: &ContentIdentifier) -> Self {
        Self {
            cid: cid.to_string(),
        }
    }
}
