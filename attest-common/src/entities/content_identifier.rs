use std::fmt::{Display, Formatter};
use std::str::FromStr;

use cid::Cid;
use ipld_core::ipld::Ipld;
use multihash::Multihash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Multicodec of DAG-CBOR encoded content
pub const DAG_CBOR_CODEC: u64 = 0x71;

/// Multicodec of raw, uninterpreted, content
pub const RAW_CODEC: u64 = 0x55;

/// Multihash code of sha2-256
pub const SHA2_256_CODE: u64 = 0x12;

/// [ContentIdentifier] related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentIdentifierError {
    /// Content could not be encoded as DAG-CBOR
    #[error("content could not be encoded as DAG-CBOR: {0}")]
    Encoding(String),

    /// Digest could not be wrapped as a multihash
    #[error("digest could not be wrapped as a multihash: {0}")]
    Multihash(String),

    /// Invalid textual or binary CID
    #[error("invalid content identifier '{0}'")]
    Invalid(String),
}

/// Self describing identifier of a content: a CIDv1 over the sha2-256 digest of its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentIdentifier(Cid);

impl ContentIdentifier {
    /// Identifier of a structured payload, canonicalized as DAG-CBOR.
    ///
    /// Two payloads that only differ by the order of their map keys share the same identifier.
    pub fn for_payload<T: Serialize>(payload: &T) -> Result<Self, ContentIdentifierError> {
        let encoded = serde_ipld_dagcbor::to_vec(payload)
            .map_err(|e| ContentIdentifierError::Encoding(e.to_string()))?;

        Self::from_encoded(DAG_CBOR_CODEC, &encoded)
    }

    /// Identifier of uploaded bytes, stored as a DAG-CBOR byte string.
    pub fn for_binary(bytes: &[u8]) -> Result<Self, ContentIdentifierError> {
        Self::for_payload(&Ipld::Bytes(bytes.to_vec()))
    }

    /// Identifier of raw bytes, hashed as they are.
    pub fn for_raw_bytes(bytes: &[u8]) -> Result<Self, ContentIdentifierError> {
        Self::from_encoded(RAW_CODEC, bytes)
    }

    fn from_encoded(codec: u64, encoded: &[u8]) -> Result<Self, ContentIdentifierError> {
        let digest = Sha256::digest(encoded);
        let hash = Multihash::<64>::wrap(SHA2_256_CODE, &digest)
            .map_err(|e| ContentIdentifierError::Multihash(e.to_string()))?;

        Ok(Self(Cid::new_v1(codec, hash)))
    }

    /// Parse a binary CID
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContentIdentifierError> {
        Cid::try_from(bytes)
            .map(Self)
            .map_err(|_| ContentIdentifierError::Invalid(hex::encode(bytes)))
    }

    /// Binary form: version, codec, then multihash
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    /// Multicodec of the identified content
    pub fn codec(&self) -> u64 {
        self.0.codec()
    }

    /// Raw sha2-256 digest of the encoded content
    pub fn digest(&self) -> &[u8] {
        self.0.hash().digest()
    }
}

impl Display for ContentIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentIdentifier {
    type Err = ContentIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cid::try_from(s)
            .map(Self)
            .map_err(|_| ContentIdentifierError::Invalid(s.to_string()))
    }
}

impl TryFrom<String> for ContentIdentifier {
    type Error = ContentIdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentIdentifier> for String {
    fn from(cid: ContentIdentifier) -> Self {
        cid.to_string()
    }
}
