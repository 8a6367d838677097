use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BlsVerificationKey, IdentityError};

/// Prefix of a base58btc encoded `did:key` identifier.
pub const DID_KEY_PREFIX: &str = "did:key:z";

/// Multicodec varint of a BLS12-381 G1 public key (`0xea`).
pub const BLS12_381_G1_PUB_MULTICODEC: [u8; 2] = [0xEA, 0x01];

/// Decentralized identifier of a member, deterministically derived from its verification key:
/// `did:key:z` followed by the base58btc encoding of the multicodec prefix and the compressed
/// key.
///
/// Equality, ordering and hashing only consider the textual form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity {
    did: String,
    verification_key: BlsVerificationKey,
}

impl Identity {
    /// Derive the identity of the holder of the given verification key.
    pub fn derive(verification_key: &BlsVerificationKey) -> Self {
        let mut payload = Vec::with_capacity(
            BLS12_381_G1_PUB_MULTICODEC.len() + BlsVerificationKey::SIZE,
        );
        payload.extend_from_slice(&BLS12_381_G1_PUB_MULTICODEC);
        payload.extend_from_slice(&verification_key.to_bytes());

        Self {
            did: format!("{DID_KEY_PREFIX}{}", bs58::encode(payload).into_string()),
            verification_key: *verification_key,
        }
    }

    /// Derive the identity of a compressed verification key.
    pub fn from_verification_key_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        if bytes.len() != BlsVerificationKey::SIZE {
            return Err(IdentityError::InvalidKeyLength {
                expected: BlsVerificationKey::SIZE,
                actual: bytes.len(),
            });
        }
        let verification_key =
            BlsVerificationKey::from_bytes(bytes).map_err(|_| IdentityError::InvalidKey)?;

        Ok(Self::derive(&verification_key))
    }

    /// Parse a textual `did:key` identifier, recovering its verification key.
    pub fn parse(did: &str) -> Result<Self, IdentityError> {
        let encoded = did
            .strip_prefix(DID_KEY_PREFIX)
            .ok_or_else(|| IdentityError::MissingPrefix(did.to_string()))?;
        let payload = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| IdentityError::InvalidBase58(e.to_string()))?;
        let key_bytes = payload
            .strip_prefix(&BLS12_381_G1_PUB_MULTICODEC)
            .ok_or(IdentityError::InvalidMulticodec)?;

        Self::from_verification_key_bytes(key_bytes)
    }

    /// Verification key embedded in the identifier
    pub fn verification_key(&self) -> BlsVerificationKey {
        self.verification_key
    }

    /// Textual form of the identifier
    pub fn as_str(&self) -> &str {
        &self.did
    }

    /// Check that this identity is the one derived from the given verification key.
    pub fn is_derived_from(&self, verification_key: &BlsVerificationKey) -> bool {
        &self.verification_key == verification_key
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.did == other.did
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.did.hash(state);
    }
}

impl PartialOrd for Identity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.did.cmp(&other.did)
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.did)
    }
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.did
    }
}

impl From<&BlsVerificationKey> for Identity {
    fn from(verification_key: &BlsVerificationKey) -> Self {
        Self::derive(verification_key)
    }
}
