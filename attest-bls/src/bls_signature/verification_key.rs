use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use blst::min_pk::{AggregatePublicKey, PublicKey as BlstVk};

use super::error::blst_failure_to_bls_error;
use super::{BlsSignatureError, BlsSigningKey};

/// BLS verification key, a compressed point of G1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlsVerificationKey(BlstVk);

impl BlsVerificationKey {
    /// Size of a compressed verification key, in bytes.
    pub const SIZE: usize = 48;

    /// Convert an `BlsVerificationKey` to its compressed byte representation.
    pub fn to_bytes(self) -> [u8; 48] {
        self.0.to_bytes()
    }

    /// Convert a compressed byte string into a `BlsVerificationKey`.
    ///
    /// # Error
    /// This function fails if the bytes do not represent a compressed point of the prime
    /// order subgroup of the curve Bls12-381, or if the point is the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlsSignatureError> {
        if bytes.len() != Self::SIZE {
            return Err(BlsSignatureError::SerializationError);
        }

        BlstVk::key_validate(bytes)
            .map(Self)
            .map_err(blst_failure_to_bls_error)
    }

    /// Aggregate a non empty slice of verification keys into a single one.
    ///
    /// The keys are expected to be subgroup checked already (as done by [Self::from_bytes]).
    pub fn aggregate(keys: &[Self]) -> Result<Self, BlsSignatureError> {
        if keys.is_empty() {
            return Err(BlsSignatureError::EmptyAggregation);
        }

        let blst_keys: Vec<&BlstVk> = keys.iter().map(|vk| &vk.0).collect();
        AggregatePublicKey::aggregate(&blst_keys, false)
            .map(|aggregate| Self(aggregate.to_public_key()))
            .map_err(blst_failure_to_bls_error)
    }

    /// Add another verification key to this one, returning the aggregate of both.
    pub fn add(&self, other: &Self) -> Result<Self, BlsSignatureError> {
        Self::aggregate(&[*self, *other])
    }

    pub(crate) fn to_blst_vk(self) -> BlstVk {
        self.0
    }

    /// Compare two verification keys through their byte encoding.
    fn cmp_vk(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl Display for BlsVerificationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl Hash for BlsVerificationKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash_slice(&self.to_bytes(), state)
    }
}

impl PartialOrd for BlsVerificationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlsVerificationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_vk(other)
    }
}

impl From<&BlsSigningKey> for BlsVerificationKey {
    /// Convert a secret key into a verification key. This is done by computing
    /// `vk = g1 * sk`.
    fn from(sk: &BlsSigningKey) -> Self {
        Self(sk.to_blst_secret_key().sk_to_pk())
    }
}
