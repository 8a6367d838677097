use std::fmt::{Display, Formatter};

use blst::min_pk::{AggregateSignature, Signature as BlstSig};

use super::error::{blst_error_to_bls_error, blst_failure_to_bls_error};
use super::{BLS_SIGNATURE_DST, BlsSignatureError, BlsVerificationKey};

/// BLS signature, a compressed point of G2, which is a wrapper over the `BlstSig` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlsSignature(pub(crate) BlstSig);

impl BlsSignature {
    /// Size of a compressed signature, in bytes.
    pub const SIZE: usize = 96;

    /// Verify a signature against a verification key.
    ///
    /// The same function verifies aggregate signatures against aggregate keys, as long as
    /// every aggregated signer signed the same message.
    pub fn verify(&self, msg: &[u8], vk: &BlsVerificationKey) -> Result<(), BlsSignatureError> {
        blst_error_to_bls_error(
            self.0.validate(true).map_or_else(
                |e| e,
                |_| {
                    self.0
                        .verify(false, msg, BLS_SIGNATURE_DST, &[], &vk.to_blst_vk(), false)
                },
            ),
            Some(*self),
            None,
        )
    }

    /// Convert an `BlsSignature` to its compressed byte representation.
    pub fn to_bytes(self) -> [u8; 96] {
        self.0.to_bytes()
    }

    /// Convert a string of bytes into a `BlsSignature`.
    ///
    /// # Error
    /// Returns an error if the byte string does not represent a point of the G2 subgroup.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlsSignatureError> {
        if bytes.len() != Self::SIZE {
            return Err(BlsSignatureError::SerializationError);
        }

        BlstSig::sig_validate(bytes, true)
            .map(Self)
            .map_err(blst_failure_to_bls_error)
    }

    /// Aggregate a non empty slice of signatures into a single one.
    pub fn aggregate(signatures: &[Self]) -> Result<Self, BlsSignatureError> {
        if signatures.is_empty() {
            return Err(BlsSignatureError::EmptyAggregation);
        }

        let blst_sigs: Vec<&BlstSig> = signatures.iter().map(|sig| &sig.0).collect();
        AggregateSignature::aggregate(&blst_sigs, false)
            .map(|aggregate| Self(aggregate.to_signature()))
            .map_err(blst_failure_to_bls_error)
    }

    /// Add another signature to this one, returning the aggregate of both.
    pub fn add(&self, other: &Self) -> Result<Self, BlsSignatureError> {
        Self::aggregate(&[*self, *other])
    }
}

impl Display for BlsSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}
