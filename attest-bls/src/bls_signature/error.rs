use blst::BLST_ERROR;

use super::{BlsSignature, BlsVerificationKey};

/// Error types for BLS signatures.
#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum BlsSignatureError {
    /// Invalid single signature
    #[error("Invalid single signature")]
    SignatureInvalid(BlsSignature),

    /// Invalid aggregate signature
    #[error("Invalid aggregated signature")]
    AggregateSignatureInvalid,

    /// This error occurs when the deserialization of the raw bytes failed
    #[error("Invalid bytes")]
    SerializationError,

    /// The key derivation seed is too short
    #[error("Key generation seed must be at least 32 bytes long, got {0}")]
    SeedTooShort(usize),

    /// Single signature is the infinity
    #[error("Single signature is the infinity")]
    SignatureInfinity(BlsSignature),

    /// Verification key is the infinity
    #[error("Verification key is the infinity")]
    VerificationKeyInfinity(Box<BlsVerificationKey>),

    /// Aggregation of an empty list
    #[error("Cannot aggregate an empty list")]
    EmptyAggregation,

    /// The key pair holds no signing key
    #[error("Key pair has no signing key")]
    MissingSigningKey,
}

pub(crate) fn blst_error_to_bls_error(
    e: BLST_ERROR,
    sig: Option<BlsSignature>,
    key: Option<BlsVerificationKey>,
) -> Result<(), BlsSignatureError> {
    match e {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        BLST_ERROR::BLST_PK_IS_INFINITY => {
            if let Some(s) = sig {
                return Err(BlsSignatureError::SignatureInfinity(s));
            }
            if let Some(vk) = key {
                return Err(BlsSignatureError::VerificationKeyInfinity(Box::new(vk)));
            }
            Err(BlsSignatureError::SerializationError)
        }
        BLST_ERROR::BLST_VERIFY_FAIL => {
            if let Some(s) = sig {
                Err(BlsSignatureError::SignatureInvalid(s))
            } else {
                Err(BlsSignatureError::AggregateSignatureInvalid)
            }
        }
        _ => Err(BlsSignatureError::SerializationError),
    }
}

/// Map a failed blst call (never `BLST_SUCCESS`) to a [BlsSignatureError].
pub(crate) fn blst_failure_to_bls_error(e: BLST_ERROR) -> BlsSignatureError {
    blst_error_to_bls_error(e, None, None)
        .err()
        .unwrap_or(BlsSignatureError::SerializationError)
}
