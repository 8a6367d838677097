//! Crate specific errors
use crate::{BlsSignatureError, Identity};

/// Errors raised while parsing or deriving a decentralized identifier.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The identifier is not a base58btc `did:key`
    #[error("identity '{0}' does not start with the 'did:key:z' prefix")]
    MissingPrefix(String),

    /// The multibase payload is not valid base58btc
    #[error("identity payload is not valid base58btc: {0}")]
    InvalidBase58(String),

    /// The multicodec prefix is not the BLS12-381 G1 public key one
    #[error("identity does not carry the BLS12-381 G1 public key multicodec")]
    InvalidMulticodec,

    /// The embedded public key does not have the expected size
    #[error("identity public key must be {expected} bytes long, got {actual}")]
    InvalidKeyLength {
        /// Expected number of bytes
        expected: usize,
        /// Actual number of bytes
        actual: usize,
    },

    /// The embedded public key is not a valid point
    #[error("identity public key is not a valid BLS12-381 G1 point")]
    InvalidKey,
}

/// Errors raised while building a member directory.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The same identity appears twice
    #[error("member '{0}' appears more than once in the directory")]
    DuplicateMember(Identity),

    /// A member identity does not derive from the member public key
    #[error("member '{0}' identity does not match its public key")]
    IdentityMismatch(Identity),

    /// A member identity could not be parsed
    #[error("invalid member identity")]
    Identity(#[from] IdentityError),
}

/// Reason why a single contribution was not folded into a [QuorumCircuit][crate::QuorumCircuit].
///
/// A rejection never alters the circuit.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SignatureRejection {
    /// The identity is not a directory member, or does not match the submitted key
    #[error("signer '{0}' is unknown or does not match its public key")]
    UnknownSigner(Identity),

    /// The identity has already been aggregated
    #[error("signer '{0}' has already been aggregated")]
    DuplicateSigner(Identity),

    /// The signature does not verify against the digest and the signer public key
    #[error("invalid signature from signer '{0}'")]
    InvalidSignature(Identity),
}

impl SignatureRejection {
    /// Identity of the rejected signer
    pub fn identity(&self) -> &Identity {
        match self {
            Self::UnknownSigner(identity)
            | Self::DuplicateSigner(identity)
            | Self::InvalidSignature(identity) => identity,
        }
    }
}

/// Errors raised by a [QuorumCircuit][crate::QuorumCircuit] as a whole.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CircuitError {
    /// No signer has been aggregated
    #[error("circuit does not hold any signature")]
    EmptyCircuit,

    /// The aggregate signature does not verify against the aggregate key
    #[error("aggregate signature does not verify")]
    InvalidAggregate(#[source] BlsSignatureError),
}

/// Reasons why a wire proof is rejected before any verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MalformedProofError {
    /// The bitmask byte length does not match the directory size
    #[error("signer bitmask must be {expected} bytes long for this directory, got {actual}")]
    BitmaskLength {
        /// Expected number of bytes
        expected: usize,
        /// Actual number of bytes
        actual: usize,
    },

    /// A padding bit designates a position beyond the directory
    #[error("signer bitmask sets position {position} of a {directory_size} members directory")]
    PositionOutOfRange {
        /// Out of range position
        position: usize,
        /// Size of the directory
        directory_size: usize,
    },

    /// No bit is set
    #[error("signer bitmask does not designate any signer")]
    NoSigner,

    /// The bitmask text encoding is invalid
    #[error("signer bitmask is not valid hexadecimal: {0}")]
    InvalidBitmaskEncoding(String),

    /// The aggregate signature bytes are not a valid point
    #[error("aggregate signature is not a valid BLS12-381 G2 point")]
    InvalidAggregateSignature,
}

/// Errors raised while encoding or decoding a circuit.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// Encoding a circuit without any signer
    #[error("cannot encode a circuit without any signer")]
    EmptyCircuit,

    /// An accepted signer is not part of the directory used to encode
    #[error("signer '{0}' is not part of the directory")]
    SignerOutsideDirectory(Identity),

    /// The proof is malformed
    #[error("malformed proof")]
    MalformedProof(#[from] MalformedProofError),

    /// The decoded circuit does not verify
    #[error("proof does not verify")]
    InvalidProof(#[source] CircuitError),
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn invalid_aggregate_keeps_its_signature_error_as_source() {
        let error = CircuitError::InvalidAggregate(BlsSignatureError::AggregateSignatureInvalid);
        let cloned = error.clone();

        assert_eq!(error, cloned);
        assert_eq!(
            Some(BlsSignatureError::AggregateSignatureInvalid.to_string()),
            cloned.source().map(|source| source.to_string())
        );
    }
}
