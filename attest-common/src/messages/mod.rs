//! Messages module
//! This module provides the structures exchanged on the gossip topics and their wire encodings.
mod collection_request;
mod collection_response;
mod proof;
mod signature_envelope;

pub use collection_request::CollectionRequestMessage;
pub use collection_response::CollectionResponseMessage;
pub use proof::ProofMessage;
pub use signature_envelope::{PublicKeyPointer, SignatureEnvelopeMessage};

use attest_bls::MalformedProofError;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use thiserror::Error;

/// Errors raised while reading a gossip message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The message is not one of the expected JSON shapes
    #[error("invalid message: {0}")]
    InvalidJson(String),

    /// A binary field is not valid base64
    #[error("field '{field}' is not valid base64: {reason}")]
    InvalidBase64 {
        /// Name of the field
        field: &'static str,
        /// Decoding error
        reason: String,
    },

    /// The signature bytes are not a valid signature
    #[error("field 's' is not a valid BLS signature")]
    InvalidSignature,

    /// A content identifier field cannot be parsed
    #[error("field '{field}' is not a valid content identifier: {reason}")]
    InvalidContentIdentifier {
        /// Name of the field
        field: &'static str,
        /// Parsing error
        reason: String,
    },

    /// The message is valid but not of the expected type
    #[error("unexpected message type: expected '{expected}', got '{actual}'")]
    UnexpectedMessageType {
        /// Expected type
        expected: &'static str,
        /// Actual type
        actual: &'static str,
    },

    /// The public key pointer does not designate a valid identity
    #[error("field 'p' is not a valid public key pointer: {0}")]
    InvalidPublicKeyPointer(String),

    /// The proof is malformed
    #[error("malformed proof")]
    MalformedProof(#[from] MalformedProofError),
}

/// Encode bytes the way every binary field is published: base64url without padding.
pub fn encode_wire_bytes<T: AsRef<[u8]>>(bytes: T) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a binary field, accepting the url safe and the standard alphabets, padded or not.
pub fn decode_wire_bytes(field: &'static str, encoded: &str) -> Result<Vec<u8>, MessageError> {
    let unpadded = encoded.trim_end_matches('=');

    URL_SAFE_NO_PAD
        .decode(unpadded)
        .or_else(|_| STANDARD_NO_PAD.decode(unpadded))
        .map_err(|e| MessageError::InvalidBase64 {
            field,
            reason: e.to_string(),
        })
}
