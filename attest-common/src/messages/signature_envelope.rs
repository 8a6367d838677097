use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

use attest_bls::{BlsSignature, Identity, SignatureCandidate};

use crate::StdResult;
use crate::messages::{MessageError, decode_wire_bytes, encode_wire_bytes};

/// Pointer to the public key of a signer, published as base64url JSON in the `p` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyPointer {
    /// Identity of the signer, embedding its public key
    #[serde(rename = "pub")]
    pub identity: Identity,
}

/// Single signature of a validator: `{ s: <signature>, p: <public key pointer> }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEnvelopeMessage {
    /// Base64url encoded compressed signature
    pub s: String,

    /// Base64url encoded JSON [PublicKeyPointer]
    pub p: String,
}

impl SignatureEnvelopeMessage {
    /// Wrap the signature of the given signer.
    pub fn new(signature: &BlsSignature, identity: &Identity) -> StdResult<Self> {
        let pointer = serde_json::to_vec(&PublicKeyPointer {
            identity: identity.clone(),
        })
        .with_context(|| format!("Could not serialize public key pointer of '{identity}'"))?;

        Ok(Self {
            s: encode_wire_bytes(signature.to_bytes()),
            p: encode_wire_bytes(pointer),
        })
    }

    /// Decode the signature
    pub fn signature(&self) -> Result<BlsSignature, MessageError> {
        let bytes = decode_wire_bytes("s", &self.s)?;

        BlsSignature::from_bytes(&bytes).map_err(|_| MessageError::InvalidSignature)
    }

    /// Decode the public key pointer
    pub fn public_key_pointer(&self) -> Result<PublicKeyPointer, MessageError> {
        let bytes = decode_wire_bytes("p", &self.p)?;

        serde_json::from_slice(&bytes)
            .map_err(|e| MessageError::InvalidPublicKeyPointer(e.to_string()))
    }

    /// Identity of the signer
    pub fn identity(&self) -> Result<Identity, MessageError> {
        self.public_key_pointer().map(|pointer| pointer.identity)
    }

    /// Decode the envelope as a contribution to a quorum circuit.
    pub fn to_candidate(&self) -> Result<SignatureCandidate, MessageError> {
        let identity = self.identity()?;
        let signature = self.signature()?;

        Ok(SignatureCandidate::from_identity(identity, signature))
    }
}

impl Debug for SignatureEnvelopeMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let is_pretty_printing = f.alternate();
        let mut debug = f.debug_struct("SignatureEnvelopeMessage");
        debug.field("p", &self.p);

        match is_pretty_printing {
            true => debug.field("s", &self.s).finish(),
            false => debug.finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    use attest_bls::BlsKeyPair;

    use super::*;

    fn key_pair() -> BlsKeyPair {
        BlsKeyPair::generate(&mut ChaCha20Rng::from_seed([8u8; 32]))
    }

    #[test]
    fn envelope_round_trip() {
        let key_pair = key_pair();
        let signature = key_pair.sign(b"digest").unwrap();

        let envelope = SignatureEnvelopeMessage::new(&signature, &key_pair.identity()).unwrap();
        let candidate = envelope.to_candidate().unwrap();

        assert_eq!(key_pair.identity(), candidate.identity);
        assert_eq!(key_pair.verification_key(), candidate.verification_key);
        assert_eq!(signature, candidate.signature);
    }

    #[test]
    fn public_key_pointer_is_a_pub_json_object() {
        let key_pair = key_pair();
        let envelope = SignatureEnvelopeMessage::new(
            &key_pair.sign(b"digest").unwrap(),
            &key_pair.identity(),
        )
        .unwrap();

        let pointer_json = String::from_utf8(decode_wire_bytes("p", &envelope.p).unwrap()).unwrap();

        assert_eq!(
            format!(r#"{{"pub":"{}"}}"#, key_pair.identity()),
            pointer_json
        );
    }

    #[test]
    fn signature_in_padded_standard_base64_is_accepted() {
        let key_pair = key_pair();
        let signature = key_pair.sign(b"digest").unwrap();
        let mut envelope = SignatureEnvelopeMessage::new(&signature, &key_pair.identity()).unwrap();
        envelope.s = STANDARD.encode(signature.to_bytes());

        assert_eq!(signature, envelope.signature().unwrap());
    }

    #[test]
    fn invalid_signature_bytes_are_rejected() {
        let key_pair = key_pair();
        let mut envelope = SignatureEnvelopeMessage::new(
            &key_pair.sign(b"digest").unwrap(),
            &key_pair.identity(),
        )
        .unwrap();
        envelope.s = encode_wire_bytes([0xFFu8; 96]);

        assert_eq!(Err(MessageError::InvalidSignature), envelope.signature());
    }

    #[test]
    fn signature_with_trailing_bytes_is_rejected() {
        let key_pair = key_pair();
        let signature = key_pair.sign(b"digest").unwrap();
        let mut envelope = SignatureEnvelopeMessage::new(&signature, &key_pair.identity()).unwrap();
        let mut bytes = signature.to_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 7]);
        envelope.s = encode_wire_bytes(bytes);

        assert_eq!(Err(MessageError::InvalidSignature), envelope.signature());
    }

    #[test]
    fn invalid_pointer_is_rejected() {
        let key_pair = key_pair();
        let mut envelope = SignatureEnvelopeMessage::new(
            &key_pair.sign(b"digest").unwrap(),
            &key_pair.identity(),
        )
        .unwrap();
        envelope.p = encode_wire_bytes(br#"{"pub":"did:key:zInvalid"}"#);

        assert!(matches!(
            envelope.identity(),
            Err(MessageError::InvalidPublicKeyPointer(_))
        ));
    }
}
