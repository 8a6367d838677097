use serde::{Deserialize, Serialize};

use attest_bls::WireProof;

use crate::messages::{MessageError, decode_wire_bytes, encode_wire_bytes};

/// Wire form of a [WireProof]: `{ sig: <aggregate signature>, bv: <signers bitmask> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMessage {
    /// Base64url encoded aggregate signature
    pub sig: String,

    /// Base64url encoded signers bitmask
    pub bv: String,
}

impl From<&WireProof> for ProofMessage {
    fn from(proof: &WireProof) -> Self {
        Self {
            sig: encode_wire_bytes(proof.aggregate_signature.to_bytes()),
            bv: encode_wire_bytes(proof.bitmask.as_bytes()),
        }
    }
}

impl TryFrom<&ProofMessage> for WireProof {
    type Error = MessageError;

    fn try_from(message: &ProofMessage) -> Result<Self, Self::Error> {
        let signature = decode_wire_bytes("sig", &message.sig)?;
        let bitmask = decode_wire_bytes("bv", &message.bv)?;

        Ok(WireProof::from_bytes(&signature, bitmask)?)
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    use attest_bls::{BlsKeyPair, MalformedProofError, SignerBitmask};

    use super::*;

    fn proof() -> WireProof {
        let key_pair = BlsKeyPair::generate(&mut ChaCha20Rng::from_seed([4u8; 32]));
        let mut bitmask = SignerBitmask::for_directory_size(4);
        bitmask.set(1);
        bitmask.set(3);

        WireProof {
            aggregate_signature: key_pair.sign(b"digest").unwrap(),
            bitmask,
        }
    }

    #[test]
    fn bitmask_is_published_as_base64url_of_its_bytes() {
        let message = ProofMessage::from(&proof());

        assert_eq!("UA", message.bv);
    }

    #[test]
    fn proof_message_round_trip() {
        let proof = proof();

        let decoded = WireProof::try_from(&ProofMessage::from(&proof)).unwrap();

        assert_eq!(proof, decoded);
    }

    #[test]
    fn invalid_aggregate_signature_is_malformed() {
        let mut message = ProofMessage::from(&proof());
        message.sig = encode_wire_bytes([0u8; 12]);

        assert_eq!(
            Err(MessageError::MalformedProof(
                MalformedProofError::InvalidAggregateSignature
            )),
            WireProof::try_from(&message)
        );
    }

    #[test]
    fn aggregate_signature_of_unexpected_length_is_malformed() {
        let signature = proof().aggregate_signature.to_bytes();
        let mut longer = signature.to_vec();
        longer.push(0);

        for bytes in [longer, signature[..95].to_vec()] {
            let mut message = ProofMessage::from(&proof());
            message.sig = encode_wire_bytes(&bytes);

            assert_eq!(
                Err(MessageError::MalformedProof(
                    MalformedProofError::InvalidAggregateSignature
                )),
                WireProof::try_from(&message)
            );
        }
    }

    #[test]
    fn json_shape() {
        let message = ProofMessage {
            sig: "c2ln".to_string(),
            bv: "UA".to_string(),
        };

        assert_eq!(
            r#"{"sig":"c2ln","bv":"UA"}"#,
            serde_json::to_string(&message).unwrap()
        );
    }
}
