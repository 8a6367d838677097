use rand_core::{CryptoRng, RngCore};

use crate::Identity;

use super::{BlsSignature, BlsSignatureError, BlsSigningKey, BlsVerificationKey};

/// A BLS verification key, optionally paired with its secret key.
///
/// Remote members are only known through their verification key, while the local signer also
/// owns the secret half.
#[derive(Debug, Clone)]
pub struct BlsKeyPair {
    signing_key: Option<BlsSigningKey>,
    verification_key: BlsVerificationKey,
}

impl BlsKeyPair {
    /// Generate a new random key pair.
    pub fn generate(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        Self::from_signing_key(BlsSigningKey::generate(rng))
    }

    /// Derive a key pair from a seed of at least 32 bytes.
    pub fn from_seed(seed: &[u8]) -> Result<Self, BlsSignatureError> {
        BlsSigningKey::from_seed(seed).map(Self::from_signing_key)
    }

    /// Build a key pair from an existing signing key.
    pub fn from_signing_key(signing_key: BlsSigningKey) -> Self {
        let verification_key = BlsVerificationKey::from(&signing_key);

        Self {
            signing_key: Some(signing_key),
            verification_key,
        }
    }

    /// Build a public only key pair, that can verify but not sign.
    pub fn from_verification_key(verification_key: BlsVerificationKey) -> Self {
        Self {
            signing_key: None,
            verification_key,
        }
    }

    /// Verification key of the pair
    pub fn verification_key(&self) -> BlsVerificationKey {
        self.verification_key
    }

    /// Signing key of the pair, if any
    pub fn signing_key(&self) -> Option<&BlsSigningKey> {
        self.signing_key.as_ref()
    }

    /// Does this pair own its secret key
    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    /// Decentralized identifier of the key holder.
    pub fn identity(&self) -> Identity {
        Identity::derive(&self.verification_key)
    }

    /// Sign a message with the secret key of the pair.
    pub fn sign(&self, msg: &[u8]) -> Result<BlsSignature, BlsSignatureError> {
        self.signing_key
            .as_ref()
            .map(|signing_key| signing_key.sign(msg))
            .ok_or(BlsSignatureError::MissingSigningKey)
    }

    /// Verify a signature against the verification key of the pair.
    pub fn verify(&self, msg: &[u8], signature: &BlsSignature) -> Result<(), BlsSignatureError> {
        signature.verify(msg, &self.verification_key)
    }
}
