use blst::min_pk::SecretKey as BlstSk;
use rand_core::{CryptoRng, RngCore};

use super::error::blst_failure_to_bls_error;
use super::{BLS_SIGNATURE_DST, BlsSignature, BlsSignatureError};

/// BLS secret key, which is a wrapper over the BlstSk type from the blst library.
///
/// It is exclusively owned by the local signer and is never part of the aggregation protocol.
#[derive(Clone)]
pub struct BlsSigningKey(BlstSk);

impl BlsSigningKey {
    /// Generate a secret key
    pub fn generate(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        let mut ikm = [0u8; 32];
        rng.fill_bytes(&mut ikm);
        // An input keying material of 32 bytes is always accepted by `key_gen`.
        Self::from_seed(&ikm).unwrap_or_else(|_| unreachable!("ikm is 32 bytes long"))
    }

    /// Derive a secret key from a seed of at least 32 bytes.
    pub fn from_seed(seed: &[u8]) -> Result<Self, BlsSignatureError> {
        if seed.len() < 32 {
            return Err(BlsSignatureError::SeedTooShort(seed.len()));
        }

        BlstSk::key_gen(seed, &[])
            .map(Self)
            .map_err(blst_failure_to_bls_error)
    }

    /// Sign a message with the given secret key
    pub fn sign(&self, msg: &[u8]) -> BlsSignature {
        BlsSignature(self.0.sign(msg, BLS_SIGNATURE_DST, &[]))
    }

    /// Convert the secret key into byte string.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Convert a string of bytes into a `BlsSigningKey`.
    ///
    /// # Error
    /// Fails if the byte string represents a scalar larger than the group order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlsSignatureError> {
        let bytes = bytes
            .get(..32)
            .ok_or(BlsSignatureError::SerializationError)?;

        BlstSk::from_bytes(bytes)
            .map(Self)
            .map_err(blst_failure_to_bls_error)
    }

    pub(crate) fn to_blst_secret_key(&self) -> &BlstSk {
        &self.0
    }
}

impl std::fmt::Debug for BlsSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BlsSigningKey").field(&"<redacted>").finish()
    }
}
