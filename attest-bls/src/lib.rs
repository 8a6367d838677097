#![warn(missing_docs)]
//! Threshold BLS aggregation for data-availability attestations.
//!
//! A requester collects single BLS signatures over one digest from the members of a known
//! [MemberDirectory], folds every valid contribution into a [QuorumCircuit], and finally
//! compresses the circuit into a constant size [WireProof]: one aggregate signature and one
//! bitmask identifying the signers by their directory position.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rand_chacha::ChaCha20Rng;
//! use rand_core::SeedableRng;
//!
//! use attest_bls::{
//!     BlsKeyPair, CircuitCodec, DirectoryEpoch, MemberDirectory, QuorumCircuit,
//!     SignatureCandidate, SignedDigest,
//! };
//!
//! let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
//! let key_pairs: Vec<BlsKeyPair> = (0..4).map(|_| BlsKeyPair::generate(&mut rng)).collect();
//! let directory = MemberDirectory::from_verification_keys(
//!     DirectoryEpoch(1),
//!     key_pairs.iter().map(|key_pair| key_pair.verification_key()),
//! )?;
//!
//! let digest = SignedDigest::new(b"content identifier digest".to_vec());
//! let mut circuit = QuorumCircuit::new(digest.clone());
//! for key_pair in &key_pairs[1..3] {
//!     let signature = key_pair.sign(digest.as_bytes())?;
//!     circuit.add(SignatureCandidate::new(key_pair.verification_key(), signature))?;
//! }
//! assert_eq!(2, circuit.quorum_size());
//!
//! // The proof only carries the aggregate signature and the signers bitmask.
//! let proof = CircuitCodec::encode(&circuit, &directory)?;
//! let decoded = CircuitCodec::decode_and_verify(&proof, &directory, digest)?;
//! assert_eq!(circuit.accepted(), decoded.accepted());
//! # Ok(())
//! # }
//! ```

mod bls_signature;
mod circuit;
mod codec;
mod directory;
mod error;
mod identity;

pub use bls_signature::{
    BlsKeyPair, BlsSignature, BlsSignatureError, BlsSigningKey, BlsVerificationKey,
    BLS_SIGNATURE_DST,
};
pub use circuit::{BatchReport, QuorumCircuit, SignatureCandidate, SignedDigest};
pub use codec::{CircuitCodec, SignerBitmask, WireProof};
pub use directory::{DirectoryEpoch, Member, MemberDirectory};
pub use error::{
    CircuitError, CodecError, DirectoryError, IdentityError, MalformedProofError,
    SignatureRejection,
};
pub use identity::{Identity, BLS12_381_G1_PUB_MULTICODEC, DID_KEY_PREFIX};
