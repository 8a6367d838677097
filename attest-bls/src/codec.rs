use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::{
    BlsSignature, BlsVerificationKey, CodecError, Identity, MalformedProofError, MemberDirectory,
    QuorumCircuit, SignedDigest,
};

/// Positional signer set: bit `i` designates the member at position `i` of a directory.
///
/// Bits are laid out most significant bit first, position 0 is the highest bit of the first
/// byte. A bitmask for a directory of `n` members is exactly `ceil(n / 8)` bytes long and its
/// trailing padding bits are zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignerBitmask(Vec<u8>);

impl SignerBitmask {
    /// Number of bytes of the bitmask of a directory of the given size.
    pub fn byte_length_for(directory_size: usize) -> usize {
        directory_size.div_ceil(8)
    }

    /// All zeros bitmask for a directory of the given size.
    pub fn for_directory_size(directory_size: usize) -> Self {
        Self(vec![0u8; Self::byte_length_for(directory_size)])
    }

    /// Wrap raw bitmask bytes, without any check.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw bitmask bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Set the bit of the given position, growing the bitmask when needed.
    pub fn set(&mut self, position: usize) {
        let byte = position / 8;
        if byte >= self.0.len() {
            self.0.resize(byte + 1, 0);
        }
        self.0[byte] |= 0x80 >> (position % 8);
    }

    /// Is the bit of the given position set
    pub fn is_set(&self, position: usize) -> bool {
        self.0
            .get(position / 8)
            .is_some_and(|byte| byte & (0x80 >> (position % 8)) != 0)
    }

    /// Positions of every set bit, in increasing order
    pub fn positions(&self) -> Vec<usize> {
        (0..self.0.len() * 8)
            .filter(|position| self.is_set(*position))
            .collect()
    }

    /// Number of set bits
    pub fn count(&self) -> usize {
        self.0.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Lower case hexadecimal form, two characters per byte
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse the hexadecimal form produced by [Self::to_hex]
    pub fn from_hex(hex_bitmask: &str) -> Result<Self, MalformedProofError> {
        hex::decode(hex_bitmask)
            .map(Self)
            .map_err(|e| MalformedProofError::InvalidBitmaskEncoding(e.to_string()))
    }

    /// Bit string of the first `directory_size` positions, `1` for a signer
    pub fn to_bit_string(&self, directory_size: usize) -> String {
        (0..directory_size)
            .map(|position| if self.is_set(position) { '1' } else { '0' })
            .collect()
    }
}

impl Display for SignerBitmask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compact proof: an aggregate signature and the bitmask of its signers.
///
/// It is meaningless without the [MemberDirectory] it was encoded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireProof {
    /// Aggregate signature of the signers
    pub aggregate_signature: BlsSignature,
    /// Positions of the signers in the directory
    pub bitmask: SignerBitmask,
}

impl WireProof {
    /// Build a proof from its raw parts, checking the aggregate signature encoding.
    pub fn from_bytes(
        aggregate_signature: &[u8],
        bitmask: Vec<u8>,
    ) -> Result<Self, MalformedProofError> {
        let aggregate_signature = BlsSignature::from_bytes(aggregate_signature)
            .map_err(|_| MalformedProofError::InvalidAggregateSignature)?;

        Ok(Self {
            aggregate_signature,
            bitmask: SignerBitmask::from_bytes(bitmask),
        })
    }
}

/// Conversion between a [QuorumCircuit] and its [WireProof] against a [MemberDirectory].
pub struct CircuitCodec;

impl CircuitCodec {
    /// Compress a circuit: bit `i` is set if and only if the member at position `i` has been
    /// accepted.
    pub fn encode(
        circuit: &QuorumCircuit,
        directory: &MemberDirectory,
    ) -> Result<WireProof, CodecError> {
        let aggregate_signature = circuit
            .aggregate_signature()
            .ok_or(CodecError::EmptyCircuit)?;

        let mut bitmask = SignerBitmask::for_directory_size(directory.len());
        for identity in circuit.accepted() {
            let position = directory
                .position_of(identity)
                .ok_or_else(|| CodecError::SignerOutsideDirectory(identity.clone()))?;
            bitmask.set(position);
        }

        Ok(WireProof {
            aggregate_signature,
            bitmask,
        })
    }

    /// Rebuild a circuit from a proof, without verifying it.
    ///
    /// Use [Self::decode_and_verify] unless the verification is done right after.
    pub fn decode(
        proof: &WireProof,
        directory: &MemberDirectory,
        digest: SignedDigest,
    ) -> Result<QuorumCircuit, CodecError> {
        let expected = SignerBitmask::byte_length_for(directory.len());
        let actual = proof.bitmask.as_bytes().len();
        if actual != expected {
            return Err(MalformedProofError::BitmaskLength { expected, actual }.into());
        }

        let mut accepted = BTreeSet::new();
        let mut keys = Vec::with_capacity(proof.bitmask.count());
        for position in proof.bitmask.positions() {
            let member =
                directory
                    .get(position)
                    .ok_or(MalformedProofError::PositionOutOfRange {
                        position,
                        directory_size: directory.len(),
                    })?;
            accepted.insert(member.identity().clone());
            keys.push(member.verification_key());
        }
        if keys.is_empty() {
            return Err(MalformedProofError::NoSigner.into());
        }

        let aggregate_verification_key = BlsVerificationKey::aggregate(&keys)
            .map_err(|_| MalformedProofError::InvalidAggregateSignature)?;

        Ok(QuorumCircuit::from_parts(
            digest,
            accepted,
            aggregate_verification_key,
            proof.aggregate_signature,
        ))
    }

    /// Rebuild a circuit from a proof and verify its aggregate signature.
    pub fn decode_and_verify(
        proof: &WireProof,
        directory: &MemberDirectory,
        digest: SignedDigest,
    ) -> Result<QuorumCircuit, CodecError> {
        let circuit = Self::decode(proof, directory, digest)?;
        circuit.verify().map_err(CodecError::InvalidProof)?;

        Ok(circuit)
    }

    /// Identities designated by a proof bitmask, in directory order.
    pub fn signers(
        bitmask: &SignerBitmask,
        directory: &MemberDirectory,
    ) -> Result<Vec<Identity>, MalformedProofError> {
        bitmask
            .positions()
            .into_iter()
            .map(|position| {
                directory
                    .get(position)
                    .map(|member| member.identity().clone())
                    .ok_or(MalformedProofError::PositionOutOfRange {
                        position,
                        directory_size: directory.len(),
                    })
            })
            .collect()
    }
}
