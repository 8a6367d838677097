use std::collections::BTreeSet;

use crate::{
    BlsSignature, BlsVerificationKey, CircuitError, Identity, MemberDirectory, SignatureRejection,
};

/// The exact bytes every signer signs, fixed when a circuit is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedDigest(Vec<u8>);

impl SignedDigest {
    /// SignedDigest factory
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hexadecimal form of the digest bytes
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Vec<u8>> for SignedDigest {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for SignedDigest {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// A single contribution submitted to a [QuorumCircuit].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCandidate {
    /// Claimed identity of the signer
    pub identity: Identity,
    /// Verification key of the signer
    pub verification_key: BlsVerificationKey,
    /// Signature of the circuit digest
    pub signature: BlsSignature,
}

impl SignatureCandidate {
    /// Candidate whose identity is derived from its verification key
    pub fn new(verification_key: BlsVerificationKey, signature: BlsSignature) -> Self {
        Self {
            identity: Identity::derive(&verification_key),
            verification_key,
            signature,
        }
    }

    /// Candidate whose verification key is recovered from its identity
    pub fn from_identity(identity: Identity, signature: BlsSignature) -> Self {
        Self {
            verification_key: identity.verification_key(),
            identity,
            signature,
        }
    }
}

/// Outcome of [QuorumCircuit::add_many].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Identities folded into the circuit, in submission order
    pub accepted: Vec<Identity>,
    /// Rejected contributions, in submission order
    pub rejections: Vec<SignatureRejection>,
}

/// Accumulator of valid signatures over a single digest.
///
/// The accepted signer set, the aggregate verification key and the aggregate signature always
/// describe the same signers: either nobody has been accepted and there is no aggregate, or the
/// aggregate key is the sum of the accepted keys and the aggregate signature is the sum of their
/// signatures. A rejected contribution leaves the circuit untouched.
#[derive(Debug, Clone)]
pub struct QuorumCircuit {
    digest: SignedDigest,
    accepted: BTreeSet<Identity>,
    aggregate: Option<(BlsVerificationKey, BlsSignature)>,
}

impl QuorumCircuit {
    /// Create an empty circuit collecting signatures of the given digest.
    pub fn new(digest: SignedDigest) -> Self {
        Self {
            digest,
            accepted: BTreeSet::new(),
            aggregate: None,
        }
    }

    pub(crate) fn from_parts(
        digest: SignedDigest,
        accepted: BTreeSet<Identity>,
        aggregate_verification_key: BlsVerificationKey,
        aggregate_signature: BlsSignature,
    ) -> Self {
        Self {
            digest,
            accepted,
            aggregate: Some((aggregate_verification_key, aggregate_signature)),
        }
    }

    /// Fold a contribution into the circuit.
    ///
    /// Checks are done in order, cheapest first: identity consistency, duplicate, then the
    /// signature itself. A duplicate is rejected without any cryptographic verification.
    pub fn add(&mut self, candidate: SignatureCandidate) -> Result<(), SignatureRejection> {
        let SignatureCandidate {
            identity,
            verification_key,
            signature,
        } = candidate;

        if !identity.is_derived_from(&verification_key) {
            return Err(SignatureRejection::UnknownSigner(identity));
        }
        if self.accepted.contains(&identity) {
            return Err(SignatureRejection::DuplicateSigner(identity));
        }
        if signature
            .verify(self.digest.as_bytes(), &verification_key)
            .is_err()
        {
            return Err(SignatureRejection::InvalidSignature(identity));
        }

        let aggregate = match &self.aggregate {
            None => (verification_key, signature),
            Some((aggregate_key, aggregate_signature)) => {
                match (
                    aggregate_key.add(&verification_key),
                    aggregate_signature.add(&signature),
                ) {
                    (Ok(key), Ok(signature)) => (key, signature),
                    _ => return Err(SignatureRejection::InvalidSignature(identity)),
                }
            }
        };
        self.aggregate = Some(aggregate);
        self.accepted.insert(identity);

        Ok(())
    }

    /// Fold a contribution, rejecting identities outside of the given directory.
    pub fn add_with_directory(
        &mut self,
        candidate: SignatureCandidate,
        directory: &MemberDirectory,
    ) -> Result<(), SignatureRejection> {
        if !directory.contains(&candidate.identity) {
            return Err(SignatureRejection::UnknownSigner(candidate.identity));
        }

        self.add(candidate)
    }

    /// Fold several contributions, one at a time and in order.
    ///
    /// A duplicate inside the batch is treated as any other duplicate and only counted once.
    pub fn add_many<I>(&mut self, candidates: I) -> BatchReport
    where
        I: IntoIterator<Item = SignatureCandidate>,
    {
        let mut report = BatchReport::default();
        for candidate in candidates {
            let identity = candidate.identity.clone();
            match self.add(candidate) {
                Ok(()) => report.accepted.push(identity),
                Err(rejection) => report.rejections.push(rejection),
            }
        }

        report
    }

    /// Verify the aggregate signature against the aggregate verification key.
    pub fn verify(&self) -> Result<(), CircuitError> {
        let (aggregate_key, aggregate_signature) =
            self.aggregate.as_ref().ok_or(CircuitError::EmptyCircuit)?;

        aggregate_signature
            .verify(self.digest.as_bytes(), aggregate_key)
            .map_err(CircuitError::InvalidAggregate)
    }

    /// Check a single signature of the circuit digest without altering the circuit.
    pub fn verify_signature(&self, identity: &Identity, signature: &BlsSignature) -> bool {
        signature
            .verify(self.digest.as_bytes(), &identity.verification_key())
            .is_ok()
    }

    /// Check that the aggregate verification key is the aggregation of the given identities keys.
    pub fn matches_verification_keys(&self, identities: &[Identity]) -> bool {
        let Some((aggregate_key, _)) = &self.aggregate else {
            return identities.is_empty();
        };
        let keys: Vec<BlsVerificationKey> = identities
            .iter()
            .map(|identity| identity.verification_key())
            .collect();

        BlsVerificationKey::aggregate(&keys).is_ok_and(|key| &key == aggregate_key)
    }

    /// Number of accepted signers
    pub fn quorum_size(&self) -> usize {
        self.accepted.len()
    }

    /// Accepted signers
    pub fn accepted(&self) -> &BTreeSet<Identity> {
        &self.accepted
    }

    /// Has the given identity been accepted
    pub fn contains(&self, identity: &Identity) -> bool {
        self.accepted.contains(identity)
    }

    /// Is the circuit empty
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Aggregate verification key, absent until a first signer is accepted
    pub fn aggregate_verification_key(&self) -> Option<BlsVerificationKey> {
        self.aggregate.map(|(key, _)| key)
    }

    /// Aggregate signature, absent until a first signer is accepted
    pub fn aggregate_signature(&self) -> Option<BlsSignature> {
        self.aggregate.map(|(_, signature)| signature)
    }

    /// Digest signed by every accepted signer
    pub fn digest(&self) -> &SignedDigest {
        &self.digest
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    use crate::{BlsKeyPair, DirectoryEpoch};

    use super::*;

    fn key_pairs(count: usize, seed: u64) -> Vec<BlsKeyPair> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        (0..count).map(|_| BlsKeyPair::generate(&mut rng)).collect()
    }

    fn candidate(key_pair: &BlsKeyPair, digest: &SignedDigest) -> SignatureCandidate {
        SignatureCandidate::new(
            key_pair.verification_key(),
            key_pair.sign(digest.as_bytes()).unwrap(),
        )
    }

    fn digest() -> SignedDigest {
        SignedDigest::new(b"digest".to_vec())
    }

    #[test]
    fn new_circuit_is_empty() {
        let circuit = QuorumCircuit::new(digest());

        assert!(circuit.is_empty());
        assert_eq!(0, circuit.quorum_size());
        assert_eq!(None, circuit.aggregate_signature());
        assert_eq!(None, circuit.aggregate_verification_key());
        assert_eq!(Err(CircuitError::EmptyCircuit), circuit.verify());
    }

    #[test]
    fn first_signer_aggregate_is_its_own_key_and_signature() {
        let signer = &key_pairs(1, 1)[0];
        let mut circuit = QuorumCircuit::new(digest());
        let candidate = candidate(signer, &digest());

        circuit.add(candidate.clone()).unwrap();

        assert_eq!(1, circuit.quorum_size());
        assert_eq!(Some(candidate.verification_key), circuit.aggregate_verification_key());
        assert_eq!(Some(candidate.signature), circuit.aggregate_signature());
        circuit.verify().unwrap();
    }

    #[test]
    fn duplicate_signer_is_rejected_and_circuit_is_unchanged() {
        let signer = &key_pairs(1, 1)[0];
        let mut circuit = QuorumCircuit::new(digest());
        circuit.add(candidate(signer, &digest())).unwrap();
        let signature_before = circuit.aggregate_signature();

        let rejection = circuit
            .add(candidate(signer, &digest()))
            .expect_err("Duplicate signer should be rejected");

        assert_eq!(SignatureRejection::DuplicateSigner(signer.identity()), rejection);
        assert_eq!(1, circuit.quorum_size());
        assert_eq!(signature_before, circuit.aggregate_signature());
    }

    #[test]
    fn signature_of_another_digest_is_rejected() {
        let signer = &key_pairs(1, 1)[0];
        let mut circuit = QuorumCircuit::new(digest());

        let rejection = circuit
            .add(candidate(signer, &SignedDigest::new(b"other".to_vec())))
            .expect_err("Signature of another digest should be rejected");

        assert_eq!(SignatureRejection::InvalidSignature(signer.identity()), rejection);
        assert!(circuit.is_empty());
        assert_eq!(None, circuit.aggregate_signature());
    }

    #[test]
    fn identity_that_does_not_match_the_key_is_rejected() {
        let signers = key_pairs(2, 1);
        let mut circuit = QuorumCircuit::new(digest());
        let mut forged = candidate(&signers[0], &digest());
        forged.identity = signers[1].identity();

        let rejection = circuit
            .add(forged)
            .expect_err("Mismatching identity should be rejected");

        assert_eq!(SignatureRejection::UnknownSigner(signers[1].identity()), rejection);
        assert!(circuit.is_empty());
    }

    #[test]
    fn add_with_directory_rejects_outsiders() {
        let signers = key_pairs(3, 2);
        let directory = MemberDirectory::from_verification_keys(
            DirectoryEpoch(1),
            signers[..2].iter().map(|s| s.verification_key()),
        )
        .unwrap();
        let mut circuit = QuorumCircuit::new(digest());

        circuit
            .add_with_directory(candidate(&signers[0], &digest()), &directory)
            .unwrap();
        let rejection = circuit
            .add_with_directory(candidate(&signers[2], &digest()), &directory)
            .expect_err("Outsider should be rejected");

        assert_eq!(SignatureRejection::UnknownSigner(signers[2].identity()), rejection);
        assert_eq!(1, circuit.quorum_size());
    }

    #[test]
    fn add_many_reports_every_outcome_in_order() {
        let signers = key_pairs(3, 3);
        let mut circuit = QuorumCircuit::new(digest());

        let report = circuit.add_many(vec![
            candidate(&signers[0], &digest()),
            candidate(&signers[1], &SignedDigest::new(b"other".to_vec())),
            candidate(&signers[0], &digest()),
            candidate(&signers[2], &digest()),
        ]);

        assert_eq!(vec![signers[0].identity(), signers[2].identity()], report.accepted);
        assert_eq!(
            vec![
                SignatureRejection::InvalidSignature(signers[1].identity()),
                SignatureRejection::DuplicateSigner(signers[0].identity()),
            ],
            report.rejections
        );
        assert_eq!(2, circuit.quorum_size());
        circuit.verify().unwrap();
    }

    #[test]
    fn verify_signature_does_not_alter_the_circuit() {
        let signer = &key_pairs(1, 4)[0];
        let circuit = QuorumCircuit::new(digest());
        let signature = signer.sign(digest().as_bytes()).unwrap();

        assert!(circuit.verify_signature(&signer.identity(), &signature));
        assert!(!circuit.verify_signature(&key_pairs(1, 5)[0].identity(), &signature));
        assert!(circuit.is_empty());
    }

    #[test]
    fn matches_verification_keys_of_accepted_signers() {
        let signers = key_pairs(3, 6);
        let mut circuit = QuorumCircuit::new(digest());
        for signer in &signers[..2] {
            circuit.add(candidate(signer, &digest())).unwrap();
        }

        assert!(circuit.matches_verification_keys(&[signers[1].identity(), signers[0].identity()]));
        assert!(!circuit.matches_verification_keys(&[signers[0].identity()]));
        assert!(!circuit.matches_verification_keys(&[
            signers[0].identity(),
            signers[2].identity()
        ]));
        assert!(QuorumCircuit::new(digest()).matches_verification_keys(&[]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn aggregation_does_not_depend_on_the_submission_order(
            seed in any::<u64>(),
            count in 2..6usize,
            shuffle_seed in any::<u64>(),
        ) {
            let signers = key_pairs(count, seed);
            let candidates: Vec<SignatureCandidate> = signers.iter().map(|s| candidate(s, &digest())).collect();
            let mut shuffled = candidates.clone();
            // Deterministic rotation and swap driven by the shuffle seed.
            shuffled.rotate_left((shuffle_seed as usize) % count);
            shuffled.swap(0, count - 1);

            let mut circuit = QuorumCircuit::new(digest());
            circuit.add_many(candidates);
            let mut shuffled_circuit = QuorumCircuit::new(digest());
            shuffled_circuit.add_many(shuffled);

            prop_assert_eq!(circuit.accepted(), shuffled_circuit.accepted());
            prop_assert_eq!(circuit.aggregate_signature(), shuffled_circuit.aggregate_signature());
            prop_assert_eq!(
                circuit.aggregate_verification_key(),
                shuffled_circuit.aggregate_verification_key()
            );
            prop_assert!(shuffled_circuit.verify().is_ok());
        }

        #[test]
        fn any_mix_of_valid_and_invalid_contributions_still_verifies(
            seed in any::<u64>(),
            validity in prop::collection::vec(any::<bool>(), 1..8),
        ) {
            let signers = key_pairs(validity.len(), seed);
            let mut circuit = QuorumCircuit::new(digest());

            for (signer, valid) in signers.iter().zip(validity.iter()) {
                let signed = if *valid { digest() } else { SignedDigest::new(b"forged".to_vec()) };
                let _ = circuit.add(candidate(signer, &signed));
            }

            let valid_count = validity.iter().filter(|v| **v).count();
            prop_assert_eq!(valid_count, circuit.quorum_size());
            if valid_count > 0 {
                prop_assert!(circuit.verify().is_ok());
            } else {
                prop_assert_eq!(Err(CircuitError::EmptyCircuit), circuit.verify());
            }
        }
    }
}
