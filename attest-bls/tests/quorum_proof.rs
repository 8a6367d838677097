use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

use attest_bls::{
    BlsKeyPair, BlsSignature, CircuitCodec, CodecError, DirectoryEpoch, MalformedProofError,
    MemberDirectory, QuorumCircuit, SignatureCandidate, SignatureRejection, SignedDigest,
    WireProof,
};

fn members(count: usize) -> (Vec<BlsKeyPair>, MemberDirectory) {
    let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
    let key_pairs: Vec<BlsKeyPair> = (0..count).map(|_| BlsKeyPair::generate(&mut rng)).collect();
    let directory = MemberDirectory::from_identities(
        DirectoryEpoch(7),
        key_pairs.iter().map(|key_pair| key_pair.identity().to_string()),
    )
    .unwrap();

    (key_pairs, directory)
}

fn contribution(key_pair: &BlsKeyPair, digest: &SignedDigest) -> SignatureCandidate {
    SignatureCandidate::from_identity(
        key_pair.identity(),
        key_pair.sign(digest.as_bytes()).unwrap(),
    )
}

#[test]
fn two_out_of_four_members_produce_a_verifiable_proof() {
    let (key_pairs, directory) = members(4);
    let digest = SignedDigest::new(b"cid-bytes".to_vec());
    let mut circuit = QuorumCircuit::new(digest.clone());

    // B then D sign, D resubmits, an outsider tries to join.
    circuit
        .add_with_directory(contribution(&key_pairs[1], &digest), &directory)
        .unwrap();
    circuit
        .add_with_directory(contribution(&key_pairs[3], &digest), &directory)
        .unwrap();
    assert_eq!(
        Err(SignatureRejection::DuplicateSigner(key_pairs[3].identity())),
        circuit.add_with_directory(contribution(&key_pairs[3], &digest), &directory)
    );
    let outsider = BlsKeyPair::generate(&mut ChaCha20Rng::from_seed([1u8; 32]));
    assert_eq!(
        Err(SignatureRejection::UnknownSigner(outsider.identity())),
        circuit.add_with_directory(contribution(&outsider, &digest), &directory)
    );

    let proof = CircuitCodec::encode(&circuit, &directory).unwrap();
    assert_eq!("0101", proof.bitmask.to_bit_string(directory.len()));

    // The receiver only gets the signature bytes and the bitmask bytes.
    let received = WireProof::from_bytes(
        &proof.aggregate_signature.to_bytes(),
        proof.bitmask.as_bytes().to_vec(),
    )
    .unwrap();
    let decoded = CircuitCodec::decode_and_verify(&received, &directory, digest).unwrap();

    assert_eq!(2, decoded.quorum_size());
    assert!(decoded.contains(&key_pairs[1].identity()));
    assert!(decoded.contains(&key_pairs[3].identity()));
    assert!(decoded.matches_verification_keys(&[
        key_pairs[1].identity(),
        key_pairs[3].identity()
    ]));
}

#[test]
fn proof_decoded_against_a_directory_of_another_size_is_rejected() {
    let (key_pairs, directory) = members(9);
    let digest = SignedDigest::new(b"cid-bytes".to_vec());
    let mut circuit = QuorumCircuit::new(digest.clone());
    circuit.add(contribution(&key_pairs[8], &digest)).unwrap();
    let proof = CircuitCodec::encode(&circuit, &directory).unwrap();

    let smaller = MemberDirectory::from_identities(
        DirectoryEpoch(6),
        key_pairs[..8].iter().map(|key_pair| key_pair.identity().to_string()),
    )
    .unwrap();

    assert!(matches!(
        CircuitCodec::decode_and_verify(&proof, &smaller, digest),
        Err(CodecError::MalformedProof(
            MalformedProofError::BitmaskLength {
                expected: 1,
                actual: 2
            }
        ))
    ));
}

#[test]
fn proof_with_a_forged_aggregate_signature_is_rejected() {
    let (key_pairs, directory) = members(4);
    let digest = SignedDigest::new(b"cid-bytes".to_vec());
    let mut circuit = QuorumCircuit::new(digest.clone());
    circuit.add(contribution(&key_pairs[0], &digest)).unwrap();
    let mut proof = CircuitCodec::encode(&circuit, &directory).unwrap();

    let forged: BlsSignature = key_pairs[2].sign(digest.as_bytes()).unwrap();
    proof.aggregate_signature = forged;

    assert!(matches!(
        CircuitCodec::decode_and_verify(&proof, &directory, digest),
        Err(CodecError::InvalidProof(_))
    ));
}
