use attest_bls::{
    BlsKeyPair, DirectoryEpoch, Identity, Member, MemberDirectory, SignatureCandidate,
    SignedDigest,
};

use crate::entities::{AttestationMessage, ContentIdentifier, DataAvailabilityClaim};
use crate::messages::CollectionResponseMessage;
use crate::protocol::SingleSigner;

/// A fixture of attestation data: a member directory, the keys of its members and an
/// attested content.
#[derive(Debug, Clone)]
pub struct AttestFixture {
    epoch: DirectoryEpoch,
    members: Vec<MemberFixture>,
    content: ContentIdentifier,
    content_bytes: Vec<u8>,
}

/// A member of the directory with its key pair.
#[derive(Debug, Clone)]
pub struct MemberFixture {
    /// The key pair of the member
    pub key_pair: BlsKeyPair,
    /// The [Member] entry of the directory
    pub member: Member,
}

impl MemberFixture {
    /// Identity of the member
    pub fn identity(&self) -> &Identity {
        self.member.identity()
    }

    /// Build a [SingleSigner] from the member key pair.
    pub fn single_signer(&self) -> SingleSigner {
        SingleSigner::new(self.key_pair.clone()).expect("Fixture members can sign")
    }
}

impl AttestFixture {
    /// [AttestFixture] factory.
    pub fn new(
        epoch: DirectoryEpoch,
        members: Vec<MemberFixture>,
        content: ContentIdentifier,
        content_bytes: Vec<u8>,
    ) -> Self {
        Self {
            epoch,
            members,
            content,
            content_bytes,
        }
    }

    /// Epoch of the directory
    pub fn epoch(&self) -> DirectoryEpoch {
        self.epoch
    }

    /// Members of the directory, in directory order
    pub fn members(&self) -> &[MemberFixture] {
        &self.members
    }

    /// Get the member at the given position, panic if out of range.
    pub fn member(&self, position: usize) -> &MemberFixture {
        &self.members[position]
    }

    /// Identities of the members, in directory order
    pub fn identities(&self) -> Vec<Identity> {
        self.members.iter().map(|m| m.identity().clone()).collect()
    }

    /// The member directory
    pub fn directory(&self) -> MemberDirectory {
        MemberDirectory::new(
            self.epoch,
            self.members.iter().map(|m| m.member.clone()).collect(),
        )
        .expect("Fixture members are unique")
    }

    /// Identifier of the attested content
    pub fn content(&self) -> ContentIdentifier {
        self.content
    }

    /// Bytes of the attested content
    pub fn content_bytes(&self) -> &[u8] {
        &self.content_bytes
    }

    /// Data availability claim of the content
    pub fn claim(&self) -> DataAvailabilityClaim {
        DataAvailabilityClaim::new(self.content)
    }

    /// Message signed by the members
    pub fn message(&self) -> AttestationMessage {
        self.claim().to_message()
    }

    /// Digest signed by the members
    pub fn signed_digest(&self) -> SignedDigest {
        self.message()
            .compute_digest()
            .expect("Computing the fixture digest should not fail")
    }

    /// Signature of the claim by the member at the given position
    pub fn signature_candidate(&self, position: usize) -> SignatureCandidate {
        let member = self.member(position);
        let signature = member
            .single_signer()
            .sign_raw(&self.signed_digest())
            .expect("Fixture members can sign");

        SignatureCandidate::from_identity(member.identity().clone(), signature)
    }

    /// `success` response of the member at the given position
    pub fn success_response(&self, position: usize) -> CollectionResponseMessage {
        self.member(position)
            .single_signer()
            .build_response(&self.content, &self.message())
            .expect("Fixture members can build a response")
    }

    /// Serialized `success` response of the member at the given position
    pub fn success_response_bytes(&self, position: usize) -> Vec<u8> {
        self.success_response(position)
            .to_bytes()
            .expect("Response serialization should not fail")
    }

    /// Serialized `error` response of the member at the given position
    pub fn decline_response_bytes(&self, position: usize, reason: &str) -> Vec<u8> {
        self.member(position)
            .single_signer()
            .decline(&self.content, reason)
            .to_bytes()
            .expect("Response serialization should not fail")
    }
}
