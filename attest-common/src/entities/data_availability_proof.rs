use attest_bls::{DirectoryEpoch, WireProof};

use crate::entities::{ContentIdentifier, ContentIdentifierError, DataAvailabilityClaim};

/// Finalized proof that a quorum of validators attested the availability of a content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAvailabilityProof {
    /// Attested content
    pub cid: ContentIdentifier,

    /// Identifier of the signed [DataAvailabilityClaim]
    pub data: ContentIdentifier,

    /// Aggregate signature and signers bitmask
    pub signature: WireProof,

    /// Epoch of the member directory the bitmask refers to
    pub epoch: DirectoryEpoch,
}

impl DataAvailabilityProof {
    /// Build the proof of the given content, deriving the identifier of its claim.
    pub fn new(
        cid: ContentIdentifier,
        signature: WireProof,
        epoch: DirectoryEpoch,
    ) -> Result<Self, ContentIdentifierError> {
        Ok(Self {
            cid,
            data: DataAvailabilityClaim::new(cid).claim_identifier()?,
            signature,
            epoch,
        })
    }

    /// Claim the proof attests
    pub fn claim(&self) -> DataAvailabilityClaim {
        DataAvailabilityClaim::new(self.cid)
    }

    /// Number of signers designated by the bitmask
    pub fn signers_count(&self) -> usize {
        self.signature.bitmask.count()
    }
}
