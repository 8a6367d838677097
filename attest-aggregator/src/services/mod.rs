//! Services module
//!
//! This module regroups the services of the requester: the collection of the validators
//! signatures, the verification of the resulting proofs and the resolution of the member
//! directory they refer to.

mod collection_session;
mod directory_provider;
mod proof_verifier;

pub use collection_session::{
    CollectionError, CollectionSession, SessionReport, SessionState, SessionStep,
};
pub use directory_provider::{MemberDirectoryProvider, StaticMemberDirectoryProvider};
pub use proof_verifier::{ProofVerificationError, ProofVerifier};

#[cfg(test)]
pub use directory_provider::MockMemberDirectoryProvider;
