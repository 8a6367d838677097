//! The entities used by, and exchanged between, the requester and the validators.

mod attestation_message;
mod content_identifier;
mod data_availability_claim;
mod data_availability_proof;

pub use attestation_message::AttestationMessage;
pub use content_identifier::{
    ContentIdentifier, ContentIdentifierError, DAG_CBOR_CODEC, RAW_CODEC, SHA2_256_CODE,
};
pub use data_availability_claim::{ClaimType, DataAvailabilityClaim};
pub use data_availability_proof::DataAvailabilityProof;
