#![warn(missing_docs)]

//! Requester side of the attestation protocol.
//!
//! A [CollectionSession][services::CollectionSession] publishes a collection request on the
//! [gossip] network, folds the signatures of the validators it receives into a quorum circuit
//! and, once the quorum is reached, compresses them into a
//! [data availability proof][attest_common::entities::DataAvailabilityProof].
//! The [ProofVerifier][services::ProofVerifier] checks such a proof on the receiving side.

mod configuration;
pub mod gossip;
pub mod services;

pub use configuration::{
    CollectionParameters, Configuration, ConfigurationError, DefaultConfiguration,
    ExecutionEnvironment,
};
