//! Protocol module
//!
//! This module contains the validator side of the attestation protocol.

mod single_signer;

pub use single_signer::{SignerError, SingleSigner};
