#![warn(missing_docs)]

//! Shared datatypes and traits used by the attestation rust projects
//!
//! Provide:
//! - The [entities] exchanged between the requester and the validators: the attested
//!   [message][entities::AttestationMessage], its [content identifier][entities::ContentIdentifier]
//!   and the final [data availability proof][entities::DataAvailabilityProof].
//! - The gossip [messages] and their wire encodings.
//! - The validator side of the protocol: the [single signer][protocol::SingleSigner].
//! - Logging helpers and, behind the `test_tools` feature, test utilities.

macro_rules! cfg_test_tools {
    ($($item:item)*) => {
        $(
            #[cfg(any(test, feature = "test_tools"))]
            $item
        )*
    }
}

pub mod entities;
pub mod logging;
pub mod messages;
pub mod protocol;

cfg_test_tools! {
    pub mod test_utils;
}

/// Generic error type
pub type StdError = anyhow::Error;

/// Generic result type
pub type StdResult<T> = anyhow::Result<T>;
