//! Test utilities
//!
//! They are enabled for tests of this crate and exposed to other crates through the
//! `test_tools` feature.

mod attest_fixture;
mod fixture_builder;
mod test_logger;

pub use attest_fixture::{AttestFixture, MemberFixture};
pub use fixture_builder::AttestFixtureBuilder;
pub use test_logger::{MemoryLogsInspector, TestLogger};
