use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

use attest_bls::{BlsKeyPair, DirectoryEpoch, Member};

use crate::entities::ContentIdentifier;
use crate::test_utils::{AttestFixture, MemberFixture};

/// A builder of attestation fixtures.
pub struct AttestFixtureBuilder {
    number_of_members: usize,
    epoch: DirectoryEpoch,
    keys_seed: [u8; 32],
    content: Vec<u8>,
    with_accounts: bool,
}

impl Default for AttestFixtureBuilder {
    fn default() -> Self {
        Self {
            number_of_members: 4,
            epoch: DirectoryEpoch(1),
            keys_seed: [0u8; 32],
            content: b"compiled contract".to_vec(),
            with_accounts: true,
        }
    }
}

impl AttestFixtureBuilder {
    /// Set the number of members of the directory.
    pub fn with_members(mut self, number_of_members: usize) -> Self {
        self.number_of_members = number_of_members;
        self
    }

    /// Set the epoch of the directory.
    pub fn with_epoch(mut self, epoch: DirectoryEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    /// Set the seed used to generate the members keys
    pub fn with_keys_seed(mut self, seed: [u8; 32]) -> Self {
        self.keys_seed = seed;
        self
    }

    /// Set the bytes of the attested content.
    pub fn with_content<T: Into<Vec<u8>>>(mut self, content: T) -> Self {
        self.content = content.into();
        self
    }

    /// If set the members won't have an account name.
    pub fn without_accounts(mut self) -> Self {
        self.with_accounts = false;
        self
    }

    /// Transform the specified parameters to an [AttestFixture].
    pub fn build(self) -> AttestFixture {
        let mut rng = ChaCha20Rng::from_seed(self.keys_seed);
        let members = (0..self.number_of_members)
            .map(|index| {
                let key_pair = BlsKeyPair::generate(&mut rng);
                let member = Member::from(key_pair.identity());
                let member = match self.with_accounts {
                    true => member.with_account(format!("validator-{index}")),
                    false => member,
                };

                MemberFixture { key_pair, member }
            })
            .collect();
        let content = ContentIdentifier::for_binary(&self.content)
            .expect("Computing the cid of the fixture content should not fail");

        AttestFixture::new(self.epoch, members, content, self.content)
    }
}
