use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{BlsVerificationKey, DirectoryError, Identity};

/// Version of a [MemberDirectory], a proof can only be decoded against the directory of the
/// epoch it was produced in.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DirectoryEpoch(pub u64);

impl DirectoryEpoch {
    /// Epoch that follows this one, `None` once the last epoch is reached
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Display for DirectoryEpoch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directory member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    identity: Identity,
    verification_key: BlsVerificationKey,
    account: Option<String>,
}

impl Member {
    /// Member constructor, fails if the identity is not derived from the verification key.
    pub fn new(
        identity: Identity,
        verification_key: BlsVerificationKey,
    ) -> Result<Self, DirectoryError> {
        if !identity.is_derived_from(&verification_key) {
            return Err(DirectoryError::IdentityMismatch(identity));
        }

        Ok(Self {
            identity,
            verification_key,
            account: None,
        })
    }

    /// Attach the name of the account operating this member
    pub fn with_account<T: Into<String>>(mut self, account: T) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Identity of the member
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Verification key of the member
    pub fn verification_key(&self) -> BlsVerificationKey {
        self.verification_key
    }

    /// Account operating this member, if known
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}

impl From<Identity> for Member {
    fn from(identity: Identity) -> Self {
        let verification_key = identity.verification_key();

        Self {
            identity,
            verification_key,
            account: None,
        }
    }
}

/// Ordered list of the members allowed to sign during an epoch.
///
/// The position of a member in the directory is its bit in a signer bitmask, so the order is
/// part of the protocol and must be identical for the proof producer and the proof verifiers.
/// A directory is immutable once built.
#[derive(Debug, Clone)]
pub struct MemberDirectory {
    epoch: DirectoryEpoch,
    members: Vec<Member>,
    positions: HashMap<Identity, usize>,
}

impl MemberDirectory {
    /// Build a directory, rejecting duplicated identities.
    pub fn new(epoch: DirectoryEpoch, members: Vec<Member>) -> Result<Self, DirectoryError> {
        let mut positions = HashMap::with_capacity(members.len());
        for (position, member) in members.iter().enumerate() {
            if positions.insert(member.identity.clone(), position).is_some() {
                return Err(DirectoryError::DuplicateMember(member.identity.clone()));
            }
        }

        Ok(Self {
            epoch,
            members,
            positions,
        })
    }

    /// Build a directory from the textual identities delivered by a membership source.
    pub fn from_identities<I, T>(epoch: DirectoryEpoch, identities: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let members = identities
            .into_iter()
            .map(|did| Identity::parse(did.as_ref()).map(Member::from))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(epoch, members)
    }

    /// Build a directory from verification keys, deriving every identity.
    pub fn from_verification_keys<I>(epoch: DirectoryEpoch, keys: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = BlsVerificationKey>,
    {
        let members = keys
            .into_iter()
            .map(|key| Member::from(Identity::derive(&key)))
            .collect();

        Self::new(epoch, members)
    }

    /// Epoch of the directory
    pub fn epoch(&self) -> DirectoryEpoch {
        self.epoch
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Is the directory empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of the given identity, if it is a member
    pub fn position_of(&self, identity: &Identity) -> Option<usize> {
        self.positions.get(identity).copied()
    }

    /// Is the given identity a member
    pub fn contains(&self, identity: &Identity) -> bool {
        self.positions.contains_key(identity)
    }

    /// Member at the given position
    pub fn get(&self, position: usize) -> Option<&Member> {
        self.members.get(position)
    }

    /// Members, in directory order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Identities, in directory order
    pub fn identities(&self) -> impl Iterator<Item = &Identity> + '_ {
        self.members.iter().map(|member| &member.identity)
    }
}
