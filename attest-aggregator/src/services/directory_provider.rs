use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;

use attest_bls::{DirectoryEpoch, MemberDirectory};
use attest_common::StdResult;

/// Source of the canonical, ordered list of validators.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MemberDirectoryProvider: Sync + Send {
    /// Directory of the current epoch
    async fn current_directory(&self) -> StdResult<Arc<MemberDirectory>>;

    /// Directory of the given epoch, if it is known
    async fn directory_at(&self, epoch: DirectoryEpoch) -> StdResult<Option<Arc<MemberDirectory>>>;
}

/// A [MemberDirectoryProvider] serving directories known in advance.
pub struct StaticMemberDirectoryProvider {
    directories: BTreeMap<DirectoryEpoch, Arc<MemberDirectory>>,
}

impl StaticMemberDirectoryProvider {
    /// Provider of a single directory
    pub fn new(directory: MemberDirectory) -> Self {
        Self::from_directories(vec![directory])
    }

    /// Provider of several directories, the current one being the one of the latest epoch
    pub fn from_directories(directories: Vec<MemberDirectory>) -> Self {
        Self {
            directories: directories
                .into_iter()
                .map(|directory| (directory.epoch(), Arc::new(directory)))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl MemberDirectoryProvider for StaticMemberDirectoryProvider {
    async fn current_directory(&self) -> StdResult<Arc<MemberDirectory>> {
        self.directories
            .values()
            .next_back()
            .cloned()
            .ok_or_else(|| anyhow!("No member directory available"))
    }

    async fn directory_at(&self, epoch: DirectoryEpoch) -> StdResult<Option<Arc<MemberDirectory>>> {
        Ok(self.directories.get(&epoch).cloned())
    }
}
