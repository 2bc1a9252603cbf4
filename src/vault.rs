use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::VaultResult;

pub use fs::{FsFile, FsVault};
pub use memory::{MemoryFile, MemoryVault};

mod fs;
mod memory;

/// Resolves a display name or path to a file handle.
pub trait FileLocator<F> {
    fn locate(&self, name: &str) -> Option<F>;
}

/// Storage holding the ledger file.
///
/// Nothing here serialises separate calls: two operations issued concurrently against the same
/// file may each read the same snapshot and the later write wins.
#[async_trait]
pub trait Vault: Send + Sync {
    type File: Clone + Debug + Send + Sync;

    /// Reads the current contents of `file` from storage.
    async fn read(&self, file: &Self::File) -> VaultResult<String>;

    /// Reads `file`, possibly from a snapshot kept by the vault instead of storage.
    async fn cached_read(&self, file: &Self::File) -> VaultResult<String> {
        self.read(file).await
    }

    /// Replaces the contents of an existing file.
    async fn modify(&self, file: &Self::File, contents: &str) -> VaultResult<()>;

    /// Creates a new file at `path`. Fails if one already exists.
    async fn create(&self, path: &str, contents: &str) -> VaultResult<Self::File>;
}
