use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{FileLocator, Vault};
use crate::error::{VaultError, VaultResult};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemoryFile {
    path: String,
}

impl MemoryFile {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Vault kept entirely in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryVault {
    files: RwLock<BTreeMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.insert(path, contents);
        self
    }

    /// Writes `path` directly, as an editor outside the engine would.
    pub fn insert(&self, path: &str, contents: &str) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), contents.to_string());
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

impl FileLocator<MemoryFile> for MemoryVault {
    /// Tries the exact path, then the path without its extension, then the file name with or
    /// without its extension.
    fn locate(&self, name: &str) -> Option<MemoryFile> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let wanted = Path::new(name);
        let found = if files.contains_key(name) {
            Some(name)
        } else {
            files
                .keys()
                .map(String::as_str)
                .find(|path| Path::new(path).with_extension("") == wanted)
                .or_else(|| {
                    files
                        .keys()
                        .map(String::as_str)
                        .find(|path| {
                            let path = Path::new(path);
                            path.file_name() == Some(wanted.as_os_str())
                                || path.file_stem() == Some(wanted.as_os_str())
                        })
                })
        };
        found.map(|path| MemoryFile {
            path: path.to_string(),
        })
    }
}

#[async_trait]
impl Vault for MemoryVault {
    type File = MemoryFile;

    async fn read(&self, file: &MemoryFile) -> VaultResult<String> {
        self.contents(&file.path)
            .ok_or_else(|| VaultError::NotFound(file.path.clone()))
    }

    async fn modify(&self, file: &MemoryFile, contents: &str) -> VaultResult<()> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        match files.get_mut(&file.path) {
            Some(existing) => {
                *existing = contents.to_string();
                Ok(())
            }
            None => Err(VaultError::NotFound(file.path.clone())),
        }
    }

    async fn create(&self, path: &str, contents: &str) -> VaultResult<MemoryFile> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        if files.contains_key(path) {
            return Err(VaultError::AlreadyExists(path.to_string()));
        }
        files.insert(path.to_string(), contents.to_string());
        Ok(MemoryFile {
            path: path.to_string(),
        })
    }
}
