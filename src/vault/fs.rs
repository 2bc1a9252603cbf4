use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use walkdir::WalkDir;

use super::{FileLocator, Vault};
use crate::error::{VaultError, VaultResult};

/// Extensions tried when a name is given without one.
const EXTENSIONS: &[&str] = &["md", "ledger"];

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FsFile {
    path: PathBuf,
}

impl FsFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

/// Text last seen for a file, with the metadata it had at the time.
#[derive(Clone, Debug)]
struct Snapshot {
    contents: String,
    modified: Option<SystemTime>,
    len: u64,
}

impl Snapshot {
    fn matches(&self, meta: &std::fs::Metadata) -> bool {
        self.len == meta.len() && self.modified.is_some() && self.modified == meta.modified().ok()
    }
}

/// Vault backed by a directory on disk.
///
/// `cached_read` answers from the last text this vault read or wrote for a file while the file's
/// length and modification time are unchanged. Any other change sends it back to disk.
#[derive(Debug)]
pub struct FsVault {
    root: PathBuf,
    snapshots: Mutex<HashMap<PathBuf, Snapshot>>,
}

impl FsVault {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        FsVault {
            root: root.into(),
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a vault-relative path onto the root, refusing anything that could leave it.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        if name.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Records `contents` as the text of `path` as of `meta`. Without metadata nothing is kept.
    fn remember(&self, path: &Path, contents: &str, meta: Option<std::fs::Metadata>) {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        match meta {
            Some(meta) => {
                snapshots.insert(
                    path.to_path_buf(),
                    Snapshot {
                        contents: contents.to_string(),
                        modified: meta.modified().ok(),
                        len: meta.len(),
                    },
                );
            }
            None => {
                snapshots.remove(path);
            }
        }
    }

    fn snapshot(&self, path: &Path) -> Option<Snapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

impl FileLocator<FsFile> for FsVault {
    /// Tries the exact path, then the path with a known extension if it has none, then any file
    /// in the vault whose name, with or without its extension, is `name`.
    fn locate(&self, name: &str) -> Option<FsFile> {
        let exact = self.resolve(name)?;
        if exact.is_file() {
            return Some(FsFile { path: exact });
        }
        if exact.extension().is_none() {
            for ext in EXTENSIONS {
                let candidate = exact.with_extension(ext);
                if candidate.is_file() {
                    return Some(FsFile { path: candidate });
                }
            }
        }
        let wanted = Some(Path::new(name).as_os_str());
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .find(|entry| entry.path().file_name() == wanted || entry.path().file_stem() == wanted)
            .map(|entry| FsFile {
                path: entry.into_path(),
            })
    }
}

#[async_trait]
impl Vault for FsVault {
    type File = FsFile;

    async fn read(&self, file: &FsFile) -> VaultResult<String> {
        // Metadata first: a change landing mid-read leaves a snapshot that no longer matches.
        let meta = tokio::fs::metadata(&file.path).await.ok();
        let contents = tokio::fs::read_to_string(&file.path)
            .await
            .map_err(|e| VaultError::from_io(&file.display(), e))?;
        self.remember(&file.path, &contents, meta);
        Ok(contents)
    }

    async fn cached_read(&self, file: &FsFile) -> VaultResult<String> {
        if let Some(snapshot) = self.snapshot(&file.path) {
            let meta = tokio::fs::metadata(&file.path)
                .await
                .map_err(|e| VaultError::from_io(&file.display(), e))?;
            if snapshot.matches(&meta) {
                return Ok(snapshot.contents);
            }
            debug!(path = %file.display(), "file changed on disk, rereading");
        }
        self.read(file).await
    }

    async fn modify(&self, file: &FsFile, contents: &str) -> VaultResult<()> {
        if !file.path.is_file() {
            return Err(VaultError::NotFound(file.display()));
        }
        tokio::fs::write(&file.path, contents)
            .await
            .map_err(|e| VaultError::from_io(&file.display(), e))?;
        let meta = tokio::fs::metadata(&file.path).await.ok();
        self.remember(&file.path, contents, meta);
        Ok(())
    }

    async fn create(&self, path: &str, contents: &str) -> VaultResult<FsFile> {
        let full = self
            .resolve(path)
            .ok_or_else(|| VaultError::InvalidPath(path.to_string()))?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| VaultError::from_io(path, e))?;
        }
        let mut out = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .map_err(|e| VaultError::from_io(path, e))?;
        out.write_all(contents.as_bytes())
            .await
            .map_err(|e| VaultError::from_io(path, e))?;
        out.flush().await.map_err(|e| VaultError::from_io(path, e))?;
        debug!(path = %full.display(), bytes = contents.len(), "created vault file");
        let meta = tokio::fs::metadata(&full).await.ok();
        self.remember(&full, contents, meta);
        Ok(FsFile { path: full })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_tries_extensions_then_file_names() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("Finance"))?;
        std::fs::write(dir.path().join("Finance/transactions.ledger"), "")?;
        std::fs::write(dir.path().join("budget.md"), "")?;
        let vault = FsVault::new(dir.path());

        let exact = vault.locate("Finance/transactions.ledger");
        assert_eq!(
            exact.map(|f| f.path().to_path_buf()),
            Some(dir.path().join("Finance/transactions.ledger"))
        );
        let by_ext = vault.locate("budget");
        assert_eq!(
            by_ext.map(|f| f.path().to_path_buf()),
            Some(dir.path().join("budget.md"))
        );
        let by_name = vault.locate("transactions");
        assert_eq!(
            by_name.map(|f| f.path().to_path_buf()),
            Some(dir.path().join("Finance/transactions.ledger"))
        );
        let by_full_name = vault.locate("transactions.ledger");
        assert_eq!(
            by_full_name.map(|f| f.path().to_path_buf()),
            Some(dir.path().join("Finance/transactions.ledger"))
        );
        assert!(vault.locate("budget.ledger").is_none());
        assert!(vault.locate("missing").is_none());
        assert!(vault.locate("../outside").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn create_makes_parents_and_never_overwrites() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let vault = FsVault::new(dir.path());
        let file = vault.create("Finance/new.ledger", "hello").await?;
        assert_eq!(std::fs::read_to_string(file.path())?, "hello");
        assert!(matches!(
            vault.create("Finance/new.ledger", "again").await,
            Err(VaultError::AlreadyExists(_))
        ));
        assert!(matches!(
            vault.create("/etc/passwd", "x").await,
            Err(VaultError::InvalidPath(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn cached_read_follows_changes_on_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("l.ledger"), "one")?;
        let vault = FsVault::new(dir.path());
        let file = vault.locate("l.ledger").expect("file exists");

        assert_eq!(vault.cached_read(&file).await?, "one");
        assert_eq!(vault.cached_read(&file).await?, "one");
        std::fs::write(dir.path().join("l.ledger"), "one\ntwo")?;
        assert_eq!(vault.cached_read(&file).await?, "one\ntwo");

        vault.modify(&file, "three").await?;
        assert_eq!(vault.cached_read(&file).await?, "three");
        assert_eq!(std::fs::read_to_string(file.path())?, "three");
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_maps_to_not_found() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let vault = FsVault::new(dir.path());
        let file = FsFile {
            path: dir.path().join("gone.ledger"),
        };
        assert!(matches!(vault.read(&file).await, Err(VaultError::NotFound(_))));
        assert!(matches!(
            vault.modify(&file, "x").await,
            Err(VaultError::NotFound(_))
        ));
        Ok(())
    }
}
