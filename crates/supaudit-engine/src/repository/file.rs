use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fd_lock::RwLock as FileLock;
use supaudit_core::{AuditError, AuditLogEntry, ProjectCredential, Result};
use tracing::debug;
use uuid::Uuid;

use super::{Repository, StoreDocument};

/// Repository backed by a single JSON document on disk.
///
/// Every operation takes an advisory lock on a sibling `.lock` file and
/// reads the document fresh, so several processes can share one store.
/// Mutations are written to a uniquely named temporary file and renamed
/// over the document.
#[derive(Debug, Clone)]
pub struct FileRepository {
    paths: Arc<StorePaths>,
}

#[derive(Debug)]
struct StorePaths {
    document: PathBuf,
    lock: PathBuf,
}

impl FileRepository {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let document = path.into();
        let mut lock = document.clone().into_os_string();
        lock.push(".lock");

        let repo = Self {
            paths: Arc::new(StorePaths {
                document,
                lock: PathBuf::from(lock),
            }),
        };
        // Surface a corrupt document here rather than on first use
        repo.read(|_| Ok(())).await?;
        debug!(path = %repo.path().display(), "opened credential store");

        Ok(repo)
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.paths.document
    }

    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&StoreDocument) -> Result<T> + Send + 'static,
    {
        let paths = Arc::clone(&self.paths);
        blocking(move || {
            let lock = FileLock::new(paths.open_lock()?);
            let _guard = lock.read()?;
            f(&paths.load()?)
        })
        .await
    }

    async fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut StoreDocument) -> Result<T> + Send + 'static,
    {
        let paths = Arc::clone(&self.paths);
        blocking(move || {
            let mut lock = FileLock::new(paths.open_lock()?);
            let _guard = lock.write()?;
            let mut doc = paths.load()?;
            let out = f(&mut doc)?;
            paths.persist(&doc)?;
            Ok(out)
        })
        .await
    }
}

impl StorePaths {
    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.document.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock)?)
    }

    fn load(&self) -> Result<StoreDocument> {
        match fs::read_to_string(&self.document) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AuditError::Persistence(format!("corrupt store {}: {e}", self.document.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, doc: &StoreDocument) -> Result<()> {
        let mut tmp = self.document.clone().into_os_string();
        tmp.push(format!(".{}.{}.tmp", std::process::id(), Uuid::new_v4().simple()));
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(doc)?)?;
        if let Err(e) = fs::rename(&tmp, &self.document) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuditError::Persistence(format!("store task failed: {e}")))?
}

#[async_trait]
impl Repository for FileRepository {
    async fn find_credential(&self, project_ref: &str) -> Result<Option<ProjectCredential>> {
        let project_ref = project_ref.to_string();
        self.read(move |doc| doc.find_credential(&project_ref)).await
    }

    async fn create_credential(&self, credential: ProjectCredential) -> Result<ProjectCredential> {
        self.mutate(move |doc| doc.insert_credential(credential)).await
    }

    async fn append_audit_entry(&self, entry: AuditLogEntry) -> Result<()> {
        self.mutate(move |doc| doc.append_entry(entry)).await
    }

    async fn list_audit_entries(&self, project_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        self.read(move |doc| Ok(doc.entries_for(project_id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let repo = FileRepository::open(&path).await.unwrap();
        let credential = repo
            .create_credential(ProjectCredential::new("abc123", "a:b:c"))
            .await
            .unwrap();
        repo.append_audit_entry(AuditLogEntry::new(credential.id, "User MFA Check").counts(1, 0))
            .await
            .unwrap();
        drop(repo);

        let reopened = FileRepository::open(&path).await.unwrap();
        let found = reopened.find_credential("abc123").await.unwrap().unwrap();
        assert_eq!(found.id, credential.id);
        assert_eq!(found.encrypted_access_key, "a:b:c");

        let entries = reopened.list_audit_entries(credential.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].success_count, 1);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::open(dir.path().join("store.json"))
            .await
            .unwrap();

        let err = repo
            .append_audit_entry(AuditLogEntry::new(Uuid::new_v4(), "User MFA Check"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Persistence(_)));
        assert!(!repo.path().exists());
    }

    #[tokio::test]
    async fn corrupt_store_is_a_persistence_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileRepository::open(&path).await.unwrap_err();
        assert!(matches!(err, AuditError::Persistence(_)));
    }

    #[tokio::test]
    async fn handles_on_one_path_see_each_others_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let a = FileRepository::open(&path).await.unwrap();
        let b = FileRepository::open(&path).await.unwrap();

        let first = a
            .create_credential(ProjectCredential::new("aaa", "t"))
            .await
            .unwrap();
        b.create_credential(ProjectCredential::new("bbb", "t"))
            .await
            .unwrap();
        a.append_audit_entry(AuditLogEntry::new(first.id, "User MFA Check"))
            .await
            .unwrap();

        let reopened = FileRepository::open(&path).await.unwrap();
        assert!(reopened.find_credential("aaa").await.unwrap().is_some());
        assert!(reopened.find_credential("bbb").await.unwrap().is_some());
        assert_eq!(reopened.list_audit_entries(first.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_handle_cannot_duplicate_a_credential() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let c = FileRepository::open(&path).await.unwrap();
        let d = FileRepository::open(&path).await.unwrap();

        c.create_credential(ProjectCredential::new("ccc", "t"))
            .await
            .unwrap();
        let err = d
            .create_credential(ProjectCredential::new("ccc", "u"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Persistence(_)));
        assert_eq!(d.find_credential("ccc").await.unwrap().unwrap().encrypted_access_key, "t");
    }

    #[tokio::test]
    async fn concurrent_creates_from_separate_handles_keep_every_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                tokio::spawn(async move {
                    let repo = FileRepository::open(path).await.unwrap();
                    repo.create_credential(ProjectCredential::new(format!("p{i}"), "t"))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let repo = FileRepository::open(&path).await.unwrap();
        for i in 0..8 {
            assert!(repo.find_credential(&format!("p{i}")).await.unwrap().is_some());
        }
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
