//! Local artifact storage.
//!
//! Files live under the upload root in purpose-named buckets. Stored names
//! are generated (`{uuid}_{sanitized original}`) so client-supplied names
//! are never trusted and concurrent uploads cannot collide; writes use
//! create-new semantics and never overwrite an existing file.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// The purpose-named buckets under the upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Posters,
    Presentations,
    GroupIntake,
    SubmissionIntake,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Posters,
        Bucket::Presentations,
        Bucket::GroupIntake,
        Bucket::SubmissionIntake,
    ];

    /// Directory name under the upload root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Bucket::Posters => "posters",
            Bucket::Presentations => "presentations",
            Bucket::GroupIntake => "group-intake",
            Bucket::SubmissionIntake => "submission-intake",
        }
    }
}

/// Filesystem-backed artifact store rooted at the upload directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The upload root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root and every bucket directory.
    pub async fn ensure_buckets(&self) -> io::Result<()> {
        for bucket in Bucket::ALL {
            tokio::fs::create_dir_all(self.root.join(bucket.dir_name())).await?;
        }
        Ok(())
    }

    /// Absolute path of a stored file.
    pub fn path(&self, bucket: Bucket, stored_name: &str) -> PathBuf {
        self.root.join(bucket.dir_name()).join(stored_name)
    }

    /// Public URL path for a stored file.
    pub fn url_path(bucket: Bucket, stored_name: &str) -> String {
        format!("/files/{}/{}", bucket.dir_name(), stored_name)
    }

    /// Writes `bytes` into `bucket` under a freshly generated name and
    /// returns that name. Fails rather than overwrite.
    pub async fn store(
        &self,
        bucket: Bucket,
        original_name: &str,
        bytes: &[u8],
    ) -> io::Result<String> {
        let stored_name = generate_stored_name(original_name);
        let path = self.path(bucket, &stored_name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(stored_name)
    }

    /// Moves a stored file between buckets, keeping its stored name.
    pub async fn promote(&self, from: Bucket, to: Bucket, stored_name: &str) -> io::Result<()> {
        tokio::fs::rename(self.path(from, stored_name), self.path(to, stored_name)).await
    }

    /// Removes a stored file.
    pub async fn delete(&self, bucket: Bucket, stored_name: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.path(bucket, stored_name)).await
    }

    /// Lists the regular files in a bucket, sorted by name so batch
    /// operations over a bucket are deterministic.
    pub async fn list(&self, bucket: Bucket) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(self.root.join(bucket.dir_name())).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Builds a collision-resistant stored name from an untrusted original.
fn generate_stored_name(original_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_name))
}

/// Strips path components and replaces anything outside a conservative
/// character set.
fn sanitize_filename(original: &str) -> String {
    let basename = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.ensure_buckets().await.unwrap();
        (dir, store)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("poster.pdf"), "poster.pdf");
        assert_eq!(sanitize_filename("my poster (v2).pdf"), "my_poster__v2_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\a.pdf"), "a.pdf");
        assert_eq!(sanitize_filename("...."), "file");
    }

    #[test]
    fn test_url_path() {
        assert_eq!(
            ArtifactStore::url_path(Bucket::Posters, "abc_poster.pdf"),
            "/files/posters/abc_poster.pdf"
        );
    }

    #[tokio::test]
    async fn test_store_generates_unique_names() {
        let (_dir, store) = store().await;
        let first = store.store(Bucket::Posters, "a.pdf", b"one").await.unwrap();
        let second = store.store(Bucket::Posters, "a.pdf", b"two").await.unwrap();
        assert_ne!(first, second);
        assert!(first.ends_with("_a.pdf"));

        let contents = tokio::fs::read(store.path(Bucket::Posters, &first))
            .await
            .unwrap();
        assert_eq!(contents, b"one");
    }

    #[tokio::test]
    async fn test_promote_moves_between_buckets() {
        let (_dir, store) = store().await;
        let name = store
            .store(Bucket::SubmissionIntake, "x_poster.pdf", b"data")
            .await
            .unwrap();
        store
            .promote(Bucket::SubmissionIntake, Bucket::Posters, &name)
            .await
            .unwrap();

        assert!(store.path(Bucket::Posters, &name).exists());
        assert!(!store.path(Bucket::SubmissionIntake, &name).exists());
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_files_only() {
        let (_dir, store) = store().await;
        store
            .store(Bucket::SubmissionIntake, "b.pdf", b"b")
            .await
            .unwrap();
        store
            .store(Bucket::SubmissionIntake, "a.pdf", b"a")
            .await
            .unwrap();

        let listed = store.list(Bucket::SubmissionIntake).await.unwrap();
        assert_eq!(listed.len(), 2);
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(listed, sorted);
    }
}
