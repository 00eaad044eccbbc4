/// Filesystem-backed store for uploaded images
///
/// Files live in per-category folders under the store root and are
/// addressed by a public URL path of the form `/uploads/<category>/<name>`.
/// Records may also reference arbitrary external URLs; those never touch
/// this store.
use crate::error::{ApiError, ApiResult};
use chrono::Utc;
use rand::Rng;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// URL prefix under which stored assets are served
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Destination folder for an upload, derived from the form field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    Events,
    News,
    Others,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Events => "events",
            AssetCategory::News => "news",
            AssetCategory::Others => "others",
        }
    }

    /// Map an upload field name to its destination folder
    pub fn for_field(field: &str) -> Self {
        match field {
            "poster" => AssetCategory::Events,
            "image" => AssetCategory::News,
            _ => AssetCategory::Others,
        }
    }
}

/// Disk-backed asset store
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// On-disk directory the public prefix maps onto
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when a path points into this store rather than at an external URL
    pub fn is_owned(path: &str) -> bool {
        path.starts_with("/uploads/")
    }

    /// Store a file and return its public path
    ///
    /// The generated name keeps the original extension; the category folder
    /// is created on demand.
    pub async fn put(
        &self,
        category: AssetCategory,
        extension: &str,
        data: &[u8],
    ) -> ApiResult<String> {
        let dir = self.root.join(category.as_str());
        fs::create_dir_all(&dir).await.map_err(|e| {
            ApiError::AssetStorage(format!("failed to create {}: {}", dir.display(), e))
        })?;

        let name = generate_name(extension);
        let path = dir.join(&name);
        fs::write(&path, data).await.map_err(|e| {
            ApiError::AssetStorage(format!("failed to write {}: {}", path.display(), e))
        })?;

        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, category.as_str(), name))
    }

    /// Resolve a store-owned public path to its on-disk location
    ///
    /// Returns None for external URLs and for paths that would escape the
    /// store root.
    pub fn disk_path(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.strip_prefix("/uploads/")?;
        if relative.is_empty() {
            return None;
        }

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        Some(self.root.join(relative))
    }

    /// Remove a stored file
    ///
    /// Already-absent files and paths outside the store are a no-op, not an
    /// error.
    pub async fn delete(&self, public_path: &str) -> ApiResult<()> {
        let Some(path) = self.disk_path(public_path) else {
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::AssetStorage(format!(
                "failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub async fn exists(&self, public_path: &str) -> bool {
        match self.disk_path(public_path) {
            Some(path) => fs::metadata(path).await.is_ok(),
            None => false,
        }
    }
}

/// Collision-resistant filename: millisecond timestamp plus random suffix,
/// original extension preserved
fn generate_name(extension: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{:09}.{}", Utc::now().timestamp_millis(), suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_delete() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().to_path_buf());

        let path = store
            .put(AssetCategory::Events, "png", b"poster bytes")
            .await
            .unwrap();

        assert!(path.starts_with("/uploads/events/"));
        assert!(path.ends_with(".png"));
        assert!(store.exists(&path).await);

        store.delete(&path).await.unwrap();
        assert!(!store.exists(&path).await);
    }

    #[tokio::test]
    async fn test_delete_absent_file_is_noop() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().to_path_buf());

        store
            .delete("/uploads/events/1700000000000-000000001.png")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_external_url_is_noop() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().to_path_buf());

        store
            .delete("https://example.org/poster.png")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_traversal_paths_are_rejected() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().to_path_buf());

        assert!(store.disk_path("/uploads/../secrets.txt").is_none());
        assert!(store.disk_path("/uploads/events/../../secrets.txt").is_none());
        assert!(store.disk_path("/uploads/").is_none());
    }

    #[tokio::test]
    async fn test_generated_names_are_unique() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().to_path_buf());

        let first = store.put(AssetCategory::News, "jpg", b"a").await.unwrap();
        let second = store.put(AssetCategory::News, "jpg", b"b").await.unwrap();

        assert_ne!(first, second);
        assert!(store.exists(&first).await);
        assert!(store.exists(&second).await);
    }

    #[test]
    fn test_ownership_check() {
        assert!(AssetStore::is_owned("/uploads/events/x.png"));
        assert!(!AssetStore::is_owned("https://example.org/x.png"));
        assert!(!AssetStore::is_owned("/uploadsx/evil.png"));
    }

    #[test]
    fn test_field_to_category() {
        assert_eq!(AssetCategory::for_field("poster"), AssetCategory::Events);
        assert_eq!(AssetCategory::for_field("image"), AssetCategory::News);
        assert_eq!(AssetCategory::for_field("banner"), AssetCategory::Others);
    }
}
