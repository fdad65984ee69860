//! Where processed photos go once the pipeline hands them back.
//!
//! The pipeline never persists anything itself. [`MediaStore`] is the seam the
//! application stores results through; [`LocalStore`] writes to a directory
//! served under a public base URL.

use std::path::{Component, Path, PathBuf};

use crate::config::StorageConfig;
use crate::error::StorageError;

/// Persists encoded objects and returns the URL they are served from.
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under the relative `path_hint`, returning its public URL.
    fn put(&self, path_hint: &str, bytes: &[u8], content_type: &str)
        -> Result<String, StorageError>;
}

/// Filesystem-backed store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.resolved_root(), config.public_base_url.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path_hint` under the root, refusing anything that escapes it.
    fn object_path(&self, path_hint: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path_hint);
        if path_hint.is_empty() || relative.file_name().is_none() {
            return Err(StorageError::InvalidKey(path_hint.to_string()));
        }
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::InvalidKey(path_hint.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl MediaStore for LocalStore {
    fn put(
        &self,
        path_hint: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.object_path(path_hint)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, bytes).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            "Stored {} ({} bytes, {}) at {:?}",
            path_hint,
            bytes.len(),
            content_type,
            path
        );

        Ok(format!(
            "{}/{}",
            self.public_base_url,
            path_hint.trim_start_matches("./")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_writes_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "https://cdn.vitrina.es/media/");

        let url = store
            .put("properties/0123456789abcdef.webp", b"RIFF", "image/webp")
            .unwrap();
        assert_eq!(
            url,
            "https://cdn.vitrina.es/media/properties/0123456789abcdef.webp"
        );
        let written =
            std::fs::read(dir.path().join("properties/0123456789abcdef.webp")).unwrap();
        assert_eq!(written, b"RIFF");
    }

    #[test]
    fn test_put_overwrites_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/media");
        store.put("a.webp", b"one", "image/webp").unwrap();
        store.put("a.webp", b"two", "image/webp").unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.webp")).unwrap(), b"two");
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/media");

        for key in ["", "../outside.webp", "properties/../../x.webp", "/etc/passwd", "properties/.."] {
            assert!(
                matches!(
                    store.put(key, b"x", "image/webp"),
                    Err(StorageError::InvalidKey(_))
                ),
                "{key:?} accepted"
            );
        }
    }

    #[test]
    fn test_from_config_expands_root() {
        let config = StorageConfig::default();
        let store = LocalStore::from_config(&config);
        assert!(!store.root().to_string_lossy().starts_with('~'));
    }
}
