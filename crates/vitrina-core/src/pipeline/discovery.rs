//! Finds upload candidates on disk for batch ingestion.
//!
//! Files over the upload ceiling are listed with a rejection reason instead
//! of being dropped, so a batch report still accounts for them without
//! reading them into memory.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::{LimitsConfig, ProcessingConfig};

use super::validate::too_large;

/// Walks a listing folder for photos to ingest.
pub struct FileDiscovery {
    extensions: Vec<String>,
    max_upload_bytes: u64,
}

/// A photo found on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
    /// Set when the file can be rejected from its metadata alone
    pub rejection: Option<String>,
}

impl FileDiscovery {
    pub fn new(processing: &ProcessingConfig, limits: &LimitsConfig) -> Self {
        Self {
            extensions: processing.supported_extensions.clone(),
            max_upload_bytes: limits.max_upload_bytes(),
        }
    }

    /// Collect the photos at `path`, sorted by path.
    ///
    /// An explicit file is taken as long as its extension matches. Directories
    /// are walked recursively, skipping hidden entries such as the `._*`
    /// AppleDouble files macOS leaves next to copied photos.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            return std::fs::metadata(path)
                .ok()
                .filter(|_| self.has_photo_extension(path))
                .map(|meta| vec![self.candidate(path.to_path_buf(), meta.len())])
                .unwrap_or_default();
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && self.has_photo_extension(entry.path()))
            .filter_map(|entry| {
                let size = entry.metadata().ok()?.len();
                Some(self.candidate(entry.into_path(), size))
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn candidate(&self, path: PathBuf, size: u64) -> DiscoveredFile {
        let rejection = if size == 0 {
            Some("Empty file".to_string())
        } else if size > self.max_upload_bytes {
            Some(too_large(size, self.max_upload_bytes))
        } else {
            None
        };
        if let Some(reason) = &rejection {
            tracing::warn!("Skipping {:?}: {}", path, reason);
        }
        DiscoveredFile {
            path,
            size,
            rejection,
        }
    }

    fn has_photo_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(&ProcessingConfig::default(), &LimitsConfig::default())
    }

    #[test]
    fn test_photo_extensions() {
        let discovery = discovery();
        assert!(discovery.has_photo_extension(Path::new("salon.jpg")));
        assert!(discovery.has_photo_extension(Path::new("SALON.JPG")));
        assert!(discovery.has_photo_extension(Path::new("cocina.jpeg")));
        assert!(discovery.has_photo_extension(Path::new("plano.png")));
        assert!(discovery.has_photo_extension(Path::new("terraza.webp")));
        assert!(discovery.has_photo_extension(Path::new("fachada.AVIF")));
        assert!(!discovery.has_photo_extension(Path::new("plano.bmp")));
        assert!(!discovery.has_photo_extension(Path::new("notas.txt")));
        assert!(!discovery.has_photo_extension(Path::new("sin_extension")));
    }

    #[test]
    fn test_walk_sorts_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("piso-3");
        let hidden = dir.path().join(".thumbs");
        std::fs::create_dir(&nested).unwrap();
        std::fs::create_dir(&hidden).unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"xx").unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join("._a.png"), b"resource fork").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();
        std::fs::write(nested.join("c.webp"), b"xxx").unwrap();
        std::fs::write(hidden.join("d.jpg"), b"xxxx").unwrap();

        let files = discovery().discover(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.jpg"),
                PathBuf::from("piso-3").join("c.webp"),
            ]
        );
        assert!(files.iter().all(|f| f.rejection.is_none()));
    }

    #[test]
    fn test_oversize_and_empty_files_are_flagged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("enorme.jpg"), vec![0u8; 1024 * 1024 + 1]).unwrap();
        std::fs::write(dir.path().join("vacia.png"), b"").unwrap();
        std::fs::write(dir.path().join("salon.jpg"), vec![0u8; 1024]).unwrap();

        let limits = LimitsConfig {
            max_upload_size_mb: 1,
            ..Default::default()
        };
        let files = FileDiscovery::new(&ProcessingConfig::default(), &limits).discover(dir.path());
        assert_eq!(files.len(), 3);

        assert!(files[0].rejection.as_deref().unwrap().contains("too large"));
        assert_eq!(files[0].size, 1024 * 1024 + 1);
        assert!(files[1].rejection.is_none());
        assert_eq!(files[2].rejection.as_deref(), Some("Empty file"));
    }

    #[test]
    fn test_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("salon.jpeg");
        std::fs::write(&photo, b"data").unwrap();
        let notes = dir.path().join("notas.txt");
        std::fs::write(&notes, b"data").unwrap();

        let discovery = discovery();
        assert_eq!(discovery.discover(&photo).len(), 1);
        assert!(discovery.discover(&notes).is_empty());
        assert!(discovery.discover(&dir.path().join("missing.jpg")).is_empty());
    }
}
