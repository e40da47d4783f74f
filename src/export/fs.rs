//! File output for exporters
//!
//! Every file lands through a temporary sibling that is renamed into place,
//! so a reader never sees a half-written artifact. Multi-file outputs are
//! collected into a [`Bundle`] first and then either laid out as a directory
//! or packed into a single zip archive.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ExportError, Platform};

/// Write `contents` to `path` atomically, creating parent directories
pub(crate) fn write_atomic(platform: Platform, path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        platform,
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(contents).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// One file inside a bundle, addressed by a `/`-separated relative path
#[derive(Debug, Clone)]
pub(crate) struct BundleFile {
    pub path: String,
    pub contents: Vec<u8>,
}

/// An ordered set of files produced by one export
#[derive(Debug, Clone, Default)]
pub(crate) struct Bundle {
    files: Vec<BundleFile>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.push(BundleFile {
            path: path.into(),
            contents: contents.into(),
        });
    }

    /// Lay the bundle out beneath `root`, returning the written paths
    pub fn write_dir(&self, platform: Platform, root: &Path) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(root).map_err(|source| ExportError::Io {
            platform,
            path: root.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let path = file
                .path
                .split('/')
                .fold(root.to_path_buf(), |acc, part| acc.join(part));
            write_atomic(platform, &path, &file.contents)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Pack the bundle into an in-memory zip archive
    pub fn to_archive(&self, platform: Platform) -> Result<Vec<u8>, ExportError> {
        let archive_err = |message: String| ExportError::Archive { platform, message };

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for file in &self.files {
            zip.start_file(file.path.as_str(), options)
                .map_err(|e| archive_err(format!("{}: {}", file.path, e)))?;
            zip.write_all(&file.contents)
                .map_err(|e| archive_err(format!("{}: {}", file.path, e)))?;
        }

        let cursor = zip.finish().map_err(|e| archive_err(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Pack the bundle and write the archive atomically to `path`
    pub fn write_archive(&self, platform: Platform, path: &Path) -> Result<PathBuf, ExportError> {
        let bytes = self.to_archive(platform)?;
        write_atomic(platform, path, &bytes)?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample_bundle() -> Bundle {
        let mut bundle = Bundle::new();
        bundle.add("README.md", "# readme\n");
        bundle.add("src/main.ts", "export {};\n");
        bundle
    }

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        write_atomic(Platform::Looker, &path, b"hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_atomic(Platform::Looker, &path, b"first").unwrap();
        write_atomic(Platform::Looker, &path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_atomic_below_regular_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write_atomic(Platform::Tableau, &blocker.join("out.twb"), b"x").unwrap_err();
        assert!(matches!(err, ExportError::Io { platform: Platform::Tableau, .. }));
        assert!(err.to_string().contains("Tableau"));
    }

    #[test]
    fn test_bundle_write_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        let written = sample_bundle().write_dir(Platform::PowerBi, &root).unwrap();

        assert_eq!(written.len(), 2);
        assert!(root.join("src").join("main.ts").is_file());
        assert_eq!(std::fs::read_to_string(root.join("README.md")).unwrap(), "# readme\n");
    }

    #[test]
    fn test_bundle_archive_round_trip() {
        let bytes = sample_bundle().to_archive(Platform::PowerBi).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        archive
            .by_name("src/main.ts")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "export {};\n");
    }
}
