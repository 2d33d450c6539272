//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the distribution engine can
//! be unit-tested without touching the real filesystem.  Production code
//! uses [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries and mutations used by the engine.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.  Succeeds if it already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Size of the file at `path` in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    fn file_len(&self, path: &Path) -> io::Result<u64>;

    /// Open `path` for sequential reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    /// Replace the contents of `dst` with the contents of `src`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be accessed.
    fn copy(&self, src: &Path, dst: &Path) -> io::Result<()>;

    /// Replace the contents of `path` with `contents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.path()))
            .collect()
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        std::fs::metadata(path).map(|m| m.len())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(io::BufReader::new(std::fs::File::open(path)?)))
    }

    fn copy(&self, src: &Path, dst: &Path) -> io::Result<()> {
        std::fs::copy(src, dst).map(|_| ())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// In-memory [`FileSystemOps`] for unit tests.
///
/// Files and directories are configured with the builder-style methods.
/// Every successful `copy`/`write` is appended to a write log so tests can
/// assert exactly which destinations were touched and in what order.
/// Paths registered with [`fail_writes_to`](Self::fail_writes_to) reject
/// mutation with `PermissionDenied`.
///
/// # Example
///
/// ```ignore
/// let fs = MockFileSystemOps::new()
///     .with_file("/work/bin/burger.h", "X")
///     .with_dir("/sdks/mac/burgerlib");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::sync::Mutex<std::collections::HashMap<PathBuf, Vec<u8>>>,
    dirs: std::sync::Mutex<std::collections::HashSet<PathBuf>>,
    read_only: std::collections::HashSet<PathBuf>,
    writes: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file with `contents` (parents are implied, not created).
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), contents.as_ref().to_vec());
        }
        self
    }

    /// Add a directory.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        if let Ok(mut dirs) = self.dirs.lock() {
            dirs.insert(path.into());
        }
        self
    }

    /// Make every write to `path` fail with `PermissionDenied`.
    #[must_use]
    pub fn fail_writes_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_only.insert(path.into());
        self
    }

    /// Current contents of `path`, if it is a file.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(path).cloned()
    }

    /// Every path written so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes
            .lock()
            .map_or_else(|_| Vec::new(), |guard| guard.clone())
    }

    /// Forget the write log (contents are kept).
    pub fn clear_writes(&self) {
        if let Ok(mut writes) = self.writes.lock() {
            writes.clear();
        }
    }

    fn store(&self, path: &Path, contents: Vec<u8>) -> io::Result<()> {
        if self.read_only.contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.files
            .lock()
            .map_err(|_| io::Error::other("mock files poisoned"))?
            .insert(path.to_path_buf(), contents);
        self.writes
            .lock()
            .map_err(|_| io::Error::other("mock writes poisoned"))?
            .push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.dirs.lock().is_ok_and(|d| d.contains(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().is_ok_and(|f| f.contains_key(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.read_only.contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let mut dirs = self
            .dirs
            .lock()
            .map_err(|_| io::Error::other("mock dirs poisoned"))?;
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.dirs.lock().is_ok_and(|d| d.contains(path)) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        let files = self
            .files
            .lock()
            .map_err(|_| io::Error::other("mock files poisoned"))?;
        let dirs = self
            .dirs
            .lock()
            .map_err(|_| io::Error::other("mock dirs poisoned"))?;
        Ok(files
            .keys()
            .chain(dirs.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        self.contents(path)
            .map(|c| c.len() as u64)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        self.contents(path)
            .map(|c| Box::new(io::Cursor::new(c)) as Box<dyn Read>)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn copy(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let contents = self
            .contents(src)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        self.store(dst, contents)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.store(path, contents.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_copy_overwrites_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.h");
        let dst = dir.path().join("dst.h");
        std::fs::write(&src, "short").unwrap();
        std::fs::write(&dst, "much longer previous content").unwrap();

        SystemFileSystemOps.copy(&src, &dst).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"short");
    }

    #[test]
    fn system_read_dir_lists_children() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.r"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut entries = SystemFileSystemOps.read_dir(dir.path()).unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec![dir.path().join("a.r"), dir.path().join("sub")]
        );
    }

    #[test]
    fn system_create_dir_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        SystemFileSystemOps.create_dir_all(&nested).unwrap();
        SystemFileSystemOps.create_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn mock_records_writes_in_order() {
        let fs = MockFileSystemOps::new().with_file("/src", "X");
        fs.copy(Path::new("/src"), Path::new("/a")).unwrap();
        fs.write(Path::new("/b"), b"Y").unwrap();
        assert_eq!(fs.writes(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(fs.contents(Path::new("/a")).unwrap(), b"X");
    }

    #[test]
    fn mock_read_only_path_rejects_writes() {
        let fs = MockFileSystemOps::new()
            .with_file("/src", "X")
            .fail_writes_to("/locked");
        let err = fs.copy(Path::new("/src"), Path::new("/locked")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn mock_read_dir_lists_direct_children_only() {
        let fs = MockFileSystemOps::new()
            .with_dir("/mac")
            .with_file("/mac/a.r", "")
            .with_file("/mac/deep/b.r", "");
        assert_eq!(
            fs.read_dir(Path::new("/mac")).unwrap(),
            vec![PathBuf::from("/mac/a.r")]
        );
    }
}
