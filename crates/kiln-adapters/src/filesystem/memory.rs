//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use kiln_core::{
    application::{ApplicationError, ports::Filesystem},
    error::KilnResult,
};

/// In-memory filesystem for testing.
///
/// Clones share storage, so a test can keep one handle and give another to
/// the executor.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a file, creating its parents.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let path = path.as_ref();
        if let Ok(mut inner) = self.inner.write() {
            if let Some(parent) = path.parent() {
                insert_ancestors(&mut inner.directories, parent);
            }
            inner.files.insert(path.to_path_buf(), content.into());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
        }
    }
}

fn insert_ancestors(directories: &mut HashSet<PathBuf>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        directories.insert(current.clone());
    }
}

impl Filesystem for MemoryFilesystem {
    fn read_to_string(&self, path: &Path) -> KilnResult<String> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.files.get(path).cloned().ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "File does not exist".into(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        insert_ancestors(&mut inner.directories, path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent_directory() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/p/src/a.ts"), "a").is_err());

        fs.create_dir_all(Path::new("/p/src")).unwrap();
        fs.write_file(Path::new("/p/src/a.ts"), "a").unwrap();
        assert_eq!(fs.read_file("/p/src/a.ts").as_deref(), Some("a"));
        assert!(fs.exists(Path::new("/p")));
    }

    #[test]
    fn clones_share_storage() {
        let fs = MemoryFilesystem::new().with_file("/p/.env", "A=1\n");
        let handle = fs.clone();
        handle.write_file(Path::new("/p/.env"), "A=2\n").unwrap();
        assert_eq!(fs.read_file("/p/.env").as_deref(), Some("A=2\n"));
        assert_eq!(fs.list_files(), vec![PathBuf::from("/p/.env")]);
    }

    #[test]
    fn reading_missing_file_fails() {
        let fs = MemoryFilesystem::new();
        assert!(fs.read_to_string(Path::new("/nope")).is_err());
    }
}
