use crate::errors::CoreError;
use std::fs;
use std::path::Path;

/// Filesystem abstraction boundary for the backup pipeline.
///
/// Keeping this trait narrow makes it easy to write deterministic tests
/// against a temporary directory or an in-memory fake.
pub trait FileSystem: Send + Sync {
    /// Returns true when path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Reads UTF-8 text.
    fn read_to_string(&self, path: &Path) -> crate::Result<String>;

    /// Removes a file.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Lists the names of the regular files directly inside a directory.
    fn list_file_names(&self, path: &Path) -> crate::Result<Vec<String>>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn read_to_string(&self, path: &Path) -> crate::Result<String> {
        fs::read_to_string(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| CoreError::io(path, err))
    }

    fn list_file_names(&self, path: &Path) -> crate::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path).map_err(|err| CoreError::io(path, err))? {
            let entry = entry.map_err(|err| CoreError::io(path, err))?;
            let is_file = entry
                .file_type()
                .map(|kind| kind.is_file())
                .map_err(|err| CoreError::io(entry.path(), err))?;
            if !is_file {
                continue;
            }
            // Non-UTF-8 names cannot be archives we produced.
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
