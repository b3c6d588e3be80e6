use std::{io, path::Path};

/// The file operations a build needs. Reads happen during collection, writes at the end.
pub trait FileSystem: Send + Sync {
  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Removes a directory and everything inside it. A missing directory is not an error.
  fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

  fn exists(&self, path: &Path) -> bool;

  fn is_file(&self, path: &Path) -> bool;
}
