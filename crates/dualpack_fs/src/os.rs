use std::{io, path::Path};

use crate::FileSystem;

#[derive(Default, Clone, Copy, Debug)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
  }

  fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
      Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }
}

#[test]
fn write_creates_parent_dirs_and_remove_tolerates_missing() {
  let dir = tempfile::tempdir().unwrap();
  let fs = OsFileSystem;
  let file = dir.path().join("dist").join("nested").join("index.mjs");

  fs.write(&file, b"export {};").unwrap();
  assert!(fs.is_file(&file));
  assert_eq!(fs.read_to_string(&file).unwrap(), "export {};");

  fs.remove_dir_all(&dir.path().join("dist")).unwrap();
  assert!(!fs.exists(&file));
  fs.remove_dir_all(&dir.path().join("dist")).unwrap();
}
