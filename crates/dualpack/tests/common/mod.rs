use std::{fs, path::Path, process::Command};

use dualpack::{BundlerOptions, EntryPointOptions, ExportPath, ModuleFormat};
use tempfile::TempDir;

pub fn create_project(files: &[(&str, &str)]) -> TempDir {
  let dir = TempDir::new().expect("temp dir");
  for (path, content) in files {
    let path = dir.path().join(path);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(&path, content).expect("write file");
  }
  dir
}

pub fn entry_point(entry: &str, export_path: &str, format: ModuleFormat) -> EntryPointOptions {
  EntryPointOptions {
    entry: entry.to_string(),
    export_path: ExportPath::new(export_path),
    format: Some(format),
    tsconfig: None,
    rename_duplicates: None,
  }
}

pub fn options(cwd: &Path, entry_points: Vec<EntryPointOptions>) -> BundlerOptions {
  BundlerOptions {
    cwd: Some(cwd.to_path_buf()),
    entry_points: Some(entry_points),
    ..Default::default()
  }
}

/// Evaluates `script` with Node.js, `process.argv[1]` set to `module`.
/// Returns `None` when Node.js is not installed.
#[allow(dead_code)]
pub fn run_node(script: &str, module: &Path) -> Option<String> {
  let output = Command::new("node").arg("-e").arg(script).arg(module).output().ok()?;
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
