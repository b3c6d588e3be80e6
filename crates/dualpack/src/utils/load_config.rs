use std::path::{Path, PathBuf};

use anyhow::Context;
use dualpack_common::BundlerOptions;
use dualpack_error::{BuildDiagnostic, BuildResult};
use dualpack_fs::FileSystem;

pub const CONFIG_FILE_NAME: &str = "dualpack.config.json";

/// Reads `dualpack.config.json` (or `config`, relative to `cwd`) into raw options.
pub fn load_config(
  fs: &dyn FileSystem,
  cwd: &Path,
  config: Option<&Path>,
) -> BuildResult<BundlerOptions> {
  let path = config.map_or_else(|| cwd.join(CONFIG_FILE_NAME), |config| cwd.join(config));
  if !fs.is_file(&path) {
    Err(BuildDiagnostic::ConfigNotFound { cwd: cwd.to_path_buf() })?;
  }

  let content =
    fs.read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
  let mut options: BundlerOptions =
    serde_json::from_str(&content).map_err(|err| BuildDiagnostic::InvalidConfig {
      path: path.clone(),
      reason: err.to_string(),
    })?;
  options.cwd = Some(PathBuf::from(cwd));

  tracing::debug!("Loaded config from {}", path.display());
  Ok(options)
}

#[cfg(test)]
mod tests {
  use dualpack_fs::OsFileSystem;

  use super::*;

  #[test]
  fn missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&OsFileSystem, dir.path(), None).unwrap_err();
    assert!(err.to_string().starts_with("No dualpack.config.json file found in"));
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "entryPoint": [] }"#).unwrap();
    let err = load_config(&OsFileSystem, dir.path(), None).unwrap_err();
    assert!(err.to_string().starts_with("Invalid config file"));
  }

  #[test]
  fn sets_cwd() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("custom.json"),
      r#"{ "entryPoints": [{ "entry": "src/index.ts", "exportPath": "." }] }"#,
    )
    .unwrap();
    let options = load_config(&OsFileSystem, dir.path(), Some(Path::new("custom.json"))).unwrap();
    assert_eq!(options.cwd.as_deref(), Some(dir.path()));
    assert_eq!(options.entry_points.map(|entries| entries.len()), Some(1));
  }
}
