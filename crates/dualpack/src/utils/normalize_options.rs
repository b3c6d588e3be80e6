use std::path::{Path, PathBuf};

use dualpack_common::{BundlerOptions, ESTarget, NormalizedBundlerOptions, NormalizedEntryPoint};
use dualpack_error::{BuildDiagnostic, BuildResult};
use dualpack_fs::FileSystem;
use dualpack_utils::indexmap::FxIndexMap;
use itertools::Itertools;

/// Fills in defaults and validates the entry points, in this order: at least one entry,
/// unique export paths, existing entry files.
pub fn normalize_options(
  raw_options: BundlerOptions,
  fs: &dyn FileSystem,
) -> BuildResult<NormalizedBundlerOptions> {
  let cwd = match raw_options.cwd {
    Some(cwd) => cwd,
    None => std::env::current_dir().map_err(anyhow::Error::from)?,
  };

  let raw_entry_points = raw_options.entry_points.unwrap_or_default();
  if raw_entry_points.is_empty() {
    Err(BuildDiagnostic::EmptyEntryPoints)?;
  }

  let mut export_path_counts = FxIndexMap::default();
  for entry_point in &raw_entry_points {
    *export_path_counts.entry(entry_point.export_path.as_str()).or_insert(0usize) += 1;
  }
  let duplicated = export_path_counts
    .into_iter()
    .filter(|(_, count)| *count > 1)
    .map(|(path, _)| dualpack_utils::ecmascript::quote_string(path))
    .collect_vec();
  if !duplicated.is_empty() {
    Err(BuildDiagnostic::DuplicateExportPaths { paths: duplicated })?;
  }

  let missing = raw_entry_points
    .iter()
    .filter(|entry_point| !fs.is_file(&cwd.join(&entry_point.entry)))
    .map(|entry_point| BuildDiagnostic::EntryNotFound { entry: entry_point.entry.clone() })
    .collect_vec();
  if !missing.is_empty() {
    Err(missing)?;
  }

  let out_dir = resolve_out_dir(&cwd, raw_options.out_dir.as_deref().unwrap_or("dist"));
  let entry_points = raw_entry_points
    .into_iter()
    .map(|entry_point| NormalizedEntryPoint {
      out_dir: entry_point.export_path.out_dir(&out_dir),
      target: raw_options
        .target
        .or_else(|| tsconfig_target(fs, &cwd, entry_point.tsconfig.as_deref()))
        .unwrap_or_default(),
      entry: entry_point.entry,
      export_path: entry_point.export_path,
      format: entry_point.format.unwrap_or_default(),
      tsconfig: entry_point.tsconfig,
      rename_duplicates: entry_point.rename_duplicates.unwrap_or(true),
    })
    .collect();

  Ok(NormalizedBundlerOptions {
    entry_points,
    allow_commonjs: raw_options.allow_commonjs.unwrap_or(false),
    node_env: raw_options.node_env.unwrap_or(true),
    type_check: raw_options.type_check.unwrap_or(false),
    preserve_namespaces: raw_options.preserve_namespaces.unwrap_or_default(),
    out_dir,
    allow_update_package_json: raw_options.allow_update_package_json.unwrap_or(true),
    target: raw_options.target.unwrap_or_default(),
    source_map: raw_options.source_map.unwrap_or(false),
    remove_unused: raw_options.remove_unused.unwrap_or(false),
    minify: raw_options.minify.unwrap_or(false),
    banner: raw_options.banner.filter(|banner| !banner.is_empty()),
    cwd,
  })
}

/// `compilerOptions.target` of `tsconfig` (default `tsconfig.json` in `cwd`). Inherited
/// `extends` targets are not followed.
fn tsconfig_target(fs: &dyn FileSystem, cwd: &Path, tsconfig: Option<&Path>) -> Option<ESTarget> {
  let path = cwd.join(tsconfig.unwrap_or(Path::new("tsconfig.json")));
  if !fs.is_file(&path) {
    return None;
  }
  let content = fs.read_to_string(&path).ok()?;
  let config = match serde_json::from_str::<serde_json::Value>(&content) {
    Ok(config) => config,
    Err(err) => {
      tracing::debug!("Skipped reading the target of {}: {err}", path.display());
      return None;
    }
  };
  let target = config.get("compilerOptions")?.get("target")?.as_str()?;
  match target.parse() {
    Ok(target) => Some(target),
    Err(err) => {
      tracing::warn!("{err} in {}, using the default target", path.display());
      None
    }
  }
}

fn resolve_out_dir(cwd: &Path, out_dir: &str) -> PathBuf {
  let out_dir = Path::new(out_dir);
  if out_dir.is_absolute() { out_dir.to_path_buf() } else { cwd.join(out_dir) }
}

#[cfg(test)]
mod tests {
  use dualpack_common::{EntryPointOptions, ExportPath, ModuleFormat};
  use dualpack_fs::OsFileSystem;

  use super::*;

  fn entry(entry: &str, export_path: &str) -> EntryPointOptions {
    EntryPointOptions {
      entry: entry.to_string(),
      export_path: ExportPath::new(export_path),
      format: None,
      tsconfig: None,
      rename_duplicates: None,
    }
  }

  #[test]
  fn empty_entry_points() {
    let options = BundlerOptions { cwd: Some(PathBuf::from("/")), ..Default::default() };
    let err = normalize_options(options, &OsFileSystem).unwrap_err();
    assert_eq!(
      err.to_string(),
      "No entry found in dualpack.config.json file, at least one entry required"
    );
  }

  #[test]
  fn duplicate_export_paths_are_checked_before_entry_files() {
    let options = BundlerOptions {
      cwd: Some(PathBuf::from("/")),
      entry_points: Some(vec![entry("missing.ts", "."), entry("missing2.ts", ".")]),
      ..Default::default()
    };
    let err = normalize_options(options, &OsFileSystem).unwrap_err();
    assert!(err.to_string().starts_with("Duplicate export paths/path (\".\")"));
  }

  #[test]
  fn missing_entry_file() {
    let dir = tempfile::tempdir().unwrap();
    let options = BundlerOptions {
      cwd: Some(dir.path().to_path_buf()),
      entry_points: Some(vec![entry("src/index.ts", ".")]),
      ..Default::default()
    };
    let err = normalize_options(options, &OsFileSystem).unwrap_err();
    assert_eq!(err.to_string(), "Entry file src/index.ts does not exist.");
  }

  #[test]
  fn defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/index.ts"), "").unwrap();
    std::fs::write(dir.path().join("src/utils.ts"), "").unwrap();
    let options = BundlerOptions {
      cwd: Some(dir.path().to_path_buf()),
      entry_points: Some(vec![entry("src/index.ts", "."), entry("src/utils.ts", "./utils")]),
      ..Default::default()
    };
    let options = normalize_options(options, &OsFileSystem).unwrap();
    assert_eq!(options.out_dir, dir.path().join("dist"));
    assert_eq!(options.entry_points[1].out_dir, dir.path().join("dist").join("utils"));
    assert_eq!(options.entry_points[0].format, ModuleFormat::Esm);
    assert!(options.entry_points[0].rename_duplicates);
    assert!(options.node_env);
    assert!(options.allow_update_package_json);
    assert!(!options.allow_commonjs);
    assert_eq!(options.entry_points[0].target, ESTarget::EsNext);
  }

  #[test]
  fn target_falls_back_to_tsconfig() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/index.ts"), "").unwrap();
    std::fs::write(dir.path().join("src/legacy.ts"), "").unwrap();
    std::fs::write(
      dir.path().join("tsconfig.json"),
      r#"{ "compilerOptions": { "target": "ES2019" } }"#,
    )
    .unwrap();
    std::fs::write(
      dir.path().join("tsconfig.legacy.json"),
      r#"{ "compilerOptions": { "target": "es6" } }"#,
    )
    .unwrap();

    let mut legacy = entry("src/legacy.ts", "./legacy");
    legacy.tsconfig = Some(PathBuf::from("tsconfig.legacy.json"));
    let options = BundlerOptions {
      cwd: Some(dir.path().to_path_buf()),
      entry_points: Some(vec![entry("src/index.ts", "."), legacy.clone()]),
      ..Default::default()
    };
    let normalized = normalize_options(options, &OsFileSystem).unwrap();
    assert_eq!(normalized.entry_points[0].target, ESTarget::Es2019);
    assert_eq!(normalized.entry_points[1].target, ESTarget::Es2015);

    let options = BundlerOptions {
      cwd: Some(dir.path().to_path_buf()),
      entry_points: Some(vec![legacy]),
      target: Some(ESTarget::Es2022),
      ..Default::default()
    };
    let normalized = normalize_options(options, &OsFileSystem).unwrap();
    assert_eq!(normalized.entry_points[0].target, ESTarget::Es2022);
  }
}
