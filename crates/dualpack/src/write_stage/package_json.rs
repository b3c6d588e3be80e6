use std::path::Path;

use anyhow::Context;
use dualpack_common::{ExportPath, OutputArtifactSet};
use dualpack_fs::FileSystem;
use dualpack_utils::path_ext::PathExt;
use serde_json::{Map, Value};

/// Fields rewritten by the patcher, in the order they are written back.
const LEADING_FIELDS: [&str; 8] =
  ["name", "version", "description", "type", "main", "types", "module", "exports"];

/// Points `package.json` in `cwd` at the written artifacts of one entry point.
///
/// Returns `false` when there is no `package.json` to patch.
pub fn patch_package_json(
  fs: &dyn FileSystem,
  cwd: &Path,
  export_path: &ExportPath,
  artifacts: &OutputArtifactSet,
) -> anyhow::Result<bool> {
  let path = cwd.join("package.json");
  if !fs.is_file(&path) {
    return Ok(false);
  }

  let content =
    fs.read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
  let manifest = serde_json::from_str::<Value>(&content)
    .with_context(|| format!("Failed to parse {}", path.display()))?;
  let Value::Object(manifest) = manifest else {
    anyhow::bail!("{} does not contain a JSON object", path.display());
  };

  let patched = patch_manifest(manifest, cwd, export_path, artifacts);
  let mut output = serde_json::to_string_pretty(&Value::Object(patched))?;
  output.push('\n');
  fs.write(&path, output.as_bytes())
    .with_context(|| format!("Failed to write {}", path.display()))?;
  tracing::debug!("Patched package.json for export path {export_path}");
  Ok(true)
}

fn patch_manifest(
  mut manifest: Map<String, Value>,
  cwd: &Path,
  export_path: &ExportPath,
  artifacts: &OutputArtifactSet,
) -> Map<String, Value> {
  let mut leading = LEADING_FIELDS
    .iter()
    .filter_map(|key| manifest.shift_remove(*key).map(|value| (key.to_string(), value)))
    .collect::<Map<_, _>>();
  let relative = |path: &Path| Value::String(path.package_relative(cwd));

  let conditions = export_conditions(artifacts, &relative);
  if export_path.is_main() {
    let module_type = if artifacts.esm.is_some() { "module" } else { "commonjs" };
    leading.insert("type".to_string(), Value::String(module_type.to_string()));
    for (key, path) in
      [("main", &artifacts.main), ("types", &artifacts.types), ("module", &artifacts.module)]
    {
      match path {
        Some(path) => leading.insert(key.to_string(), relative(path)),
        None => leading.shift_remove(key),
      };
    }

    let mut exports = Map::new();
    exports.insert(export_path.to_string(), conditions);
    leading.insert("exports".to_string(), Value::Object(exports));
  } else {
    let mut exports = match leading.shift_remove("exports") {
      Some(Value::Object(exports)) => exports,
      Some(Value::Null) | None => Map::new(),
      Some(exports) => Map::from_iter([(".".to_string(), exports)]),
    };
    exports.insert(export_path.to_string(), conditions);
    leading.insert("exports".to_string(), Value::Object(exports));
  }

  let mut patched = Map::new();
  for key in LEADING_FIELDS {
    if let Some(value) = leading.shift_remove(key) {
      patched.insert(key.to_string(), value);
    }
  }
  patched.extend(manifest);
  patched
}

/// `{ import?: { types, default }, require?: { types, default } }`
fn export_conditions(artifacts: &OutputArtifactSet, relative: &impl Fn(&Path) -> Value) -> Value {
  let mut conditions = Map::new();
  let formats = [
    ("import", &artifacts.esm, &artifacts.esm_types),
    ("require", &artifacts.commonjs, &artifacts.commonjs_types),
  ];
  for (condition, js, types) in formats {
    let Some(js) = js else { continue };
    let mut target = Map::new();
    if let Some(types) = types {
      target.insert("types".to_string(), relative(types));
    }
    target.insert("default".to_string(), relative(js));
    conditions.insert(condition.to_string(), Value::Object(target));
  }
  Value::Object(conditions)
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use dualpack_common::OutputFormat;
  use serde_json::json;

  use super::*;

  fn artifacts(cwd: &Path, dir: &str, formats: &[OutputFormat]) -> OutputArtifactSet {
    let mut set = OutputArtifactSet::default();
    for format in formats {
      let dir: PathBuf = cwd.join(dir);
      set.record(
        *format,
        Some(dir.join(format!("index.{}", format.js_extension()))),
        Some(dir.join(format!("index.{}", format.dts_extension()))),
      );
    }
    set
  }

  fn patch(manifest: Value, export_path: &str, artifacts: &OutputArtifactSet) -> Value {
    let Value::Object(manifest) = manifest else { unreachable!() };
    Value::Object(patch_manifest(
      manifest,
      Path::new("/project"),
      &ExportPath::new(export_path),
      artifacts,
    ))
  }

  #[test]
  fn main_entry_rewrites_leading_fields() {
    let cwd = Path::new("/project");
    let manifest = json!({
      "scripts": { "build": "dualpack" },
      "name": "pkg",
      "exports": { "./old": "./old.js" },
      "version": "1.0.0",
      "license": "MIT"
    });
    let patched =
      patch(manifest, ".", &artifacts(cwd, "dist", &[OutputFormat::Esm, OutputFormat::Cjs]));

    assert_eq!(
      serde_json::to_string_pretty(&patched).unwrap(),
      r#"{
  "name": "pkg",
  "version": "1.0.0",
  "type": "module",
  "main": "./dist/index.cjs",
  "types": "./dist/index.d.cts",
  "module": "./dist/index.mjs",
  "exports": {
    ".": {
      "import": {
        "types": "./dist/index.d.mts",
        "default": "./dist/index.mjs"
      },
      "require": {
        "types": "./dist/index.d.cts",
        "default": "./dist/index.cjs"
      }
    }
  },
  "scripts": {
    "build": "dualpack"
  },
  "license": "MIT"
}"#
    );
  }

  #[test]
  fn subpath_entry_merges_exports() {
    let cwd = Path::new("/project");
    let manifest = json!({
      "name": "pkg",
      "type": "commonjs",
      "main": "./dist/index.cjs",
      "exports": "./dist/index.cjs"
    });
    let patched = patch(manifest, "./utils", &artifacts(cwd, "dist/utils", &[OutputFormat::Esm]));

    assert_eq!(patched["type"], "commonjs");
    assert_eq!(patched["main"], "./dist/index.cjs");
    assert_eq!(patched["exports"]["."], "./dist/index.cjs");
    assert_eq!(patched["exports"]["./utils"]["import"]["default"], "./dist/utils/index.mjs");
    assert!(patched["exports"]["./utils"].get("require").is_none());
  }

  #[test]
  fn commonjs_only_main_entry() {
    let cwd = Path::new("/project");
    let patched = patch(
      json!({ "name": "pkg", "module": "./old.mjs" }),
      ".",
      &artifacts(cwd, "dist", &[OutputFormat::Cjs]),
    );
    assert_eq!(patched["type"], "commonjs");
    assert!(patched.get("module").is_none());
    assert_eq!(patched["main"], "./dist/index.cjs");
  }
}
