use std::path::{Path, PathBuf};

use dualpack_common::OutputFormat;
use dualpack_utils::concat_string;

/// Gives an emitted `.js`, `.d.ts` or `.js.map` file the extension of its module format.
pub fn rename_output_extension(path: &Path, format: OutputFormat) -> PathBuf {
  let Some(file_name) = path.file_name().map(|name| name.to_string_lossy()) else {
    return path.to_path_buf();
  };

  let renamed = if let Some(stem) = file_name.strip_suffix(".d.ts") {
    concat_string!(stem, ".", format.dts_extension())
  } else if let Some(stem) = file_name.strip_suffix(".js.map") {
    concat_string!(stem, ".", format.js_extension(), ".map")
  } else if let Some(stem) = file_name.strip_suffix(".js") {
    concat_string!(stem, ".", format.js_extension())
  } else {
    return path.to_path_buf();
  };
  path.with_file_name(renamed)
}

pub fn is_source_map(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == "map")
}

pub fn is_declaration(path: &Path) -> bool {
  path.file_name().is_some_and(|name| {
    let name = name.to_string_lossy();
    name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
  })
}

#[test]
fn renames_by_format() {
  let dist = Path::new("dist");
  assert_eq!(
    rename_output_extension(&dist.join("index.js"), OutputFormat::Esm),
    dist.join("index.mjs")
  );
  assert_eq!(
    rename_output_extension(&dist.join("index.d.ts"), OutputFormat::Cjs),
    dist.join("index.d.cts")
  );
  assert_eq!(
    rename_output_extension(&dist.join("index.js.map"), OutputFormat::Cjs),
    dist.join("index.cjs.map")
  );
  assert_eq!(
    rename_output_extension(&dist.join("README.md"), OutputFormat::Esm),
    dist.join("README.md")
  );
  assert!(is_declaration(&dist.join("index.d.mts")));
  assert!(is_source_map(&dist.join("index.mjs.map")));
}
