pub mod entry_point_options;
pub mod es_target;
pub mod export_path;
pub mod module_format;
pub mod normalized_bundler_options;
pub mod output_format;

use std::path::PathBuf;

use serde::Deserialize;

use crate::{ESTarget, EntryPointOptions};

/// Raw options, as read from `dualpack.config.json` or assembled by the CLI.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
  // --- Input
  pub entry_points: Option<Vec<EntryPointOptions>>,
  #[serde(skip)]
  pub cwd: Option<PathBuf>,
  pub allow_commonjs: Option<bool>,
  pub node_env: Option<bool>,
  pub type_check: Option<bool>,
  pub preserve_namespaces: Option<Vec<String>>,

  // --- Output
  pub out_dir: Option<String>,
  pub allow_update_package_json: Option<bool>,
  pub target: Option<ESTarget>,
  pub source_map: Option<bool>,
  pub remove_unused: Option<bool>,

  // --- Plugins
  pub minify: Option<bool>,
  pub banner: Option<String>,
}

#[test]
fn deserializes_config_file() {
  use crate::ModuleFormat;

  let options: BundlerOptions = serde_json::from_str(
    r#"{
      "entryPoints": [
        { "entry": "src/index.ts", "exportPath": ".", "format": "both" },
        { "entry": "src/utils.ts", "exportPath": "./utils", "renameDuplicates": false }
      ],
      "outDir": "build",
      "target": "es2020"
    }"#,
  )
  .unwrap();

  let entry_points = options.entry_points.unwrap();
  assert_eq!(entry_points[0].format, Some(ModuleFormat::Both));
  assert_eq!(entry_points[1].format, None);
  assert_eq!(entry_points[1].rename_duplicates, Some(false));
  assert_eq!(options.out_dir.as_deref(), Some("build"));
  assert_eq!(options.target, Some(ESTarget::Es2020));
}
