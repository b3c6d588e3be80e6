use std::path::Path;

use dualpack_common::{DependencyGraph, NormalizedBundlerOptions};
use dualpack_error::{BuildDiagnostic, BuildResult};
use dualpack_utils::path_ext::PathExt;

const TYPESCRIPT_EXTENSIONS: [&str; 4] = ["ts", "mts", "cts", "tsx"];
const JAVASCRIPT_EXTENSIONS: [&str; 4] = ["js", "mjs", "cjs", "jsx"];

/// Checkpoint after collection. Every finding of this checkpoint is reported at once.
pub fn validate_graph(
  graph: &DependencyGraph,
  commonjs_files: &[&Path],
  options: &NormalizedBundlerOptions,
) -> BuildResult<()> {
  let mut errors = vec![];

  for unit in &graph.units {
    let extension = unit.path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let is_allowed_commonjs = options.allow_commonjs
      && JAVASCRIPT_EXTENSIONS.contains(&extension)
      && commonjs_files.contains(&unit.path.as_path());
    if !TYPESCRIPT_EXTENSIONS.contains(&extension) && !is_allowed_commonjs {
      errors.push(BuildDiagnostic::UnsupportedExtension {
        file: unit.path.relative_display(&options.cwd),
      });
    }
  }

  if !options.allow_commonjs && !commonjs_files.is_empty() {
    errors.push(BuildDiagnostic::CommonJsNotAllowed {
      files: commonjs_files.iter().map(|path| path.relative_display(&options.cwd)).collect(),
    });
  }

  if !options.node_env && graph.uses_builtins() {
    errors.push(BuildDiagnostic::BuiltinsNotAllowed { modules: graph.builtin_modules.clone() });
  }

  if errors.is_empty() { Ok(()) } else { Err(errors.into()) }
}
