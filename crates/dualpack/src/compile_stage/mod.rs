mod oxc_compiler_host;
mod render_exports;
mod to_commonjs;

use std::path::{Path, PathBuf};

use dualpack_common::{ESTarget, ExportSurface, OutputFormat};
use dualpack_error::BuildResult;
use dualpack_utils::indexmap::FxIndexMap;

pub use self::oxc_compiler_host::OxcCompilerHost;

/// One compilation of the bundle text.
#[derive(Debug, Clone, Copy)]
pub struct CompileInput<'a> {
  /// Path of the entry file, the bundle is compiled as if it were this file.
  pub entry_path: &'a Path,
  pub source: &'a str,
  pub format: OutputFormat,
  pub out_dir: &'a Path,
  pub target: ESTarget,
  pub source_map: bool,
  pub declaration: bool,
  pub export_surface: &'a ExportSurface,
}

impl CompileInput<'_> {
  /// `<out_dir>/<entry stem>.<extension>`
  pub fn output_path(&self, extension: &str) -> PathBuf {
    let stem =
      self.entry_path.file_stem().map_or_else(|| "index".into(), |stem| stem.to_string_lossy());
    let mut file_name = String::with_capacity(stem.len() + extension.len() + 1);
    file_name.push_str(&stem);
    file_name.push('.');
    file_name.push_str(extension);
    self.out_dir.join(file_name)
  }
}

#[derive(Debug, Default)]
pub struct EmittedFiles {
  /// Emitted path to content, in emit order.
  pub files: FxIndexMap<PathBuf, String>,
  pub warnings: Vec<anyhow::Error>,
}

/// Turns the bundle text into JavaScript, source map and declaration files.
///
/// The bundle is a single self-contained module, a host does no resolution of its own.
pub trait CompilerHost: Send + Sync {
  fn emit(&self, input: &CompileInput<'_>) -> BuildResult<EmittedFiles>;
}
