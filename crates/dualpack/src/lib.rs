mod bundle_stage;
mod bundler;
mod collect_stage;
mod compile_stage;
mod plugin;
mod types;
mod utils;
mod write_stage;

use std::sync::Arc;

pub use crate::{
  bundle_stage::BundleStageOutput,
  bundler::Bundler,
  compile_stage::{CompileInput, CompilerHost, EmittedFiles, OxcCompilerHost},
  plugin::{Plugin, PluginHooks, SharedPlugin, banner::BannerPlugin, minify::MinifyPlugin},
  types::bundle_output::{BundleOutput, EntryOutput, OutputFile},
  utils::load_config::{CONFIG_FILE_NAME, load_config},
};
pub use dualpack_common::*;
pub use dualpack_ecmascript::WithMutFields;
pub use dualpack_error::{BuildDiagnostic, BuildError, BuildResult};
pub use dualpack_fs::{FileSystem, OsFileSystem};

pub(crate) type SharedOptions = Arc<NormalizedBundlerOptions>;
