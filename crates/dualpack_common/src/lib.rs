mod bundler_options;
mod types;

pub use bundler_options::{
  BundlerOptions,
  entry_point_options::EntryPointOptions,
  es_target::ESTarget,
  export_path::ExportPath,
  module_format::ModuleFormat,
  normalized_bundler_options::{NormalizedBundlerOptions, NormalizedEntryPoint},
  output_format::OutputFormat,
};

pub use crate::types::{
  bundle_result::{BundleResult, ExportSurface},
  dependency_graph::DependencyGraph,
  import_record::{ImportBinding, ImportKind, ImportRecord, ImportedName},
  output_artifact_set::OutputArtifactSet,
  raw_idx::UnitIdx,
  rename_record::RenameRecord,
  source::{ModuleSource, Source},
  source_joiner::SourceJoiner,
  source_unit::SourceUnit,
};
