use std::{path::PathBuf, time::Duration};

use dualpack_common::{ExportPath, OutputArtifactSet, OutputFormat, RenameRecord};

#[derive(Debug)]
pub struct OutputFile {
  pub path: PathBuf,
  pub size: usize,
}

#[derive(Debug)]
pub struct EntryOutput {
  pub export_path: ExportPath,
  pub artifacts: OutputArtifactSet,
  pub files: Vec<OutputFile>,
  /// Compile and write time of every requested format, in build order.
  pub compiled: Vec<(OutputFormat, Duration)>,
  pub renames: Vec<RenameRecord>,
}

#[derive(Debug, Default)]
pub struct BundleOutput {
  pub entries: Vec<EntryOutput>,
  pub warnings: Vec<anyhow::Error>,
}
