mod output_extension;
mod package_json;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context;
use dualpack_common::OutputFormat;
use dualpack_error::BuildResult;
use dualpack_fs::FileSystem;
use dualpack_utils::concat_string;
use futures::future::try_join_all;
use rustc_hash::FxHashSet;

pub use self::package_json::patch_package_json;
use self::output_extension::{is_declaration, is_source_map, rename_output_extension};
use crate::{compile_stage::EmittedFiles, plugin::PluginDriver, types::bundle_output::OutputFile};

pub struct WrittenFormat {
  pub files: Vec<OutputFile>,
  pub js: Option<PathBuf>,
  pub types: Option<PathBuf>,
}

/// Renames, post-processes and writes the emitted files of one output format.
pub struct WriteStage<'a> {
  fs: &'a Arc<dyn FileSystem>,
  plugins: &'a PluginDriver,
}

impl<'a> WriteStage<'a> {
  pub fn new(fs: &'a Arc<dyn FileSystem>, plugins: &'a PluginDriver) -> Self {
    Self { fs, plugins }
  }

  #[tracing::instrument(level = "debug", skip_all, fields(format = %format))]
  pub async fn write(
    &self,
    format: OutputFormat,
    emitted: EmittedFiles,
  ) -> BuildResult<WrittenFormat> {
    let renamed = emitted
      .files
      .into_iter()
      .map(|(path, content)| (rename_output_extension(&path, format), content))
      .collect::<Vec<_>>();
    let paths = renamed.iter().map(|(path, _)| path.clone()).collect::<FxHashSet<_>>();

    let mut js = None;
    let mut types = None;
    let mut outputs = Vec::with_capacity(renamed.len());
    for (path, content) in renamed {
      let mut content = self.plugins.post_process(content, &path)?;
      if is_declaration(&path) {
        types = Some(path.clone());
      } else if !is_source_map(&path) {
        let map_path = path.with_extension(concat_string!(format.js_extension(), ".map"));
        if paths.contains(&map_path) {
          append_source_mapping_url(&mut content, &map_path);
        }
        js = Some(path.clone());
      }
      outputs.push((path, content));
    }

    let tasks = outputs.into_iter().map(|(path, content)| {
      let fs = Arc::clone(self.fs);
      tokio::task::spawn_blocking(move || {
        fs.write(&path, content.as_bytes())
          .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok::<_, anyhow::Error>(OutputFile { size: content.len(), path })
      })
    });
    let files = try_join_all(tasks)
      .await
      .map_err(anyhow::Error::from)?
      .into_iter()
      .collect::<anyhow::Result<Vec<_>>>()?;
    tracing::debug!("Wrote {} files", files.len());

    Ok(WrittenFormat { files, js, types })
  }
}

fn append_source_mapping_url(content: &mut String, map_path: &Path) {
  let Some(file_name) = map_path.file_name() else { return };
  if !content.ends_with('\n') {
    content.push('\n');
  }
  content.push_str("//# sourceMappingURL=");
  content.push_str(&file_name.to_string_lossy());
  content.push('\n');
}

#[test]
fn source_mapping_url_uses_the_file_name() {
  let mut content = "export {};".to_string();
  append_source_mapping_url(&mut content, Path::new("/out/dist/index.mjs.map"));
  assert_eq!(content, "export {};\n//# sourceMappingURL=index.mjs.map\n");
}
