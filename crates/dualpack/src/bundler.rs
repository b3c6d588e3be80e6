use std::{mem, sync::Arc, time::Instant};

use anyhow::Context;
use dualpack_common::{
  BundlerOptions, NormalizedBundlerOptions, NormalizedEntryPoint, OutputArtifactSet,
};
use dualpack_error::BuildResult;
use dualpack_fs::{FileSystem, OsFileSystem};
use dualpack_resolver::Resolver;
use tracing::Instrument;

use crate::{
  SharedOptions,
  bundle_stage::{BundleStage, BundleStageOutput},
  collect_stage::CollectStage,
  compile_stage::{CompileInput, CompilerHost, OxcCompilerHost},
  plugin::{PluginDriver, SharedPlugin, banner::BannerPlugin, minify::MinifyPlugin},
  types::bundle_output::{BundleOutput, EntryOutput},
  utils::normalize_options::normalize_options,
  write_stage::{WriteStage, patch_package_json},
};

pub struct Bundler {
  options: SharedOptions,
  fs: Arc<dyn FileSystem>,
  plugins: PluginDriver,
  compiler_host: Arc<dyn CompilerHost>,
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> BuildResult<Self> {
    Self::with_file_system(options, Arc::new(OsFileSystem))
  }

  /// Options are validated against `fs`, which is also used for every read and write.
  pub fn with_file_system(options: BundlerOptions, fs: Arc<dyn FileSystem>) -> BuildResult<Self> {
    let options = normalize_options(options, fs.as_ref())?;

    let mut plugins = PluginDriver::default();
    // Minify first, the banner has to survive it.
    if options.minify {
      plugins.push(Arc::new(MinifyPlugin::new(options.target)));
    }
    if let Some(banner) = &options.banner {
      plugins.push(Arc::new(BannerPlugin::new(banner.as_str())));
    }

    Ok(Self {
      options: Arc::new(options),
      fs,
      plugins,
      compiler_host: Arc::new(OxcCompilerHost),
    })
  }

  #[must_use]
  pub fn with_plugin(mut self, plugin: SharedPlugin) -> Self {
    self.plugins.push(plugin);
    self
  }

  #[must_use]
  pub fn with_compiler_host(mut self, compiler_host: Arc<dyn CompilerHost>) -> Self {
    self.compiler_host = compiler_host;
    self
  }

  pub fn options(&self) -> &NormalizedBundlerOptions {
    &self.options
  }

  /// Collects the files of `entry_point` and flattens them into one module, without writing.
  pub async fn bundle(
    &self,
    entry_point: &NormalizedEntryPoint,
  ) -> BuildResult<BundleStageOutput> {
    let resolver = Arc::new(Resolver::new(self.options.cwd.clone(), entry_point.tsconfig.clone()));

    let collected =
      CollectStage::new(Arc::clone(&self.fs), Arc::clone(&resolver), &self.options, &self.plugins)
        .collect(entry_point)
        .await?;

    let mut output = BundleStage::new(&self.options, entry_point, resolver, collected).bundle()?;
    tracing::debug!("Bundled with {} renames", output.renames.len());

    let code = self.plugins.pre_process(mem::take(&mut output.result.code))?;
    output.result.code = self.plugins.ast(code, &output.result.entry, &self.options.cwd)?;
    Ok(output)
  }

  /// Builds every entry point in order, writes its outputs and patches `package.json`.
  pub async fn write(&self) -> BuildResult<BundleOutput> {
    for entry_point in &self.options.entry_points {
      self
        .fs
        .remove_dir_all(&entry_point.out_dir)
        .with_context(|| format!("Failed to clear {}", entry_point.out_dir.display()))?;
    }

    let mut output = BundleOutput::default();
    for entry_point in &self.options.entry_points {
      let span = tracing::info_span!("entry", export_path = %entry_point.export_path);
      let entry = self.write_entry(entry_point, &mut output.warnings).instrument(span).await?;
      output.entries.push(entry);
    }
    Ok(output)
  }

  async fn write_entry(
    &self,
    entry_point: &NormalizedEntryPoint,
    warnings: &mut Vec<anyhow::Error>,
  ) -> BuildResult<EntryOutput> {
    let BundleStageOutput { result, renames, warnings: bundle_warnings } =
      self.bundle(entry_point).await?;
    warnings.extend(bundle_warnings);

    let write_stage = WriteStage::new(&self.fs, &self.plugins);
    let mut artifacts = OutputArtifactSet::default();
    let mut files = vec![];
    let mut compiled = vec![];
    for &format in entry_point.format.output_formats() {
      let start = Instant::now();
      let input = CompileInput {
        entry_path: &result.entry,
        source: &result.code,
        format,
        out_dir: &entry_point.out_dir,
        target: entry_point.target,
        source_map: self.options.source_map,
        declaration: true,
        export_surface: &result.export_surface,
      };

      let mut emitted = self.compiler_host.emit(&input)?;
      warnings.append(&mut emitted.warnings);
      let written = write_stage.write(format, emitted).await?;
      artifacts.record(format, written.js, written.types);
      files.extend(written.files);

      let elapsed = start.elapsed();
      tracing::debug!("Compiled {format} output in {elapsed:?}");
      compiled.push((format, elapsed));
    }

    if self.options.allow_update_package_json {
      let cwd = &self.options.cwd;
      let patched =
        patch_package_json(self.fs.as_ref(), cwd, &entry_point.export_path, &artifacts)?;
      if !patched {
        let warning = anyhow::anyhow!("No package.json in {}, skipped updating it", cwd.display());
        tracing::warn!("{warning}");
        warnings.push(warning);
      }
    }

    Ok(EntryOutput {
      export_path: entry_point.export_path.clone(),
      artifacts,
      files,
      compiled,
      renames,
    })
  }
}
