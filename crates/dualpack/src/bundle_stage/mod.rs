mod anonymous_namer;
mod commonjs;
mod duplicate_resolver;
mod import_linker;
mod merge_imports;
mod reference_rewriter;
mod remove_unused;
mod strip_modules;
mod top_level_names;

use std::sync::Arc;

use dualpack_common::{
  BundleResult, ModuleSource, NormalizedBundlerOptions, NormalizedEntryPoint, RenameRecord,
  SourceJoiner, SourceUnit, UnitIdx,
};
use dualpack_error::{BuildDiagnostic, BuildError, BuildResult};
use dualpack_resolver::Resolver;
use dualpack_utils::{path_ext::PathExt, rayon::*};
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use self::{merge_imports::merge_imports, remove_unused::remove_unused};
use crate::{collect_stage::CollectStageOutput, utils::module_locator::ModuleLocator};

pub struct BundleStageOutput {
  pub result: BundleResult,
  /// Duplicate, anonymous default and import renames, in the order they were decided.
  pub renames: Vec<RenameRecord>,
  pub warnings: Vec<anyhow::Error>,
}

/// Flattens the collected files of one entry point into a single module.
pub struct BundleStage<'a> {
  options: &'a NormalizedBundlerOptions,
  entry_point: &'a NormalizedEntryPoint,
  locator: ModuleLocator,
  units: IndexVec<UnitIdx, SourceUnit>,
  entry: UnitIdx,
  commonjs_units: FxHashSet<UnitIdx>,
  renames: Vec<RenameRecord>,
  warnings: Vec<anyhow::Error>,
}

impl<'a> BundleStage<'a> {
  pub fn new(
    options: &'a NormalizedBundlerOptions,
    entry_point: &'a NormalizedEntryPoint,
    resolver: Arc<Resolver>,
    collected: CollectStageOutput,
  ) -> Self {
    let CollectStageOutput { graph, commonjs_files, warnings } = collected;
    let entry = graph.entry_idx();
    let units = graph.units;
    let commonjs_units = units
      .iter_enumerated()
      .filter(|(_, unit)| commonjs_files.contains(&unit.path))
      .map(|(idx, _)| idx)
      .collect();
    let locator = ModuleLocator::new(resolver, &units);

    Self {
      options,
      entry_point,
      locator,
      units,
      entry,
      commonjs_units,
      renames: vec![],
      warnings,
    }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn bundle(mut self) -> BuildResult<BundleStageOutput> {
    if self.units.is_empty() {
      Err(anyhow::anyhow!("Nothing to bundle for {}", self.entry_point.entry))?;
    }

    self.resolve_duplicates()?;
    self.link_imports()?;
    // Linking may import names of external modules into files that declared nothing by them.
    self.resolve_duplicates()?;
    self.name_anonymous_defaults()?;
    let tables = self.link_imports()?;

    let stripped = self.strip_modules(&tables)?;
    let imports = merge_imports(
      stripped.iter().flat_map(|unit| unit.records.iter().cloned()).collect(),
      &self.options.cwd,
    )?;
    tracing::debug!("Merged external imports into {} statements", imports.len());

    let export_surface = stripped[self.entry].export_surface.clone().unwrap_or_default();
    let mut code = self.assemble(&imports, stripped.into_iter().map(|unit| unit.content));

    let entry_path = self.units[self.entry].path.clone();
    if self.options.remove_unused {
      code = remove_unused(code, &entry_path, &self.options.cwd)?;
    }

    if self.entry_point.format.includes_commonjs() && export_surface.is_ambiguous_for_commonjs() {
      let warning = BuildDiagnostic::AmbiguousCommonJsExports {
        file: entry_path.relative_display(&self.options.cwd),
      };
      tracing::warn!("{warning}");
      self.warnings.push(warning.into());
    }

    Ok(BundleStageOutput {
      result: BundleResult { code, entry: entry_path, export_surface },
      renames: self.renames,
      warnings: self.warnings,
    })
  }

  /// Imports block, then every dependency labelled with its path, then the entry.
  fn assemble(&self, imports: &[String], contents: impl Iterator<Item = String>) -> String {
    let mut joiner = SourceJoiner::default();
    joiner.append_source(imports.join("\n"));
    for (unit, content) in self.units.iter().zip(contents) {
      joiner.append_source(ModuleSource {
        relative_path: unit.path.relative_display(&self.options.cwd),
        content,
      });
    }
    joiner.join()
  }

  fn display_path(&self, idx: UnitIdx) -> String {
    self.units[idx].path.relative_display(&self.options.cwd)
  }

  /// Runs `func` on every unit in parallel. Errors of all units are reported together.
  fn par_map_units<T, F>(&self, func: F) -> BuildResult<IndexVec<UnitIdx, T>>
  where
    T: Send,
    F: Fn(UnitIdx, &SourceUnit) -> BuildResult<T> + Sync + Send,
  {
    let results = self
      .units
      .raw
      .par_iter()
      .enumerate()
      .map(|(idx, unit)| func(UnitIdx::from_usize(idx), unit))
      .collect::<Vec<_>>();

    let mut values = IndexVec::with_capacity(results.len());
    let mut errors = vec![];
    for result in results {
      match result {
        Ok(value) => {
          values.push(value);
        }
        Err(BuildError(found)) => errors.extend(found),
      }
    }
    if errors.is_empty() { Ok(values) } else { Err(errors.into()) }
  }
}
