mod module_loader;
mod module_scanner;
mod module_task;
mod sort_modules;
mod type_check;
mod validate;

use std::{path::PathBuf, sync::Arc};

use dualpack_common::{DependencyGraph, NormalizedEntryPoint, SourceUnit};
use dualpack_error::{BuildDiagnostic, BuildResult};
use dualpack_fs::FileSystem;
use dualpack_resolver::Resolver;
use dualpack_utils::{indexmap::FxIndexSet, path_ext::PathExt};
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use self::{
  module_loader::{ModuleLoader, ModuleLoaderOutput},
  sort_modules::{SortedModules, sort_modules},
  type_check::type_check,
  validate::validate_graph,
};
use crate::{SharedOptions, plugin::PluginDriver};

pub struct CollectStageOutput {
  pub graph: DependencyGraph,
  /// Files written with `require`/`module.exports` and no ESM syntax.
  pub commonjs_files: FxHashSet<PathBuf>,
  pub warnings: Vec<anyhow::Error>,
}

pub struct CollectStage<'a> {
  fs: Arc<dyn FileSystem>,
  resolver: Arc<Resolver>,
  options: &'a SharedOptions,
  plugins: &'a PluginDriver,
}

impl<'a> CollectStage<'a> {
  pub fn new(
    fs: Arc<dyn FileSystem>,
    resolver: Arc<Resolver>,
    options: &'a SharedOptions,
    plugins: &'a PluginDriver,
  ) -> Self {
    Self { fs, resolver, options, plugins }
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub async fn collect(
    &self,
    entry_point: &NormalizedEntryPoint,
  ) -> BuildResult<CollectStageOutput> {
    let entry_path = self
      .resolver
      .resolve_entry(&entry_point.entry)
      .map_err(|_| BuildDiagnostic::EntryNotFound { entry: entry_point.entry.clone() })?;

    let ModuleLoaderOutput { modules, entry } =
      ModuleLoader::new(Arc::clone(&self.fs), Arc::clone(&self.resolver), Arc::clone(self.options))
        .fetch_all_modules(entry_path)
        .await?;

    let SortedModules { order, cycles } = sort_modules(&modules, entry);
    let cwd = &self.options.cwd;

    let mut warnings = vec![];
    let mut circular_pairs = vec![];
    for cycle in &cycles {
      if let [.., importer, importee] = cycle.as_slice() {
        circular_pairs.push((modules[*importer].path.clone(), modules[*importee].path.clone()));
      }
      let paths = cycle.iter().map(|idx| modules[*idx].path.relative_display(cwd)).collect();
      let warning = BuildDiagnostic::CircularDependency { paths };
      tracing::warn!("{warning}");
      warnings.push(warning.into());
    }

    let mut modules = modules.into_iter().map(Some).collect::<IndexVec<_, _>>();
    let mut units = IndexVec::with_capacity(order.len());
    let mut builtin_modules = FxIndexSet::default();
    let mut commonjs_files = vec![];
    for idx in order {
      let Some(module) = modules[idx].take() else { continue };
      warnings.extend(module.warnings);
      builtin_modules.extend(module.builtin_modules);
      if module.is_commonjs {
        commonjs_files.push(module.path.clone());
      }
      units.push(SourceUnit::new(module.path, module.content));
    }

    let graph = DependencyGraph {
      units,
      builtin_modules: builtin_modules.into_iter().collect(),
      circular_pairs,
    };
    tracing::debug!("Collected {} files", graph.units.len());

    validate_graph(
      &graph,
      &commonjs_files.iter().map(PathBuf::as_path).collect::<Vec<_>>(),
      self.options,
    )?;
    if self.options.type_check {
      type_check(cwd, entry_point, &graph)?;
    }

    let DependencyGraph { units, builtin_modules, circular_pairs } = graph;
    let units = self.plugins.dependency(units.raw)?;
    let graph =
      DependencyGraph { units: IndexVec::from_vec(units), builtin_modules, circular_pairs };

    Ok(CollectStageOutput {
      graph,
      commonjs_files: commonjs_files.into_iter().collect(),
      warnings,
    })
  }
}
