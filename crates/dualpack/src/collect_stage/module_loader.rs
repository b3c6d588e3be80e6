use std::{path::PathBuf, sync::Arc};

use dualpack_error::{BuildError, BuildResult};
use dualpack_utils::node_builtins::is_node_builtin;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::Receiver;

use super::module_task::{
  ModuleIdx, ModuleLoaderMsg, ModuleTask, ResolvedSpecifier, ScannedModule, TaskContext,
};

#[derive(Debug)]
pub struct LoadedModule {
  pub path: PathBuf,
  pub content: String,
  /// Local dependencies in import order.
  pub dependencies: Vec<ModuleIdx>,
  pub is_commonjs: bool,
  pub builtin_modules: Vec<String>,
  pub warnings: Vec<anyhow::Error>,
}

pub struct ModuleLoaderOutput {
  pub modules: IndexVec<ModuleIdx, LoadedModule>,
  pub entry: ModuleIdx,
}

/// Discovers every local file reachable from the entry, one task per file.
pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  shared_context: Arc<TaskContext>,
  modules: IndexVec<ModuleIdx, Option<LoadedModule>>,
  visited: FxHashMap<PathBuf, ModuleIdx>,
}

impl ModuleLoader {
  pub fn new(
    fs: Arc<dyn dualpack_fs::FileSystem>,
    resolver: Arc<dualpack_resolver::Resolver>,
    options: crate::SharedOptions,
  ) -> Self {
    // Tasks block on a full channel, they never drop messages.
    let (tx, rx) = tokio::sync::mpsc::channel(1024);
    let shared_context = Arc::new(TaskContext { fs, resolver, options, tx });
    Self {
      rx,
      remaining: 0,
      shared_context,
      modules: IndexVec::new(),
      visited: FxHashMap::default(),
    }
  }

  fn try_spawn_new_task(&mut self, path: PathBuf) -> ModuleIdx {
    if let Some(idx) = self.visited.get(&path) {
      return *idx;
    }
    let idx = self.modules.push(None);
    self.visited.insert(path.clone(), idx);
    self.remaining += 1;

    let task = ModuleTask::new(Arc::clone(&self.shared_context), idx, path);
    tokio::spawn(task.run());
    idx
  }

  pub async fn fetch_all_modules(mut self, entry: PathBuf) -> BuildResult<ModuleLoaderOutput> {
    let entry = self.try_spawn_new_task(entry);

    let mut errors = vec![];

    while self.remaining > 0 {
      let Some(msg) = self.rx.recv().await else {
        break;
      };
      match msg {
        ModuleLoaderMsg::Done(module) => {
          let ScannedModule { idx, path, content, specifiers, is_commonjs, warnings } = *module;

          let mut dependencies = Vec::with_capacity(specifiers.len());
          let mut builtin_modules = vec![];
          for specifier in specifiers {
            match specifier {
              ResolvedSpecifier::Local(path) => dependencies.push(self.try_spawn_new_task(path)),
              ResolvedSpecifier::External(specifier) => {
                if is_node_builtin(&specifier) {
                  builtin_modules.push(specifier);
                }
              }
            }
          }
          self.modules[idx] = Some(LoadedModule {
            path,
            content,
            dependencies,
            is_commonjs,
            builtin_modules,
            warnings,
          });
        }
        ModuleLoaderMsg::Failed(BuildError(found)) => errors.extend(found),
      }
      self.remaining -= 1;
    }

    if !errors.is_empty() {
      // Tasks finish in any order.
      errors.sort_by_cached_key(ToString::to_string);
      Err(errors)?;
    }

    let modules = self
      .modules
      .into_iter()
      .map(|module| module.ok_or_else(|| anyhow::anyhow!("Module loader stopped early")))
      .collect::<Result<IndexVec<ModuleIdx, _>, _>>()?;

    Ok(ModuleLoaderOutput { modules, entry })
  }
}
