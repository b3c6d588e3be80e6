use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use dualpack_error::{BuildDiagnostic, BuildError, BuildResult};
use dualpack_ecmascript::EcmaCompiler;
use dualpack_fs::FileSystem;
use dualpack_resolver::Resolver;
use dualpack_utils::path_ext::PathExt;
use oxc::ast_visit::Visit;
use tokio::sync::mpsc::Sender;

use super::module_scanner::ModuleScanner;
use crate::SharedOptions;

oxc_index::define_index_type! {
  pub struct ModuleIdx = u32;
}

pub struct TaskContext {
  pub fs: Arc<dyn FileSystem>,
  pub resolver: Arc<Resolver>,
  pub options: SharedOptions,
  pub tx: Sender<ModuleLoaderMsg>,
}

#[derive(Debug)]
pub enum ResolvedSpecifier {
  Local(PathBuf),
  External(String),
}

#[derive(Debug)]
pub struct ScannedModule {
  pub idx: ModuleIdx,
  pub path: PathBuf,
  pub content: String,
  /// Deduplicated, in source order.
  pub specifiers: Vec<ResolvedSpecifier>,
  pub is_commonjs: bool,
  pub warnings: Vec<anyhow::Error>,
}

pub enum ModuleLoaderMsg {
  Done(Box<ScannedModule>),
  Failed(BuildError),
}

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  idx: ModuleIdx,
  path: PathBuf,
}

impl ModuleTask {
  pub fn new(ctx: Arc<TaskContext>, idx: ModuleIdx, path: PathBuf) -> Self {
    Self { ctx, idx, path }
  }

  pub async fn run(self) {
    let msg = match self.scan() {
      Ok(module) => ModuleLoaderMsg::Done(Box::new(module)),
      Err(errors) => ModuleLoaderMsg::Failed(errors),
    };
    // The loader only stops listening once it has failed already.
    let _ = self.ctx.tx.send(msg).await;
  }

  fn scan(&self) -> BuildResult<ScannedModule> {
    let display_path = self.path.relative_display(&self.ctx.options.cwd);
    let content = self
      .ctx
      .fs
      .read_to_string(&self.path)
      .with_context(|| format!("Failed to read {display_path}"))?;

    let ast = EcmaCompiler::parse_file(&self.path, &display_path, content.as_str())?;
    let scoping = ast.make_scoping();
    let mut scanner = ModuleScanner::new(&scoping);
    scanner.visit_program(ast.program());

    let mut specifiers = Vec::with_capacity(scanner.specifiers.len());
    let mut seen = rustc_hash::FxHashSet::default();
    let mut errors = vec![];
    for specifier in &scanner.specifiers {
      if !seen.insert(specifier.as_str()) {
        continue;
      }
      match self.ctx.resolver.resolve_local(&self.path, specifier) {
        Some(Ok(path)) => specifiers.push(ResolvedSpecifier::Local(path)),
        Some(Err(err)) => {
          tracing::debug!("Failed to resolve {specifier:?} from {display_path}: {err}");
          errors.push(BuildDiagnostic::UnresolvedImport {
            specifier: specifier.clone(),
            importer: display_path.clone(),
          });
        }
        None => specifiers.push(ResolvedSpecifier::External(specifier.clone())),
      }
    }
    if !errors.is_empty() {
      Err(errors)?;
    }

    let warnings = scanner
      .dynamic_imports
      .iter()
      .filter(|specifier| dualpack_resolver::is_local_specifier(specifier))
      .map(|specifier| {
        anyhow::anyhow!(
          "Dynamic import of \"{specifier}\" in {display_path} is left as is and will not be bundled."
        )
      })
      .collect();

    Ok(ScannedModule {
      idx: self.idx,
      path: self.path.clone(),
      content,
      specifiers,
      is_commonjs: scanner.is_commonjs(),
      warnings,
    })
  }
}
