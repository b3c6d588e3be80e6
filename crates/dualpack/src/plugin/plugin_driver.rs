use std::path::Path;

use anyhow::Context;
use dualpack_common::SourceUnit;
use dualpack_ecmascript::EcmaCompiler;
use dualpack_error::BuildResult;
use dualpack_utils::path_ext::PathExt;

use super::{PluginHooks, SharedPlugin};

/// Runs registered plugins in registration order, each hook feeding the next plugin.
#[derive(Default, Clone)]
pub struct PluginDriver {
  plugins: Vec<SharedPlugin>,
}

impl PluginDriver {
  pub fn new(plugins: Vec<SharedPlugin>) -> Self {
    Self { plugins }
  }

  pub fn push(&mut self, plugin: SharedPlugin) {
    self.plugins.push(plugin);
  }

  fn plugins_with(&self, hook: PluginHooks) -> impl Iterator<Item = &SharedPlugin> {
    self.plugins.iter().filter(move |plugin| plugin.hooks().contains(hook))
  }

  pub fn dependency(&self, mut units: Vec<SourceUnit>) -> BuildResult<Vec<SourceUnit>> {
    for plugin in self.plugins_with(PluginHooks::DEPENDENCY) {
      units = plugin
        .dependency(units)
        .with_context(|| format!("Plugin `{}` failed in `dependency`", plugin.name()))?;
    }
    Ok(units)
  }

  pub fn pre_process(&self, mut code: String) -> BuildResult<String> {
    for plugin in self.plugins_with(PluginHooks::PRE_PROCESS) {
      code = plugin
        .pre_process(code)
        .with_context(|| format!("Plugin `{}` failed in `pre_process`", plugin.name()))?;
    }
    Ok(code)
  }

  /// Parses `code` once for all AST plugins and prints the result. Untouched without AST plugins.
  pub fn ast(&self, code: String, path: &Path, cwd: &Path) -> BuildResult<String> {
    let mut plugins = self.plugins_with(PluginHooks::AST).peekable();
    if plugins.peek().is_none() {
      return Ok(code);
    }

    let mut ast = EcmaCompiler::parse_file(path, &path.relative_display(cwd), code)?;
    for plugin in plugins {
      ast
        .program
        .with_mut(|fields| plugin.ast(fields))
        .with_context(|| format!("Plugin `{}` failed in `ast`", plugin.name()))?;
    }
    Ok(EcmaCompiler::print(&ast).code)
  }

  pub fn post_process(&self, mut code: String, path: &Path) -> BuildResult<String> {
    for plugin in self.plugins_with(PluginHooks::POST_PROCESS) {
      code = plugin.post_process(code, path).with_context(|| {
        format!("Plugin `{}` failed in `post_process` for {}", plugin.name(), path.display())
      })?;
    }
    Ok(code)
  }
}
