pub mod banner;
pub mod minify;
mod plugin_driver;

use std::{borrow::Cow, path::Path, sync::Arc};

use bitflags::bitflags;
use dualpack_common::SourceUnit;
use dualpack_ecmascript::WithMutFields;

pub(crate) use plugin_driver::PluginDriver;

bitflags! {
  /// Hooks a plugin takes part in. The driver skips plugins for hooks they did not register.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct PluginHooks: u8 {
    /// Sees the ordered source units before bundling.
    const DEPENDENCY = 1;
    /// Sees the bundled text.
    const PRE_PROCESS = 1 << 1;
    /// Sees the parsed bundle.
    const AST = 1 << 2;
    /// Sees every emitted file before it is written.
    const POST_PROCESS = 1 << 3;
  }
}

pub trait Plugin: Send + Sync {
  fn name(&self) -> Cow<'static, str>;

  fn hooks(&self) -> PluginHooks;

  /// Entry unit stays last.
  fn dependency(&self, units: Vec<SourceUnit>) -> anyhow::Result<Vec<SourceUnit>> {
    Ok(units)
  }

  fn pre_process(&self, code: String) -> anyhow::Result<String> {
    Ok(code)
  }

  fn ast(&self, _fields: WithMutFields<'_, '_>) -> anyhow::Result<()> {
    Ok(())
  }

  fn post_process(&self, code: String, _path: &Path) -> anyhow::Result<String> {
    Ok(code)
  }
}

pub type SharedPlugin = Arc<dyn Plugin>;
