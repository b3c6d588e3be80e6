use std::{borrow::Cow, path::Path};

use dualpack_common::ESTarget;
use dualpack_ecmascript::EcmaCompiler;

use super::{Plugin, PluginHooks};

/// Minifies emitted JavaScript files. Declarations and source maps are left alone.
#[derive(Debug, Default)]
pub struct MinifyPlugin {
  pub target: ESTarget,
}

impl MinifyPlugin {
  pub fn new(target: ESTarget) -> Self {
    Self { target }
  }
}

impl Plugin for MinifyPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("dualpack:minify")
  }

  fn hooks(&self) -> PluginHooks {
    PluginHooks::POST_PROCESS
  }

  fn post_process(&self, code: String, path: &Path) -> anyhow::Result<String> {
    if !is_javascript_output(path) {
      return Ok(code);
    }
    let minified = EcmaCompiler::minify(&code, self.target.into())
      .map_err(|err| anyhow::anyhow!("Failed to minify {}: {err}", path.display()))?;
    Ok(minified)
  }
}

pub(crate) fn is_javascript_output(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == "js" || ext == "mjs" || ext == "cjs")
}

#[test]
fn skips_declarations() {
  let plugin = MinifyPlugin::default();
  let code = "export declare const a: number;\n".to_string();
  assert_eq!(plugin.post_process(code.clone(), Path::new("dist/index.d.mts")).unwrap(), code);
  assert!(is_javascript_output(Path::new("dist/index.cjs")));
  assert!(!is_javascript_output(Path::new("dist/index.mjs.map")));
}
