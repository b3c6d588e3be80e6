use std::{borrow::Cow, path::Path};

use dualpack_utils::concat_string;

use super::{Plugin, PluginHooks, minify::is_javascript_output};

/// Prepends a fixed banner to emitted JavaScript files.
#[derive(Debug)]
pub struct BannerPlugin {
  banner: String,
}

impl BannerPlugin {
  pub fn new(banner: impl Into<String>) -> Self {
    Self { banner: banner.into() }
  }
}

impl Plugin for BannerPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("dualpack:banner")
  }

  fn hooks(&self) -> PluginHooks {
    PluginHooks::POST_PROCESS
  }

  fn post_process(&self, code: String, path: &Path) -> anyhow::Result<String> {
    if !is_javascript_output(path) {
      return Ok(code);
    }
    Ok(concat_string!(self.banner.trim_end(), "\n", code))
  }
}

#[test]
fn prepends_banner() {
  let plugin = BannerPlugin::new("/*! pkg v1.0.0 */");
  let code = plugin.post_process("export {};\n".to_string(), Path::new("dist/index.mjs")).unwrap();
  assert_eq!(code, "/*! pkg v1.0.0 */\nexport {};\n");
}
