mod common;

use std::{
  borrow::Cow,
  fs,
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use dualpack::{
  BuildResult, Bundler, CompileInput, CompilerHost, EmittedFiles, ModuleFormat, OxcCompilerHost,
  Plugin, PluginHooks, SourceUnit,
};

use self::common::{create_project, entry_point, options};

struct StampPlugin;

impl Plugin for StampPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("stamp")
  }

  fn hooks(&self) -> PluginHooks {
    PluginHooks::DEPENDENCY | PluginHooks::PRE_PROCESS | PluginHooks::POST_PROCESS
  }

  fn dependency(&self, units: Vec<SourceUnit>) -> anyhow::Result<Vec<SourceUnit>> {
    assert_eq!(units.last().map(|unit| unit.path.ends_with("index.ts")), Some(true));
    Ok(units)
  }

  fn pre_process(&self, code: String) -> anyhow::Result<String> {
    Ok(code.replace("\"__STAMP__\"", "\"stamped\""))
  }

  fn post_process(&self, code: String, path: &Path) -> anyhow::Result<String> {
    if path.extension().is_some_and(|ext| ext == "mjs") {
      return Ok(format!("// checked\n{code}"));
    }
    Ok(code)
  }
}

#[derive(Default)]
struct CountingHost {
  calls: AtomicUsize,
}

impl CompilerHost for CountingHost {
  fn emit(&self, input: &CompileInput<'_>) -> BuildResult<EmittedFiles> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    OxcCompilerHost.emit(input)
  }
}

#[tokio::test]
async fn plugins_and_compiler_host_are_called() {
  let project =
    create_project(&[("src/index.ts", "export const stamp: string = \"__STAMP__\";\n")]);
  let mut raw_options =
    options(project.path(), vec![entry_point("src/index.ts", ".", ModuleFormat::Both)]);
  raw_options.allow_update_package_json = Some(false);

  let host = Arc::new(CountingHost::default());
  let bundler = Bundler::new(raw_options)
    .unwrap()
    .with_plugin(Arc::new(StampPlugin))
    .with_compiler_host(Arc::clone(&host) as Arc<dyn CompilerHost>);
  bundler.write().await.unwrap();

  assert_eq!(host.calls.load(Ordering::SeqCst), 2);
  let dist = project.path().join("dist");
  let esm = fs::read_to_string(dist.join("index.mjs")).unwrap();
  assert!(esm.starts_with("// checked\n"), "{esm}");
  assert!(esm.contains("export const stamp = \"stamped\";"), "{esm}");
  let cjs = fs::read_to_string(dist.join("index.cjs")).unwrap();
  assert!(!cjs.contains("// checked"), "{cjs}");
}
