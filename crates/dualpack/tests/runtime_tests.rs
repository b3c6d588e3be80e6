mod common;

use std::path::Path;

use dualpack::{Bundler, ModuleFormat};

use self::common::{create_project, entry_point, options, run_node};

const IMPORT_ESM: &str =
  "import(require('url').pathToFileURL(process.argv[1]).href).then((m) => console.log(JSON.stringify(m.result ?? m.default(2, 3))))";
const REQUIRE_CJS: &str =
  "const m = require(process.argv[1]); console.log(JSON.stringify(typeof m === 'function' ? m(2, 3) : m.result))";

async fn build(project: &Path) {
  let mut raw_options =
    options(project, vec![entry_point("src/index.ts", ".", ModuleFormat::Both)]);
  raw_options.allow_update_package_json = Some(false);
  Bundler::new(raw_options).unwrap().write().await.unwrap();
}

fn run_both(project: &Path) -> Option<(String, String)> {
  let dist = project.join("dist");
  let esm = run_node(IMPORT_ESM, &dist.join("index.mjs"))?;
  let cjs = run_node(REQUIRE_CJS, &dist.join("index.cjs"))?;
  Some((esm, cjs))
}

#[tokio::test]
async fn default_export_runs_in_both_formats() {
  let project = create_project(&[
    ("src/util.ts", "export const add = (a: number, b: number): number => a + b;\n"),
    (
      "src/index.ts",
      "import { add } from \"./util\";\nexport default function sum(a: number, b: number): number {\n  return add(a, b);\n}\n",
    ),
  ]);
  build(project.path()).await;

  let Some((esm, cjs)) = run_both(project.path()) else { return };
  assert_eq!(esm, "5");
  assert_eq!(cjs, "5");
}

#[tokio::test]
async fn renamed_and_anonymous_bindings_keep_their_values() {
  let project = create_project(&[
    ("src/a.ts", "export function helper() {\n  return \"a\";\n}\n"),
    (
      "src/b.ts",
      "import { helper as h } from \"./a\";\nexport function helper() {\n  return \"b\" + h();\n}\n",
    ),
    ("src/one.ts", "export default () => 9.9;\n"),
    ("src/meta.ts", "export const VERSION = \"9.9\";\nexport const meta = VERSION;\n"),
    (
      "src/index.ts",
      "import { helper } from \"./b\";\nimport one from \"./one\";\nimport { meta } from \"./meta\";\nexport const VERSION = \"1.0\";\nexport const result = [helper(), one(), meta, VERSION];\n",
    ),
  ]);
  build(project.path()).await;

  let Some((esm, cjs)) = run_both(project.path()) else { return };
  assert_eq!(esm, r#"["ba",9.9,"9.9","1.0"]"#);
  assert_eq!(cjs, esm);
}
