mod common;

use std::fs;

use dualpack::{Bundler, ModuleFormat};

use self::common::{create_project, entry_point, options};

const UTIL: &str = "export const add = (a: number, b: number): number => a + b;\n";
const INDEX: &str = "import { add } from \"./util\";\nexport default function sum(a: number, b: number): number {\n  return add(a, b);\n}\n";

#[tokio::test]
async fn writes_both_formats_and_patches_package_json() {
  let project = create_project(&[
    ("src/util.ts", UTIL),
    ("src/index.ts", INDEX),
    ("package.json", "{\n  \"license\": \"MIT\",\n  \"name\": \"pkg\",\n  \"version\": \"1.0.0\"\n}\n"),
  ]);
  let dist = project.path().join("dist");

  let bundler = Bundler::new(options(
    project.path(),
    vec![entry_point("src/index.ts", ".", ModuleFormat::Both)],
  ))
  .unwrap();
  let output = bundler.write().await.unwrap();

  let entry = &output.entries[0];
  assert_eq!(entry.compiled.len(), 2);
  assert_eq!(entry.artifacts.main, Some(dist.join("index.cjs")));
  assert_eq!(entry.artifacts.module, Some(dist.join("index.mjs")));

  let esm = fs::read_to_string(dist.join("index.mjs")).unwrap();
  assert!(esm.contains("const add = (a, b) => a + b;"), "{esm}");
  assert!(esm.contains("export default function sum(a, b)"), "{esm}");

  let cjs = fs::read_to_string(dist.join("index.cjs")).unwrap();
  assert!(cjs.starts_with("\"use strict\";"), "{cjs}");
  assert!(cjs.contains("function sum(a, b)"), "{cjs}");
  assert!(cjs.trim_end().ends_with("module.exports = sum;"), "{cjs}");

  let esm_types = fs::read_to_string(dist.join("index.d.mts")).unwrap();
  assert!(esm_types.contains("export default function sum(a: number, b: number): number;"));
  let cjs_types = fs::read_to_string(dist.join("index.d.cts")).unwrap();
  assert!(cjs_types.contains("declare function sum(a: number, b: number): number;"), "{cjs_types}");
  assert!(cjs_types.contains("export = sum;"), "{cjs_types}");

  let manifest: serde_json::Value =
    serde_json::from_str(&fs::read_to_string(project.path().join("package.json")).unwrap())
      .unwrap();
  let keys = manifest.as_object().unwrap().keys().map(String::as_str).collect::<Vec<_>>();
  assert_eq!(keys, ["name", "version", "type", "main", "types", "module", "exports", "license"]);
  assert_eq!(manifest["main"], "./dist/index.cjs");
  assert_eq!(manifest["exports"]["."]["import"]["types"], "./dist/index.d.mts");
  assert_eq!(manifest["exports"]["."]["require"]["default"], "./dist/index.cjs");
}

#[tokio::test]
async fn subpath_entries_get_their_own_directory() {
  let project = create_project(&[
    ("src/util.ts", UTIL),
    ("src/index.ts", INDEX),
    ("package.json", "{ \"name\": \"pkg\" }"),
  ]);
  let dist = project.path().join("dist");
  fs::create_dir_all(&dist).unwrap();
  fs::write(dist.join("stale.js"), "").unwrap();

  let bundler = Bundler::new(options(
    project.path(),
    vec![
      entry_point("src/util.ts", "./util", ModuleFormat::Esm),
      entry_point("src/index.ts", ".", ModuleFormat::Esm),
    ],
  ))
  .unwrap();
  bundler.write().await.unwrap();

  assert!(!dist.join("stale.js").exists());
  assert!(dist.join("util").join("util.mjs").is_file());
  assert!(dist.join("index.mjs").is_file());

  let manifest: serde_json::Value =
    serde_json::from_str(&fs::read_to_string(project.path().join("package.json")).unwrap())
      .unwrap();
  assert_eq!(manifest["type"], "module");
  assert_eq!(manifest["exports"]["."]["import"]["default"], "./dist/index.mjs");
  assert!(manifest["exports"].get("./util").is_none(), "main entry replaces the export map");
}

#[tokio::test]
async fn missing_package_json_is_a_warning() {
  let project = create_project(&[("src/util.ts", UTIL), ("src/index.ts", INDEX)]);

  let bundler = Bundler::new(options(
    project.path(),
    vec![entry_point("src/index.ts", ".", ModuleFormat::Esm)],
  ))
  .unwrap();
  let output = bundler.write().await.unwrap();

  assert_eq!(output.warnings.len(), 1);
  assert!(output.warnings[0].to_string().starts_with("No package.json in "));
  assert!(project.path().join("dist").join("index.d.mts").is_file());
}

#[tokio::test]
async fn ambiguous_exports_warn_for_commonjs() {
  let project = create_project(&[(
    "src/index.ts",
    "export const named = 1;\nexport default function main(): number {\n  return named;\n}\n",
  )]);

  let mut raw_options =
    options(project.path(), vec![entry_point("src/index.ts", ".", ModuleFormat::Commonjs)]);
  raw_options.allow_update_package_json = Some(false);
  let output = Bundler::new(raw_options).unwrap().write().await.unwrap();

  assert_eq!(
    output.warnings[0].to_string(),
    "Both named export and default export are exported from src/index.ts, that will affect the default export for CommonJS output."
  );
  let cjs = fs::read_to_string(project.path().join("dist").join("index.cjs")).unwrap();
  assert!(cjs.contains("Object.defineProperty(exports, '__esModule'"), "{cjs}");
}
