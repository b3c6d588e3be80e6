mod common;

use dualpack::{Bundler, ModuleFormat};

use self::common::{create_project, entry_point, options};

async fn bundle(
  project: &tempfile::TempDir,
  rename_duplicates: bool,
) -> dualpack::BuildResult<String> {
  let mut entry = entry_point("src/index.ts", ".", ModuleFormat::Esm);
  entry.rename_duplicates = Some(rename_duplicates);
  let bundler = Bundler::new(options(project.path(), vec![entry]))?;
  let output = bundler.bundle(&bundler.options().entry_points[0]).await?;
  Ok(output.result.code)
}

#[tokio::test]
async fn flattens_local_imports() {
  let project = create_project(&[
    ("src/util.ts", "export const add = (a: number, b: number): number => a + b;\n"),
    (
      "src/index.ts",
      "import { add } from \"./util\";\nexport default function sum(a: number, b: number): number {\n  return add(a, b);\n}\n",
    ),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert_eq!(
    code,
    "// src/util.ts\nconst add = (a: number, b: number): number => a + b;\n\n// src/index.ts\nexport default function sum(a: number, b: number): number {\n  return add(a, b);\n}"
  );
}

#[tokio::test]
async fn renames_duplicated_declarations() {
  let project = create_project(&[
    ("src/a.ts", "export function helper() {\n  return \"a\";\n}\nexport const fromA = helper();\n"),
    ("src/b.ts", "export function helper() {\n  return \"b\";\n}\nexport const fromB = helper();\n"),
    (
      "src/index.ts",
      "import { fromA } from \"./a\";\nimport { fromB } from \"./b\";\nexport const both = fromA + fromB;\n",
    ),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert!(code.contains("function helper() {\n  return \"a\";\n}"), "{code}");
  assert!(code.contains("function d_helper_1() {\n  return \"b\";\n}"), "{code}");
  assert!(code.contains("const fromB = d_helper_1();"), "{code}");
  assert!(code.contains("export const both = fromA + fromB;"), "{code}");
  assert!(!code.contains("import"), "{code}");
}

#[tokio::test]
async fn duplicated_declarations_fail_without_renaming() {
  let project = create_project(&[
    ("src/a.ts", "export function helper() {\n  return \"a\";\n}\nexport const fromA = helper();\n"),
    ("src/b.ts", "export function helper() {\n  return \"b\";\n}\nexport const fromB = helper();\n"),
    (
      "src/index.ts",
      "import { fromA } from \"./a\";\nimport { fromB } from \"./b\";\nexport const both = fromA + fromB;\n",
    ),
  ]);

  let err = bundle(&project, false).await.unwrap_err();
  assert_eq!(
    err.to_string(),
    "Name -> helper declared in multiple files :\n  - src/a.ts\n  - src/b.ts"
  );
}

#[tokio::test]
async fn entry_keeps_its_exported_names() {
  let project = create_project(&[
    ("src/meta.ts", "export const VERSION = \"9.9\";\nexport const meta = VERSION;\n"),
    (
      "src/index.ts",
      "import { meta } from \"./meta\";\nexport const VERSION = \"1.0\";\nexport const info = meta;\n",
    ),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert!(code.contains("const d_VERSION_1 = \"9.9\";"), "{code}");
  assert!(code.contains("const meta = d_VERSION_1;"), "{code}");
  assert!(code.contains("export const VERSION = \"1.0\";"), "{code}");
  assert_eq!(code.matches("export const VERSION").count(), 1, "{code}");
}

#[tokio::test]
async fn names_anonymous_default_exports() {
  let project = create_project(&[
    ("src/one.ts", "export default function () {\n  return 1;\n}\n"),
    ("src/index.ts", "import one from \"./one\";\nexport const value = one();\n"),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert!(code.contains("function a_one_1() {\n  return 1;\n}"), "{code}");
  assert!(code.contains("export const value = a_one_1();"), "{code}");
  assert!(!code.contains("export default"), "{code}");
}

#[tokio::test]
async fn merges_external_imports() {
  let project = create_project(&[
    ("src/a.ts", "import { a } from \"x\";\nexport const fromA = a;\n"),
    ("src/b.ts", "import { b } from \"x\";\nimport type { c } from \"x\";\nexport const fromB: c = b;\n"),
    (
      "src/index.ts",
      "import { fromA } from \"./a\";\nimport { fromB } from \"./b\";\nexport const both = [fromA, fromB];\n",
    ),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert!(code.starts_with("import { a, b, c } from \"x\";\n"), "{code}");
  assert_eq!(code.matches("from \"x\"").count(), 1, "{code}");
}

#[tokio::test]
async fn flattens_local_namespace_members() {
  let project = create_project(&[
    ("src/math.ts", "export const two = 2;\nexport type Num = number;\n"),
    (
      "src/index.ts",
      "import * as math from \"./math\";\nexport const four: math.Num = math.two * 2;\n",
    ),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert!(code.contains("export const four: Num = two * 2;"), "{code}");
}

#[tokio::test]
async fn missing_local_module_is_fatal() {
  let project = create_project(&[("src/index.ts", "import { a } from \"./missing\";\nexport { a };\n")]);

  let err = bundle(&project, true).await.unwrap_err();
  assert_eq!(err.to_string(), "Cannot find module \"./missing\" imported from src/index.ts.");
}

#[tokio::test]
async fn renames_flow_through_importers() {
  let project = create_project(&[
    ("src/a.ts", "export function helper() {\n  return \"a\";\n}\n"),
    (
      "src/b.ts",
      "import { helper as h } from \"./a\";\nexport function helper() {\n  return \"b\" + h();\n}\n",
    ),
    ("src/c.ts", "import { helper } from \"./b\";\nexport const fromC = helper();\n"),
    ("src/index.ts", "import { fromC } from \"./c\";\nexport const result = fromC;\n"),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert!(code.contains("function helper() {\n  return \"a\";\n}"), "{code}");
  assert!(code.contains("function d_helper_1() {\n  return \"b\" + helper();\n}"), "{code}");
  assert!(code.contains("const fromC = d_helper_1();"), "{code}");
  assert!(!code.contains("h()"), "{code}");
}

#[tokio::test]
async fn declaration_like_file_names_are_renamed() {
  let project = create_project(&[
    ("src/c.ts", "export class K {\n  m() {\n    return 1;\n  }\n}\n"),
    ("src/d.ts", "export class K {\n  x = 1;\n}\n"),
    ("src/e.ts", "import { K as KK } from \"./d\";\nexport const k = new KK();\n"),
    (
      "src/index.ts",
      "import { K } from \"./c\";\nimport { k } from \"./e\";\nexport const both = [new K(), k];\n",
    ),
  ]);

  let code = bundle(&project, true).await.unwrap();
  assert!(code.contains("// src/d.ts\nclass d_K_1 {\n  x = 1;\n}"), "{code}");
  assert!(code.contains("const k = new d_K_1();"), "{code}");
  assert_eq!(code.matches("class K ").count(), 1, "{code}");
  assert!(!code.contains("d_K_2"), "{code}");
}
