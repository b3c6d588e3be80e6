use std::path::PathBuf;

/// Every message here is matched verbatim by scripts running the CLI, keep the wording stable.
#[derive(Debug, thiserror::Error)]
pub enum BuildDiagnostic {
  #[error("No dualpack.config.json file found in {}", cwd.display())]
  ConfigNotFound { cwd: PathBuf },

  #[error("Invalid config file {}: {reason}", path.display())]
  InvalidConfig { path: PathBuf, reason: String },

  #[error("No entry found in dualpack.config.json file, at least one entry required")]
  EmptyEntryPoints,

  /// Each path is already quoted, e.g. `"./utils"`.
  #[error(
    "Duplicate export paths/path ({}) found in your dualpack.config.json file, that will error for bundled output",
    paths.join(",")
  )]
  DuplicateExportPaths { paths: Vec<String> },

  #[error("Entry file {entry} does not exist.")]
  EntryNotFound { entry: String },

  #[error("Cannot find module \"{specifier}\" imported from {importer}.")]
  UnresolvedImport { specifier: String, importer: String },

  #[error("{file} has no valid TypeScript extension")]
  UnsupportedExtension { file: String },

  #[error(
    "The package detects CommonJs format in the dependencies tree ({}), that is unsupported.",
    files.join(", ")
  )]
  CommonJsNotAllowed { files: Vec<String> },

  #[error(
    "Node built-in modules ({}) are imported but `nodeEnv` is disabled.",
    modules.join(", ")
  )]
  BuiltinsNotAllowed { modules: Vec<String> },

  #[error("{}", render_duplicate_declarations(declarations))]
  DuplicateDeclarations { declarations: Vec<(String, Vec<String>)> },

  #[error("Failed to parse {file}: {message}")]
  ParseFailed { file: String, message: String },

  #[error("\"{name}\" is not exported by {module}, imported by {importer}.")]
  MissingExport { name: String, module: String, importer: String },

  #[error("Import binding \"{local}\" refers to both {first} and {second}.")]
  ConflictingImportBinding { local: String, first: String, second: String },

  #[error(
    "Namespace import \"{name}\" of a local module in {file} can only be used for static member access."
  )]
  UnsupportedNamespaceUsage { name: String, file: String },

  #[error("Re-exporting local module \"{specifier}\" as namespace \"{name}\" in {file} is unsupported.")]
  UnsupportedNamespaceReexport { name: String, specifier: String, file: String },

  #[error("Type check failed:\n{output}")]
  TypeCheckFailed { output: String },

  #[error(
    "Both named export and default export are exported from {file}, that will affect the default export for CommonJS output."
  )]
  AmbiguousCommonJsExports { file: String },

  #[error("Circular dependency: {}.", paths.join(" -> "))]
  CircularDependency { paths: Vec<String> },
}

fn render_duplicate_declarations(declarations: &[(String, Vec<String>)]) -> String {
  let mut rendered = String::new();
  for (index, (name, files)) in declarations.iter().enumerate() {
    if index > 0 {
      rendered.push('\n');
    }
    rendered.push_str("Name -> ");
    rendered.push_str(name);
    rendered.push_str(" declared in multiple files :");
    for file in files {
      rendered.push_str("\n  - ");
      rendered.push_str(file);
    }
  }
  rendered
}

#[test]
fn duplicate_declarations_list_every_file() {
  let diagnostic = BuildDiagnostic::DuplicateDeclarations {
    declarations: vec![("N".to_string(), vec!["src/a.ts".to_string(), "src/b.ts".to_string()])],
  };
  assert_eq!(diagnostic.to_string(), "Name -> N declared in multiple files :\n  - src/a.ts\n  - src/b.ts");
}

#[test]
fn duplicate_export_paths_keep_quotes() {
  let diagnostic =
    BuildDiagnostic::DuplicateExportPaths { paths: vec!["\".\"".to_string(), "\"./a\"".to_string()] };
  assert_eq!(
    diagnostic.to_string(),
    "Duplicate export paths/path (\".\",\"./a\") found in your dualpack.config.json file, that will error for bundled output"
  );
}
