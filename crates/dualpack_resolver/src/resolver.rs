use std::path::{Path, PathBuf};

use oxc_resolver::{
  ResolveError, ResolveOptions, Resolver as OxcResolver, TsconfigOptions, TsconfigReferences,
};
use sugar_path::SugarPath;

/// Extensions tried for extension-less specifiers, TypeScript first.
const EXTENSIONS: [&str; 8] = [".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs"];

#[derive(Debug)]
pub struct Resolver {
  cwd: PathBuf,
  inner: OxcResolver,
  has_tsconfig: bool,
}

impl Resolver {
  pub fn new(cwd: PathBuf, tsconfig: Option<PathBuf>) -> Self {
    // `./util.js` written in TypeScript sources points at `./util.ts`.
    let extension_alias = vec![
      (".js".to_string(), vec![".ts".to_string(), ".tsx".to_string(), ".js".to_string()]),
      (".mjs".to_string(), vec![".mts".to_string(), ".mjs".to_string()]),
      (".cjs".to_string(), vec![".cts".to_string(), ".cjs".to_string()]),
    ];

    let has_tsconfig = tsconfig.is_some();
    let tsconfig = tsconfig.map(|config_file| TsconfigOptions {
      config_file: if config_file.is_absolute() { config_file } else { cwd.join(config_file) },
      references: TsconfigReferences::Auto,
    });

    let inner = OxcResolver::new(ResolveOptions {
      extensions: EXTENSIONS.iter().map(ToString::to_string).collect(),
      extension_alias,
      condition_names: vec!["import".to_string(), "default".to_string()],
      tsconfig,
      ..ResolveOptions::default()
    });

    Self { cwd, inner, has_tsconfig }
  }

  pub fn cwd(&self) -> &PathBuf {
    &self.cwd
  }

  /// Resolves `specifier` as written in `importer`.
  pub fn resolve(&self, importer: &Path, specifier: &str) -> Result<PathBuf, ResolveError> {
    let dir = importer
      .parent()
      .filter(|inner| inner.components().next().is_some())
      .unwrap_or(self.cwd.as_path());

    self.inner.resolve(dir, specifier).map(|resolution| resolution.path().normalize())
  }

  /// Resolves an entry written relative to the working directory, so entry paths compare equal
  /// to the paths produced for imports.
  pub fn resolve_entry(&self, entry: &str) -> Result<PathBuf, ResolveError> {
    let specifier = if is_local_specifier(entry) {
      entry.to_string()
    } else {
      let mut prefixed = String::with_capacity(entry.len() + 2);
      prefixed.push_str("./");
      prefixed.push_str(entry);
      prefixed
    };
    self.inner.resolve(&self.cwd, &specifier).map(|resolution| resolution.path().normalize())
  }

  /// Local files are relative or absolute specifiers, plus tsconfig `paths` aliases that land
  /// outside of `node_modules`.
  pub fn resolve_local(
    &self,
    importer: &Path,
    specifier: &str,
  ) -> Option<Result<PathBuf, ResolveError>> {
    if is_local_specifier(specifier) {
      return Some(self.resolve(importer, specifier));
    }
    if !self.has_tsconfig {
      return None;
    }
    match self.resolve(importer, specifier) {
      Ok(path) if !path.components().any(|c| c.as_os_str() == "node_modules") => Some(Ok(path)),
      _ => None,
    }
  }
}

pub fn is_local_specifier(specifier: &str) -> bool {
  specifier.starts_with("./")
    || specifier.starts_with("../")
    || specifier == "."
    || specifier == ".."
    || Path::new(specifier).is_absolute()
}

#[test]
fn resolves_typescript_sources() {
  let dir = tempfile::tempdir().unwrap();
  let src = dir.path().join("src");
  std::fs::create_dir_all(src.join("utils")).unwrap();
  std::fs::write(src.join("index.ts"), "").unwrap();
  std::fs::write(src.join("math.ts"), "").unwrap();
  std::fs::write(src.join("utils").join("index.ts"), "").unwrap();

  let resolver = Resolver::new(dir.path().to_path_buf(), None);
  let importer = src.join("index.ts");

  assert_eq!(resolver.resolve(&importer, "./math").unwrap(), src.join("math.ts").normalize());
  assert_eq!(resolver.resolve(&importer, "./math.js").unwrap(), src.join("math.ts").normalize());
  assert_eq!(
    resolver.resolve(&importer, "./utils").unwrap(),
    src.join("utils").join("index.ts").normalize()
  );
  assert!(resolver.resolve(&importer, "./missing").is_err());
  assert_eq!(resolver.resolve_entry("src/index.ts").unwrap(), importer.normalize());
  assert!(resolver.resolve_local(&importer, "lodash").is_none());
}

#[test]
fn detects_local_specifiers() {
  assert!(is_local_specifier("./a"));
  assert!(is_local_specifier("../a"));
  assert!(!is_local_specifier("node:fs"));
  assert!(!is_local_specifier("@scope/pkg"));
}
