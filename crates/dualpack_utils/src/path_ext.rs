use std::{borrow::Cow, ffi::OsStr, path::Path};

use sugar_path::SugarPath;

pub trait PathExt {
  fn representative_file_name(&self) -> Cow<str>;

  /// Slash separated path relative to `base`, used in comments and messages.
  fn relative_display(&self, base: &Path) -> String;

  /// `./dist/index.mjs` style path, as expected by `package.json`.
  fn package_relative(&self, base: &Path) -> String;
}

impl PathExt for Path {
  /// It doesn't ensure the file name is a valid identifier in JS.
  fn representative_file_name(&self) -> Cow<str> {
    let file_name =
      self.file_stem().map_or_else(|| self.to_string_lossy(), |stem| stem.to_string_lossy());

    match &*file_name {
      // "index": Node.js use `index` as a special name for directory import.
      "index" | "mod" => self
        .parent()
        .and_then(Self::file_stem)
        .map(OsStr::to_string_lossy)
        .map_or(file_name, |parent_dir_name| parent_dir_name),
      _ => file_name,
    }
  }

  fn relative_display(&self, base: &Path) -> String {
    if self.is_absolute() {
      self.relative(base).to_slash_lossy().into_owned()
    } else {
      self.to_slash_lossy().into_owned()
    }
  }

  fn package_relative(&self, base: &Path) -> String {
    let relative = self.relative_display(base);
    if relative.starts_with("../") || relative.starts_with("./") {
      relative
    } else {
      let mut prefixed = String::with_capacity(relative.len() + 2);
      prefixed.push_str("./");
      prefixed.push_str(&relative);
      prefixed
    }
  }
}

#[test]
fn test_representative_file_name() {
  let cwd = Path::new(".").join("project");
  let path = cwd.join("src").join("vue.ts");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("index.ts");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("mod.ts");
  assert_eq!(path.representative_file_name(), "vue");
}

#[test]
fn test_package_relative() {
  let cwd = Path::new("/project");
  assert_eq!(Path::new("/project/dist/index.mjs").package_relative(cwd), "./dist/index.mjs");
  assert_eq!(Path::new("/project/src/a.ts").relative_display(cwd), "src/a.ts");
}
