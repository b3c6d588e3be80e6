pub trait Source {
  fn content(&self) -> &str;

  /// Single-line comment written above the content.
  fn comment(&self) -> Option<&str> {
    None
  }
}

impl Source for &str {
  fn content(&self) -> &str {
    self
  }
}

impl Source for String {
  fn content(&self) -> &str {
    self
  }
}

/// A file's content labelled with its path.
pub struct ModuleSource {
  pub relative_path: String,
  pub content: String,
}

impl Source for ModuleSource {
  fn content(&self) -> &str {
    &self.content
  }

  fn comment(&self) -> Option<&str> {
    Some(&self.relative_path)
  }
}
