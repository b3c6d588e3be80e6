use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportedName {
  /// `import foo from 'mod'`
  Default,
  /// `import * as foo from 'mod'`
  Namespace,
  /// `import { foo } from 'mod'` or `import { "a-b" as foo } from 'mod'`
  Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
  Default,
  Named,
  Namespace,
  SideEffect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
  pub imported: ImportedName,
  pub local: String,
  /// `import type { A }` or `import { type A }`.
  pub is_type: bool,
}

impl ImportBinding {
  pub fn new(imported: ImportedName, local: impl Into<String>, is_type: bool) -> Self {
    Self { imported, local: local.into(), is_type }
  }

  pub fn kind(&self) -> ImportKind {
    match self.imported {
      ImportedName::Default => ImportKind::Default,
      ImportedName::Namespace => ImportKind::Namespace,
      ImportedName::Named(_) => ImportKind::Named,
    }
  }
}

/// An import of a non-local module, captured when its statement is removed from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
  /// `lodash` in `import { map } from 'lodash'`, already unescaped.
  pub specifier: String,
  /// Empty for `import 'mod'`.
  pub bindings: Vec<ImportBinding>,
  /// Source text of the `with { ... }` clause, if any.
  pub attributes: Option<String>,
  pub importer: PathBuf,
}

impl ImportRecord {
  pub fn new(specifier: impl Into<String>, importer: impl Into<PathBuf>) -> Self {
    Self {
      specifier: specifier.into(),
      bindings: vec![],
      attributes: None,
      importer: importer.into(),
    }
  }

  pub fn with_binding(mut self, binding: ImportBinding) -> Self {
    self.bindings.push(binding);
    self
  }

  pub fn is_side_effect(&self) -> bool {
    self.bindings.is_empty()
  }
}
