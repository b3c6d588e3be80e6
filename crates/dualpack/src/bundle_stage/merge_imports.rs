use std::path::{Path, PathBuf};

use dualpack_common::{ImportBinding, ImportKind, ImportRecord, ImportedName};
use dualpack_error::{BuildDiagnostic, BuildResult};
use dualpack_utils::{
  concat_string,
  ecmascript::{quote_string, to_module_import_export_name},
  indexmap::FxIndexMap,
  path_ext::PathExt,
};
use itertools::Itertools;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
struct ModuleImports<'a> {
  /// Local name to whether every import of it is type-only.
  defaults: FxIndexMap<&'a str, bool>,
  named: FxIndexMap<(&'a str, &'a str), bool>,
  namespaces: FxIndexMap<&'a str, bool>,
  attributes: Option<&'a str>,
}

impl<'a> ModuleImports<'a> {
  fn add(&mut self, binding: &'a ImportBinding) {
    let entry = match &binding.imported {
      ImportedName::Default => self.defaults.entry(binding.local.as_str()),
      ImportedName::Namespace => self.namespaces.entry(binding.local.as_str()),
      ImportedName::Named(imported) => {
        let is_type = self.named.entry((imported.as_str(), binding.local.as_str())).or_insert(true);
        *is_type &= binding.is_type;
        return;
      }
    };
    let is_type = entry.or_insert(true);
    *is_type &= binding.is_type;
  }

  fn is_empty(&self) -> bool {
    self.defaults.is_empty() && self.named.is_empty() && self.namespaces.is_empty()
  }

  fn render(&self, specifier: &str) -> Vec<String> {
    let mut statements = vec![];
    let mut named = self
      .named
      .iter()
      .map(|(&(imported, local), &is_type)| {
        ImportBinding::new(ImportedName::Named(imported.to_string()), local, is_type)
      })
      .collect::<Vec<_>>();

    let mut defaults = self.defaults.iter();
    if let Some((&local, &is_type)) = defaults.next() {
      let binding = ImportBinding::new(ImportedName::Default, local, is_type);
      statements.push(render_statement(specifier, &[binding], is_type, self.attributes));
    }
    // `import a from "x"` and `import b from "x"` become `import a from "x"` and
    // `import { default as b } from "x"`.
    named.extend(defaults.map(|(&local, &is_type)| {
      ImportBinding::new(ImportedName::Named("default".to_string()), local, is_type)
    }));

    if !named.is_empty() {
      named.sort_by(|a, b| (&a.imported, &a.local).cmp(&(&b.imported, &b.local)));
      named.dedup_by(|a, b| a.imported == b.imported && a.local == b.local);
      let type_only = named.iter().all(|binding| binding.is_type);
      for binding in &mut named {
        binding.is_type = false;
      }
      statements.push(render_statement(specifier, &named, type_only, self.attributes));
    }

    for (&local, &is_type) in &self.namespaces {
      let binding = ImportBinding::new(ImportedName::Namespace, local, is_type);
      statements.push(render_statement(specifier, &[binding], is_type, self.attributes));
    }
    statements
  }
}

/// Merges the external imports removed from every file into the import block of the bundle.
///
/// One statement per module and import kind, names sorted, statements sorted by their text.
/// A name imported both as a value and as a type is imported as a value.
pub fn merge_imports(records: Vec<ImportRecord>, cwd: &Path) -> BuildResult<Vec<String>> {
  let mut modules = FxIndexMap::<&str, ModuleImports>::default();
  let mut side_effects = vec![];
  let mut bound = FxHashMap::<&str, (&str, &ImportedName, &PathBuf)>::default();
  let mut errors = vec![];

  for record in &records {
    let module = modules.entry(record.specifier.as_str()).or_default();
    if record.is_side_effect() {
      side_effects.push(record.specifier.as_str());
      continue;
    }
    if module.attributes.is_none() {
      module.attributes = record.attributes.as_deref();
    }

    for binding in &record.bindings {
      let current = (record.specifier.as_str(), &binding.imported, &record.importer);
      match bound.get(binding.local.as_str()) {
        Some(&(specifier, imported, importer))
          if (specifier, imported) != (current.0, current.1) =>
        {
          errors.push(BuildDiagnostic::ConflictingImportBinding {
            local: binding.local.clone(),
            first: describe(specifier, imported, importer, cwd),
            second: describe(current.0, current.1, current.2, cwd),
          });
        }
        Some(_) => {}
        None => {
          bound.insert(binding.local.as_str(), current);
        }
      }
      module.add(binding);
    }
  }
  if !errors.is_empty() {
    Err(errors)?;
  }

  let mut statements = vec![];
  for (specifier, module) in &modules {
    if module.is_empty() {
      if side_effects.contains(specifier) {
        statements.push(render_statement(specifier, &[], false, module.attributes));
      }
      continue;
    }
    statements.extend(module.render(specifier));
  }
  statements.sort_unstable();
  statements.dedup();
  Ok(statements)
}

fn describe(specifier: &str, imported: &ImportedName, importer: &Path, cwd: &Path) -> String {
  let imported = match imported {
    ImportedName::Default => "default",
    ImportedName::Namespace => "*",
    ImportedName::Named(name) => name.as_str(),
  };
  concat_string!(
    imported,
    " from ",
    quote_string(specifier),
    " in ",
    importer.relative_display(cwd)
  )
}

/// Renders one import statement. Inline `type` markers are only written when the statement
/// itself is not type-only.
pub fn render_import(specifier: &str, bindings: &[ImportBinding], type_only: bool) -> String {
  render_statement(specifier, bindings, type_only, None)
}

fn render_statement(
  specifier: &str,
  bindings: &[ImportBinding],
  type_only: bool,
  attributes: Option<&str>,
) -> String {
  let source = quote_string(specifier);
  let attributes = attributes.map(|attributes| concat_string!(" ", attributes)).unwrap_or_default();
  if bindings.is_empty() {
    return concat_string!("import ", source, attributes, ";");
  }

  let mut clause = vec![];
  for binding in bindings {
    match binding.kind() {
      ImportKind::Default => clause.push(binding.local.clone()),
      ImportKind::Namespace => clause.push(concat_string!("* as ", binding.local)),
      ImportKind::Named | ImportKind::SideEffect => {}
    }
  }
  let named = bindings
    .iter()
    .filter_map(|binding| {
      let ImportedName::Named(imported) = &binding.imported else { return None };
      let marker = if binding.is_type && !type_only { "type " } else { "" };
      Some(if *imported == binding.local {
        concat_string!(marker, binding.local)
      } else {
        concat_string!(marker, to_module_import_export_name(imported), " as ", binding.local)
      })
    })
    .join(", ");
  if !named.is_empty() {
    clause.push(concat_string!("{ ", named, " }"));
  }

  let head = if type_only { "import type " } else { "import " };
  concat_string!(head, clause.join(", "), " from ", source, attributes, ";")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(
    specifier: &str,
    importer: &str,
    bindings: &[(ImportedName, &str, bool)],
  ) -> ImportRecord {
    bindings.iter().fold(
      ImportRecord::new(specifier, importer),
      |record, (imported, local, is_type)| {
        record.with_binding(ImportBinding::new(imported.clone(), *local, *is_type))
      },
    )
  }

  fn named(name: &str) -> ImportedName {
    ImportedName::Named(name.to_string())
  }

  #[test]
  fn type_names_fold_into_value_import() {
    let records = vec![
      record("x", "/p/a.ts", &[(named("a"), "a", false)]),
      record("x", "/p/b.ts", &[(named("b"), "b", false)]),
      record("x", "/p/c.ts", &[(named("c"), "c", true)]),
    ];
    let merged = merge_imports(records, Path::new("/p")).unwrap();
    assert_eq!(merged, ["import { a, b, c } from \"x\";"]);
  }

  #[test]
  fn type_only_names_stay_type_only() {
    let records = vec![
      record("x", "/p/a.ts", &[(named("B"), "B", true)]),
      record("x", "/p/b.ts", &[(named("A"), "A", true), (named("B"), "B", true)]),
    ];
    let merged = merge_imports(records, Path::new("/p")).unwrap();
    assert_eq!(merged, ["import type { A, B } from \"x\";"]);
  }

  #[test]
  fn one_statement_per_kind_sorted_by_text() {
    let records = vec![
      record("react", "/p/a.ts", &[(ImportedName::Default, "React", false)]),
      record("react", "/p/b.ts", &[(named("useState"), "useState", false)]),
      record("path", "/p/b.ts", &[(ImportedName::Namespace, "path", false)]),
      ImportRecord::new("reflect-metadata", "/p/c.ts"),
      ImportRecord::new("path", "/p/c.ts"),
    ];
    let merged = merge_imports(records, Path::new("/p")).unwrap();
    assert_eq!(
      merged,
      [
        "import \"reflect-metadata\";",
        "import * as path from \"path\";",
        "import React from \"react\";",
        "import { useState } from \"react\";",
      ]
    );
  }

  #[test]
  fn extra_default_locals_become_named() {
    let records = vec![
      record("x", "/p/a.ts", &[(ImportedName::Default, "a", false)]),
      record("x", "/p/b.ts", &[(ImportedName::Default, "b", false), (named("c"), "d", false)]),
    ];
    let merged = merge_imports(records, Path::new("/p")).unwrap();
    assert_eq!(merged, ["import a from \"x\";", "import { c as d, default as b } from \"x\";"]);
  }

  #[test]
  fn attributes_are_kept() {
    let mut record = record("./data.json", "/p/a.ts", &[(ImportedName::Default, "data", false)]);
    record.attributes = Some("with { type: \"json\" }".to_string());
    let merged = merge_imports(vec![record], Path::new("/p")).unwrap();
    assert_eq!(merged, ["import data from \"./data.json\" with { type: \"json\" };"]);
  }

  #[test]
  fn conflicting_local_is_fatal() {
    let records = vec![
      record("a", "/p/a.ts", &[(named("x"), "x", false)]),
      record("b", "/p/b.ts", &[(named("x"), "x", false)]),
    ];
    let error = merge_imports(records, Path::new("/p")).unwrap_err();
    assert_eq!(
      error.to_string(),
      "Import binding \"x\" refers to both x from \"a\" in a.ts and x from \"b\" in b.ts."
    );
  }
}
