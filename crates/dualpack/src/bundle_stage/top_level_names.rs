use std::path::Path;

use dualpack_common::ImportedName;
use dualpack_ecmascript::StatementExt;
use oxc::ast::ast::{ImportDeclarationSpecifier, ModuleExportName, Statement, TSModuleReference};
use rustc_hash::FxHashSet;

use crate::utils::{module_locator::ModuleLocator, parse_unit::ParsedUnit};

/// Where a top-level name of a file comes from. Two files only conflict over a name when
/// the origins differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameOrigin {
  Declared,
  ExternalImport { specifier: String, imported: ImportedName },
  /// Used without any declaration, e.g. `process` or `Record`.
  Global,
}

#[derive(Debug, Default)]
pub struct UnitNames {
  /// Once per name, declarations first.
  pub names: Vec<(String, NameOrigin)>,
  /// Every name the file uses in any scope. Synthetic names must avoid them all.
  pub used_names: Vec<String>,
}

pub fn imported_name(name: &ModuleExportName) -> ImportedName {
  match name.name().as_str() {
    "default" => ImportedName::Default,
    name => ImportedName::Named(name.to_string()),
  }
}

pub fn collect_unit_names(parsed: &ParsedUnit, path: &Path, locator: &ModuleLocator) -> UnitNames {
  let mut seen = FxHashSet::default();
  let mut names = vec![];
  let mut add = |name: &str, origin: NameOrigin| {
    if seen.insert(name.to_string()) {
      names.push((name.to_string(), origin));
    }
  };

  for stmt in &parsed.ast.program().body {
    for ident in stmt.declared_names() {
      add(ident.name.as_str(), NameOrigin::Declared);
    }

    match stmt {
      Statement::ImportDeclaration(decl) if !locator.is_local(path, &decl.source.value) => {
        let specifier = decl.source.value.to_string();
        for spec in decl.specifiers.iter().flatten() {
          let (local, imported) = match spec {
            ImportDeclarationSpecifier::ImportSpecifier(spec) => {
              (&spec.local, imported_name(&spec.imported))
            }
            ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
              (&spec.local, ImportedName::Default)
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
              (&spec.local, ImportedName::Namespace)
            }
          };
          add(
            local.name.as_str(),
            NameOrigin::ExternalImport { specifier: specifier.clone(), imported },
          );
        }
      }
      Statement::TSImportEqualsDeclaration(decl) => {
        if let TSModuleReference::ExternalModuleReference(reference) = &decl.module_reference {
          let specifier = reference.expression.value.as_str();
          if !locator.is_local(path, specifier) {
            add(
              decl.id.name.as_str(),
              NameOrigin::ExternalImport {
                specifier: specifier.to_string(),
                imported: ImportedName::Namespace,
              },
            );
          }
        }
      }
      _ => {}
    }
  }

  let unresolved = parsed.scoping.root_unresolved_references();
  let mut globals = unresolved.keys().map(ToString::to_string).collect::<Vec<_>>();
  globals.sort_unstable();
  for name in &globals {
    add(name, NameOrigin::Global);
  }

  let used_names = parsed.scoping.symbol_names().map(ToString::to_string).chain(globals).collect();

  UnitNames { names, used_names }
}
