use std::path::Path;

use dualpack_common::{ImportedName, UnitIdx};
use dualpack_ecmascript::StatementExt;
use dualpack_utils::indexmap::FxIndexMap;
use oxc::ast::ast::{
  ExportDefaultDeclarationKind, Expression, ImportDeclarationSpecifier, Program, Statement,
  TSModuleReference,
};
use oxc_index::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
  bundle_stage::{
    commonjs::{CommonJsExport, RequireBindings, commonjs_export, require_declaration},
    top_level_names::imported_name,
  },
  utils::module_locator::ModuleLocator,
};

#[derive(Debug, Clone)]
pub enum LocalExport {
  /// A name of this file, possibly a binding imported from another local file.
  Binding(String),
  Reexport { source: UnitIdx, imported: ImportedName },
  External { specifier: String, imported: ImportedName },
  /// `export default function () {}` and friends, named later on.
  Anonymous,
}

#[derive(Debug, Clone)]
pub enum StarExport {
  Local(UnitIdx),
  External(String),
}

#[derive(Debug, Clone)]
pub struct LocalImport {
  pub source: UnitIdx,
  pub imported: ImportedName,
  pub is_type: bool,
}

#[derive(Debug, Default)]
pub struct ExportTable {
  pub exports: FxIndexMap<String, LocalExport>,
  pub star_exports: Vec<StarExport>,
  /// Local binding name to the local file it is imported from.
  pub local_imports: FxIndexMap<String, LocalImport>,
}

impl ExportTable {
  pub fn new(program: &Program, path: &Path, locator: &ModuleLocator, commonjs: bool) -> Self {
    let mut table = Self::default();
    for stmt in &program.body {
      match stmt {
        Statement::VariableDeclaration(decl) if commonjs => {
          let Some(require) = require_declaration(decl) else { continue };
          let Some(source) = locator.locate(path, &require.specifier.value) else { continue };
          let bindings = match require.bindings {
            RequireBindings::Whole(local) => vec![(ImportedName::Default, local)],
            RequireBindings::Destructured(pairs) => pairs
              .into_iter()
              .map(|(imported, local)| (ImportedName::Named(imported), local))
              .collect(),
          };
          for (imported, local) in bindings {
            table.local_imports.insert(local, LocalImport { source, imported, is_type: false });
          }
        }
        Statement::ExpressionStatement(_) if commonjs => match commonjs_export(stmt) {
          Some(CommonJsExport::Identifier(name)) => {
            table.add_export("default", LocalExport::Binding(name.to_string()));
          }
          Some(CommonJsExport::Shorthands(names)) => {
            for name in names {
              table.add_export(name, LocalExport::Binding(name.to_string()));
            }
          }
          Some(CommonJsExport::Named { name, .. }) => {
            table.add_export(name, LocalExport::Binding(name.to_string()));
          }
          None => {}
        },
        Statement::ImportDeclaration(decl) => {
          let Some(source) = locator.locate(path, &decl.source.value) else { continue };
          for spec in decl.specifiers.iter().flatten() {
            let (local, imported, is_type) = match spec {
              ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                (&spec.local, imported_name(&spec.imported), spec.import_kind.is_type())
              }
              ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
                (&spec.local, ImportedName::Default, false)
              }
              ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
                (&spec.local, ImportedName::Namespace, false)
              }
            };
            table.local_imports.insert(
              local.name.to_string(),
              LocalImport { source, imported, is_type: is_type || decl.import_kind.is_type() },
            );
          }
        }
        Statement::TSImportEqualsDeclaration(decl) => {
          let TSModuleReference::ExternalModuleReference(reference) = &decl.module_reference else {
            continue;
          };
          let Some(source) = locator.locate(path, &reference.expression.value) else { continue };
          table.local_imports.insert(
            decl.id.name.to_string(),
            LocalImport {
              source,
              imported: ImportedName::Namespace,
              is_type: decl.import_kind.is_type(),
            },
          );
        }
        Statement::ExportNamedDeclaration(decl) => {
          if decl.declaration.is_some() {
            for ident in stmt.declared_names() {
              table.add_export(ident.name.as_str(), LocalExport::Binding(ident.name.to_string()));
            }
            continue;
          }

          let source = decl.source.as_ref();
          let local_source = source.and_then(|source| locator.locate(path, &source.value));
          for spec in &decl.specifiers {
            let exported = spec.exported.name();
            let export = match (source, local_source) {
              (None, _) => LocalExport::Binding(spec.local.name().to_string()),
              (Some(_), Some(source)) => {
                LocalExport::Reexport { source, imported: imported_name(&spec.local) }
              }
              (Some(source), None) => LocalExport::External {
                specifier: source.value.to_string(),
                imported: imported_name(&spec.local),
              },
            };
            table.add_export(exported.as_str(), export);
          }
        }
        Statement::ExportDefaultDeclaration(decl) => {
          let export = match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => func
              .id
              .as_ref()
              .map_or(LocalExport::Anonymous, |id| LocalExport::Binding(id.name.to_string())),
            ExportDefaultDeclarationKind::ClassDeclaration(class) => class
              .id
              .as_ref()
              .map_or(LocalExport::Anonymous, |id| LocalExport::Binding(id.name.to_string())),
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
              LocalExport::Binding(interface.id.name.to_string())
            }
            ExportDefaultDeclarationKind::Identifier(ident) => {
              LocalExport::Binding(ident.name.to_string())
            }
            _ => LocalExport::Anonymous,
          };
          table.add_export("default", export);
        }
        Statement::TSExportAssignment(assignment) => {
          if let Expression::Identifier(ident) = &assignment.expression {
            table.add_export("default", LocalExport::Binding(ident.name.to_string()));
          }
        }
        Statement::ExportAllDeclaration(decl) => {
          let source = locator.locate(path, &decl.source.value);
          match (&decl.exported, source) {
            (Some(exported), Some(source)) => table.add_export(
              exported.name().as_str(),
              LocalExport::Reexport { source, imported: ImportedName::Namespace },
            ),
            (Some(exported), None) => table.add_export(
              exported.name().as_str(),
              LocalExport::External {
                specifier: decl.source.value.to_string(),
                imported: ImportedName::Namespace,
              },
            ),
            (None, Some(source)) => table.star_exports.push(StarExport::Local(source)),
            (None, None) => {
              table.star_exports.push(StarExport::External(decl.source.value.to_string()));
            }
          }
        }
        _ => {}
      }
    }
    table
  }

  fn add_export(&mut self, exported: &str, export: LocalExport) {
    self.exports.entry(exported.to_string()).or_insert(export);
  }
}

/// Final target of an exported name, after following imports and re-exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedExport {
  Binding(String),
  External { specifier: String, imported: ImportedName },
  Namespace(UnitIdx),
  Anonymous,
}

enum Lookup {
  Found(ResolvedExport),
  /// Exported, but the chain behind it is not resolved yet.
  Pending,
  Missing,
}

/// Every exported name of an entry, `export *` expanded.
#[derive(Debug, Default)]
pub struct ExportSummary {
  /// `None` for names whose chain never resolved, e.g. a re-export cycle.
  pub named: FxIndexMap<String, Option<ResolvedExport>>,
  pub external_stars: Vec<String>,
}

/// Export tables of all units with every re-export chain resolved.
pub struct LinkTables {
  tables: IndexVec<UnitIdx, ExportTable>,
  resolved: IndexVec<UnitIdx, FxHashMap<String, ResolvedExport>>,
}

impl LinkTables {
  pub fn new(tables: IndexVec<UnitIdx, ExportTable>) -> Self {
    let resolved = tables.iter().map(|_| FxHashMap::default()).collect();
    let mut this = Self { tables, resolved };
    this.resolve();
    this
  }

  pub fn table(&self, idx: UnitIdx) -> &ExportTable {
    &self.tables[idx]
  }

  /// Each round settles at least one more link of every pending chain, so the number of
  /// files bounds the number of useful rounds.
  fn resolve(&mut self) {
    for _ in 0..=self.tables.len() {
      let mut settled = vec![];
      for (idx, table) in self.tables.iter_enumerated() {
        for (name, export) in &table.exports {
          if self.resolved[idx].contains_key(name) {
            continue;
          }
          if let Lookup::Found(target) = self.resolve_export(idx, export) {
            settled.push((idx, name.clone(), target));
          }
        }
      }
      if settled.is_empty() {
        break;
      }
      for (idx, name, target) in settled {
        self.resolved[idx].insert(name, target);
      }
    }
  }

  fn resolve_export(&self, idx: UnitIdx, export: &LocalExport) -> Lookup {
    match export {
      LocalExport::Binding(name) => match self.tables[idx].local_imports.get(name) {
        Some(import) => self.resolve_import_inner(import.source, &import.imported),
        None => Lookup::Found(ResolvedExport::Binding(name.clone())),
      },
      LocalExport::Reexport { source, imported } => self.resolve_import_inner(*source, imported),
      LocalExport::External { specifier, imported } => Lookup::Found(ResolvedExport::External {
        specifier: specifier.clone(),
        imported: imported.clone(),
      }),
      LocalExport::Anonymous => Lookup::Found(ResolvedExport::Anonymous),
    }
  }

  fn resolve_import_inner(&self, source: UnitIdx, imported: &ImportedName) -> Lookup {
    match imported {
      ImportedName::Namespace => Lookup::Found(ResolvedExport::Namespace(source)),
      ImportedName::Default => self.lookup(source, "default", &mut FxHashSet::default()),
      ImportedName::Named(name) => self.lookup(source, name, &mut FxHashSet::default()),
    }
  }

  fn lookup(&self, unit: UnitIdx, name: &str, visited: &mut FxHashSet<UnitIdx>) -> Lookup {
    if let Some(target) = self.resolved[unit].get(name) {
      return Lookup::Found(target.clone());
    }
    if self.tables[unit].exports.contains_key(name) {
      return Lookup::Pending;
    }
    // `export *` never forwards the default export.
    if name == "default" || !visited.insert(unit) {
      return Lookup::Missing;
    }

    let mut pending = false;
    let mut external_star = None;
    for star in &self.tables[unit].star_exports {
      match star {
        StarExport::Local(source) => match self.lookup(*source, name, visited) {
          found @ Lookup::Found(_) => return found,
          Lookup::Pending => pending = true,
          Lookup::Missing => {}
        },
        StarExport::External(specifier) => {
          external_star.get_or_insert(specifier);
        }
      }
    }

    match external_star {
      _ if pending => Lookup::Pending,
      Some(specifier) => Lookup::Found(ResolvedExport::External {
        specifier: specifier.clone(),
        imported: ImportedName::Named(name.to_string()),
      }),
      None => Lookup::Missing,
    }
  }

  /// Target of `import { <imported> } from '<source>'`, `None` when nothing is exported
  /// under that name.
  pub fn resolve_import(&self, source: UnitIdx, imported: &ImportedName) -> Option<ResolvedExport> {
    match self.resolve_import_inner(source, imported) {
      Lookup::Found(target) => Some(target),
      Lookup::Pending | Lookup::Missing => None,
    }
  }

  pub fn summarize(&self, unit: UnitIdx) -> ExportSummary {
    let mut summary = ExportSummary::default();
    self.summarize_into(unit, &mut summary, &mut FxHashSet::default(), true);
    summary
  }

  fn summarize_into(
    &self,
    unit: UnitIdx,
    summary: &mut ExportSummary,
    visited: &mut FxHashSet<UnitIdx>,
    include_default: bool,
  ) {
    if !visited.insert(unit) {
      return;
    }
    for name in self.tables[unit].exports.keys() {
      if (!include_default && name == "default") || summary.named.contains_key(name) {
        continue;
      }
      summary.named.insert(name.clone(), self.resolved[unit].get(name).cloned());
    }
    for star in &self.tables[unit].star_exports {
      match star {
        StarExport::Local(source) => self.summarize_into(*source, summary, visited, false),
        StarExport::External(specifier) => {
          if !summary.external_stars.contains(specifier) {
            summary.external_stars.push(specifier.clone());
          }
        }
      }
    }
  }
}
