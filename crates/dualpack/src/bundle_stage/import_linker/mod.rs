mod export_table;

use dualpack_common::{ImportBinding, ImportedName, RenameRecord, SourceUnit, UnitIdx};
use dualpack_error::{BuildDiagnostic, BuildResult};
use oxc::{
  ast::ast::{ImportDeclaration, ImportDeclarationSpecifier, Statement},
  ast_visit::Visit,
  semantic::SymbolId,
};
use rustc_hash::FxHashMap;

pub use self::export_table::{ExportTable, LinkTables, LocalExport, ResolvedExport, StarExport};
use super::{
  BundleStage,
  merge_imports::render_import,
  reference_rewriter::{NamespaceMembers, ReferenceRewriter},
  top_level_names::imported_name,
};
use crate::utils::parse_unit::{ParsedUnit, parse_unit};

struct LinkedUnit {
  content: Option<String>,
  renames: Vec<RenameRecord>,
}

impl BundleStage<'_> {
  /// Points every import of a local module at the binding it finally resolves to.
  ///
  /// Aliases and default imports are renamed to the target binding, `ns.member` accesses
  /// are flattened and names re-exported from external modules are imported from there
  /// directly. Local import statements themselves stay until the stripping pass.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn link_imports(&mut self) -> BuildResult<LinkTables> {
    let cwd = &self.options.cwd;
    let tables = self.par_map_units(|idx, unit| {
      let parsed = parse_unit(unit, cwd)?;
      let commonjs = self.commonjs_units.contains(&idx);
      Ok(ExportTable::new(parsed.ast.program(), &unit.path, &self.locator, commonjs))
    })?;
    let tables = LinkTables::new(tables);

    let linked = self.par_map_units(|idx, unit| {
      if tables.table(idx).local_imports.is_empty() {
        return Ok(None);
      }
      let parsed = parse_unit(unit, cwd)?;
      self.link_unit(idx, unit, &parsed, &tables).map(Some)
    })?;

    let mut linked_count = 0;
    for (idx, linked) in linked.into_iter_enumerated() {
      let Some(linked) = linked else { continue };
      if let Some(content) = linked.content {
        self.units[idx].content = content;
        linked_count += 1;
      }
      self.renames.extend(linked.renames);
    }
    tracing::debug!("Linked imports of {linked_count} files");
    Ok(tables)
  }

  fn link_unit(
    &self,
    idx: UnitIdx,
    unit: &SourceUnit,
    parsed: &ParsedUnit,
    tables: &LinkTables,
  ) -> BuildResult<LinkedUnit> {
    let scoping = &parsed.scoping;
    let root_scope_id = scoping.root_scope_id();
    let mut renames = FxHashMap::<SymbolId, String>::default();
    let mut namespaces = FxHashMap::<SymbolId, NamespaceMembers>::default();
    let mut externals = FxHashMap::<&str, (String, ImportedName)>::default();
    let mut records = vec![];
    let mut errors = vec![];

    for (local, import) in &tables.table(idx).local_imports {
      let Some(symbol_id) = scoping.get_binding(root_scope_id, local) else { continue };
      let resolved = tables.resolve_import(import.source, &import.imported).or_else(|| {
        // `const lib = require("./lib")` of a file without `module.exports = ...`
        (import.imported == ImportedName::Default && self.commonjs_units.contains(&import.source))
          .then_some(ResolvedExport::Namespace(import.source))
      });

      match resolved {
        Some(ResolvedExport::Binding(binding)) => {
          // Already redirected by an earlier round when nothing refers to the alias anymore.
          if binding != *local && !scoping.get_resolved_reference_ids(symbol_id).is_empty() {
            renames.insert(symbol_id, binding.clone());
            records.push(RenameRecord {
              original_name: local.clone(),
              file: unit.path.clone(),
              synthetic_name: binding,
            });
          }
        }
        Some(ResolvedExport::Namespace(target)) => {
          namespaces.insert(symbol_id, self.namespace_members(tables, target));
        }
        Some(ResolvedExport::External { specifier, imported }) => {
          externals.insert(local.as_str(), (specifier, imported));
        }
        Some(ResolvedExport::Anonymous) => {}
        None if import.is_type => {}
        None => errors.push(BuildDiagnostic::MissingExport {
          name: match &import.imported {
            ImportedName::Named(name) => name.clone(),
            _ => "default".to_string(),
          },
          module: self.display_path(import.source),
          importer: parsed.display_path.clone(),
        }),
      }
    }

    let mut rewriter =
      ReferenceRewriter::new(scoping, &renames, &namespaces, &parsed.display_path);
    rewriter.visit_program(parsed.ast.program());
    errors.extend(rewriter.errors);
    if !errors.is_empty() {
      Err(errors)?;
    }

    let mut edits = rewriter.edits;
    if !externals.is_empty() {
      for stmt in &parsed.ast.program().body {
        let Statement::ImportDeclaration(decl) = stmt else { continue };
        if let Some(rebuilt) = rebuild_import(decl, &externals, &renames) {
          edits.replace(decl.span, rebuilt);
        }
      }
    }

    let content = (!edits.is_empty()).then(|| edits.apply(&unit.content));
    Ok(LinkedUnit { content, renames: records })
  }

  fn namespace_members(&self, tables: &LinkTables, target: UnitIdx) -> NamespaceMembers {
    let summary = tables.summarize(target);
    let members = summary
      .named
      .into_iter()
      .map(|(name, export)| {
        let binding = match export {
          Some(ResolvedExport::Binding(binding)) => Some(binding),
          _ => None,
        };
        (name, binding)
      })
      .collect();
    NamespaceMembers {
      module: self.display_path(target),
      members,
      has_external_stars: !summary.external_stars.is_empty(),
    }
  }
}

/// Splits an import of a local module whose bindings partly come from external modules.
/// Returns `None` when no binding of `decl` is external.
fn rebuild_import(
  decl: &ImportDeclaration,
  externals: &FxHashMap<&str, (String, ImportedName)>,
  renames: &FxHashMap<SymbolId, String>,
) -> Option<String> {
  let specifiers = decl.specifiers.as_ref()?;
  if !specifiers.iter().any(|spec| externals.contains_key(spec.local().name.as_str())) {
    return None;
  }

  let statement_is_type = decl.import_kind.is_type();
  let mut statements = vec![];
  let mut local_bindings = vec![];
  for spec in specifiers {
    let local = spec.local();
    let new_local = local
      .symbol_id
      .get()
      .and_then(|symbol_id| renames.get(&symbol_id))
      .map_or(local.name.as_str(), String::as_str);
    let is_type = statement_is_type
      || matches!(
        spec,
        ImportDeclarationSpecifier::ImportSpecifier(spec) if spec.import_kind.is_type()
      );

    if let Some((specifier, imported)) = externals.get(local.name.as_str()) {
      let binding = ImportBinding::new(imported.clone(), new_local, is_type);
      statements.push(render_import(specifier, &[binding], is_type));
      continue;
    }
    let imported = match spec {
      ImportDeclarationSpecifier::ImportSpecifier(spec) => imported_name(&spec.imported),
      ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => ImportedName::Default,
      ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => ImportedName::Namespace,
    };
    local_bindings.push(ImportBinding::new(imported, new_local, is_type));
  }

  let source = decl.source.value.as_str();
  let defaults_and_named = local_bindings
    .iter()
    .filter(|binding| binding.imported != ImportedName::Namespace)
    .cloned()
    .collect::<Vec<_>>();
  if !defaults_and_named.is_empty() {
    statements.push(render_import(source, &defaults_and_named, statement_is_type));
  }
  for binding in local_bindings.into_iter().filter(|b| b.imported == ImportedName::Namespace) {
    statements.push(render_import(source, &[binding], statement_is_type));
  }
  Some(statements.join("\n"))
}
