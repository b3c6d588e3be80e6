use std::mem;

use dualpack_common::{
  ExportSurface, ImportBinding, ImportRecord, ImportedName, SourceUnit, UnitIdx,
};
use dualpack_ecmascript::SourceEdits;
use dualpack_error::{BuildDiagnostic, BuildResult};
use dualpack_utils::{
  concat_string,
  ecmascript::{quote_string, to_module_import_export_name},
};
use oxc::{
  ast::ast::{
    ExportAllDeclaration, ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression,
    IdentifierReference, ImportDeclaration, ImportDeclarationSpecifier, ModuleExportName,
    Statement, StaticMemberExpression, TSImportEqualsDeclaration, TSModuleReference,
    TSQualifiedName, TSTypeName, VariableDeclaration,
  },
  ast_visit::{Visit, walk},
  semantic::{Scoping, SymbolId},
  span::{GetSpan, Span},
};
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use super::{
  BundleStage,
  commonjs::{CommonJsExport, RequireBindings, commonjs_export, require_declaration},
  import_linker::{LinkTables, ResolvedExport},
  top_level_names::imported_name,
};
use crate::utils::parse_unit::{ParsedUnit, parse_unit};

#[derive(Debug)]
pub struct StrippedUnit {
  pub content: String,
  /// External imports removed from the file.
  pub records: Vec<ImportRecord>,
  /// Only set for the entry.
  pub export_surface: Option<ExportSurface>,
}

impl BundleStage<'_> {
  /// Removes every import, and every export outside of the entry, capturing external
  /// imports as records for the merged import block.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn strip_modules(&self, tables: &LinkTables) -> BuildResult<IndexVec<UnitIdx, StrippedUnit>> {
    let cwd = &self.options.cwd;
    let stripped = self.par_map_units(|idx, unit| {
      let parsed = parse_unit(unit, cwd)?;
      let mut stripper = Stripper::new(self, tables, idx, unit, &parsed);
      stripper.strip()?;
      Ok(stripper.finish())
    })?;
    tracing::debug!(
      "Captured {} external import statements",
      stripped.iter().map(|unit| unit.records.len()).sum::<usize>()
    );
    Ok(stripped)
  }
}

struct Stripper<'me> {
  stage: &'me BundleStage<'me>,
  tables: &'me LinkTables,
  idx: UnitIdx,
  unit: &'me SourceUnit,
  parsed: &'me ParsedUnit,
  is_entry: bool,
  is_commonjs: bool,
  edits: SourceEdits,
  records: Vec<ImportRecord>,
  /// Names already re-exported by an expanded `export *` of the entry.
  star_names: FxHashSet<String>,
  errors: Vec<BuildDiagnostic>,
}

impl<'me> Stripper<'me> {
  fn new(
    stage: &'me BundleStage<'me>,
    tables: &'me LinkTables,
    idx: UnitIdx,
    unit: &'me SourceUnit,
    parsed: &'me ParsedUnit,
  ) -> Self {
    Self {
      stage,
      tables,
      idx,
      unit,
      parsed,
      is_entry: idx == stage.entry,
      is_commonjs: stage.commonjs_units.contains(&idx),
      edits: SourceEdits::default(),
      records: vec![],
      star_names: FxHashSet::default(),
      errors: vec![],
    }
  }

  fn strip(&mut self) -> BuildResult<()> {
    let program = self.parsed.ast.program();
    let bare_uses = NamespaceUses::bare_uses(program, &self.parsed.scoping);

    for stmt in &program.body {
      match stmt {
        Statement::ImportDeclaration(decl) => self.strip_import(decl),
        Statement::TSImportEqualsDeclaration(decl) => self.strip_import_equals(decl, &bare_uses),
        Statement::VariableDeclaration(decl) if self.is_commonjs => self.strip_require(decl),
        Statement::ExpressionStatement(_) if self.is_commonjs => self.strip_commonjs_export(stmt),
        _ if self.is_entry => self.rewrite_entry_export(stmt),
        _ => self.remove_export(stmt),
      }
    }

    if !self.errors.is_empty() {
      Err(mem::take(&mut self.errors))?;
    }
    Ok(())
  }

  fn finish(self) -> StrippedUnit {
    let export_surface = self.is_entry.then(|| {
      let summary = self.tables.summarize(self.idx);
      ExportSurface {
        named: summary.named.keys().filter(|name| *name != "default").cloned().collect(),
        has_default: summary.named.contains_key("default"),
      }
    });
    StrippedUnit {
      content: self.edits.apply(&self.unit.content),
      records: self.records,
      export_surface,
    }
  }

  fn is_local(&self, specifier: &str) -> bool {
    self.stage.locator.is_local(&self.unit.path, specifier)
  }

  /// The statement plus the line break following it.
  fn statement_span(&self, span: Span) -> Span {
    let rest = self.unit.content.get(span.end as usize..).unwrap_or_default();
    let line_break = if rest.starts_with("\r\n") {
      2
    } else {
      u32::from(rest.starts_with('\n'))
    };
    Span::new(span.start, span.end + line_break)
  }

  fn remove_statement(&mut self, span: Span) {
    let span = self.statement_span(span);
    self.edits.remove(span);
  }

  fn strip_import(&mut self, decl: &ImportDeclaration) {
    self.remove_statement(decl.span);
    let specifier = decl.source.value.as_str();
    if self.is_local(specifier) {
      return;
    }

    let mut record = ImportRecord::new(specifier, self.unit.path.clone());
    record.attributes = decl
      .with_clause
      .as_ref()
      .map(|clause| clause.span.source_text(&self.unit.content).to_string());
    let statement_is_type = decl.import_kind.is_type();
    for spec in decl.specifiers.iter().flatten() {
      let binding = match spec {
        ImportDeclarationSpecifier::ImportSpecifier(spec) => ImportBinding::new(
          imported_name(&spec.imported),
          spec.local.name.as_str(),
          statement_is_type || spec.import_kind.is_type(),
        ),
        ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
          ImportBinding::new(ImportedName::Default, spec.local.name.as_str(), statement_is_type)
        }
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
          ImportBinding::new(ImportedName::Namespace, spec.local.name.as_str(), statement_is_type)
        }
      };
      record.bindings.push(binding);
    }
    self.records.push(record);
  }

  /// `import x = require("y")` becomes `import * as x from "y"` when `x` is only used for
  /// member access, `import x from "y"` otherwise. Type-only ones and modules listed in
  /// `preserveNamespaces` always stay namespaces.
  fn strip_import_equals(
    &mut self,
    decl: &TSImportEqualsDeclaration,
    bare_uses: &FxHashSet<SymbolId>,
  ) {
    let TSModuleReference::ExternalModuleReference(reference) = &decl.module_reference else {
      return;
    };
    self.remove_statement(decl.span);
    let specifier = reference.expression.value.as_str();
    if self.is_local(specifier) {
      return;
    }

    let is_type = decl.import_kind.is_type();
    let is_namespace = is_type
      || self.stage.options.preserve_namespaces.iter().any(|preserved| preserved == specifier)
      || decl.id.symbol_id.get().is_none_or(|symbol_id| !bare_uses.contains(&symbol_id));
    let imported = if is_namespace { ImportedName::Namespace } else { ImportedName::Default };
    let record = ImportRecord::new(specifier, self.unit.path.clone())
      .with_binding(ImportBinding::new(imported, decl.id.name.as_str(), is_type));
    self.records.push(record);
  }

  fn strip_require(&mut self, decl: &VariableDeclaration) {
    let Some(require) = require_declaration(decl) else { return };
    self.remove_statement(decl.span);
    let specifier = require.specifier.value.as_str();
    if self.is_local(specifier) {
      return;
    }

    let mut record = ImportRecord::new(specifier, self.unit.path.clone());
    match require.bindings {
      RequireBindings::Whole(local) => {
        record.bindings.push(ImportBinding::new(ImportedName::Default, local, false));
      }
      RequireBindings::Destructured(pairs) => {
        for (imported, local) in pairs {
          record.bindings.push(ImportBinding::new(ImportedName::Named(imported), local, false));
        }
      }
    }
    self.records.push(record);
  }

  fn strip_commonjs_export(&mut self, stmt: &Statement) {
    let Some(export) = commonjs_export(stmt) else { return };
    let replacement = match export {
      CommonJsExport::Identifier(name) => {
        self.is_entry.then(|| concat_string!("export default ", name, ";"))
      }
      CommonJsExport::Shorthands(names) => {
        self.is_entry.then(|| concat_string!("export { ", names.join(", "), " };"))
      }
      CommonJsExport::Named { name, .. } if name == "default" => return,
      CommonJsExport::Named { name, value } => {
        let declaration = match value {
          Expression::Identifier(ident) if ident.name.as_str() == name => None,
          _ => Some(concat_string!(
            "var ",
            name,
            " = ",
            value.span().source_text(&self.unit.content),
            ";"
          )),
        };
        let export = self.is_entry.then(|| concat_string!("export { ", name, " };"));
        let parts = declaration.into_iter().chain(export).collect::<Vec<_>>();
        (!parts.is_empty()).then(|| parts.join("\n"))
      }
    };
    match replacement {
      Some(replacement) => self.edits.replace(stmt.span(), replacement),
      None => self.remove_statement(stmt.span()),
    }
  }

  /// Declarations lose their `export`/`export default` prefix, export lists disappear.
  /// Declarations inside namespaces keep their modifiers.
  fn remove_export(&mut self, stmt: &Statement) {
    match stmt {
      Statement::ExportNamedDeclaration(decl) => match &decl.declaration {
        Some(declaration) => {
          self.edits.remove(Span::new(decl.span.start, declaration.span().start));
        }
        None => self.remove_statement(decl.span),
      },
      Statement::ExportDefaultDeclaration(decl) => {
        let declaration_start = match &decl.declaration {
          ExportDefaultDeclarationKind::FunctionDeclaration(func) => Some(func.span.start),
          ExportDefaultDeclarationKind::ClassDeclaration(class) => Some(class.span.start),
          ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
            Some(interface.span.start)
          }
          // `export default foo;`, expressions were hoisted into a `const` already.
          _ => None,
        };
        match declaration_start {
          Some(start) => self.edits.remove(Span::new(decl.span.start, start)),
          None => self.remove_statement(decl.span),
        }
      }
      Statement::ExportAllDeclaration(_)
      | Statement::TSExportAssignment(_)
      | Statement::TSNamespaceExportDeclaration(_) => self.remove_statement(stmt.span()),
      _ => {}
    }
  }

  fn rewrite_entry_export(&mut self, stmt: &Statement) {
    match stmt {
      Statement::ExportNamedDeclaration(decl) => match &decl.source {
        Some(source) => {
          if let Some(target) = self.stage.locator.locate(&self.unit.path, &source.value) {
            self.rewrite_local_reexport(decl, target, source.value.as_str());
          }
        }
        None if decl.declaration.is_none() => self.check_namespace_exports(decl),
        None => {}
      },
      Statement::ExportAllDeclaration(decl) => {
        let Some(target) = self.stage.locator.locate(&self.unit.path, &decl.source.value) else {
          return;
        };
        match &decl.exported {
          Some(exported) => self.errors.push(BuildDiagnostic::UnsupportedNamespaceReexport {
            name: exported.name().to_string(),
            specifier: decl.source.value.to_string(),
            file: self.parsed.display_path.clone(),
          }),
          None => self.expand_star_export(decl, target),
        }
      }
      _ => {}
    }
  }

  /// `export { a, b as c } from "./x"` to `export { a, d_b_1 as c };`.
  fn rewrite_local_reexport(
    &mut self,
    decl: &ExportNamedDeclaration,
    target: UnitIdx,
    specifier: &str,
  ) {
    let statement_is_type = decl.export_kind.is_type();
    let mut locals = vec![];
    let mut externals = vec![];
    for spec in &decl.specifiers {
      let exported = spec.exported.name();
      let is_type = statement_is_type || spec.export_kind.is_type();
      let imported = imported_name(&spec.local);
      match self.tables.resolve_import(target, &imported) {
        Some(ResolvedExport::Binding(binding)) => {
          let marker = is_type && !statement_is_type;
          locals.push(render_export_specifier(&binding, exported.as_str(), marker));
        }
        Some(ResolvedExport::External { specifier, imported }) => {
          let rendered =
            render_external_reexport(&specifier, &imported, exported.as_str(), is_type);
          externals.push(rendered);
        }
        Some(ResolvedExport::Namespace(_)) => {
          self.errors.push(BuildDiagnostic::UnsupportedNamespaceReexport {
            name: exported.to_string(),
            specifier: specifier.to_string(),
            file: self.parsed.display_path.clone(),
          });
        }
        _ if is_type => {}
        _ => self.errors.push(BuildDiagnostic::MissingExport {
          name: spec.local.name().to_string(),
          module: self.stage.display_path(target),
          importer: self.parsed.display_path.clone(),
        }),
      }
    }

    let mut statements = vec![];
    if !locals.is_empty() {
      let head = if statement_is_type { "export type { " } else { "export { " };
      statements.push(concat_string!(head, locals.join(", "), " };"));
    }
    statements.extend(externals);
    if statements.is_empty() {
      self.remove_statement(decl.span);
    } else {
      self.edits.replace(decl.span, statements.join("\n"));
    }
  }

  /// `export * from "./x"` to an explicit list. Names the entry exports itself, `default`
  /// and names of earlier `export *` statements are skipped.
  fn expand_star_export(&mut self, decl: &ExportAllDeclaration, target: UnitIdx) {
    let explicit = &self.tables.table(self.idx).exports;
    let summary = self.tables.summarize(target);
    let mut locals = vec![];
    let mut externals = vec![];
    for (name, export) in summary.named {
      if name == "default"
        || explicit.contains_key(&name)
        || !self.star_names.insert(name.clone())
      {
        continue;
      }
      match export {
        Some(ResolvedExport::Binding(binding)) => {
          locals.push(render_export_specifier(&binding, &name, false));
        }
        Some(ResolvedExport::External { specifier, imported }) => {
          externals.push(render_external_reexport(&specifier, &imported, &name, false));
        }
        Some(ResolvedExport::Namespace(_)) => {
          self.errors.push(BuildDiagnostic::UnsupportedNamespaceReexport {
            name,
            specifier: decl.source.value.to_string(),
            file: self.parsed.display_path.clone(),
          });
        }
        Some(ResolvedExport::Anonymous) | None => {}
      }
    }
    for specifier in summary.external_stars {
      if self.star_names.insert(concat_string!("*", specifier)) {
        externals.push(concat_string!("export * from ", quote_string(&specifier), ";"));
      }
    }

    let mut statements = vec![];
    if !locals.is_empty() {
      statements.push(concat_string!("export { ", locals.join(", "), " };"));
    }
    statements.extend(externals);
    if statements.is_empty() {
      self.remove_statement(decl.span);
    } else {
      self.edits.replace(decl.span, statements.join("\n"));
    }
  }

  /// `import * as ns from "./x"; export { ns };` cannot be expressed once files are flattened.
  fn check_namespace_exports(&mut self, decl: &ExportNamedDeclaration) {
    let local_imports = &self.tables.table(self.idx).local_imports;
    for spec in &decl.specifiers {
      let ModuleExportName::IdentifierReference(local) = &spec.local else { continue };
      let Some(import) = local_imports.get(local.name.as_str()) else { continue };
      if let Some(ResolvedExport::Namespace(target)) =
        self.tables.resolve_import(import.source, &import.imported)
      {
        self.errors.push(BuildDiagnostic::UnsupportedNamespaceReexport {
          name: spec.exported.name().to_string(),
          specifier: self.stage.display_path(target),
          file: self.parsed.display_path.clone(),
        });
      }
    }
  }
}

fn render_export_specifier(local: &str, exported: &str, type_marker: bool) -> String {
  let marker = if type_marker { "type " } else { "" };
  if local == exported {
    concat_string!(marker, local)
  } else {
    concat_string!(marker, local, " as ", to_module_import_export_name(exported))
  }
}

fn render_external_reexport(
  specifier: &str,
  imported: &ImportedName,
  exported: &str,
  is_type: bool,
) -> String {
  let head = if is_type { "export type " } else { "export " };
  let exported = to_module_import_export_name(exported);
  let clause = match imported {
    ImportedName::Namespace => concat_string!("* as ", exported),
    ImportedName::Default if exported == "default" => "{ default }".to_string(),
    ImportedName::Default => concat_string!("{ default as ", exported, " }"),
    ImportedName::Named(name) if *name == exported => concat_string!("{ ", exported, " }"),
    ImportedName::Named(name) => {
      concat_string!("{ ", to_module_import_export_name(name), " as ", exported, " }")
    }
  };
  concat_string!(head, clause, " from ", quote_string(specifier), ";")
}

/// Finds the symbols used other than as `x.member` or `x.Type`.
struct NamespaceUses<'me> {
  scoping: &'me Scoping,
  bare: FxHashSet<SymbolId>,
}

impl<'me> NamespaceUses<'me> {
  fn bare_uses(program: &oxc::ast::ast::Program, scoping: &'me Scoping) -> FxHashSet<SymbolId> {
    let mut uses = Self { scoping, bare: FxHashSet::default() };
    uses.visit_program(program);
    uses.bare
  }

  fn is_symbol_reference(&self, ident: &IdentifierReference) -> bool {
    ident
      .reference_id
      .get()
      .and_then(|reference_id| self.scoping.get_reference(reference_id).symbol_id())
      .is_some()
  }
}

impl<'a> Visit<'a> for NamespaceUses<'_> {
  fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
    let symbol_id = ident
      .reference_id
      .get()
      .and_then(|reference_id| self.scoping.get_reference(reference_id).symbol_id());
    if let Some(symbol_id) = symbol_id {
      self.bare.insert(symbol_id);
    }
  }

  fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
    if let Expression::Identifier(object) = &expr.object {
      if self.is_symbol_reference(object) {
        return;
      }
    }
    walk::walk_static_member_expression(self, expr);
  }

  fn visit_ts_qualified_name(&mut self, name: &TSQualifiedName<'a>) {
    if let TSTypeName::IdentifierReference(object) = &name.left {
      if self.is_symbol_reference(object) {
        return;
      }
    }
    walk::walk_ts_qualified_name(self, name);
  }
}

#[cfg(test)]
mod tests {
  use dualpack_ecmascript::EcmaCompiler;
  use oxc::span::SourceType;

  use super::*;

  fn bare_names(source: &str) -> Vec<String> {
    let ast = EcmaCompiler::parse("test.ts", source, SourceType::ts()).unwrap();
    let scoping = ast.make_scoping();
    let bare = NamespaceUses::bare_uses(ast.program(), &scoping);
    let mut names = bare
      .into_iter()
      .map(|symbol_id| scoping.symbol_name(symbol_id).to_string())
      .collect::<Vec<_>>();
    names.sort();
    names
  }

  #[test]
  fn member_access_is_not_a_bare_use() {
    assert_eq!(
      bare_names(
        "import ts = require('typescript');\nimport express = require('express');\nts.createSourceFile();\nlet node: ts.Node;\nexpress();"
      ),
      ["express"]
    );
  }

  #[test]
  fn renders_external_reexports() {
    assert_eq!(
      render_external_reexport("lodash", &ImportedName::Named("map".into()), "map", false),
      "export { map } from \"lodash\";"
    );
    assert_eq!(
      render_external_reexport("lodash", &ImportedName::Default, "lodash", false),
      "export { default as lodash } from \"lodash\";"
    );
    assert_eq!(
      render_external_reexport("./types", &ImportedName::Namespace, "types", true),
      "export type * as types from \"./types\";"
    );
  }
}
