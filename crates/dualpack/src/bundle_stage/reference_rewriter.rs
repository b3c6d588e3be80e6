use dualpack_ecmascript::SourceEdits;
use dualpack_error::BuildDiagnostic;
use dualpack_utils::concat_string;
use oxc::{
  ast::ast::{
    AssignmentTargetPropertyIdentifier, BindingIdentifier, BindingPatternKind, BindingProperty,
    ExportSpecifier, Expression, IdentifierReference, ImportSpecifier, ModuleExportName,
    ObjectProperty, StaticMemberExpression, TSQualifiedName, TSTypeName,
  },
  ast_visit::{Visit, walk},
  semantic::{Scoping, SymbolId},
  span::{GetSpan, Span},
};
use rustc_hash::FxHashMap;

/// Exports of a local module reached through `import * as ns`.
#[derive(Debug, Default)]
pub struct NamespaceMembers {
  /// Display path of the module.
  pub module: String,
  /// `None` for members that are not a binding of the bundle, e.g. external re-exports.
  pub members: FxHashMap<String, Option<String>>,
  pub has_external_stars: bool,
}

/// Renames references of top-level symbols and flattens `ns.member` accesses.
///
/// Only identifiers resolving to one of the given symbols are touched, shadowing locals are
/// left alone.
pub struct ReferenceRewriter<'me> {
  scoping: &'me Scoping,
  renames: &'me FxHashMap<SymbolId, String>,
  namespaces: &'me FxHashMap<SymbolId, NamespaceMembers>,
  file: &'me str,
  pub edits: SourceEdits,
  pub errors: Vec<BuildDiagnostic>,
}

impl<'me> ReferenceRewriter<'me> {
  pub fn new(
    scoping: &'me Scoping,
    renames: &'me FxHashMap<SymbolId, String>,
    namespaces: &'me FxHashMap<SymbolId, NamespaceMembers>,
    file: &'me str,
  ) -> Self {
    Self { scoping, renames, namespaces, file, edits: SourceEdits::default(), errors: vec![] }
  }

  fn referenced_symbol(&self, ident: &IdentifierReference) -> Option<SymbolId> {
    let reference_id = ident.reference_id.get()?;
    self.scoping.get_reference(reference_id).symbol_id()
  }

  fn renamed_reference(&self, ident: &IdentifierReference) -> Option<&'me str> {
    let renames = self.renames;
    renames.get(&self.referenced_symbol(ident)?).map(String::as_str)
  }

  fn renamed_binding(&self, ident: &BindingIdentifier) -> Option<&'me str> {
    let renames = self.renames;
    renames.get(&ident.symbol_id.get()?).map(String::as_str)
  }

  /// Replaces `ns.member` spanning `span`. Returns false if `object` is not a local namespace.
  fn flatten_namespace_member(
    &mut self,
    object: &IdentifierReference,
    member: &str,
    span: Span,
  ) -> bool {
    let Some(namespace) = self.referenced_symbol(object).and_then(|id| self.namespaces.get(&id))
    else {
      return false;
    };

    match namespace.members.get(member) {
      Some(Some(binding)) => self.edits.replace(span, binding.as_str()),
      Some(None) => self.errors.push(self.unsupported_namespace_usage(object)),
      None if namespace.has_external_stars => {
        self.errors.push(self.unsupported_namespace_usage(object));
      }
      None => self.errors.push(BuildDiagnostic::MissingExport {
        name: member.to_string(),
        module: namespace.module.clone(),
        importer: self.file.to_string(),
      }),
    }
    true
  }

  fn unsupported_namespace_usage(&self, object: &IdentifierReference) -> BuildDiagnostic {
    BuildDiagnostic::UnsupportedNamespaceUsage {
      name: object.name.to_string(),
      file: self.file.to_string(),
    }
  }

  /// `{ foo }` to `{ foo: d_foo_1 }`, the key keeps its public name.
  fn expand_shorthand(&mut self, span: Span, key: &str, name: &str) {
    self.edits.replace(span, concat_string!(key, ": ", name));
  }
}

impl<'a> Visit<'a> for ReferenceRewriter<'_> {
  fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
    if let Some(name) = self.renamed_binding(ident) {
      self.edits.replace(ident.span, name);
    }
  }

  fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
    let Some(symbol_id) = self.referenced_symbol(ident) else { return };
    if let Some(name) = self.renames.get(&symbol_id) {
      self.edits.replace(ident.span, name.as_str());
    } else if self.namespaces.contains_key(&symbol_id) {
      self.errors.push(self.unsupported_namespace_usage(ident));
    }
  }

  fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
    if let Expression::Identifier(object) = &expr.object {
      if self.flatten_namespace_member(object, expr.property.name.as_str(), expr.span) {
        return;
      }
    }
    walk::walk_static_member_expression(self, expr);
  }

  fn visit_ts_qualified_name(&mut self, name: &TSQualifiedName<'a>) {
    if let TSTypeName::IdentifierReference(object) = &name.left {
      if self.flatten_namespace_member(object, name.right.name.as_str(), name.span) {
        return;
      }
    }
    walk::walk_ts_qualified_name(self, name);
  }

  fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
    if prop.shorthand {
      if let Expression::Identifier(ident) = &prop.value {
        if let Some(name) = self.renamed_reference(ident) {
          self.expand_shorthand(ident.span, ident.name.as_str(), name);
          return;
        }
      }
    }
    walk::walk_object_property(self, prop);
  }

  fn visit_binding_property(&mut self, prop: &BindingProperty<'a>) {
    if prop.shorthand {
      let (ident, default_value) = match &prop.value.kind {
        BindingPatternKind::BindingIdentifier(ident) => (Some(ident), None),
        BindingPatternKind::AssignmentPattern(pattern) => match &pattern.left.kind {
          BindingPatternKind::BindingIdentifier(ident) => (Some(ident), Some(&pattern.right)),
          _ => (None, None),
        },
        _ => (None, None),
      };
      if let Some(ident) = ident {
        if let Some(name) = self.renamed_binding(ident) {
          self.expand_shorthand(ident.span, ident.name.as_str(), name);
          if let Some(default_value) = default_value {
            self.visit_expression(default_value);
          }
          return;
        }
      }
    }
    walk::walk_binding_property(self, prop);
  }

  fn visit_assignment_target_property_identifier(
    &mut self,
    prop: &AssignmentTargetPropertyIdentifier<'a>,
  ) {
    if let Some(name) = self.renamed_reference(&prop.binding) {
      self.expand_shorthand(prop.binding.span, prop.binding.name.as_str(), name);
      if let Some(init) = &prop.init {
        self.visit_expression(init);
      }
      return;
    }
    walk::walk_assignment_target_property_identifier(self, prop);
  }

  fn visit_import_specifier(&mut self, spec: &ImportSpecifier<'a>) {
    let Some(name) = self.renamed_binding(&spec.local) else { return };
    if spec.imported.span() == spec.local.span {
      let imported = spec.imported.name();
      self.edits.replace(spec.local.span, concat_string!(imported.as_str(), " as ", name));
    } else {
      self.edits.replace(spec.local.span, name);
    }
  }

  fn visit_export_specifier(&mut self, spec: &ExportSpecifier<'a>) {
    let ModuleExportName::IdentifierReference(local) = &spec.local else { return };
    let Some(name) = self.renamed_reference(local) else { return };
    if spec.local.span() == spec.exported.span() {
      self.edits.replace(local.span, concat_string!(name, " as ", local.name.as_str()));
    } else {
      self.edits.replace(local.span, name);
    }
  }
}

#[cfg(test)]
mod tests {
  use dualpack_ecmascript::EcmaCompiler;
  use oxc::span::SourceType;

  use super::*;

  fn rename(source: &str, name: &str, to: &str) -> String {
    let ast = EcmaCompiler::parse("test.ts", source, SourceType::ts()).unwrap();
    let scoping = ast.make_scoping();
    let symbol_id = scoping.get_binding(scoping.root_scope_id(), name).unwrap();
    let renames = FxHashMap::from_iter([(symbol_id, to.to_string())]);
    let namespaces = FxHashMap::default();
    let mut rewriter = ReferenceRewriter::new(&scoping, &renames, &namespaces, "test.ts");
    rewriter.visit_program(ast.program());
    rewriter.edits.apply(source)
  }

  #[test]
  fn shadowed_locals_are_untouched() {
    assert_eq!(
      rename("const foo = 1;\nfunction f(foo: number) { return foo; }\nf(foo);", "foo", "d_foo_1"),
      "const d_foo_1 = 1;\nfunction f(foo: number) { return foo; }\nf(d_foo_1);"
    );
  }

  #[test]
  fn shorthand_keeps_the_key() {
    assert_eq!(
      rename("const foo = 1;\nconst o = { foo };\nexport { foo };", "foo", "d_foo_1"),
      "const d_foo_1 = 1;\nconst o = { foo: d_foo_1 };\nexport { d_foo_1 as foo };"
    );
  }

  #[test]
  fn import_specifier_keeps_the_imported_name() {
    assert_eq!(
      rename("import { join } from 'path';\njoin('a');", "join", "d_join_1"),
      "import { join as d_join_1 } from 'path';\nd_join_1('a');"
    );
  }

  #[test]
  fn types_are_renamed() {
    assert_eq!(
      rename("interface Options {}\nlet o: Options;", "Options", "d_Options_1"),
      "interface d_Options_1 {}\nlet o: d_Options_1;"
    );
  }
}
