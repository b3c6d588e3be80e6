use std::path::Path;

use dualpack_common::{ImportBinding, ImportedName};
use dualpack_ecmascript::{BindingPatternExt, EcmaCompiler, SourceEdits};
use dualpack_error::BuildResult;
use dualpack_utils::path_ext::PathExt;
use oxc::{
  ast::ast::{
    ArrayExpressionElement, BindingIdentifier, Class, ClassElement, Declaration, Expression,
    ImportDeclaration, ImportDeclarationSpecifier, ObjectPropertyKind, PropertyKey, Statement,
  },
  semantic::Scoping,
  span::{GetSpan, Span},
};

use super::{merge_imports::render_import, top_level_names::imported_name};

/// Drops unused imports and unused module-private declarations from the bundle.
///
/// Repeats until nothing changes, a removed function may leave its callees unused. Only
/// declarations without side effects are removed.
pub fn remove_unused(mut code: String, entry_path: &Path, cwd: &Path) -> BuildResult<String> {
  let display_path = entry_path.relative_display(cwd);
  loop {
    let ast = EcmaCompiler::parse_file(entry_path, &display_path, code.as_str())?;
    let scoping = ast.make_scoping();
    let mut edits = SourceEdits::default();
    for stmt in &ast.program().body {
      match stmt {
        Statement::ImportDeclaration(decl) => {
          remove_unused_specifiers(decl, &code, &scoping, &mut edits);
        }
        _ if is_removable(stmt, &scoping) => edits.remove(line_span(stmt.span(), &code)),
        _ => {}
      }
    }

    if edits.is_empty() {
      return Ok(code);
    }
    tracing::debug!("Removed {} unused statements or imports", edits.len());
    code = edits.apply(&code);
  }
}

fn is_unused(ident: &BindingIdentifier, scoping: &Scoping) -> bool {
  ident
    .symbol_id
    .get()
    .is_some_and(|symbol_id| scoping.get_resolved_reference_ids(symbol_id).is_empty())
}

fn remove_unused_specifiers(
  decl: &ImportDeclaration,
  source: &str,
  scoping: &Scoping,
  edits: &mut SourceEdits,
) {
  let Some(specifiers) = &decl.specifiers else { return };
  if specifiers.is_empty() {
    return;
  }
  let used = specifiers.iter().filter(|spec| !is_unused(spec.local(), scoping)).collect::<Vec<_>>();
  if used.len() == specifiers.len() {
    return;
  }
  if used.is_empty() {
    edits.remove(line_span(decl.span, source));
    return;
  }
  // Import attributes are kept verbatim, rendering them again is not worth it.
  if decl.with_clause.is_some() {
    return;
  }

  let statement_is_type = decl.import_kind.is_type();
  let bindings = used
    .into_iter()
    .map(|spec| match spec {
      ImportDeclarationSpecifier::ImportSpecifier(spec) => ImportBinding::new(
        imported_name(&spec.imported),
        spec.local.name.as_str(),
        spec.import_kind.is_type(),
      ),
      ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
        ImportBinding::new(ImportedName::Default, spec.local.name.as_str(), false)
      }
      ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
        ImportBinding::new(ImportedName::Namespace, spec.local.name.as_str(), false)
      }
    })
    .collect::<Vec<_>>();
  edits.replace(decl.span, render_import(&decl.source.value, &bindings, statement_is_type));
}

fn is_removable(stmt: &Statement, scoping: &Scoping) -> bool {
  let Some(declaration) = stmt.as_declaration() else { return false };
  match declaration {
    Declaration::FunctionDeclaration(func) => {
      func.id.as_ref().is_some_and(|id| is_unused(id, scoping))
    }
    Declaration::ClassDeclaration(class) => {
      is_class_side_effect_free(class) && class.id.as_ref().is_some_and(|id| is_unused(id, scoping))
    }
    Declaration::VariableDeclaration(var) => var.declarations.iter().all(|declarator| {
      declarator.init.as_ref().is_none_or(is_side_effect_free)
        && declarator.id.binding_identifiers().iter().all(|ident| is_unused(ident, scoping))
    }),
    _ => false,
  }
}

fn is_side_effect_free(expr: &Expression) -> bool {
  match expr.without_parentheses() {
    Expression::BooleanLiteral(_)
    | Expression::NullLiteral(_)
    | Expression::NumericLiteral(_)
    | Expression::BigIntLiteral(_)
    | Expression::StringLiteral(_)
    | Expression::RegExpLiteral(_)
    | Expression::Identifier(_)
    | Expression::ArrowFunctionExpression(_)
    | Expression::FunctionExpression(_) => true,
    Expression::TemplateLiteral(template) => template.expressions.is_empty(),
    Expression::ClassExpression(class) => is_class_side_effect_free(class),
    Expression::ArrayExpression(array) => array.elements.iter().all(|element| match element {
      ArrayExpressionElement::SpreadElement(_) => false,
      ArrayExpressionElement::Elision(_) => true,
      element => element.as_expression().is_some_and(is_side_effect_free),
    }),
    Expression::ObjectExpression(object) => object.properties.iter().all(|prop| match prop {
      ObjectPropertyKind::ObjectProperty(prop) => {
        !prop.computed && is_side_effect_free(&prop.value)
      }
      ObjectPropertyKind::SpreadProperty(_) => false,
    }),
    Expression::TSAsExpression(expr) => is_side_effect_free(&expr.expression),
    Expression::TSSatisfiesExpression(expr) => is_side_effect_free(&expr.expression),
    _ => false,
  }
}

/// Static blocks, static initializers, computed keys and `extends` run when the class is
/// defined.
fn is_class_side_effect_free(class: &Class) -> bool {
  let is_key_free = |key: &PropertyKey, computed: bool| {
    !computed || key.as_expression().is_some_and(is_side_effect_free)
  };
  class.decorators.is_empty()
    && class.super_class.as_ref().is_none_or(is_side_effect_free)
    && class.body.body.iter().all(|element| match element {
      ClassElement::StaticBlock(_) => false,
      ClassElement::MethodDefinition(method) => {
        method.decorators.is_empty() && is_key_free(&method.key, method.computed)
      }
      ClassElement::PropertyDefinition(prop) => {
        prop.decorators.is_empty()
          && is_key_free(&prop.key, prop.computed)
          && (!prop.r#static || prop.value.as_ref().is_none_or(is_side_effect_free))
      }
      ClassElement::AccessorProperty(prop) => {
        prop.decorators.is_empty()
          && is_key_free(&prop.key, prop.computed)
          && (!prop.r#static || prop.value.as_ref().is_none_or(is_side_effect_free))
      }
      ClassElement::TSIndexSignature(_) => true,
    })
}

/// The statement plus the line break following it.
fn line_span(span: Span, source: &str) -> Span {
  let rest = source.get(span.end as usize..).unwrap_or_default();
  Span::new(span.start, span.end + u32::from(rest.starts_with('\n')))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn clean(code: &str) -> String {
    remove_unused(code.to_string(), Path::new("/p/index.ts"), Path::new("/p")).unwrap()
  }

  #[test]
  fn removes_unused_chains() {
    assert_eq!(
      clean("function a() {}\nfunction b() { a(); }\nconst c = 1;\nexport const d = c;"),
      "const c = 1;\nexport const d = c;"
    );
  }

  #[test]
  fn keeps_side_effects() {
    let code = "const a = init();\nclass B {}\nnew B();";
    assert_eq!(clean(code), code);
  }

  #[test]
  fn keeps_classes_with_static_initialization() {
    let code = "class A {\n  static {\n    init();\n  }\n}\nclass B {\n  static x = init();\n}\nclass C {\n  static y = 1;\n  z = init();\n  m() {}\n}\nexport const d = 1;";
    assert_eq!(
      clean(code),
      "class A {\n  static {\n    init();\n  }\n}\nclass B {\n  static x = init();\n}\nexport const d = 1;"
    );
  }

  #[test]
  fn trims_import_specifiers() {
    assert_eq!(
      clean("import { a, b } from \"x\";\nimport c from \"y\";\nexport default a;"),
      "import { a } from \"x\";\nexport default a;"
    );
  }
}
