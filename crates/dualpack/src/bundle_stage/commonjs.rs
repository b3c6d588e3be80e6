//! Shapes of CommonJS syntax the bundler understands in CommonJS-authored files.

use oxc::ast::ast::{
  AssignmentTarget, BindingPatternKind, Expression, ObjectExpression, ObjectPropertyKind,
  PropertyKey, Statement, StringLiteral, VariableDeclaration,
};

/// `require("<specifier>")` with a single string argument.
pub fn require_call<'a, 'ast>(expr: &'a Expression<'ast>) -> Option<&'a StringLiteral<'ast>> {
  let Expression::CallExpression(call) = expr.without_parentheses() else { return None };
  let Expression::Identifier(callee) = &call.callee else { return None };
  if callee.name.as_str() != "require" {
    return None;
  }
  match call.arguments.as_slice() {
    [argument] => match argument.as_expression()? {
      Expression::StringLiteral(request) => Some(request),
      _ => None,
    },
    _ => None,
  }
}

/// A `const x = require("y")` or `const { a, b: c } = require("y")` declaration.
pub struct RequireDeclaration<'a, 'ast> {
  pub specifier: &'a StringLiteral<'ast>,
  pub bindings: RequireBindings,
}

pub enum RequireBindings {
  /// `const x = require("y")`
  Whole(String),
  /// `(imported, local)` pairs of `const { a, b: c } = require("y")`.
  Destructured(Vec<(String, String)>),
}

pub fn require_declaration<'a, 'ast>(
  decl: &'a VariableDeclaration<'ast>,
) -> Option<RequireDeclaration<'a, 'ast>> {
  let [declarator] = decl.declarations.as_slice() else { return None };
  let specifier = require_call(declarator.init.as_ref()?)?;
  let bindings = match &declarator.id.kind {
    BindingPatternKind::BindingIdentifier(ident) => RequireBindings::Whole(ident.name.to_string()),
    BindingPatternKind::ObjectPattern(pattern) if pattern.rest.is_none() => {
      let mut pairs = vec![];
      for prop in &pattern.properties {
        let imported = prop.key.static_name()?;
        let BindingPatternKind::BindingIdentifier(local) = &prop.value.kind else { return None };
        pairs.push((imported.to_string(), local.name.to_string()));
      }
      RequireBindings::Destructured(pairs)
    }
    _ => return None,
  };
  Some(RequireDeclaration { specifier, bindings })
}

pub enum CommonJsExport<'a, 'ast> {
  /// `module.exports = foo`
  Identifier(&'a str),
  /// `module.exports = { a, b }`, shorthand properties only.
  Shorthands(Vec<&'a str>),
  /// `exports.name = <value>` or `module.exports.name = <value>`.
  Named { name: &'a str, value: &'a Expression<'ast> },
}

pub fn commonjs_export<'a, 'ast>(stmt: &'a Statement<'ast>) -> Option<CommonJsExport<'a, 'ast>> {
  let Statement::ExpressionStatement(stmt) = stmt else { return None };
  let Expression::AssignmentExpression(assignment) = &stmt.expression else { return None };
  let AssignmentTarget::StaticMemberExpression(target) = &assignment.left else { return None };

  if is_module_exports(&target.object) {
    return Some(CommonJsExport::Named {
      name: target.property.name.as_str(),
      value: &assignment.right,
    });
  }
  match &target.object {
    Expression::Identifier(ident) if ident.name.as_str() == "exports" => {
      Some(CommonJsExport::Named { name: target.property.name.as_str(), value: &assignment.right })
    }
    Expression::Identifier(ident)
      if ident.name.as_str() == "module" && target.property.name.as_str() == "exports" =>
    {
      match &assignment.right {
        Expression::Identifier(value) => Some(CommonJsExport::Identifier(value.name.as_str())),
        Expression::ObjectExpression(object) => {
          shorthand_names(object).map(CommonJsExport::Shorthands)
        }
        _ => None,
      }
    }
    _ => None,
  }
}

fn is_module_exports(expr: &Expression) -> bool {
  let Expression::StaticMemberExpression(member) = expr else { return false };
  matches!(&member.object, Expression::Identifier(ident) if ident.name.as_str() == "module")
    && member.property.name.as_str() == "exports"
}

fn shorthand_names<'a>(object: &'a ObjectExpression) -> Option<Vec<&'a str>> {
  object
    .properties
    .iter()
    .map(|prop| match prop {
      ObjectPropertyKind::ObjectProperty(prop) if prop.shorthand => match &prop.key {
        PropertyKey::StaticIdentifier(key) => Some(key.name.as_str()),
        _ => None,
      },
      _ => None,
    })
    .collect()
}
