use oxc::{
  ast::ast::{
    CallExpression, Expression, ImportExpression, ModuleDeclaration, Program, Statement,
    StaticMemberExpression, TSModuleReference,
  },
  ast_visit::{Visit, walk},
  semantic::Scoping,
};

/// Finds the module specifiers a file depends on and whether it is written as CommonJS.
pub struct ModuleScanner<'me> {
  scoping: &'me Scoping,
  /// Static specifiers in source order, duplicates included.
  pub specifiers: Vec<String>,
  pub dynamic_imports: Vec<String>,
  has_module_syntax: bool,
  has_commonjs_syntax: bool,
}

impl<'me> ModuleScanner<'me> {
  pub fn new(scoping: &'me Scoping) -> Self {
    Self {
      scoping,
      specifiers: vec![],
      dynamic_imports: vec![],
      has_module_syntax: false,
      has_commonjs_syntax: false,
    }
  }

  /// `require`/`module.exports`/`exports.x` without a single `import` or `export`.
  pub fn is_commonjs(&self) -> bool {
    self.has_commonjs_syntax && !self.has_module_syntax
  }

  fn is_global_reference(&self, expr: &Expression, name: &str) -> bool {
    let Expression::Identifier(ident) = expr else { return false };
    ident.name.as_str() == name
      && ident
        .reference_id
        .get()
        .is_none_or(|reference_id| self.scoping.get_reference(reference_id).symbol_id().is_none())
  }

  fn scan_module_declaration(&mut self, decl: &ModuleDeclaration) {
    self.has_module_syntax = true;
    let source = match decl {
      ModuleDeclaration::ImportDeclaration(decl) => Some(&decl.source),
      ModuleDeclaration::ExportNamedDeclaration(decl) => decl.source.as_ref(),
      ModuleDeclaration::ExportAllDeclaration(decl) => Some(&decl.source),
      _ => None,
    };
    if let Some(source) = source {
      self.specifiers.push(source.value.to_string());
    }
  }
}

impl<'a> Visit<'a> for ModuleScanner<'_> {
  fn visit_program(&mut self, program: &Program<'a>) {
    for stmt in &program.body {
      if let Some(decl) = stmt.as_module_declaration() {
        self.scan_module_declaration(decl);
      }
      if let Statement::TSImportEqualsDeclaration(decl) = stmt {
        if let TSModuleReference::ExternalModuleReference(reference) = &decl.module_reference {
          self.has_module_syntax = true;
          self.specifiers.push(reference.expression.value.to_string());
        }
      }
    }
    walk::walk_program(self, program);
  }

  fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
    if self.is_global_reference(&expr.callee, "require") {
      self.has_commonjs_syntax = true;
      if let [argument] = expr.arguments.as_slice() {
        if let Some(Expression::StringLiteral(request)) = argument.as_expression() {
          self.specifiers.push(request.value.to_string());
        }
      }
    }
    walk::walk_call_expression(self, expr);
  }

  fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
    let module_exports =
      self.is_global_reference(&expr.object, "module") && expr.property.name.as_str() == "exports";
    if module_exports || self.is_global_reference(&expr.object, "exports")
    {
      self.has_commonjs_syntax = true;
    }
    walk::walk_static_member_expression(self, expr);
  }

  fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
    if let Expression::StringLiteral(request) = &expr.source {
      self.dynamic_imports.push(request.value.to_string());
    }
    walk::walk_import_expression(self, expr);
  }
}

#[cfg(test)]
mod tests {
  use dualpack_ecmascript::EcmaCompiler;
  use oxc::span::SourceType;

  use super::*;

  fn scan(source: &str) -> (Vec<String>, bool) {
    let ast = EcmaCompiler::parse("test.ts", source, SourceType::ts()).unwrap();
    let scoping = ast.make_scoping();
    let mut scanner = ModuleScanner::new(&scoping);
    scanner.visit_program(ast.program());
    let is_commonjs = scanner.is_commonjs();
    (scanner.specifiers, is_commonjs)
  }

  #[test]
  fn static_specifiers_in_order() {
    let (specifiers, is_commonjs) = scan(
      "import { a } from './a';\nimport type { B } from './b';\nexport * from 'pkg';\nimport fs = require('fs');\nexport { c } from './c';",
    );
    assert_eq!(specifiers, ["./a", "./b", "pkg", "fs", "./c"]);
    assert!(!is_commonjs);
  }

  #[test]
  fn detects_commonjs() {
    let (specifiers, is_commonjs) = scan("const path = require('path');\nmodule.exports = path;");
    assert_eq!(specifiers, ["path"]);
    assert!(is_commonjs);
  }

  #[test]
  fn local_require_binding_is_not_commonjs() {
    let (_, is_commonjs) = scan("function require(id: string) { return id; }\nrequire('x');");
    assert!(!is_commonjs);
  }
}
