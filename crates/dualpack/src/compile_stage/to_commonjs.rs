use dualpack_common::{ExportSurface, ImportedName};
use dualpack_ecmascript::{EcmaCompiler, SourceEdits, StatementExt};
use dualpack_error::BuildResult;
use dualpack_utils::{
  concat_string,
  ecmascript::{is_validate_identifier_name, quote_string},
};
use oxc::{
  ast::ast::{
    ExportDefaultDeclarationKind, ImportDeclaration, ImportDeclarationSpecifier, ModuleExportName,
    Statement,
  },
  span::{GetSpan, SourceType, Span},
};

use super::render_exports::{
  ES_MODULE_MARKER, EXPORT_STAR_HELPER, INTEROP_DEFAULT_HELPER, render_object_define_property,
  render_require,
};

const DEFAULT_BINDING: &str = "__dualpack_default";

fn property_access(object: &str, key: &str) -> String {
  if is_validate_identifier_name(key) {
    concat_string!(object, ".", key)
  } else {
    concat_string!(object, "[", quote_string(key), "]")
  }
}

fn property_key(key: &str) -> String {
  if is_validate_identifier_name(key) { key.to_string() } else { quote_string(key) }
}

fn imported_name(name: &ModuleExportName) -> ImportedName {
  match name.name().as_str() {
    "default" => ImportedName::Default,
    name => ImportedName::Named(name.to_string()),
  }
}

pub struct CommonJsOutput {
  pub code: String,
  /// The default export became `module.exports` itself.
  pub is_export_assignment: bool,
}

/// Rewrites the ES module output of the compiler into CommonJS.
///
/// Statements are replaced on their own line and the exports are appended, so the source map
/// of the ES module output still holds for every original line.
pub fn to_commonjs(
  code: &str,
  filename: &str,
  surface: &ExportSurface,
) -> BuildResult<CommonJsOutput> {
  let ast = EcmaCompiler::parse(filename, code, SourceType::mjs())?;
  let mut edits = SourceEdits::default();
  let mut exports = Vec::<(String, String)>::new();
  let mut star_exports = vec![];
  let mut uses_interop = false;

  for stmt in &ast.program().body {
    match stmt {
      Statement::ImportDeclaration(decl) => {
        edits.replace(decl.span, render_import_requires(decl, &mut uses_interop));
      }
      Statement::ExportNamedDeclaration(decl) => {
        if let Some(declaration) = &decl.declaration {
          edits.remove(Span::new(decl.span.start, declaration.span().start));
          for ident in stmt.declared_names() {
            exports.push((ident.name.to_string(), ident.name.to_string()));
          }
          continue;
        }
        let Some(source) = &decl.source else {
          for spec in &decl.specifiers {
            exports.push((spec.exported.name().to_string(), spec.local.name().to_string()));
          }
          edits.remove(decl.span);
          continue;
        };
        let require = render_require(&source.value);
        for spec in &decl.specifiers {
          let value = match imported_name(&spec.local) {
            ImportedName::Named(name) => property_access(&require, &name),
            _ => {
              uses_interop = true;
              concat_string!("__interopDefault(", require, ")")
            }
          };
          exports.push((spec.exported.name().to_string(), value));
        }
        edits.replace(decl.span, concat_string!(require, ";"));
      }
      Statement::ExportDefaultDeclaration(decl) => {
        let id = match &decl.declaration {
          ExportDefaultDeclarationKind::FunctionDeclaration(func) => func.id.as_ref(),
          ExportDefaultDeclarationKind::ClassDeclaration(class) => class.id.as_ref(),
          ExportDefaultDeclarationKind::Identifier(ident) => {
            exports.push(("default".to_string(), ident.name.to_string()));
            edits.remove(decl.span);
            continue;
          }
          _ => None,
        };
        let declaration_start = decl.declaration.span().start;
        let prefix = Span::new(decl.span.start, declaration_start);
        match id {
          Some(id) => {
            edits.remove(prefix);
            exports.push(("default".to_string(), id.name.to_string()));
          }
          None => {
            edits.replace(prefix, concat_string!("var ", DEFAULT_BINDING, " = "));
            if !decl.declaration.is_expression() {
              edits.insert(decl.span.end, ";");
            }
            exports.push(("default".to_string(), DEFAULT_BINDING.to_string()));
          }
        }
      }
      Statement::ExportAllDeclaration(decl) => {
        let require = render_require(&decl.source.value);
        match &decl.exported {
          Some(exported) => {
            exports.push((exported.name().to_string(), require.clone()));
            edits.replace(decl.span, concat_string!(require, ";"));
          }
          None => {
            star_exports.push(require);
            edits.remove(decl.span);
          }
        }
      }
      _ => {}
    }
  }

  let mut tail = vec![];
  let default_value = exports.iter().find(|(name, _)| name == "default").map(|(_, value)| value);
  let mut is_export_assignment = false;
  match default_value {
    Some(value) if surface.named.is_empty() && star_exports.is_empty() => {
      tail.push(concat_string!("module.exports = ", value, ";"));
      is_export_assignment = true;
    }
    _ => {
      if !exports.is_empty() || !star_exports.is_empty() {
        tail.push(ES_MODULE_MARKER.to_string());
      }
      for (name, value) in &exports {
        tail.push(render_object_define_property(name, value));
      }
      for require in &star_exports {
        tail.push(concat_string!("__exportStar(", require, ");"));
      }
    }
  }
  if uses_interop {
    tail.push(INTEROP_DEFAULT_HELPER.to_string());
  }
  if !star_exports.is_empty() {
    tail.push(EXPORT_STAR_HELPER.to_string());
  }

  edits.insert(0, "\"use strict\";");
  if !tail.is_empty() {
    let end = u32::try_from(code.len()).map_err(anyhow::Error::from)?;
    let separator = if code.ends_with('\n') { "" } else { "\n" };
    edits.insert(end, concat_string!(separator, tail.join("\n"), "\n"));
  }
  Ok(CommonJsOutput { code: edits.apply(code), is_export_assignment })
}

fn render_import_requires(decl: &ImportDeclaration, uses_interop: &mut bool) -> String {
  let require = render_require(&decl.source.value);
  let Some(specifiers) = decl.specifiers.as_ref().filter(|specifiers| !specifiers.is_empty())
  else {
    return concat_string!(require, ";");
  };

  let mut declarations = vec![];
  let mut named = vec![];
  for spec in specifiers {
    match spec {
      ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
        *uses_interop = true;
        declarations.push(concat_string!(
          "const ",
          spec.local.name.as_str(),
          " = __interopDefault(",
          require,
          ");"
        ));
      }
      ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
        declarations.push(concat_string!("const ", spec.local.name.as_str(), " = ", require, ";"));
      }
      ImportDeclarationSpecifier::ImportSpecifier(spec) => {
        let imported = spec.imported.name();
        let local = spec.local.name.as_str();
        named.push(if imported.as_str() == local {
          local.to_string()
        } else {
          concat_string!(property_key(imported.as_str()), ": ", local)
        });
      }
    }
  }
  if !named.is_empty() {
    declarations.push(concat_string!("const { ", named.join(", "), " } = ", require, ";"));
  }
  declarations.join(" ")
}

/// Rewrites the declaration of a default-only entry to `export = <binding>`, matching
/// `module.exports = <binding>` in the CommonJS output.
pub fn to_export_assignment(dts: &str, filename: &str) -> BuildResult<String> {
  let ast = EcmaCompiler::parse(filename, dts, SourceType::d_ts())?;
  let mut edits = SourceEdits::default();
  let mut assigned = None;

  for stmt in &ast.program().body {
    match stmt {
      Statement::ExportDefaultDeclaration(decl) => {
        let (declaration_start, id, needs_declare) = match &decl.declaration {
          ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
            (func.span.start, func.id.as_ref().map(|id| id.name.as_str()), !func.declare)
          }
          ExportDefaultDeclarationKind::ClassDeclaration(class) => {
            (class.span.start, class.id.as_ref().map(|id| id.name.as_str()), !class.declare)
          }
          ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
            (interface.span.start, Some(interface.id.name.as_str()), false)
          }
          ExportDefaultDeclarationKind::Identifier(ident) => {
            edits.replace(decl.span, concat_string!("export = ", ident.name.as_str(), ";"));
            continue;
          }
          _ => continue,
        };
        let Some(id) = id else { continue };
        let prefix = Span::new(decl.span.start, declaration_start);
        edits.replace(prefix, if needs_declare { "declare " } else { "" });
        assigned = Some(id);
      }
      Statement::ExportNamedDeclaration(decl)
        if decl.declaration.is_none() && decl.source.is_none() =>
      {
        match decl.specifiers.as_slice() {
          [] => edits.remove(decl.span),
          [spec] if spec.exported.name().as_str() == "default" => {
            let local = spec.local.name();
            edits.replace(decl.span, concat_string!("export = ", local.as_str(), ";"));
          }
          _ => {}
        }
      }
      _ => {}
    }
  }

  if let Some(id) = assigned {
    let end = u32::try_from(dts.len()).map_err(anyhow::Error::from)?;
    edits.insert(end, concat_string!("export = ", id, ";\n"));
  }
  Ok(edits.apply(dts))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn surface(named: &[&str], has_default: bool) -> ExportSurface {
    ExportSurface { named: named.iter().map(ToString::to_string).collect(), has_default }
  }

  #[test]
  fn default_only_assigns_module_exports() {
    let code = "const add = (a, b) => a + b;\nexport default function sum(a, b) {\n\treturn add(a, b);\n}\n";
    let output = to_commonjs(code, "index.js", &surface(&[], true)).unwrap();
    assert!(output.is_export_assignment);
    assert_eq!(
      output.code,
      "\"use strict\";const add = (a, b) => a + b;\nfunction sum(a, b) {\n\treturn add(a, b);\n}\nmodule.exports = sum;\n"
    );
  }

  #[test]
  fn named_exports_become_getters() {
    let code = "import { join as j } from \"path\";\nconst VERSION = \"1.0\";\nexport { VERSION };\n";
    let output = to_commonjs(code, "index.js", &surface(&["VERSION"], false)).unwrap().code;
    assert!(output.starts_with("\"use strict\";const { join: j } = require(\"path\");\n"));
    assert!(output.contains(ES_MODULE_MARKER));
    assert!(output.contains(&render_object_define_property("VERSION", "VERSION")));
  }

  #[test]
  fn default_imports_use_interop() {
    let code = "import React, { useState } from \"react\";\nexport const x = [React, useState];\n";
    let output = to_commonjs(code, "index.js", &surface(&["x"], false)).unwrap().code;
    assert!(output.contains(
      "const React = __interopDefault(require(\"react\")); const { useState } = require(\"react\");\n"
    ));
    assert!(output.contains(INTEROP_DEFAULT_HELPER));
  }

  #[test]
  fn star_exports_run_after_explicit_exports() {
    let code = "export * from \"pkg\";\nexport const a = 1;\n";
    let output = to_commonjs(code, "index.js", &surface(&["a"], false)).unwrap().code;
    let explicit = output.find("Object.defineProperty(exports, \"a\"").unwrap();
    let star = output.find("__exportStar(require(\"pkg\"));").unwrap();
    assert!(explicit < star);
    assert!(output.contains(EXPORT_STAR_HELPER));
  }

  #[test]
  fn declaration_uses_export_assignment() {
    let dts = "declare const add: (a: number, b: number) => number;\nexport default function sum(a: number, b: number): number;\n";
    assert_eq!(
      to_export_assignment(dts, "index.d.ts").unwrap(),
      "declare const add: (a: number, b: number) => number;\ndeclare function sum(a: number, b: number): number;\nexport = sum;\n"
    );
  }
}
