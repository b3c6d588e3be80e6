use dualpack_common::RenameRecord;
use dualpack_ecmascript::SourceEdits;
use dualpack_error::BuildResult;
use dualpack_utils::{concat_string, ecmascript::legitimize_identifier_fragment, path_ext::PathExt};
use oxc::{
  ast::ast::{ExportDefaultDeclarationKind, Program, Statement},
  span::{GetSpan, Span},
};

use super::BundleStage;
use crate::utils::{name_generator::NameGenerator, parse_unit::parse_unit};

#[derive(Debug)]
enum AnonymousDefault {
  /// `export default function () {}` or `export default class {}`, named in place.
  Declaration { insert_at: u32, needs_space: bool },
  /// `export default <expr>`, hoisted into a `const`.
  Expression { statement: Span, expression: Span },
}

fn find_anonymous_default(program: &Program, source: &str) -> Option<AnonymousDefault> {
  program.body.iter().find_map(|stmt| {
    let Statement::ExportDefaultDeclaration(decl) = stmt else { return None };
    let insert_at = match &decl.declaration {
      ExportDefaultDeclarationKind::FunctionDeclaration(func) if func.id.is_none() => func
        .type_parameters
        .as_ref()
        .map_or(func.params.span.start, |type_parameters| type_parameters.span.start),
      ExportDefaultDeclarationKind::ClassDeclaration(class) if class.id.is_none() => {
        let keyword = source.get(class.span.start as usize..)?.find("class")?;
        class.span.start + u32::try_from(keyword).ok()? + 5
      }
      ExportDefaultDeclarationKind::FunctionDeclaration(_)
      | ExportDefaultDeclarationKind::ClassDeclaration(_)
      | ExportDefaultDeclarationKind::TSInterfaceDeclaration(_)
      | ExportDefaultDeclarationKind::Identifier(_) => return None,
      expression => {
        return Some(AnonymousDefault::Expression {
          statement: decl.span,
          expression: expression.span(),
        });
      }
    };
    let preceding = source.as_bytes().get((insert_at as usize).checked_sub(1)?)?;
    Some(AnonymousDefault::Declaration {
      insert_at,
      needs_space: !preceding.is_ascii_whitespace(),
    })
  })
}

impl BundleStage<'_> {
  /// Gives anonymous default exports a top-level name, `a_<file>_<n>`, so importers can
  /// refer to them once the files are flattened.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn name_anonymous_defaults(&mut self) -> BuildResult<()> {
    let cwd = &self.options.cwd;
    let found = self.par_map_units(|_, unit| {
      let parsed = parse_unit(unit, cwd)?;
      let anonymous = find_anonymous_default(parsed.ast.program(), &unit.content);
      let scoping = &parsed.scoping;
      let used_names = scoping
        .symbol_names()
        .map(ToString::to_string)
        .chain(scoping.root_unresolved_references().keys().map(ToString::to_string))
        .collect::<Vec<_>>();
      Ok((anonymous, used_names))
    })?;

    let mut generator = NameGenerator::new("a_");
    for (_, used_names) in &found {
      generator.reserve_all(used_names.iter().map(String::as_str));
    }

    let mut named_count = 0;
    for (idx, (anonymous, _)) in found.into_iter_enumerated() {
      let Some(anonymous) = anonymous else { continue };
      let unit = &mut self.units[idx];
      let hint = legitimize_identifier_fragment(&unit.path.representative_file_name());
      let name = generator.generate(&hint);

      let mut edits = SourceEdits::default();
      match anonymous {
        AnonymousDefault::Declaration { insert_at, needs_space } => {
          let inserted = if needs_space { concat_string!(" ", name) } else { name.clone() };
          edits.insert(insert_at, inserted);
        }
        AnonymousDefault::Expression { statement, expression } => {
          let expression = expression.source_text(&unit.content);
          edits.replace(
            statement,
            concat_string!("const ", name, " = ", expression, ";\nexport default ", name, ";"),
          );
        }
      }
      unit.content = edits.apply(&unit.content);
      self.renames.push(RenameRecord {
        original_name: "default".to_string(),
        file: unit.path.clone(),
        synthetic_name: name,
      });
      named_count += 1;
    }
    tracing::debug!("Named {named_count} anonymous default exports");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use dualpack_ecmascript::EcmaCompiler;
  use oxc::span::SourceType;

  use super::*;

  fn name(source: &str) -> String {
    let ast = EcmaCompiler::parse("test.ts", source, SourceType::ts()).unwrap();
    let mut edits = SourceEdits::default();
    match find_anonymous_default(ast.program(), source).unwrap() {
      AnonymousDefault::Declaration { insert_at, needs_space } => {
        edits.insert(insert_at, if needs_space { " a_test_1" } else { "a_test_1" });
      }
      AnonymousDefault::Expression { statement, expression } => {
        let expression = expression.source_text(source);
        edits.replace(
          statement,
          concat_string!("const a_test_1 = ", expression, ";\nexport default a_test_1;"),
        );
      }
    }
    edits.apply(source)
  }

  #[test]
  fn names_functions_in_place() {
    assert_eq!(
      name("export default function () { return 1; }"),
      "export default function a_test_1() { return 1; }"
    );
    assert_eq!(
      name("export default async function<T>(value: T) {}"),
      "export default async function a_test_1<T>(value: T) {}"
    );
  }

  #[test]
  fn names_classes_in_place() {
    assert_eq!(
      name("export default class extends Base {}"),
      "export default class a_test_1 extends Base {}"
    );
  }

  #[test]
  fn hoists_expressions() {
    assert_eq!(
      name("export default (a: number, b: number) => a + b;"),
      "const a_test_1 = (a: number, b: number) => a + b;\nexport default a_test_1;"
    );
    assert_eq!(
      name("export default { retries: 3 };"),
      "const a_test_1 = { retries: 3 };\nexport default a_test_1;"
    );
  }

  #[test]
  fn named_defaults_are_left_alone() {
    let source = "export default function sum() {}\nconst x = 1;\nexport { x as default };";
    let ast = EcmaCompiler::parse("test.ts", source, SourceType::ts()).unwrap();
    assert!(find_anonymous_default(ast.program(), source).is_none());
  }
}
