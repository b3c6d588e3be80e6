use std::path::Path;

use arcstr::ArcStr;
use dualpack_error::{BuildDiagnostic, BuildResult};
use itertools::Itertools;
use oxc::{
  allocator::Allocator,
  codegen::{Codegen, CodegenOptions, CodegenReturn},
  minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions},
  parser::Parser,
  span::SourceType,
  transformer::ESTarget,
};

use crate::ecma_ast::{
  EcmaAst,
  program_cell::{ProgramCell, ProgramCellDependent, ProgramCellOwner},
};

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Source type derived from the extension, falling back to a TypeScript module.
  /// Always an implementation file. `SourceType::from_path` reads names like `d.ts` or
  /// `x.d.config.ts` as declaration files, which bind no symbols.
  pub fn source_type_of(path: &Path) -> SourceType {
    SourceType::from_path(path)
      .unwrap_or_else(|_| SourceType::ts())
      .with_typescript_definition(false)
  }

  /// `filename` only shows up in the error message.
  pub fn parse(
    filename: &str,
    source: impl Into<ArcStr>,
    source_type: SourceType,
  ) -> BuildResult<EcmaAst> {
    let allocator = Allocator::default();
    let owner = ProgramCellOwner { source: source.into(), allocator };
    let program = ProgramCell::try_new(owner, |owner| {
      let ret = Parser::new(&owner.allocator, &owner.source, source_type).parse();
      if ret.errors.is_empty() && !ret.panicked {
        Ok(ProgramCellDependent { program: ret.program })
      } else {
        Err(BuildDiagnostic::ParseFailed {
          file: filename.to_string(),
          message: ret.errors.iter().map(ToString::to_string).join("; "),
        })
      }
    })?;

    Ok(EcmaAst { program, source_type })
  }

  pub fn parse_file(
    path: &Path,
    filename: &str,
    source: impl Into<ArcStr>,
  ) -> BuildResult<EcmaAst> {
    Self::parse(filename, source, Self::source_type_of(path))
  }

  pub fn print(ast: &EcmaAst) -> CodegenReturn {
    Codegen::new().build(ast.program())
  }

  pub fn minify(source_text: &str, target: ESTarget) -> BuildResult<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();

    let ret = Parser::new(&allocator, source_text, source_type).parse();
    if !ret.errors.is_empty() {
      Err(anyhow::anyhow!(
        "Failed to minify: {}",
        ret.errors.iter().map(ToString::to_string).join("; ")
      ))?;
    }
    let program = allocator.alloc(ret.program);

    let ret = Minifier::new(MinifierOptions {
      mangle: Some(MangleOptions::default()),
      compress: Some(CompressOptions { target, ..CompressOptions::smallest() }),
    })
    .build(&allocator, program);

    let ret = Codegen::new()
      .with_options(CodegenOptions { minify: true, ..CodegenOptions::default() })
      .with_scoping(ret.scoping)
      .build(program);

    Ok(ret.code)
  }
}

#[test]
fn basic_test() {
  let ast = EcmaCompiler::parse("a.ts", "const a: number = 1;", SourceType::ts()).unwrap();
  let code = EcmaCompiler::print(&ast).code;
  assert_eq!(code, "const a: number = 1;\n");
}

#[test]
fn parse_error_names_the_file() {
  let err = EcmaCompiler::parse("src/broken.ts", "const = ;", SourceType::ts()).unwrap_err();
  assert!(err.to_string().starts_with("Failed to parse src/broken.ts:"));
}

#[test]
fn minify_keeps_semantics() {
  let code = EcmaCompiler::minify("export const answer = 40 + 2;\n", ESTarget::ESNext).unwrap();
  assert!(code.contains("answer"));
  assert!(code.contains("42"));
}

#[test]
fn declaration_like_names_bind_symbols() {
  for path in ["src/d.ts", "src/types.d.ts", "src/x.d.config.ts"] {
    let source_type = EcmaCompiler::source_type_of(Path::new(path));
    assert!(source_type.is_typescript(), "{path}");
    assert!(!source_type.is_typescript_definition(), "{path}");

    let ast = EcmaCompiler::parse_file(Path::new(path), path, "export class K {}").unwrap();
    let scoping = ast.make_scoping();
    assert!(scoping.get_binding(scoping.root_scope_id(), "K").is_some(), "{path}");
  }
}
