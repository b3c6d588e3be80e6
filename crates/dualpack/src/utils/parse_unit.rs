use std::path::Path;

use dualpack_common::SourceUnit;
use dualpack_ecmascript::{EcmaAst, EcmaCompiler};
use dualpack_error::BuildResult;
use dualpack_utils::path_ext::PathExt;
use oxc::semantic::Scoping;

pub struct ParsedUnit {
  pub ast: EcmaAst,
  pub scoping: Scoping,
  /// Path relative to `cwd`, used in messages and comments.
  pub display_path: String,
}

pub fn parse_unit(unit: &SourceUnit, cwd: &Path) -> BuildResult<ParsedUnit> {
  let display_path = unit.path.relative_display(cwd);
  let ast = EcmaCompiler::parse_file(&unit.path, &display_path, unit.content.as_str())?;
  let scoping = ast.make_scoping();
  Ok(ParsedUnit { ast, scoping, display_path })
}
