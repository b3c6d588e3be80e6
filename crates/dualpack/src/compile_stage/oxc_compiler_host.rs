use std::path::PathBuf;

use dualpack_common::OutputFormat;
use dualpack_ecmascript::EcmaCompiler;
use dualpack_error::BuildResult;
use itertools::Itertools;
use oxc::{
  codegen::{Codegen, CodegenOptions},
  isolated_declarations::{IsolatedDeclarations, IsolatedDeclarationsOptions},
  transformer::{ESTarget as OxcESTarget, TransformOptions, Transformer},
};
use sugar_path::SugarPath;

use super::{
  CompileInput, CompilerHost, EmittedFiles,
  to_commonjs::{to_commonjs, to_export_assignment},
};

/// Compiles with oxc: isolated declarations for `.d.ts`, the transformer to strip types and
/// lower syntax, codegen for JavaScript and source maps.
#[derive(Debug, Default)]
pub struct OxcCompilerHost;

impl CompilerHost for OxcCompilerHost {
  fn emit(&self, input: &CompileInput<'_>) -> BuildResult<EmittedFiles> {
    let filename = input
      .entry_path
      .file_name()
      .map_or_else(|| input.entry_path.to_string_lossy(), |name| name.to_string_lossy())
      .into_owned();
    let mut emitted = EmittedFiles::default();
    let mut ast = EcmaCompiler::parse_file(input.entry_path, &filename, input.source)?;

    let declaration = input.declaration.then(|| {
      let options = IsolatedDeclarationsOptions { strip_internal: false };
      let ret = IsolatedDeclarations::new(ast.allocator(), options).build(ast.program());
      for error in ret.errors {
        let warning = anyhow::anyhow!("Declaration of {filename}: {error}");
        tracing::warn!("{warning}");
        emitted.warnings.push(warning);
      }
      Codegen::new().build(&ret.program).code
    });

    let scoping = ast.make_scoping();
    let transform_options = TransformOptions::from(OxcESTarget::from(input.target));
    let ret = ast.program.with_mut(|fields| {
      Transformer::new(fields.allocator, input.entry_path, &transform_options)
        .build_with_scoping(scoping, fields.program)
    });
    if !ret.errors.is_empty() {
      Err(anyhow::anyhow!(
        "Failed to transform {filename}: {}",
        ret.errors.iter().map(ToString::to_string).join("; ")
      ))?;
    }

    // Sources of the map are relative to the map itself.
    let source_map_path =
      input.source_map.then(|| PathBuf::from(input.entry_path.relative(input.out_dir)));
    let ret = Codegen::new()
      .with_options(CodegenOptions { source_map_path, ..CodegenOptions::default() })
      .build(ast.program());

    let mut code = ret.code;
    let mut is_export_assignment = false;
    if input.format == OutputFormat::Cjs {
      let output = to_commonjs(&code, &filename, input.export_surface)?;
      code = output.code;
      is_export_assignment = output.is_export_assignment;
    }
    emitted.files.insert(input.output_path("js"), code);
    if let Some(map) = ret.map {
      emitted.files.insert(input.output_path("js.map"), map.to_json_string());
    }

    if let Some(mut declaration) = declaration {
      if is_export_assignment {
        declaration = to_export_assignment(&declaration, &filename)?;
      }
      emitted.files.insert(input.output_path("d.ts"), declaration);
    }

    tracing::debug!("Emitted {} files for {filename} as {}", emitted.files.len(), input.format);
    Ok(emitted)
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use dualpack_common::{ESTarget, ExportSurface};

  use super::*;

  fn emit(source: &str, format: OutputFormat, surface: &ExportSurface) -> EmittedFiles {
    let input = CompileInput {
      entry_path: Path::new("/project/src/index.ts"),
      source,
      format,
      out_dir: Path::new("/project/dist"),
      target: ESTarget::EsNext,
      source_map: true,
      declaration: true,
      export_surface: surface,
    };
    OxcCompilerHost.emit(&input).unwrap()
  }

  #[test]
  fn emits_javascript_map_and_declaration() {
    let surface = ExportSurface { named: vec!["add".to_string()], has_default: false };
    let emitted = emit(
      "export const add = (a: number, b: number): number => a + b;",
      OutputFormat::Esm,
      &surface,
    );
    let paths = emitted.files.keys().cloned().collect::<Vec<_>>();
    assert_eq!(
      paths,
      [
        PathBuf::from("/project/dist/index.js"),
        PathBuf::from("/project/dist/index.js.map"),
        PathBuf::from("/project/dist/index.d.ts"),
      ]
    );
    assert_eq!(emitted.files[0], "export const add = (a, b) => a + b;\n");
    assert!(emitted.files[2].contains("export declare const add: (a: number, b: number) => number;"));
  }

  #[test]
  fn default_only_commonjs() {
    let surface = ExportSurface { named: vec![], has_default: true };
    let emitted = emit(
      "export default function sum(a: number, b: number): number {\n  return a + b;\n}",
      OutputFormat::Cjs,
      &surface,
    );
    assert!(emitted.files[0].contains("module.exports = sum;"));
    assert!(emitted.files[2].contains("export = sum;"));
  }
}
