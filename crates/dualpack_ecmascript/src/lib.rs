mod ecma_ast;
mod ecma_compiler;
mod ecma_utils;

pub use crate::{
  ecma_ast::{EcmaAst, program_cell::WithMutFields},
  ecma_compiler::EcmaCompiler,
  ecma_utils::{
    ast_ext::{binding_pattern_ext::BindingPatternExt, statement_ext::StatementExt},
    source_edits::SourceEdits,
  },
};
