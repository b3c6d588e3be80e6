pub mod program_cell;

use std::fmt::Debug;

use arcstr::ArcStr;
use oxc::{
  allocator::Allocator,
  ast::ast::Program,
  semantic::{Scoping, SemanticBuilder},
  span::SourceType,
};

use self::program_cell::ProgramCell;

/// A parsed source file.
///
/// - To access `&mut ast::Program`, use `ast.program.with_mut(|fields| { fields.program; })`.
/// - Scoping is not stored, every pass rebuilds it with [`EcmaAst::make_scoping`] because
///   passes run on freshly rewritten text.
pub struct EcmaAst {
  pub program: ProgramCell,
  pub source_type: SourceType,
}

impl EcmaAst {
  pub fn source(&self) -> &ArcStr {
    &self.program.borrow_owner().source
  }

  pub fn allocator(&self) -> &Allocator {
    &self.program.borrow_owner().allocator
  }

  pub fn program(&self) -> &Program {
    &self.program.borrow_dependent().program
  }

  /// Symbols and references of the current program.
  pub fn make_scoping(&self) -> Scoping {
    SemanticBuilder::new().build(self.program()).semantic.into_scoping()
  }
}

impl Debug for EcmaAst {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EcmaAst").field("source", &self.source()).finish_non_exhaustive()
  }
}

unsafe impl Send for EcmaAst {}
unsafe impl Sync for EcmaAst {}
