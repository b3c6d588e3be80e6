use std::path::PathBuf;

use oxc_index::IndexVec;

use crate::{SourceUnit, UnitIdx};

#[derive(Debug, Default)]
pub struct DependencyGraph {
  /// Dependencies before dependents, the entry is always last.
  pub units: IndexVec<UnitIdx, SourceUnit>,
  /// Node built-in modules imported anywhere in the graph, in discovery order.
  pub builtin_modules: Vec<String>,
  /// `(importer, importee)` edges that close a cycle.
  pub circular_pairs: Vec<(PathBuf, PathBuf)>,
}

impl DependencyGraph {
  pub fn uses_builtins(&self) -> bool {
    !self.builtin_modules.is_empty()
  }

  pub fn entry_idx(&self) -> UnitIdx {
    UnitIdx::from_usize(self.units.len().saturating_sub(1))
  }
}
