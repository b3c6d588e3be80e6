use std::{path::Path, sync::Arc};

use dualpack_common::{SourceUnit, UnitIdx};
use dualpack_resolver::Resolver;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

/// Maps an import specifier back to the unit it points at, if it points at one.
pub struct ModuleLocator {
  resolver: Arc<Resolver>,
  by_path: FxHashMap<std::path::PathBuf, UnitIdx>,
}

impl ModuleLocator {
  pub fn new(resolver: Arc<Resolver>, units: &IndexVec<UnitIdx, SourceUnit>) -> Self {
    let by_path = units.iter_enumerated().map(|(idx, unit)| (unit.path.clone(), idx)).collect();
    Self { resolver, by_path }
  }

  pub fn locate(&self, importer: &Path, specifier: &str) -> Option<UnitIdx> {
    match self.resolver.resolve_local(importer, specifier)? {
      Ok(path) => self.by_path.get(&path).copied(),
      Err(_) => None,
    }
  }

  /// Local specifiers that resolve to nothing in the graph still count as local.
  pub fn is_local(&self, importer: &Path, specifier: &str) -> bool {
    self.resolver.resolve_local(importer, specifier).is_some()
  }
}
