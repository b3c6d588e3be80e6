use std::iter;

use oxc_index::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{module_loader::LoadedModule, module_task::ModuleIdx};

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Status {
  ToBeExecuted(ModuleIdx),
  WaitForExit(ModuleIdx),
}

pub struct SortedModules {
  /// Dependencies before dependents, the entry last.
  pub order: Vec<ModuleIdx>,
  /// Each cycle starts and ends with the same module, in discovery order.
  pub cycles: Vec<Vec<ModuleIdx>>,
}

/// Depth-first post-order from the entry, visiting dependencies in import order.
pub fn sort_modules(
  modules: &IndexVec<ModuleIdx, LoadedModule>,
  entry: ModuleIdx,
) -> SortedModules {
  let mut execution_stack = vec![Status::ToBeExecuted(entry)];

  let mut executed_ids = FxHashSet::default();
  let mut stack_indexes_of_executing_id = FxHashMap::default();

  let mut seen_cycles = FxHashSet::default();
  let mut cycles = vec![];
  let mut order = Vec::with_capacity(modules.len());

  while let Some(status) = execution_stack.pop() {
    match status {
      Status::ToBeExecuted(id) => {
        if executed_ids.contains(&id) {
          // Still executing means we came back through an import cycle
          if let Some(index) = stack_indexes_of_executing_id.get(&id).copied() {
            let cycle = execution_stack[index..]
              .iter()
              .filter_map(|action| match action {
                // Only modules with `Status::WaitForExit` are on the execution chain
                Status::ToBeExecuted(_) => None,
                Status::WaitForExit(id) => Some(*id),
              })
              .chain(iter::once(id))
              .collect::<Vec<_>>();
            if seen_cycles.insert(cycle.clone()) {
              cycles.push(cycle);
            }
          }
        } else {
          executed_ids.insert(id);
          execution_stack.push(Status::WaitForExit(id));
          stack_indexes_of_executing_id.insert(id, execution_stack.len() - 1);

          execution_stack
            .extend(modules[id].dependencies.iter().rev().copied().map(Status::ToBeExecuted));
        }
      }
      Status::WaitForExit(id) => {
        order.push(id);
        stack_indexes_of_executing_id.remove(&id);
      }
    }
  }

  SortedModules { order, cycles }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn graph(edges: &[&[usize]]) -> IndexVec<ModuleIdx, LoadedModule> {
    edges
      .iter()
      .enumerate()
      .map(|(idx, deps)| LoadedModule {
        path: format!("{idx}.ts").into(),
        content: String::new(),
        dependencies: deps.iter().copied().map(ModuleIdx::from_usize).collect(),
        is_commonjs: false,
        builtin_modules: vec![],
        warnings: vec![],
      })
      .collect()
  }

  fn ids(order: &[ModuleIdx]) -> Vec<usize> {
    order.iter().map(|idx| idx.index()).collect()
  }

  #[test]
  fn dependencies_first_in_import_order() {
    // 0 imports 1 then 2, 1 imports 3, 2 imports 3
    let modules = graph(&[&[1, 2], &[3], &[3], &[]]);
    let sorted = sort_modules(&modules, ModuleIdx::from_usize(0));
    assert_eq!(ids(&sorted.order), [3, 1, 2, 0]);
    assert!(sorted.cycles.is_empty());
  }

  #[test]
  fn cycles_are_reported_once() {
    // 0 -> 1 -> 2 -> 1
    let modules = graph(&[&[1], &[2], &[1]]);
    let sorted = sort_modules(&modules, ModuleIdx::from_usize(0));
    assert_eq!(ids(&sorted.order), [2, 1, 0]);
    assert_eq!(sorted.cycles.len(), 1);
    assert_eq!(ids(&sorted.cycles[0]), [1, 2, 1]);
  }
}
