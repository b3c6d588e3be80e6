use dualpack_common::{RenameRecord, UnitIdx};
use dualpack_ecmascript::StatementExt;
use dualpack_error::{BuildDiagnostic, BuildResult};
use dualpack_utils::{concat_string, indexmap::FxIndexMap};
use oxc::{
  ast::ast::Statement,
  ast_visit::Visit,
  semantic::SymbolId,
  span::{GetSpan, Span},
};
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

use super::{
  BundleStage,
  reference_rewriter::ReferenceRewriter,
  top_level_names::{NameOrigin, collect_unit_names},
};
use crate::utils::{name_generator::NameGenerator, parse_unit::parse_unit};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
enum OriginKey<'a> {
  Declared(UnitIdx),
  External(&'a NameOrigin),
  Global,
}

impl<'a> OriginKey<'a> {
  fn new(idx: UnitIdx, origin: &'a NameOrigin) -> Self {
    match origin {
      NameOrigin::Declared => Self::Declared(idx),
      NameOrigin::ExternalImport { .. } => Self::External(origin),
      NameOrigin::Global => Self::Global,
    }
  }
}

impl BundleStage<'_> {
  /// Gives every top-level name of the bundle a single owner.
  ///
  /// The entry keeps its names so its public surface is unchanged, then a global used
  /// anywhere keeps its name, then the first file in dependency order. Every other
  /// occurrence gets a fresh `d_<name>_<n>`. With `renameDuplicates: false` any conflict is
  /// fatal instead.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn resolve_duplicates(&mut self) -> BuildResult<()> {
    let cwd = &self.options.cwd;
    let unit_names = self.par_map_units(|_, unit| {
      let parsed = parse_unit(unit, cwd)?;
      Ok(collect_unit_names(&parsed, &unit.path, &self.locator))
    })?;

    let mut occurrences: FxIndexMap<&str, Vec<(UnitIdx, OriginKey)>> = FxIndexMap::default();
    for (idx, names) in unit_names.iter_enumerated() {
      for (name, origin) in &names.names {
        occurrences.entry(name.as_str()).or_default().push((idx, OriginKey::new(idx, origin)));
      }
    }
    occurrences.retain(|_, found| {
      let first = found[0].1;
      found.iter().any(|(_, key)| *key != first)
    });

    if occurrences.is_empty() {
      return Ok(());
    }

    if !self.entry_point.rename_duplicates {
      let declarations = occurrences
        .iter()
        .filter_map(|(name, found)| {
          let mut files = vec![];
          for (idx, key) in found {
            let file = self.display_path(*idx);
            if *key != OriginKey::Global && !files.contains(&file) {
              files.push(file);
            }
          }
          (files.len() > 1).then(|| (name.to_string(), files))
        })
        .collect::<Vec<_>>();
      if declarations.is_empty() {
        return Ok(());
      }
      Err(BuildDiagnostic::DuplicateDeclarations { declarations })?;
    }

    let mut generator = NameGenerator::new("d_");
    for names in &unit_names {
      generator.reserve_all(names.used_names.iter().map(String::as_str));
    }

    let mut renames_by_unit: IndexVec<UnitIdx, FxHashMap<String, String>> =
      self.units.iter().map(|_| FxHashMap::default()).collect();
    for (name, found) in &occurrences {
      let canonical = found
        .iter()
        .find(|(idx, _)| *idx == self.entry)
        .or_else(|| found.iter().find(|(_, key)| *key == OriginKey::Global))
        .unwrap_or(&found[0])
        .1;

      for (idx, key) in found {
        if *key == canonical || *key == OriginKey::Global {
          continue;
        }
        let synthetic_name = generator.generate(name);
        renames_by_unit[*idx].insert(name.to_string(), synthetic_name.clone());
        self.renames.push(RenameRecord {
          original_name: name.to_string(),
          file: self.units[*idx].path.clone(),
          synthetic_name,
        });
      }
    }
    tracing::debug!("Renamed {} duplicated declarations", self.renames.len());

    let contents = self.par_map_units(|idx, unit| {
      let renames = &renames_by_unit[idx];
      if renames.is_empty() {
        return Ok(None);
      }
      let parsed = parse_unit(unit, cwd)?;
      let root_scope_id = parsed.scoping.root_scope_id();
      let symbol_renames = renames
        .iter()
        .filter_map(|(name, synthetic_name)| {
          let symbol_id = parsed.scoping.get_binding(root_scope_id, name)?;
          Some((symbol_id, synthetic_name.clone()))
        })
        .collect::<FxHashMap<SymbolId, String>>();

      let namespaces = FxHashMap::default();
      let mut rewriter = ReferenceRewriter::new(
        &parsed.scoping,
        &symbol_renames,
        &namespaces,
        &parsed.display_path,
      );
      rewriter.visit_program(parsed.ast.program());

      // `export const foo` would now export `d_foo_1`, keep the public name for importers.
      let mut edits = rewriter.edits;
      let mut exported = vec![];
      for stmt in &parsed.ast.program().body {
        let Statement::ExportNamedDeclaration(decl) = stmt else { continue };
        let Some(declaration) = &decl.declaration else { continue };
        let names = stmt.declared_names();
        if !names.iter().any(|ident| renames.contains_key(ident.name.as_str())) {
          continue;
        }
        edits.remove(Span::new(decl.span.start, declaration.span().start));
        exported.extend(names.iter().map(|ident| match renames.get(ident.name.as_str()) {
          Some(synthetic_name) => concat_string!(synthetic_name, " as ", ident.name.as_str()),
          None => ident.name.to_string(),
        }));
      }
      if !exported.is_empty() {
        let end = u32::try_from(unit.content.len()).map_err(anyhow::Error::from)?;
        edits.insert(end, concat_string!("\nexport { ", exported.join(", "), " };"));
      }
      Ok(Some(edits.apply(&unit.content)))
    })?;

    for (idx, content) in contents.into_iter_enumerated() {
      if let Some(content) = content {
        self.units[idx].content = content;
      }
    }
    Ok(())
  }
}
