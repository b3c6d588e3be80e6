use super::source::Source;

#[derive(Default)]
pub struct SourceJoiner<'source> {
  inner: Vec<Box<dyn Source + Send + 'source>>,
}

impl<'source> SourceJoiner<'source> {
  pub fn append_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.inner.push(Box::new(source));
  }

  /// Sources separated by `\n`, each preceded by its `// comment` line, whole result trimmed.
  pub fn join(&self) -> String {
    let size_hint = self
      .inner
      .iter()
      .map(|source| source.content().len() + source.comment().map_or(0, |c| c.len() + 4) + 1)
      .sum::<usize>();
    let mut ret_source = String::with_capacity(size_hint);

    for (index, source) in self.inner.iter().enumerate() {
      if index > 0 {
        ret_source.push('\n');
      }
      if let Some(comment) = source.comment() {
        ret_source.push_str("// ");
        ret_source.push_str(comment);
        ret_source.push('\n');
      }
      ret_source.push_str(source.content());
    }

    let trimmed = ret_source.trim();
    if trimmed.len() == ret_source.len() { ret_source } else { trimmed.to_string() }
  }
}

#[test]
fn joins_with_comments_and_trims() {
  use super::source::ModuleSource;

  let mut joiner = SourceJoiner::default();
  joiner.append_source("");
  joiner.append_source(ModuleSource {
    relative_path: "src/util.ts".to_string(),
    content: "const add = 1;\n".to_string(),
  });
  joiner.append_source(ModuleSource {
    relative_path: "src/index.ts".to_string(),
    content: "export { add };".to_string(),
  });

  assert_eq!(joiner.join(), "// src/util.ts\nconst add = 1;\n\n// src/index.ts\nexport { add };");
}
