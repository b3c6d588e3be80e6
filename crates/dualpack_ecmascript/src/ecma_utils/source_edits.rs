use oxc::span::Span;
use string_wizard::MagicString;

#[derive(Debug)]
struct Edit {
  span: Span,
  content: String,
  order: usize,
}

/// Text edits keyed by spans of the original source.
///
/// Edits nested inside a wider replacement are dropped, the wider one wins. An empty span
/// is an insertion; insertions at the same offset keep their recording order.
#[derive(Debug, Default)]
pub struct SourceEdits {
  edits: Vec<Edit>,
}

impl SourceEdits {
  pub fn replace(&mut self, span: Span, content: impl Into<String>) {
    let order = self.edits.len();
    self.edits.push(Edit { span, content: content.into(), order });
  }

  pub fn remove(&mut self, span: Span) {
    self.replace(span, String::new());
  }

  pub fn insert(&mut self, at: u32, content: impl Into<String>) {
    self.replace(Span::new(at, at), content);
  }

  pub fn is_empty(&self) -> bool {
    self.edits.is_empty()
  }

  pub fn len(&self) -> usize {
    self.edits.len()
  }

  pub fn apply(mut self, source: &str) -> String {
    if self.edits.is_empty() {
      return source.to_string();
    }

    self.edits.sort_by(|a, b| {
      a.span
        .start
        .cmp(&b.span.start)
        .then_with(|| a.span.is_empty().cmp(&b.span.is_empty()).reverse())
        .then_with(|| b.span.end.cmp(&a.span.end))
        .then_with(|| a.order.cmp(&b.order))
    });

    let mut magic_string = MagicString::new(source);
    let mut intro = String::new();
    let mut covered_until = 0;
    let mut has_replacement = false;
    for edit in self.edits {
      let (start, end) = (edit.span.start as usize, edit.span.end as usize);
      if edit.span.is_empty() {
        if has_replacement && start < covered_until {
          continue;
        }
        if start == 0 {
          intro.push_str(&edit.content);
        } else {
          magic_string.append_left(start, edit.content);
        }
        continue;
      }
      if has_replacement && start < covered_until {
        continue;
      }
      if edit.content.is_empty() {
        magic_string.remove(start, end);
      } else {
        magic_string.update(start, end, edit.content);
      }
      covered_until = end;
      has_replacement = true;
    }
    if !intro.is_empty() {
      magic_string.prepend(intro);
    }
    magic_string.to_string()
  }
}

#[test]
fn nested_edits_are_dropped() {
  let source = "import { a } from './a';\nconst b = a;";
  let mut edits = SourceEdits::default();
  edits.replace(Span::new(9, 10), "x");
  edits.remove(Span::new(0, 24));
  edits.replace(Span::new(35, 36), "d_a_1");
  assert_eq!(edits.apply(source), "\nconst b = d_a_1;");
}

#[test]
fn insertions_keep_recording_order() {
  let source = "function () {}";
  let mut edits = SourceEdits::default();
  edits.insert(9, " a_");
  edits.insert(9, "index_1");
  assert_eq!(edits.apply(source), "function  a_index_1() {}");
}

#[test]
fn insertion_before_replacement() {
  let source = "const { foo } = obj;";
  let mut edits = SourceEdits::default();
  edits.replace(Span::new(8, 11), "d_foo_1");
  edits.insert(8, "foo: ");
  assert_eq!(edits.apply(source), "const { foo: d_foo_1 } = obj;");
}
