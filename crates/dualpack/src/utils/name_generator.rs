use dualpack_utils::concat_string;
use oxc::syntax::keyword::{GLOBAL_OBJECTS, RESERVED_KEYWORDS};
use rustc_hash::FxHashSet;

/// Produces `{prefix}{hint}_{n}` names that collide with nothing seen in the bundle.
///
/// `n` is shared by every name of one generator, so two hints never produce the same suffix.
#[derive(Debug)]
pub struct NameGenerator {
  prefix: &'static str,
  next_index: u32,
  used_names: FxHashSet<String>,
}

impl NameGenerator {
  pub fn new(prefix: &'static str) -> Self {
    let used_names =
      RESERVED_KEYWORDS.iter().chain(GLOBAL_OBJECTS.iter()).map(ToString::to_string).collect();
    Self { prefix, next_index: 0, used_names }
  }

  pub fn reserve(&mut self, name: impl Into<String>) {
    self.used_names.insert(name.into());
  }

  pub fn reserve_all<I, S>(&mut self, names: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.used_names.extend(names.into_iter().map(Into::into));
  }

  pub fn generate(&mut self, hint: &str) -> String {
    loop {
      self.next_index += 1;
      let candidate =
        concat_string!(self.prefix, hint, "_", itoa::Buffer::new().format(self.next_index));
      if self.used_names.insert(candidate.clone()) {
        return candidate;
      }
    }
  }
}

#[test]
fn skips_used_names() {
  let mut generator = NameGenerator::new("d_");
  generator.reserve("d_foo_1");
  assert_eq!(generator.generate("foo"), "d_foo_2");
  assert_eq!(generator.generate("bar"), "d_bar_3");
}
