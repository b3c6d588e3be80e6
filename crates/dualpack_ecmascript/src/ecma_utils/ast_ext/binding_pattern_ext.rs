use oxc::ast::ast::{BindingIdentifier, BindingPattern, BindingPatternKind};

pub trait BindingPatternExt<'ast> {
  /// Every identifier bound by the pattern, in source order.
  fn binding_identifiers(&self) -> Vec<&BindingIdentifier<'ast>>;
}

impl<'ast> BindingPatternExt<'ast> for BindingPattern<'ast> {
  fn binding_identifiers(&self) -> Vec<&BindingIdentifier<'ast>> {
    let mut identifiers = vec![];
    collect(self, &mut identifiers);
    identifiers
  }
}

fn collect<'a, 'ast>(
  pattern: &'a BindingPattern<'ast>,
  out: &mut Vec<&'a BindingIdentifier<'ast>>,
) {
  match &pattern.kind {
    BindingPatternKind::BindingIdentifier(ident) => out.push(ident),
    BindingPatternKind::ObjectPattern(object) => {
      for property in &object.properties {
        collect(&property.value, out);
      }
      if let Some(rest) = &object.rest {
        collect(&rest.argument, out);
      }
    }
    BindingPatternKind::ArrayPattern(array) => {
      for element in array.elements.iter().flatten() {
        collect(element, out);
      }
      if let Some(rest) = &array.rest {
        collect(&rest.argument, out);
      }
    }
    BindingPatternKind::AssignmentPattern(assignment) => collect(&assignment.left, out),
  }
}
