use oxc::syntax::identifier;

use crate::concat_string;

pub fn is_validate_identifier_name(name: &str) -> bool {
  identifier::is_identifier_name(name)
}

/// Renders a string literal with double quotes, escaping whatever needs it.
pub fn quote_string(value: &str) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| concat_string!("\"", value, "\""))
}

pub fn to_module_import_export_name(name: &str) -> String {
  if is_validate_identifier_name(name) { name.into() } else { quote_string(name) }
}

/// Turns an arbitrary file name into a fragment usable inside an identifier.
pub fn legitimize_identifier_fragment(name: &str) -> String {
  let mut legitimized = String::with_capacity(name.len());
  for char in name.chars() {
    if char.is_ascii_alphanumeric() || char == '_' || char == '$' {
      legitimized.push(char);
    } else {
      legitimized.push('_');
    }
  }
  legitimized
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("😈"));
}

#[test]
fn test_quote_string() {
  assert_eq!(quote_string("node:path"), "\"node:path\"");
  assert_eq!(quote_string("it's \"quoted\""), "\"it's \\\"quoted\\\"\"");
}

#[test]
fn test_legitimize_identifier_fragment() {
  assert_eq!(legitimize_identifier_fragment("my-utils.v2"), "my_utils_v2");
  assert_eq!(legitimize_identifier_fragment("index"), "index");
}
