/// Concatenates string-like values with a single allocation.
#[macro_export]
macro_rules! concat_string {
  () => {
    String::new()
  };
  ($($s:expr),+ $(,)?) => {{
    let mut len = 0;
    $(len += AsRef::<str>::as_ref(&$s).len();)+
    let mut buf = String::with_capacity(len);
    $(buf.push_str(AsRef::<str>::as_ref(&$s));)+
    buf
  }};
}

#[test]
fn test_concat_string() {
  let name = String::from("foo");
  assert_eq!(concat_string!("d_", name, "_", "1"), "d_foo_1");
  assert_eq!(concat_string!(), "");
}
