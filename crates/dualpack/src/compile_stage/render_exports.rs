use dualpack_utils::{concat_string, ecmascript::quote_string};

pub const ES_MODULE_MARKER: &str = "Object.defineProperty(exports, '__esModule', { value: true });";

pub const INTEROP_DEFAULT_HELPER: &str = "function __interopDefault(m) {
  return m && m.__esModule ? m.default : m;
}";

pub const EXPORT_STAR_HELPER: &str = "function __exportStar(from) {
  Object.keys(from).forEach(function (k) {
    if (k !== 'default' && !Object.prototype.hasOwnProperty.call(exports, k)) Object.defineProperty(exports, k, {
      enumerable: true,
      get: function () { return from[k]; }
    });
  });
}";

#[inline]
pub fn render_object_define_property(key: &str, value: &str) -> String {
  concat_string!(
    "Object.defineProperty(exports, ",
    quote_string(key),
    ", {
  enumerable: true,
  get: function () {
    return ",
    value,
    ";
  }
});"
  )
}

pub fn render_require(specifier: &str) -> String {
  concat_string!("require(", quote_string(specifier), ")")
}

#[test]
fn define_property_getter() {
  assert_eq!(
    render_object_define_property("add", "add"),
    "Object.defineProperty(exports, \"add\", {\n  enumerable: true,\n  get: function () {\n    return add;\n  }\n});"
  );
}
