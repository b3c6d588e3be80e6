use phf::{Set, phf_set};

static NODE_BUILTIN_MODULES: Set<&'static str> = phf_set! {
  "assert", "assert/strict", "async_hooks", "buffer", "child_process", "cluster", "console",
  "constants", "crypto", "dgram", "diagnostics_channel", "dns", "dns/promises", "domain",
  "events", "fs", "fs/promises", "http", "http2", "https", "inspector", "inspector/promises",
  "module", "net", "os", "path", "path/posix", "path/win32", "perf_hooks", "process",
  "punycode", "querystring", "readline", "readline/promises", "repl", "stream",
  "stream/consumers", "stream/promises", "stream/web", "string_decoder", "sys", "timers",
  "timers/promises", "tls", "trace_events", "tty", "url", "util", "util/types", "v8", "vm",
  "wasi", "worker_threads", "zlib",
};

/// `node:`-prefixed specifiers are always built-ins, even ones missing from the table.
pub fn is_node_builtin(specifier: &str) -> bool {
  specifier.starts_with("node:") || NODE_BUILTIN_MODULES.contains(specifier)
}

#[test]
fn test_is_node_builtin() {
  assert!(is_node_builtin("fs"));
  assert!(is_node_builtin("node:test"));
  assert!(is_node_builtin("fs/promises"));
  assert!(!is_node_builtin("lodash"));
  assert!(!is_node_builtin("./path"));
}
