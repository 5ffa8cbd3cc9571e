/// Modules bundled with Node.js, reachable with or without the `node:` scheme.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Modules that only exist behind the `node:` scheme.
const NODE_SCHEME_ONLY: &[&str] = &["sea", "sqlite", "test", "test/reporters"];

/// Returns `true` if `name` is a Node.js built-in module specifier,
/// e.g. `"fs"`, `"fs/promises"`, `"node:crypto"`, `"node:test"`.
pub fn is_builtin_module(name: &str) -> bool {
    match name.strip_prefix("node:") {
        Some(rest) => NODE_BUILTINS.contains(&rest) || NODE_SCHEME_ONLY.contains(&rest),
        None => NODE_BUILTINS.contains(&name),
    }
}
