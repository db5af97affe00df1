use crate::{BuiltinInfo, Category, Support};

/// Closed table of Node builtin modules. Order matters for nothing except
/// readability; lookups are by name, not position.
pub(crate) static BUILTINS: &[BuiltinInfo] = &[
  BuiltinInfo { name: "assert", category: Category::Core, polyfill: Some("assert"), subpaths: &["strict"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "async_hooks", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Partial, bun: Support::Partial },
  BuiltinInfo { name: "buffer", category: Category::Core, polyfill: Some("buffer"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "child_process", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Partial, bun: Support::Yes },
  BuiltinInfo { name: "cluster", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::Partial },
  BuiltinInfo { name: "console", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "constants", category: Category::Core, polyfill: Some("constants-browserify"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "crypto", category: Category::Core, polyfill: Some("crypto-browserify"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "dgram", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Partial },
  BuiltinInfo { name: "diagnostics_channel", category: Category::Experimental, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Partial, bun: Support::Partial },
  BuiltinInfo { name: "dns", category: Category::Core, polyfill: None, subpaths: &["promises"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "domain", category: Category::Deprecated, polyfill: Some("domain-browser"), subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
  BuiltinInfo { name: "events", category: Category::Core, polyfill: Some("events"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "fs", category: Category::Core, polyfill: None, subpaths: &["promises"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "http", category: Category::Core, polyfill: Some("stream-http"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "http2", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Partial, bun: Support::Partial },
  BuiltinInfo { name: "https", category: Category::Core, polyfill: Some("https-browserify"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "inspector", category: Category::Core, polyfill: None, subpaths: &["promises"], node: Support::Yes, deno: Support::Partial, bun: Support::No },
  BuiltinInfo { name: "module", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "net", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "os", category: Category::Core, polyfill: Some("os-browserify"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "path", category: Category::Core, polyfill: Some("path-browserify"), subpaths: &["posix", "win32"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "perf_hooks", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "process", category: Category::Core, polyfill: Some("process"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "punycode", category: Category::Deprecated, polyfill: Some("punycode"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "querystring", category: Category::Core, polyfill: Some("querystring-es3"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "readline", category: Category::Core, polyfill: None, subpaths: &["promises"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "repl", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::Partial },
  BuiltinInfo { name: "stream", category: Category::Core, polyfill: Some("stream-browserify"), subpaths: &["promises", "web"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "string_decoder", category: Category::Core, polyfill: Some("string_decoder"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "sys", category: Category::Deprecated, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
  BuiltinInfo { name: "timers", category: Category::Core, polyfill: Some("timers-browserify"), subpaths: &["promises"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "tls", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "trace_events", category: Category::Experimental, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
  BuiltinInfo { name: "tty", category: Category::Core, polyfill: Some("tty-browserify"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "url", category: Category::Core, polyfill: Some("url"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "util", category: Category::Core, polyfill: Some("util"), subpaths: &["types"], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "v8", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Partial, bun: Support::Partial },
  BuiltinInfo { name: "vm", category: Category::Core, polyfill: Some("vm-browserify"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "wasi", category: Category::Experimental, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::Partial },
  BuiltinInfo { name: "worker_threads", category: Category::Worker, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "zlib", category: Category::Core, polyfill: Some("browserify-zlib"), subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "test", category: Category::Core, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "sea", category: Category::Experimental, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::Partial },
  BuiltinInfo { name: "sqlite", category: Category::Experimental, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::Yes, bun: Support::Yes },
  BuiltinInfo { name: "quic", category: Category::Experimental, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
  BuiltinInfo { name: "domain_tools", category: Category::Internal, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
  BuiltinInfo { name: "_http_common", category: Category::Internal, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
  BuiltinInfo { name: "_stream_wrap", category: Category::Internal, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
  BuiltinInfo { name: "freelist", category: Category::Internal, polyfill: None, subpaths: &[], node: Support::Yes, deno: Support::No, bun: Support::No },
];
