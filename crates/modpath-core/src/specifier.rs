//! Specifier classification.
//!
//! Splits a raw import specifier into one of: built-in, unknown reserved
//! built-in, relative, absolute, or bare (package name + optional subpath).

use crate::options::Platform;

/// Built-in modules importable with or without the `node:` prefix.
pub const NODE_BUILTINS: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
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

/// Built-ins that only exist behind the `node:` prefix.
pub const NODE_PREFIX_ONLY_BUILTINS: &[&str] = &["sea", "sqlite", "test", "test/reporters"];

/// Bun built-ins behind the `bun:` prefix.
pub const BUN_PREFIXED_BUILTINS: &[&str] = &["ffi", "jsc", "sqlite", "test", "wrap"];

pub const NODE_PREFIX: &str = "node:";
pub const BUN_PREFIX: &str = "bun:";

/// A classified specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specifier<'a> {
    /// Empty after stripping the query string.
    Empty,
    /// Platform built-in; resolves without a path.
    Builtin,
    /// Uses a reserved prefix but names no known built-in.
    UnknownBuiltin,
    /// Starts with `.`.
    Relative(&'a str),
    /// Starts with `/`.
    Absolute(&'a str),
    /// Package specifier.
    Bare {
        request: &'a str,
        package: &'a str,
        subpath: Option<&'a str>,
    },
}

impl Specifier<'_> {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Builtin => "builtin",
            Self::UnknownBuiltin => "unknown_builtin",
            Self::Relative(_) => "relative",
            Self::Absolute(_) => "absolute",
            Self::Bare { .. } => "bare",
        }
    }
}

/// Remove a bundler-style query suffix: everything from the last `?` onward.
#[must_use]
pub fn strip_query(spec: &str) -> &str {
    match spec.rfind('?') {
        Some(index) => &spec[..index],
        None => spec,
    }
}

/// Whether `spec` (query already stripped) names a built-in on `platform`.
#[must_use]
pub fn is_builtin(spec: &str, platform: Platform) -> bool {
    if let Some(name) = spec.strip_prefix(NODE_PREFIX) {
        return NODE_BUILTINS.contains(&name) || NODE_PREFIX_ONLY_BUILTINS.contains(&name);
    }

    if platform == Platform::Bun {
        if spec == "bun" {
            return true;
        }
        if let Some(name) = spec.strip_prefix(BUN_PREFIX) {
            return BUN_PREFIXED_BUILTINS.contains(&name);
        }
    }

    NODE_BUILTINS.contains(&spec)
}

/// Whether `spec` starts with a prefix reserved for built-ins on `platform`.
#[must_use]
pub fn has_reserved_prefix(spec: &str, platform: Platform) -> bool {
    spec.starts_with(NODE_PREFIX) || (platform == Platform::Bun && spec.starts_with(BUN_PREFIX))
}

/// Classify a raw specifier.
#[must_use]
pub fn classify(raw: &str, platform: Platform) -> Specifier<'_> {
    let spec = strip_query(raw);

    if spec.is_empty() {
        return Specifier::Empty;
    }

    if is_builtin(spec, platform) {
        return Specifier::Builtin;
    }

    if has_reserved_prefix(spec, platform) {
        return Specifier::UnknownBuiltin;
    }

    if spec.starts_with('.') {
        return Specifier::Relative(spec);
    }

    if spec.starts_with('/') {
        return Specifier::Absolute(spec);
    }

    let (package, subpath) = parse_bare_specifier(spec);
    Specifier::Bare {
        request: spec,
        package,
        subpath,
    }
}

/// Parse a bare specifier into package name and optional subpath.
///
/// `lodash/fp` -> (`lodash`, `fp`), `@scope/pkg/sub` -> (`@scope/pkg`, `sub`).
#[must_use]
pub fn parse_bare_specifier(spec: &str) -> (&str, Option<&str>) {
    if spec.starts_with('@') {
        let mut slash_count = 0;
        for (i, c) in spec.char_indices() {
            if c == '/' {
                slash_count += 1;
                if slash_count == 2 {
                    return (&spec[..i], Some(&spec[i + 1..]));
                }
            }
        }
        return (spec, None);
    }

    if let Some(pos) = spec.find('/') {
        (&spec[..pos], Some(&spec[pos + 1..]))
    } else {
        (spec, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("module?query"), "module");
        assert_eq!(strip_query("module?query=value?more=params"), "module?query=value");
        assert_eq!(strip_query("module"), "module");
        assert_eq!(strip_query(""), "");
        assert_eq!(strip_query("./style.css?inline"), "./style.css");
    }

    #[test]
    fn test_node_builtins() {
        for name in ["fs", "node:fs", "path", "node:path", "fs/promises", "node:test"] {
            assert_eq!(classify(name, Platform::Node), Specifier::Builtin, "{name}");
        }
        assert_eq!(classify("fs?raw", Platform::Node), Specifier::Builtin);
        assert!(!is_builtin("test", Platform::Node));
    }

    #[test]
    fn test_unknown_node_prefixed() {
        assert_eq!(
            classify("node:non-exist-module", Platform::Node),
            Specifier::UnknownBuiltin
        );
        assert_eq!(classify("node:", Platform::Node), Specifier::UnknownBuiltin);
    }

    #[test]
    fn test_bun_prefix_depends_on_platform() {
        assert_eq!(classify("bun:sqlite", Platform::Bun), Specifier::Builtin);
        assert_eq!(classify("bun", Platform::Bun), Specifier::Builtin);
        assert_eq!(classify("bun:nope", Platform::Bun), Specifier::UnknownBuiltin);
        assert!(matches!(
            classify("bun:fs", Platform::Node),
            Specifier::Bare { package: "bun:fs", .. }
        ));
    }

    #[test]
    fn test_relative_and_absolute() {
        assert_eq!(classify("./a", Platform::Node), Specifier::Relative("./a"));
        assert_eq!(classify("../a?x", Platform::Node), Specifier::Relative("../a"));
        assert_eq!(classify("/abs/a", Platform::Node), Specifier::Absolute("/abs/a"));
        assert_eq!(classify("?only", Platform::Node), Specifier::Empty);
    }

    #[test]
    fn test_bare() {
        assert_eq!(
            classify("@scope/pkg/sub/file", Platform::Node),
            Specifier::Bare {
                request: "@scope/pkg/sub/file",
                package: "@scope/pkg",
                subpath: Some("sub/file"),
            }
        );
        assert_eq!(parse_bare_specifier("lodash"), ("lodash", None));
        assert_eq!(parse_bare_specifier("lodash/fp"), ("lodash", Some("fp")));
        assert_eq!(parse_bare_specifier("@scope/pkg"), ("@scope/pkg", None));
    }
}
