//! Package manifest `exports` and `imports` field evaluation.
//!
//! Targets are returned as candidate relative paths (always starting with
//! `./`) in the order they should be tried:
//! - string shorthand and `"."` root entries
//! - exact subpath keys, then `*` patterns (most specific first)
//! - condition objects, walked in configured condition priority
//! - arrays, each element tried in order
//!
//! A matched key whose targets are all invalid or `null` yields no candidates.

use serde_json::{Map, Value};

/// Evaluate `exports` for a subpath (`"."` or `"./feature"`).
///
/// Returns `None` when the manifest has no `exports` field, so the caller can
/// fall back to main fields. `Some(vec![])` means `exports` exists but does not
/// expose the subpath.
#[must_use]
pub fn resolve_exports(manifest: &Value, subpath: &str, conditions: &[String]) -> Option<Vec<String>> {
    let exports = manifest.get("exports")?;

    let Some(obj) = exports.as_object().filter(|obj| has_subpath_keys(obj)) else {
        // Sugar: the whole value is the "." entry.
        if subpath == "." {
            return Some(resolve_target(exports, conditions, None));
        }
        return Some(Vec::new());
    };

    Some(resolve_keyed(obj, subpath, conditions, "./"))
}

/// Evaluate `imports` for a `#`-prefixed specifier.
///
/// Returns `None` when there is no `imports` field or no key matches.
#[must_use]
pub fn resolve_imports(manifest: &Value, request: &str, conditions: &[String]) -> Option<Vec<String>> {
    if !request.starts_with('#') {
        return None;
    }
    let imports = manifest.get("imports")?.as_object()?;
    let found = resolve_keyed(imports, request, conditions, "#");
    (!found.is_empty()).then_some(found)
}

/// Exact key first, then the most specific single-`*` pattern key.
fn resolve_keyed(
    obj: &Map<String, Value>,
    request: &str,
    conditions: &[String],
    key_prefix: &str,
) -> Vec<String> {
    if !request.contains('*') {
        if let Some(target) = obj.get(request) {
            return resolve_target(target, conditions, None);
        }
    }

    let mut matches: Vec<(&str, &Value, &str)> = obj
        .iter()
        .filter(|(key, _)| key.starts_with(key_prefix))
        .filter(|(key, _)| key.chars().filter(|&c| c == '*').count() == 1)
        .filter_map(|(key, value)| {
            match_pattern(key, request).map(|star| (key.as_str(), value, star))
        })
        .collect();

    // Longest prefix before `*` wins, then longest key.
    matches.sort_by(|a, b| {
        let a_prefix = a.0.find('*').unwrap_or(0);
        let b_prefix = b.0.find('*').unwrap_or(0);
        b_prefix
            .cmp(&a_prefix)
            .then_with(|| b.0.len().cmp(&a.0.len()))
            .then_with(|| a.0.cmp(b.0))
    });

    matches
        .first()
        .map(|(_, target, star)| resolve_target(target, conditions, Some(*star)))
        .unwrap_or_default()
}

/// Whether an exports object is keyed by subpaths rather than conditions.
fn has_subpath_keys(obj: &Map<String, Value>) -> bool {
    obj.keys().any(|k| k.starts_with('.'))
}

/// Match a pattern key against a request.
///
/// Returns the `*` substitution value if matched.
/// E.g., pattern `"./features/*"` with subpath `"./features/foo"` returns `Some("foo")`.
fn match_pattern<'a>(pattern: &str, request: &'a str) -> Option<&'a str> {
    let star_pos = pattern.find('*')?;

    let prefix = &pattern[..star_pos];
    let suffix = &pattern[star_pos + 1..];

    if request.len() < prefix.len() + suffix.len() {
        return None;
    }
    let rest = request.strip_prefix(prefix)?;
    let star_value = rest.strip_suffix(suffix)?;

    // Reject empty star values
    if star_value.is_empty() {
        return None;
    }

    Some(star_value)
}

/// Collect candidate paths from a target value.
fn resolve_target(target: &Value, conditions: &[String], star: Option<&str>) -> Vec<String> {
    let mut out = Vec::new();
    collect_targets(target, conditions, star, &mut out);
    out
}

fn collect_targets(target: &Value, conditions: &[String], star: Option<&str>, out: &mut Vec<String>) {
    match target {
        Value::String(s) => {
            if let Some(path) = substitute(s, star) {
                if !out.contains(&path) {
                    out.push(path);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_targets(item, conditions, star, out);
            }
        }
        Value::Object(obj) => {
            for condition in conditions {
                if let Some(nested) = obj.get(condition.as_str()) {
                    collect_targets(nested, conditions, star, out);
                }
            }
        }
        _ => {}
    }
}

/// Substitute `*` and validate the resulting path.
///
/// Targets must start with `./` and must not escape the package with `..`.
fn substitute(target: &str, star: Option<&str>) -> Option<String> {
    if !target.starts_with("./") {
        return None;
    }

    let result = match star {
        Some(value) => target.replace('*', value),
        None => target.to_string(),
    };

    if result.split('/').any(|segment| segment == ".." || segment == "node_modules") {
        return None;
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_CONDITION_NAMES;
    use serde_json::json;

    fn conditions() -> Vec<String> {
        DEFAULT_CONDITION_NAMES
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    fn exports(pkg: &Value, subpath: &str) -> Option<Vec<String>> {
        resolve_exports(pkg, subpath, &conditions())
    }

    #[test]
    fn test_exports_string_root() {
        let pkg = json!({
            "name": "test",
            "exports": "./dist/index.js"
        });
        assert_eq!(exports(&pkg, "."), Some(vec!["./dist/index.js".to_string()]));
        assert_eq!(exports(&pkg, "./other"), Some(vec![]));
    }

    #[test]
    fn test_exports_dot_string() {
        let pkg = json!({
            "name": "test",
            "exports": { ".": "./a.js" }
        });
        assert_eq!(exports(&pkg, "."), Some(vec!["./a.js".to_string()]));
    }

    #[test]
    fn test_exports_conditions_in_priority_order() {
        let pkg = json!({
            "exports": {
                ".": {
                    "default": "./index.js",
                    "require": "./index.cjs",
                    "import": "./index.mjs",
                    "types": "./index.d.ts"
                }
            }
        });
        assert_eq!(
            exports(&pkg, "."),
            Some(vec![
                "./index.d.ts".to_string(),
                "./index.mjs".to_string(),
                "./index.cjs".to_string(),
                "./index.js".to_string(),
            ])
        );

        let only_require = vec!["require".to_string()];
        assert_eq!(
            resolve_exports(&pkg, ".", &only_require),
            Some(vec!["./index.cjs".to_string()])
        );
    }

    #[test]
    fn test_exports_conditions_at_root() {
        let pkg = json!({
            "exports": {
                "import": "./esm/index.js",
                "default": "./cjs/index.js"
            }
        });
        assert_eq!(
            exports(&pkg, "."),
            Some(vec!["./esm/index.js".to_string(), "./cjs/index.js".to_string()])
        );
        assert_eq!(exports(&pkg, "./feature"), Some(vec![]));
    }

    #[test]
    fn test_exports_nested_conditions_and_arrays() {
        let pkg = json!({
            "exports": {
                ".": {
                    "node": { "import": "./node.mjs" },
                    "default": ["invalid", "./fallback.js"]
                }
            }
        });
        assert_eq!(
            exports(&pkg, "."),
            Some(vec!["./node.mjs".to_string(), "./fallback.js".to_string()])
        );
    }

    #[test]
    fn test_exports_invalid_targets_ignored() {
        let pkg = json!({
            "exports": {
                "./abs": "/etc/passwd",
                "./bare": "lodash",
                "./up": "../outside.js",
                "./blocked": null
            }
        });
        for sub in ["./abs", "./bare", "./up", "./blocked"] {
            assert_eq!(exports(&pkg, sub), Some(vec![]), "{sub}");
        }
    }

    #[test]
    fn test_no_exports_field() {
        let pkg = json!({ "main": "./index.js" });
        assert_eq!(exports(&pkg, "."), None);
    }

    #[test]
    fn test_exports_subpath_not_found() {
        let pkg = json!({
            "exports": {
                ".": "./index.js",
                "./lib-alias": "./lib/index.js"
            }
        });
        assert_eq!(
            exports(&pkg, "./lib-alias"),
            Some(vec!["./lib/index.js".to_string()])
        );
        assert_eq!(exports(&pkg, "./index"), Some(vec![]));
    }

    #[test]
    fn test_exports_pattern_specificity() {
        let pkg = json!({
            "exports": {
                "./*": "./dist/*.js",
                "./features/*": "./dist/features/*.js",
                "./features/*.css": "./styles/*.css"
            }
        });
        assert_eq!(
            exports(&pkg, "./features/button"),
            Some(vec!["./dist/features/button.js".to_string()])
        );
        assert_eq!(
            exports(&pkg, "./features/button.css"),
            Some(vec!["./styles/button.css".to_string()])
        );
        assert_eq!(exports(&pkg, "./utils"), Some(vec!["./dist/utils.js".to_string()]));
    }

    #[test]
    fn test_exports_exact_before_pattern() {
        let pkg = json!({
            "exports": {
                "./*": "./dist/*.js",
                "./special": "./special.js"
            }
        });
        assert_eq!(exports(&pkg, "./special"), Some(vec!["./special.js".to_string()]));
    }

    #[test]
    fn test_exports_pattern_path_traversal_rejected() {
        let pkg = json!({ "exports": { "./*": "./dist/*" } });
        assert_eq!(exports(&pkg, "./../secret"), Some(vec![]));
    }

    #[test]
    fn test_imports_exact_and_pattern() {
        let pkg = json!({
            "imports": {
                "#internal": "./src/internal.js",
                "#utils/*": { "types": "./src/utils/*.d.ts", "default": "./src/utils/*.js" }
            }
        });
        let conditions = conditions();
        assert_eq!(
            resolve_imports(&pkg, "#internal", &conditions),
            Some(vec!["./src/internal.js".to_string()])
        );
        assert_eq!(
            resolve_imports(&pkg, "#utils/math", &conditions),
            Some(vec![
                "./src/utils/math.d.ts".to_string(),
                "./src/utils/math.js".to_string()
            ])
        );
        assert_eq!(resolve_imports(&pkg, "#missing", &conditions), None);
        assert_eq!(resolve_imports(&pkg, "internal", &conditions), None);
    }
}
