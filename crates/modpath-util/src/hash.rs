use serde::Serialize;
use serde_json::Value;

/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Hash any serializable value so that object key order does not matter.
///
/// The value is converted to JSON, written out with every object's keys
/// sorted, and the canonical text is hashed with BLAKE3. Array order is
/// significant. Returns `None` when the value cannot be serialized, such as
/// a path that is not valid UTF-8.
#[must_use]
pub fn stable_hash<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    let value = serde_json::to_value(value).ok()?;
    let mut out = String::new();
    write_canonical(&value, &mut out);
    Some(blake3_bytes(out.as_bytes()))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blake3_bytes() {
        let hash = blake3_bytes(b"hello world");
        assert_eq!(
            hash,
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_stable_hash_same_value() {
        let obj = json!({"a": 1, "b": "string", "c": [1, 2, 3], "d": {"e": "f"}});
        assert_eq!(stable_hash(&obj), stable_hash(&obj));
    }

    #[test]
    fn test_stable_hash_ignores_key_order() {
        let a = json!({"a": 1, "b": "string", "c": [1, 2, 3], "d": {"e": "f", "g": null}});
        let b = json!({"d": {"g": null, "e": "f"}, "c": [1, 2, 3], "b": "string", "a": 1});
        assert_eq!(stable_hash(&a), stable_hash(&b));
    }

    #[test]
    fn test_stable_hash_differs_on_value() {
        let a = json!({"a": 1, "b": "string"});
        let b = json!({"a": 2, "b": "string"});
        assert_ne!(stable_hash(&a), stable_hash(&b));
    }

    #[test]
    fn test_stable_hash_array_order_matters() {
        assert_ne!(stable_hash(&json!(["x", "y"])), stable_hash(&json!(["y", "x"])));
    }

    #[test]
    #[cfg(unix)]
    fn test_stable_hash_rejects_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use std::path::PathBuf;

        let a = PathBuf::from(OsStr::from_bytes(b"/repo/a\xff"));
        let b = PathBuf::from(OsStr::from_bytes(b"/other/b\xfe"));
        assert_eq!(stable_hash(&a), None);
        assert_eq!(stable_hash(&vec![b]), None);
        assert!(stable_hash(&PathBuf::from("/repo/a")).is_some());
    }
}
