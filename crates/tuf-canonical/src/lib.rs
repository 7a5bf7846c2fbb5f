//! Canonical JSON serialization
//!
//! Every byte string that is hashed or signed in this workspace is produced
//! here. The encoding is deterministic: object keys are sorted
//! lexicographically by code point, there is no insignificant whitespace,
//! strings use the minimal escape set (`\\` and `\"` only), and numbers must
//! be integers. Two semantically equal documents always serialize to
//! identical bytes.
//!
//! # Example
//!
//! ```
//! let value = serde_json::json!({"b": 2, "a": 1});
//! let bytes = tuf_canonical::to_canonical_json(&value).unwrap();
//! assert_eq!(bytes, br#"{"a":1,"b":2}"#);
//! ```

mod error;

pub use error::{Error, Result};

use serde::Serialize;
use serde_json::Value;

/// Serialize a value to canonical JSON bytes.
///
/// The value is first converted to a generic JSON tree, then written out in
/// canonical form. Inputs containing non-integer numbers are rejected.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let tree = serde_json::to_value(value)?;
    value_to_canonical_json(&tree)
}

/// Serialize an already-parsed JSON tree to canonical bytes.
pub fn value_to_canonical_json(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_value(&mut out, value)?;
    Ok(out)
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // serde_json may back its map with an insertion-ordered type
            // depending on feature unification, so sort explicitly.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(out, key);
                out.push(b':');
                write_value(out, &map[key])?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_number(out: &mut Vec<u8>, n: &serde_json::Number) -> Result<()> {
    if let Some(i) = n.as_i64() {
        out.extend_from_slice(i.to_string().as_bytes());
        return Ok(());
    }
    if let Some(u) = n.as_u64() {
        out.extend_from_slice(u.to_string().as_bytes());
        return Ok(());
    }
    // Floats with an exact integer value are emitted without a decimal
    // point; anything else has no canonical representation.
    if let Some(f) = n.as_f64() {
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            out.extend_from_slice((f as i64).to_string().as_bytes());
            return Ok(());
        }
    }
    Err(Error::NonIntegerNumber(n.to_string()))
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.push(b'"');
    for byte in s.bytes() {
        match byte {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            // Control characters and all other code points pass through
            // verbatim; canonical JSON escapes nothing else.
            _ => out.push(byte),
        }
    }
    out.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canon(v: &Value) -> String {
        String::from_utf8(value_to_canonical_json(v).unwrap()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(canon(&json!(null)), "null");
        assert_eq!(canon(&json!(true)), "true");
        assert_eq!(canon(&json!(false)), "false");
        assert_eq!(canon(&json!(0)), "0");
        assert_eq!(canon(&json!(-42)), "-42");
        assert_eq!(canon(&json!(u64::MAX)), u64::MAX.to_string());
        assert_eq!(canon(&json!("hi")), "\"hi\"");
    }

    #[test]
    fn test_keys_sorted() {
        let v = json!({"b": 2, "a": 1, "ab": 3});
        assert_eq!(canon(&v), r#"{"a":1,"ab":3,"b":2}"#);
    }

    #[test]
    fn test_nested_structures() {
        let v = json!({"z": [1, {"y": null, "x": "s"}], "a": {}});
        assert_eq!(canon(&v), r#"{"a":{},"z":[1,{"x":"s","y":null}]}"#);
    }

    #[test]
    fn test_minimal_escapes() {
        assert_eq!(canon(&json!("a\"b")), "\"a\\\"b\"");
        assert_eq!(canon(&json!("a\\b")), "\"a\\\\b\"");
        // Newlines and tabs are written raw, not escaped.
        assert_eq!(canon(&json!("a\nb\tc")), "\"a\nb\tc\"");
    }

    #[test]
    fn test_unicode_passthrough() {
        assert_eq!(canon(&json!("héllo ☃")), "\"héllo ☃\"");
    }

    #[test]
    fn test_integral_float_accepted() {
        let v: Value = serde_json::from_str("2.0").unwrap();
        assert_eq!(canon(&v), "2");
    }

    #[test]
    fn test_fractional_float_rejected() {
        let v: Value = serde_json::from_str("2.5").unwrap();
        assert!(matches!(
            value_to_canonical_json(&v),
            Err(Error::NonIntegerNumber(_))
        ));
    }

    #[test]
    fn test_no_whitespace() {
        let v: Value = serde_json::from_str("{ \"a\" : [ 1 , 2 ] }").unwrap();
        assert_eq!(canon(&v), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_deterministic_across_parses() {
        let a: Value = serde_json::from_str(r#"{"x":1,"y":[true,"s"]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{ "y": [ true, "s" ], "x": 1 }"#).unwrap();
        assert_eq!(
            value_to_canonical_json(&a).unwrap(),
            value_to_canonical_json(&b).unwrap()
        );
    }

    #[test]
    fn test_serialize_from_struct() {
        #[derive(serde::Serialize)]
        struct Doc {
            b: u32,
            a: &'static str,
        }
        let bytes = to_canonical_json(&Doc { b: 7, a: "x" }).unwrap();
        assert_eq!(bytes, br#"{"a":"x","b":7}"#);
    }
}
