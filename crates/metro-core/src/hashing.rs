//! Canonicalización JSON y helpers de hash para los fingerprints de steps.
//!
//! Notas:
//! - Ordena claves de objetos (BTreeMap) y mantiene el orden de arrays, de
//!   modo que los bytes del hash son estables bajo el orden de inserción.
//! - El `config_hash` del sidecar usa SHA-256 (hex en minúsculas, 64 chars).
//! - No usar NaN/Inf en los valores a canonicalizar.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use serde_json::Value;

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap_or_default(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let mut tree = BTreeMap::new();
            for (k, v) in map {
                tree.insert(k, to_canonical_json(v));
            }
            let items: Vec<String> = tree
                .into_iter()
                .map(|(k, v)| format!("{}:{}", serde_json::to_string(&k).unwrap_or_default(), v))
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

/// SHA-256 de un string, como hex en minúsculas.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Canonicaliza y hashea un JSON Value en un solo paso.
pub fn hash_value(v: &Value) -> String {
    sha256_hex(&to_canonical_json(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_object_keys() {
        let a = json!({"b": 1, "a": [2, 3], "c": {"z": null, "y": "s"}});
        assert_eq!(to_canonical_json(&a), r#"{"a":[2,3],"b":1,"c":{"y":"s","z":null}}"#);
    }

    #[test]
    fn hash_is_stable_under_insertion_order() {
        let mut m1 = serde_json::Map::new();
        m1.insert("x".into(), json!(1));
        m1.insert("y".into(), json!(2));
        let mut m2 = serde_json::Map::new();
        m2.insert("y".into(), json!(2));
        m2.insert("x".into(), json!(1));
        assert_eq!(hash_value(&Value::Object(m1)), hash_value(&Value::Object(m2)));
    }

    #[test]
    fn sha256_is_lowercase_hex_64() {
        let h = sha256_hex("metropolis");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
