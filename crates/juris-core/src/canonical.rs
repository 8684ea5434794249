//! # Canonical Serialization
//!
//! `CanonicalBytes` is the sole construction path for bytes fed into digest
//! computation. The inner buffer is private; the only constructor runs the
//! coercion pass below and then serializes with `serde_jcs` (RFC 8785:
//! sorted keys, compact separators).
//!
//! ## Coercion rules
//!
//! 1. `null`, `bool`, `string`, integers pass through unchanged.
//! 2. Floats with an integral value become integers (`3.0` → `3`).
//! 3. Other floats become their decimal string (`1500.5` → `"1500.5"`).
//!    Fee amounts and percentages show up in entity snapshots, and a float
//!    rendering that differs between producers must not change a digest.
//! 4. Objects and arrays are coerced recursively.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by the canonicalization pipeline.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - No non-integral float appears as a JSON number.
/// - Object keys are sorted, separators are compact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value);
        let s = serde_jcs::to_string(&coerced)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn coerce_json_value(value: Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => value,
        Value::Number(n) => coerce_number(n),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_json_value(v)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(coerce_json_value).collect()),
    }
}

fn coerce_number(n: Number) -> Value {
    if n.is_i64() || n.is_u64() {
        return Value::Number(n);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
        _ => Value::String(n.to_string()),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            (-1.0e9f64..1.0e9f64).prop_map(|f| serde_json::json!(f)),
            "[a-zA-Z0-9_ ]{0,30}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,10}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonicalization_is_deterministic(value in json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_bytes_are_valid_json(value in json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let reparsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(reparsed.is_ok());
        }
    }
}
