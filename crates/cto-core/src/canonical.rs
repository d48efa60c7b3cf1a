//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the comparison form of metamodel documents. Two
//! documents are structurally equal exactly when their canonical bytes are
//! equal: object keys are sorted, separators are compact, and numbers use
//! the RFC 8785 (JSON Canonicalization Scheme) rendering.
//!
//! ## Invariant
//!
//! The inner `Vec<u8>` is private. The only constructors are
//! [`CanonicalBytes::new`] and [`CanonicalBytes::from_value`], both of which
//! route through `serde_jcs`. Field order in the source struct, `serde_json`
//! map ordering, and pretty-printing therefore never leak into comparisons.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - Keys are sorted lexicographically by UTF-16 code units (RFC 8785 §3.2.3).
/// - No insignificant whitespace.
/// - The bytes are valid UTF-8.
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
        Self::from_value(&value)
    }

    /// Construct canonical bytes from an already-built JSON tree.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if JCS
    /// serialization fails.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        let s = serde_jcs::to_string(value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the canonical bytes as text.
    pub fn as_str(&self) -> &str {
        // Built from a `String` in `from_value`; never fails.
        std::str::from_utf8(&self.0).unwrap_or_default()
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

impl std::fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_bytes_sorted_keys() {
        let data = serde_json::json!({"namespace": "ns.a", "$class": "concerto.metamodel.Model"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        assert_eq!(
            cb.as_str(),
            r#"{"$class":"concerto.metamodel.Model","namespace":"ns.a"}"#
        );
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = serde_json::json!({
            "type": {"namespace": "ns.a", "name": "Foo"},
            "isArray": false
        });
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        assert_eq!(
            cb.as_str(),
            r#"{"isArray":false,"type":{"name":"Foo","namespace":"ns.a"}}"#
        );
    }

    #[test]
    fn test_floats_accepted() {
        let data = serde_json::json!({"defaultValue": 1.5});
        let cb = CanonicalBytes::new(&data).expect("floats are part of the metamodel");
        assert_eq!(cb.as_str(), r#"{"defaultValue":1.5}"#);
    }

    #[test]
    fn test_integral_float_matches_integer() {
        // RFC 8785 renders 2.0 and 2 identically.
        let a = CanonicalBytes::new(&serde_json::json!({"v": 2.0})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"v": 2})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_field_order_does_not_matter() {
        #[derive(Serialize)]
        struct A {
            name: &'static str,
            namespace: &'static str,
        }
        #[derive(Serialize)]
        struct B {
            namespace: &'static str,
            name: &'static str,
        }
        let a = CanonicalBytes::new(&A { name: "Foo", namespace: "ns" }).unwrap();
        let b = CanonicalBytes::new(&B { namespace: "ns", name: "Foo" }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }

    #[test]
    fn test_unicode_passthrough() {
        let data = serde_json::json!({"name": "Caf\u{00e9}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(cb.as_str().contains('\u{00e9}'));
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
            any::<i32>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z$]{1,8}", inner, 0..6).prop_map(|m| {
                    Value::Object(m.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        /// Canonicalization is deterministic.
        #[test]
        fn canonical_bytes_deterministic(value in json_value()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// Canonical bytes parse back to the same JSON tree.
        #[test]
        fn canonical_bytes_reparse(value in json_value()) {
            let cb = CanonicalBytes::new(&value).unwrap();
            let parsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
