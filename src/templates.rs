//! Naming Templates - What the Bundler Names Files With
//!
//! A template is either a string pattern, a computed naming function, or
//! some other value the host handed us. Only patterns are ever rewritten.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// The literal segment stripped from patterns.
pub const HASH_SEGMENT: &str = ".[hash]";

/// Placeholder token the bundler substitutes with a content digest.
pub const HASH_TOKEN: &str = "[hash";

/// Artifact class a naming field governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingField {
    Asset,
    Chunk,
    Entry,
}

impl NamingField {
    pub const ALL: [NamingField; 3] = [NamingField::Asset, NamingField::Chunk, NamingField::Entry];

    /// Key used by the host configuration object.
    pub fn key(&self) -> &'static str {
        match self {
            NamingField::Asset => "assetFileNames",
            NamingField::Chunk => "chunkFileNames",
            NamingField::Entry => "entryFileNames",
        }
    }
}

impl fmt::Display for NamingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What the bundler knows about an output file before naming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRendered {
    pub name: String,
    pub kind: NamingField,
}

/// Computed naming function. Owned by the bundler; never called here.
pub type NamingFn = Arc<dyn Fn(&PreRendered) -> String + Send + Sync>;

#[derive(Clone)]
pub enum NamingTemplate {
    Pattern(String),
    Computed(NamingFn),
    /// Anything else the host put in a naming field, `null` included.
    Opaque(Value),
}

impl NamingTemplate {
    pub fn pattern(s: impl Into<String>) -> Self {
        NamingTemplate::Pattern(s.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&PreRendered) -> String + Send + Sync + 'static,
    {
        NamingTemplate::Computed(Arc::new(f))
    }

    pub fn as_pattern(&self) -> Option<&str> {
        match self {
            NamingTemplate::Pattern(s) => Some(s),
            _ => None,
        }
    }

    /// Strip the hash segment from a pattern. Every other variant comes back
    /// as the same value; a computed function keeps its `Arc`.
    pub fn normalized(&self) -> NamingTemplate {
        match self {
            NamingTemplate::Pattern(s) => match strip_hash_segment(s) {
                Cow::Borrowed(_) => self.clone(),
                Cow::Owned(stripped) => NamingTemplate::Pattern(stripped),
            },
            NamingTemplate::Computed(f) => NamingTemplate::Computed(Arc::clone(f)),
            NamingTemplate::Opaque(v) => NamingTemplate::Opaque(v.clone()),
        }
    }

    /// Stable textual form used for fingerprints and diagnostics.
    pub fn summary(&self) -> Value {
        match self {
            NamingTemplate::Pattern(s) => Value::String(s.clone()),
            NamingTemplate::Computed(_) => Value::String("<computed>".to_string()),
            NamingTemplate::Opaque(v) => v.clone(),
        }
    }
}

/// Remove the first `.[hash]` segment, leaving the rest contiguous.
///
/// `"chunks/[name].[hash].js"` becomes `"chunks/[name].js"`. Patterns without
/// the segment are returned borrowed and untouched. Other spellings such as
/// `-[hash]` or `[hash:8]` are left alone.
pub fn strip_hash_segment(pattern: &str) -> Cow<'_, str> {
    if pattern.contains(HASH_SEGMENT) {
        Cow::Owned(pattern.replacen(HASH_SEGMENT, "", 1))
    } else {
        Cow::Borrowed(pattern)
    }
}

impl fmt::Debug for NamingTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingTemplate::Pattern(s) => f.debug_tuple("Pattern").field(s).finish(),
            NamingTemplate::Computed(_) => f.write_str("Computed(<fn>)"),
            NamingTemplate::Opaque(v) => f.debug_tuple("Opaque").field(v).finish(),
        }
    }
}

impl PartialEq for NamingTemplate {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NamingTemplate::Pattern(a), NamingTemplate::Pattern(b)) => a == b,
            (NamingTemplate::Computed(a), NamingTemplate::Computed(b)) => Arc::ptr_eq(a, b),
            (NamingTemplate::Opaque(a), NamingTemplate::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for NamingTemplate {
    fn from(s: &str) -> Self {
        NamingTemplate::Pattern(s.to_string())
    }
}

impl From<String> for NamingTemplate {
    fn from(s: String) -> Self {
        NamingTemplate::Pattern(s)
    }
}

impl Serialize for NamingTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NamingTemplate::Pattern(s) => serializer.serialize_str(s),
            NamingTemplate::Opaque(v) => v.serialize(serializer),
            NamingTemplate::Computed(_) => Err(serde::ser::Error::custom(
                "computed naming function cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for NamingTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => NamingTemplate::Pattern(s),
            other => NamingTemplate::Opaque(other),
        })
    }
}

/// Field deserializer that keeps an explicit `null` as `Opaque(Null)` instead
/// of collapsing it into an absent field.
pub(crate) fn present_template<'de, D>(deserializer: D) -> Result<Option<NamingTemplate>, D::Error>
where
    D: Deserializer<'de>,
{
    NamingTemplate::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_removes_segment() {
        assert_eq!(strip_hash_segment("name.[hash].js"), "name.js");
        assert_eq!(
            strip_hash_segment("assets/[name].[hash][extname]"),
            "assets/[name][extname]"
        );
    }

    #[test]
    fn test_strip_without_segment_borrows() {
        let out = strip_hash_segment("[name].js");
        assert!(matches!(out, Cow::Borrowed("[name].js")));
    }

    #[test]
    fn test_strip_only_first_occurrence() {
        assert_eq!(strip_hash_segment("a.[hash].b.[hash].js"), "a.b.[hash].js");
    }

    #[test]
    fn test_other_spellings_untouched() {
        assert_eq!(strip_hash_segment("[name]-[hash].js"), "[name]-[hash].js");
        assert_eq!(strip_hash_segment("[name].[hash:8].js"), "[name].[hash:8].js");
    }

    #[test]
    fn test_computed_keeps_reference() {
        let t = NamingTemplate::computed(|info| format!("{}.js", info.name));
        let n = t.normalized();
        match (&t, &n) {
            (NamingTemplate::Computed(a), NamingTemplate::Computed(b)) => {
                assert!(Arc::ptr_eq(a, b))
            }
            _ => panic!("expected computed templates"),
        }
    }

    #[test]
    fn test_deserialize_shapes() {
        let p: NamingTemplate = serde_json::from_value(json!("x.[hash].js")).unwrap();
        assert_eq!(p, NamingTemplate::pattern("x.[hash].js"));

        let o: NamingTemplate = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(o, NamingTemplate::Opaque(json!(42)));
        assert_eq!(o.normalized(), o);
    }

    #[test]
    fn test_computed_does_not_serialize() {
        let t = NamingTemplate::computed(|_| String::new());
        assert!(serde_json::to_string(&t).is_err());
        assert_eq!(t.summary(), json!("<computed>"));
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(NamingField::Asset.key(), "assetFileNames");
        assert_eq!(NamingField::Chunk.to_string(), "chunkFileNames");
        assert_eq!(NamingField::Entry.key(), "entryFileNames");
    }
}
