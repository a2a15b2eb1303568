//! Naming Fingerprints - SHA-256 Over Canonical JSON
//!
//! Two builds with the same naming rules produce the same fingerprint, which is
//! what lets repeated LittleFS images overwrite the same paths.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{json, Value, to_string};

use crate::output::{OutputConfig, OutputRecord};
use crate::templates::NamingField;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// The naming-relevant view of an output config. Computed functions appear as
/// `"<computed>"`, so configs holding them still fingerprint.
pub fn naming_summary(output: &OutputConfig) -> Value {
    let summarize = |record: &OutputRecord| {
        let mut fields = serde_json::Map::new();
        for field in NamingField::ALL {
            if let Some(template) = record.field(field) {
                fields.insert(field.key().to_string(), template.summary());
            }
        }
        Value::Object(fields)
    };

    match output {
        OutputConfig::Absent => json!({ "shape": "absent" }),
        OutputConfig::Single(record) => json!({ "shape": "single", "records": [summarize(record)] }),
        OutputConfig::Many(records) => json!({
            "shape": "many",
            "records": records.iter().map(summarize).collect::<Vec<_>>(),
        }),
        OutputConfig::Opaque(value) => json!({ "shape": "opaque", "value": value }),
    }
}

/// Fingerprint of the naming rules in an output config.
pub fn naming_fingerprint(output: &OutputConfig) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(&naming_summary(output))?;
    Ok(sha256_hex(canonical.as_bytes()))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
