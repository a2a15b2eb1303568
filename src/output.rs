//! Output Naming Config - Shape-Preserving Normalization
//!
//! The host may hand us no output config, one record, or an ordered list of
//! records. Whatever comes in goes back out in the same shape.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::templates::{present_template, NamingField, NamingTemplate};

/// Naming rules for one output target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    #[serde(
        default,
        deserialize_with = "present_template",
        skip_serializing_if = "Option::is_none"
    )]
    pub asset_file_names: Option<NamingTemplate>,
    #[serde(
        default,
        deserialize_with = "present_template",
        skip_serializing_if = "Option::is_none"
    )]
    pub chunk_file_names: Option<NamingTemplate>,
    #[serde(
        default,
        deserialize_with = "present_template",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_file_names: Option<NamingTemplate>,
    /// Every other output option, carried through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputRecord {
    pub fn field(&self, field: NamingField) -> Option<&NamingTemplate> {
        match field {
            NamingField::Asset => self.asset_file_names.as_ref(),
            NamingField::Chunk => self.chunk_file_names.as_ref(),
            NamingField::Entry => self.entry_file_names.as_ref(),
        }
    }

    pub fn field_mut(&mut self, field: NamingField) -> &mut Option<NamingTemplate> {
        match field {
            NamingField::Asset => &mut self.asset_file_names,
            NamingField::Chunk => &mut self.chunk_file_names,
            NamingField::Entry => &mut self.entry_file_names,
        }
    }

    pub fn with_field(mut self, field: NamingField, template: impl Into<NamingTemplate>) -> Self {
        *self.field_mut(field) = Some(template.into());
        self
    }

    /// A copy of this record with every naming pattern hash-free.
    pub fn normalized(&self) -> OutputRecord {
        let mut next = self.clone();
        for field in NamingField::ALL {
            if let Some(template) = next.field_mut(field) {
                let rewritten = template.normalized();
                if rewritten != *template {
                    debug!(
                        field = %field,
                        before = ?template.as_pattern(),
                        after = ?rewritten.as_pattern(),
                        "stripped hash segment"
                    );
                    *template = rewritten;
                }
            }
        }
        next
    }
}

/// `build.rollupOptions.output` as the host build tool shapes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OutputConfig {
    /// Key not present.
    #[default]
    Absent,
    Single(OutputRecord),
    Many(Vec<OutputRecord>),
    /// Present but not records: `null`, `false`, `""`, or a list holding a
    /// non-object. Never rewritten, written back as it came.
    Opaque(Value),
}

impl OutputConfig {
    pub fn is_absent(&self) -> bool {
        matches!(self, OutputConfig::Absent)
    }

    /// Whether there is anything to normalize.
    pub fn has_records(&self) -> bool {
        matches!(self, OutputConfig::Single(_) | OutputConfig::Many(_))
    }

    /// Records in order, regardless of shape.
    pub fn records(&self) -> &[OutputRecord] {
        match self {
            OutputConfig::Absent | OutputConfig::Opaque(_) => &[],
            OutputConfig::Single(record) => std::slice::from_ref(record),
            OutputConfig::Many(records) => records,
        }
    }

    /// Normalize every record. `Single` stays `Single`, `Many` keeps length
    /// and order, `Absent` and `Opaque` come back unchanged.
    pub fn normalized(&self) -> OutputConfig {
        match self {
            OutputConfig::Absent => OutputConfig::Absent,
            OutputConfig::Single(record) => OutputConfig::Single(record.normalized()),
            OutputConfig::Many(records) => {
                OutputConfig::Many(records.iter().map(OutputRecord::normalized).collect())
            }
            OutputConfig::Opaque(value) => OutputConfig::Opaque(value.clone()),
        }
    }
}

impl Serialize for OutputConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutputConfig::Absent => serializer.serialize_none(),
            OutputConfig::Single(record) => record.serialize(serializer),
            OutputConfig::Many(records) => records.serialize(serializer),
            OutputConfig::Opaque(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for OutputConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = if value.is_object() {
            serde_json::from_value(value.clone()).map(OutputConfig::Single).ok()
        } else if value.as_array().map_or(false, |items| items.iter().all(Value::is_object)) {
            serde_json::from_value(value.clone()).map(OutputConfig::Many).ok()
        } else {
            None
        };
        Ok(parsed.unwrap_or(OutputConfig::Opaque(value)))
    }
}
