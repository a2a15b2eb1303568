//! Naming Diagnostics - Rules Report, They Never Rewrite
//!
//! Rules produce structured diagnostics about naming fields.
//! Nothing here changes the config or fails the build.

use serde::{Deserialize, Serialize};

use crate::output::OutputConfig;
use crate::templates::{NamingField, NamingTemplate, HASH_TOKEN};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamingDiagnostic {
    pub rule: String,
    pub severity: DiagnosticSeverity,
    /// Index of the record within the output config.
    pub record: usize,
    pub field: NamingField,
    pub message: String,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

/// Naming rule trait - produces diagnostics for one field
pub trait NamingRule {
    fn name(&self) -> &'static str;
    fn check(&self, record: usize, field: NamingField, template: &NamingTemplate) -> Vec<NamingDiagnostic>;
}

// --- Concrete Rules ---

/// A hash placeholder spelled some other way than `.[hash]` survives stripping.
pub struct ResidualHashRule;

impl NamingRule for ResidualHashRule {
    fn name(&self) -> &'static str { "residual_hash" }

    fn check(&self, record: usize, field: NamingField, template: &NamingTemplate) -> Vec<NamingDiagnostic> {
        match template.as_pattern() {
            Some(pattern) if pattern.contains(HASH_TOKEN) => vec![NamingDiagnostic {
                rule: self.name().to_string(),
                severity: DiagnosticSeverity::Warning,
                record,
                field,
                message: "Hash placeholder remains; filenames will change between builds".to_string(),
                actual: Some(pattern.to_string()),
                remediation: vec![format!(
                    "Spell the placeholder as `.[hash]` in {} or drop it",
                    field
                )],
            }],
            _ => vec![],
        }
    }
}

pub struct EmptyPatternRule;

impl NamingRule for EmptyPatternRule {
    fn name(&self) -> &'static str { "empty_pattern" }

    fn check(&self, record: usize, field: NamingField, template: &NamingTemplate) -> Vec<NamingDiagnostic> {
        if template.as_pattern() != Some("") {
            return vec![];
        }
        vec![NamingDiagnostic {
            rule: self.name().to_string(),
            severity: DiagnosticSeverity::Warning,
            record,
            field,
            message: "Empty naming pattern".to_string(),
            actual: Some(String::new()),
            remediation: vec!["Use a pattern such as `[name].js`".to_string()],
        }]
    }
}

pub struct ComputedNamingRule;

impl NamingRule for ComputedNamingRule {
    fn name(&self) -> &'static str { "computed_naming" }

    fn check(&self, record: usize, field: NamingField, template: &NamingTemplate) -> Vec<NamingDiagnostic> {
        if !matches!(template, NamingTemplate::Computed(_)) {
            return vec![];
        }
        vec![NamingDiagnostic {
            rule: self.name().to_string(),
            severity: DiagnosticSeverity::Info,
            record,
            field,
            message: "Computed naming function is passed through unchecked".to_string(),
            actual: None,
            remediation: vec![],
        }]
    }
}

pub struct OpaqueValueRule;

impl NamingRule for OpaqueValueRule {
    fn name(&self) -> &'static str { "opaque_value" }

    fn check(&self, record: usize, field: NamingField, template: &NamingTemplate) -> Vec<NamingDiagnostic> {
        let NamingTemplate::Opaque(value) = template else {
            return vec![];
        };
        vec![NamingDiagnostic {
            rule: self.name().to_string(),
            severity: DiagnosticSeverity::Warning,
            record,
            field,
            message: "Naming field is neither a pattern nor a function".to_string(),
            actual: Some(value.to_string()),
            remediation: vec!["The bundler will reject or ignore this value".to_string()],
        }]
    }
}

/// Validator runs every rule over every naming field of every record
pub struct Validator {
    rules: Vec<Box<dyn NamingRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(ResidualHashRule),
                Box::new(EmptyPatternRule),
                Box::new(ComputedNamingRule),
                Box::new(OpaqueValueRule),
            ],
        }
    }

    pub fn check(&self, output: &OutputConfig) -> Vec<NamingDiagnostic> {
        let mut diagnostics = vec![];

        for (index, record) in output.records().iter().enumerate() {
            for field in NamingField::ALL {
                let Some(template) = record.field(field) else { continue };
                for rule in &self.rules {
                    diagnostics.extend(rule.check(index, field, template));
                }
            }
        }

        diagnostics
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn has_warnings(diagnostics: &[NamingDiagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == DiagnosticSeverity::Warning)
}
