//! LittleFS Naming - Stable Output Names for Embedded UI Builds
//!
//! # Guarantees
//! 1. `.[hash]` Is Stripped From Every Naming Pattern
//! 2. Shape Is Preserved (single stays single, lists keep order)
//! 3. Functions And Unknown Values Pass Through Untouched
//! 4. Absence Is A No-Op At Every Level
//! 5. Production Builds Only, Decided At Assembly

pub mod templates;
pub mod output;
pub mod config;
pub mod plugin;
pub mod validation;
pub mod hashing;
pub mod logging;
pub mod pipeline;

pub use templates::{NamingTemplate, NamingField, NamingFn, PreRendered, strip_hash_segment};
pub use output::{OutputConfig, OutputRecord};
pub use config::{BuildConfig, BuildOptions, RollupOptions, Slot, Command, ConfigEnv};
pub use plugin::{Plugin, PluginStage, ApplyMode, LittleFsPlugin};
pub use validation::{NamingDiagnostic, NamingRule, DiagnosticSeverity, Validator};
pub use hashing::{naming_fingerprint, canonical_json, sha256_hex};
pub use pipeline::{BuildPipeline, BuildReport, PipelineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
