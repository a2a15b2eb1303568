//! Build Pipeline - Assembly and the Config Phase
//!
//! Plugins are filtered by apply mode and ordered by stage exactly once, in
//! `assemble`. `run_config` then runs every config hook to completion in that
//! order before anything downstream sees the config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{BuildConfig, Command, ConfigEnv};
use crate::hashing::naming_fingerprint;
use crate::output::OutputConfig;
use crate::plugin::{LittleFsPlugin, Plugin};
use crate::validation::{NamingDiagnostic, Validator};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read build config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid build config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What one config phase did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub command: Command,
    pub plugins: Vec<String>,
    pub naming_before: String,
    pub naming_after: String,
    pub diagnostics: Vec<NamingDiagnostic>,
}

impl BuildReport {
    /// Whether the config phase changed any output name.
    pub fn naming_changed(&self) -> bool {
        self.naming_before != self.naming_after
    }
}

pub struct BuildPipeline {
    env: ConfigEnv,
    plugins: Vec<Box<dyn Plugin>>,
    validator: Validator,
}

impl BuildPipeline {
    /// Keep the plugins that apply to `env.command`, ordered pre, normal, post.
    /// Registration order is kept within a stage.
    pub fn assemble(env: ConfigEnv, plugins: Vec<Box<dyn Plugin>>) -> Self {
        let mut plugins: Vec<_> = plugins
            .into_iter()
            .filter(|p| {
                let applies = p.apply().applies_to(env.command);
                if !applies {
                    debug!(plugin = p.name(), command = %env.command, "plugin skipped for command");
                }
                applies
            })
            .collect();
        plugins.sort_by_key(|p| p.stage());

        Self {
            env,
            plugins,
            validator: Validator::new(),
        }
    }

    /// Pipeline holding only the LittleFS naming plugin.
    pub fn littlefs(env: ConfigEnv) -> Self {
        Self::assemble(env, vec![Box::new(LittleFsPlugin)])
    }

    pub fn env(&self) -> &ConfigEnv {
        &self.env
    }

    /// Plugin names in run order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Run every config hook against `config`, in place.
    pub fn run_config(&self, config: &mut BuildConfig) -> Result<BuildReport, PipelineError> {
        let before = naming_fingerprint(config.output().unwrap_or(&OutputConfig::Absent))?;

        for plugin in &self.plugins {
            debug!(plugin = plugin.name(), stage = ?plugin.stage(), "running config hook");
            plugin.config(config, &self.env);
        }

        let output = config.output().unwrap_or(&OutputConfig::Absent);
        let after = naming_fingerprint(output)?;
        let diagnostics = self.validator.check(output);

        let report = BuildReport {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            command: self.env.command,
            plugins: self.plugin_names().into_iter().map(String::from).collect(),
            naming_before: before,
            naming_after: after,
            diagnostics,
        };

        info!(
            command = %report.command,
            plugins = report.plugins.len(),
            naming_changed = report.naming_changed(),
            diagnostics = report.diagnostics.len(),
            "config phase complete"
        );

        Ok(report)
    }
}

impl Default for BuildPipeline {
    fn default() -> Self {
        Self::littlefs(ConfigEnv::build())
    }
}
