//! Host Build Configuration
//!
//! Only the path down to `build.rollupOptions.output` is typed. Every other key
//! at every level lands in an `extra` map and is written back untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::output::OutputConfig;
use crate::pipeline::PipelineError;

/// One level of the host config. A key that holds something other than an
/// object (`null`, `false`, ...) is kept as `Raw` and written back as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Missing,
    Present(T),
    Raw(Value),
}

impl<T> Slot<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Slot::Missing)
    }

    pub fn present(&self) -> Option<&T> {
        match self {
            Slot::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn present_mut(&mut self) -> Option<&mut T> {
        match self {
            Slot::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Missing
    }
}

impl<T: Serialize> Serialize for Slot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Missing => serializer.serialize_none(),
            Slot::Present(value) => value.serialize(serializer),
            Slot::Raw(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Slot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(Slot::Raw(value));
        }
        Ok(match serde_json::from_value(value.clone()) {
            Ok(typed) => Slot::Present(typed),
            Err(_) => Slot::Raw(value),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Slot::is_missing")]
    pub build: Slot<BuildOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    #[serde(default, skip_serializing_if = "Slot::is_missing")]
    pub rollup_options: Slot<RollupOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupOptions {
    #[serde(default, skip_serializing_if = "OutputConfig::is_absent")]
    pub output: OutputConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildConfig {
    pub fn from_json_str(s: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(s).map_err(PipelineError::ConfigParse)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Build config holding just an output naming config.
    pub fn with_output(output: OutputConfig) -> Self {
        Self {
            build: Slot::Present(BuildOptions {
                rollup_options: Slot::Present(RollupOptions {
                    output,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// `build.rollupOptions.output`, if every level holds naming records.
    pub fn output(&self) -> Option<&OutputConfig> {
        self.build
            .present()
            .and_then(|b| b.rollup_options.present())
            .map(|r| &r.output)
            .filter(|o| o.has_records())
    }

    /// Mutable access without creating missing levels.
    pub fn output_mut(&mut self) -> Option<&mut OutputConfig> {
        self.build
            .present_mut()
            .and_then(|b| b.rollup_options.present_mut())
            .map(|r| &mut r.output)
            .filter(|o| o.has_records())
    }
}

/// What the host build tool was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Development server.
    Serve,
    /// Production build.
    Build,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Serve => f.write_str("serve"),
            Command::Build => f.write_str("build"),
        }
    }
}

/// Passed to every config hook alongside the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEnv {
    pub command: Command,
    pub mode: String,
}

impl ConfigEnv {
    pub fn build() -> Self {
        Self { command: Command::Build, mode: "production".to_string() }
    }

    pub fn serve() -> Self {
        Self { command: Command::Serve, mode: "development".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_levels_have_no_output() {
        let config = BuildConfig::from_json_str(r#"{"base": "/"}"#).unwrap();
        assert!(config.output().is_none());

        let config = BuildConfig::from_json_str(r#"{"build": {"outDir": "dist"}}"#).unwrap();
        assert!(config.output().is_none());

        let config = BuildConfig::from_json_str(r#"{"build": {"rollupOptions": {}}}"#).unwrap();
        assert!(config.output().is_none());
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let input = json!({
            "base": "/",
            "plugins": ["sveltekit"],
            "build": {
                "outDir": "../data/www",
                "rollupOptions": {
                    "input": "index.html",
                    "output": {"entryFileNames": "[name].js", "format": "es"}
                }
            }
        });
        let config: BuildConfig = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&config).unwrap(), input);
    }

    #[test]
    fn test_null_and_falsy_levels_round_trip() {
        for input in [
            json!({"build": null}),
            json!({"build": false}),
            json!({"build": {"rollupOptions": null}}),
            json!({"build": {"rollupOptions": 0}}),
            json!({"build": {"rollupOptions": {"output": null}}}),
        ] {
            let config: BuildConfig = serde_json::from_value(input.clone()).unwrap();
            assert!(config.output().is_none());
            assert_eq!(serde_json::to_value(&config).unwrap(), input);
        }
    }

    #[test]
    fn test_raw_level_kept() {
        let config: BuildConfig = serde_json::from_value(json!({"build": "dist"})).unwrap();
        assert_eq!(config.build, Slot::Raw(json!("dist")));
    }

    #[test]
    fn test_parse_error() {
        let err = BuildConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse(_)));
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::Build.to_string(), "build");
        assert_eq!(ConfigEnv::serve().command, Command::Serve);
    }
}
