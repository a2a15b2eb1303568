//! Build Plugins - Config Hooks With Declared Stage and Apply Mode
//!
//! Stage and apply mode are declarations, read once when the pipeline is
//! assembled. Hooks themselves never check the command.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{BuildConfig, Command, ConfigEnv};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static NORMALIZE_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_normalize_call_count() -> u32 {
    NORMALIZE_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_normalize_call_count() {
    NORMALIZE_CALL_COUNT.store(0, Ordering::SeqCst);
}

/// Where a plugin runs relative to the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStage {
    Pre,
    #[default]
    Normal,
    /// After every other plugin has settled its naming decisions.
    Post,
}

/// Which commands a plugin takes part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    Serve,
    Build,
    #[default]
    Always,
}

impl ApplyMode {
    pub fn applies_to(self, command: Command) -> bool {
        match self {
            ApplyMode::Always => true,
            ApplyMode::Serve => command == Command::Serve,
            ApplyMode::Build => command == Command::Build,
        }
    }
}

pub trait Plugin {
    fn name(&self) -> &'static str;

    fn stage(&self) -> PluginStage {
        PluginStage::Normal
    }

    fn apply(&self) -> ApplyMode {
        ApplyMode::Always
    }

    /// Inspect and rewrite the in-progress config before bundling consumes it.
    fn config(&self, config: &mut BuildConfig, env: &ConfigEnv);
}

/// Strips `.[hash]` from output names so a LittleFS image gets the same
/// filenames on every build.
#[derive(Debug, Clone, Copy, Default)]
pub struct LittleFsPlugin;

impl LittleFsPlugin {
    pub const NAME: &'static str = "vite-plugin-littlefs";
}

impl Plugin for LittleFsPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn stage(&self) -> PluginStage {
        PluginStage::Post
    }

    fn apply(&self) -> ApplyMode {
        ApplyMode::Build
    }

    fn config(&self, config: &mut BuildConfig, _env: &ConfigEnv) {
        #[cfg(feature = "test-hooks")]
        NORMALIZE_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let Some(output) = config.output_mut() else {
            trace!("no output naming config, nothing to normalize");
            return;
        };

        *output = output.normalized();
    }
}
