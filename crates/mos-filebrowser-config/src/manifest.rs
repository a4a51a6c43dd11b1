//! Plugin manifest consumed by the plugin registry.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::schema::PluginConfig;

/// Version written when the plugin configuration does not pin one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// File name the registry looks for in the build output directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Registry metadata descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub icon: String,
    pub author: String,
    pub homepage: String,
    pub remote_entry: String,
    pub exposed_module: String,
}

impl PluginManifest {
    /// Build the manifest from plugin metadata.
    pub fn from_plugin(plugin: &PluginConfig) -> Self {
        Self {
            name: plugin.name.clone(),
            display_name: plugin.display_name.clone(),
            description: plugin.description.clone(),
            version: plugin
                .version
                .clone()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            icon: plugin.icon.clone(),
            author: plugin.author.clone(),
            homepage: plugin.homepage.clone(),
            remote_entry: plugin.remote_entry.clone(),
            exposed_module: plugin.exposed_module.clone(),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `manifest.json` into `out_dir`, creating the directory if needed.
    pub fn write_to(&self, out_dir: &Path) -> Result<PathBuf, ConfigError> {
        fs::create_dir_all(out_dir)?;
        let path = out_dir.join(MANIFEST_FILE_NAME);
        fs::write(&path, self.to_json_pretty()?)?;
        info!("Wrote plugin manifest to {}", path.display());
        Ok(path)
    }
}
