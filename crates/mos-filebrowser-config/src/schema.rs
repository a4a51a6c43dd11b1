//! Configuration schema definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plugin: PluginConfig,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub rows: RowsConfig,
}

/// Plugin metadata published to the plugin registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Registry name, also the `/plugins/<name>` route segment.
    #[serde(default = "default_plugin_name")]
    pub name: String,

    #[serde(default = "default_display_name")]
    pub display_name: String,

    #[serde(default = "default_description")]
    pub description: String,

    /// Explicit version; the manifest falls back to a fixed default when unset.
    #[serde(default)]
    pub version: Option<String>,

    /// Material Design icon identifier.
    #[serde(default = "default_icon")]
    pub icon: String,

    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default)]
    pub homepage: String,

    /// File name of the remote-loadable module entry.
    #[serde(default = "default_remote_entry")]
    pub remote_entry: String,

    /// Module path exposed by the remote entry.
    #[serde(default = "default_exposed_module")]
    pub exposed_module: String,
}

fn default_plugin_name() -> String {
    "mos-file-browser".to_string()
}

fn default_display_name() -> String {
    "MOS FileBrowser".to_string()
}

fn default_description() -> String {
    "File browser for MOS".to_string()
}

fn default_icon() -> String {
    "mdi-folder-open".to_string()
}

fn default_author() -> String {
    "RiDDiX".to_string()
}

fn default_remote_entry() -> String {
    "remoteEntry.js".to_string()
}

fn default_exposed_module() -> String {
    "./Plugin".to_string()
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: default_plugin_name(),
            display_name: default_display_name(),
            description: default_description(),
            version: None,
            icon: default_icon(),
            author: default_author(),
            homepage: String::new(),
            remote_entry: default_remote_entry(),
            exposed_module: default_exposed_module(),
        }
    }
}

/// How strictly an inferred path is checked before a control is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathValidation {
    /// Accept any non-empty string starting with `/`.
    #[default]
    Lenient,
    /// Additionally reject bare `/`, whitespace, markup characters and `..` segments.
    Strict,
}

/// Loader behavior: timing, markers and navigation channel names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Delay after the last qualifying mutation batch before a rescan.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Delay after a navigation signal before a rescan.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Class carried by every injected control.
    #[serde(default = "default_marker_class")]
    pub marker_class: String,

    /// Name of the process-wide notification event.
    #[serde(default = "default_event_name")]
    pub event_name: String,

    /// Session storage key used by the fallback navigation.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Tooltip used when a control is built without a title.
    #[serde(default = "default_title")]
    pub default_title: String,

    #[serde(default)]
    pub path_validation: PathValidation,

    /// Skip mutation batches made only of injected controls.
    #[serde(default)]
    pub ignore_own_mutations: bool,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_settle_ms() -> u64 {
    500
}

fn default_marker_class() -> String {
    "mos-filebrowser-icon".to_string()
}

fn default_event_name() -> String {
    "mos-open-file-browser".to_string()
}

fn default_storage_key() -> String {
    "mos-file-browser-path".to_string()
}

fn default_title() -> String {
    "Browse files".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            settle_ms: default_settle_ms(),
            marker_class: default_marker_class(),
            event_name: default_event_name(),
            storage_key: default_storage_key(),
            default_title: default_title(),
            path_validation: PathValidation::default(),
            ignore_own_mutations: false,
        }
    }
}

/// Row category detected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCategory {
    Disk,
    Share,
    Pool,
}

impl RowCategory {
    /// Scan order used by the injection engine.
    pub const ALL: [RowCategory; 3] = [RowCategory::Disk, RowCategory::Share, RowCategory::Pool];

    pub fn as_str(&self) -> &'static str {
        match self {
            RowCategory::Disk => "disk",
            RowCategory::Share => "share",
            RowCategory::Pool => "pool",
        }
    }
}

impl fmt::Display for RowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection rules for the three row categories.
///
/// A `[rows.<category>]` table replaces that category's defaults entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowsConfig {
    #[serde(default = "RowRulesConfig::disk_defaults")]
    pub disk: RowRulesConfig,

    #[serde(default = "RowRulesConfig::share_defaults")]
    pub share: RowRulesConfig,

    #[serde(default = "RowRulesConfig::pool_defaults")]
    pub pool: RowRulesConfig,
}

impl RowsConfig {
    /// Rules for one category.
    pub fn get(&self, category: RowCategory) -> &RowRulesConfig {
        match category {
            RowCategory::Disk => &self.disk,
            RowCategory::Share => &self.share,
            RowCategory::Pool => &self.pool,
        }
    }
}

impl Default for RowsConfig {
    fn default() -> Self {
        Self {
            disk: RowRulesConfig::disk_defaults(),
            share: RowRulesConfig::share_defaults(),
            pool: RowRulesConfig::pool_defaults(),
        }
    }
}

/// Detection rules for one row category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowRulesConfig {
    /// Selectors locating the rows.
    #[serde(default)]
    pub selectors: Vec<String>,

    /// Data-attributes holding a path, in priority order.
    #[serde(default)]
    pub path_attributes: Vec<String>,

    /// Selectors for a descendant whose text is the path.
    #[serde(default)]
    pub path_selectors: Vec<String>,

    /// Selectors for the element the control is appended to.
    #[serde(default)]
    pub label_selectors: Vec<String>,

    /// Pattern searched in the row text; `None` disables the text rule.
    #[serde(default)]
    pub text_pattern: Option<String>,
}

/// Root-mount pattern shared by every category.
pub const DEFAULT_TEXT_PATTERN: &str = r"/mnt/\S+";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl RowRulesConfig {
    pub fn disk_defaults() -> Self {
        Self {
            selectors: strings(&["[data-disk-path]", "[data-mount-point]", ".disk-row", ".v-list-item"]),
            path_attributes: strings(&["data-disk-path", "data-mount-point", "data-path"]),
            path_selectors: strings(&[".mount-point", ".path", "[class*=\"path\"]", "[class*=\"mount\"]"]),
            label_selectors: strings(&[".v-list-item-title", ".disk-name", ".title", "h3", "h4", "strong"]),
            text_pattern: Some(DEFAULT_TEXT_PATTERN.to_string()),
        }
    }

    pub fn share_defaults() -> Self {
        Self {
            selectors: strings(&["[data-share-path]", ".share-row"]),
            path_attributes: strings(&["data-share-path", "data-path"]),
            path_selectors: strings(&[".share-path", ".path"]),
            label_selectors: strings(&[".v-list-item-title", ".share-name", ".title"]),
            text_pattern: Some(DEFAULT_TEXT_PATTERN.to_string()),
        }
    }

    pub fn pool_defaults() -> Self {
        Self {
            selectors: strings(&["[data-pool-path]", ".pool-row"]),
            path_attributes: strings(&["data-pool-path", "data-path"]),
            path_selectors: strings(&[".pool-path", ".path"]),
            label_selectors: strings(&[".v-list-item-title", ".pool-name", ".title"]),
            text_pattern: Some(DEFAULT_TEXT_PATTERN.to_string()),
        }
    }
}
