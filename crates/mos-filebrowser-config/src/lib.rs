//! # MOS FileBrowser Config
//!
//! Configuration management for the MOS FileBrowser loader: plugin metadata,
//! loader timing and the per-category row detection rules.

mod error;
mod loader;
mod manifest;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use manifest::{PluginManifest, DEFAULT_VERSION, MANIFEST_FILE_NAME};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
