//! Configuration validation.

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

use crate::error::ConfigError;
use crate::schema::{Config, RowCategory};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a `ConfigError`, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_plugin(config, &mut result);
        Self::validate_loader(config, &mut result);
        Self::validate_rows(config, &mut result);

        Ok(result)
    }

    fn validate_plugin(config: &Config, result: &mut ValidationResult) {
        let name = &config.plugin.name;
        if name.is_empty() {
            result.add_error(ValidationError::new("plugin.name", "Plugin name cannot be empty"));
        } else if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            // The name is embedded in the `/plugins/<name>` route.
            result.add_error(ValidationError::new(
                "plugin.name",
                format!("Plugin name '{}' may only contain ASCII letters, digits, '-' and '_'", name),
            ));
        }

        if !config.plugin.remote_entry.ends_with(".js") {
            result.add_warning(ValidationWarning::new(
                "plugin.remote_entry",
                format!("Remote entry '{}' does not end in .js", config.plugin.remote_entry),
            ));
        }
    }

    fn validate_loader(config: &Config, result: &mut ValidationResult) {
        let loader = &config.loader;

        if loader.marker_class.is_empty() {
            result.add_error(ValidationError::new(
                "loader.marker_class",
                "Marker class cannot be empty",
            ));
        } else if loader.marker_class.chars().any(char::is_whitespace) {
            result.add_error(ValidationError::new(
                "loader.marker_class",
                "Marker class must be a single class name",
            ));
        }

        if loader.event_name.is_empty() {
            result.add_error(ValidationError::new("loader.event_name", "Event name cannot be empty"));
        }

        if loader.storage_key.is_empty() {
            result.add_error(ValidationError::new(
                "loader.storage_key",
                "Storage key cannot be empty",
            ));
        }

        if loader.debounce_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "loader.debounce_ms",
                "debounce_ms is 0, every mutation batch triggers its own rescan",
            ));
        }

        if loader.settle_ms < loader.debounce_ms {
            result.add_warning(ValidationWarning::new(
                "loader.settle_ms",
                "settle_ms is shorter than debounce_ms, route changes may be scanned before they settle",
            ));
        }
    }

    fn validate_rows(config: &Config, result: &mut ValidationResult) {
        for category in RowCategory::ALL {
            let rules = config.rows.get(category);
            let prefix = format!("rows.{}", category);

            if rules.selectors.is_empty() {
                result.add_warning(ValidationWarning::new(
                    format!("{}.selectors", prefix),
                    format!("No row selectors, {} rows will never be detected", category),
                ));
            }

            let lists = [
                ("selectors", &rules.selectors),
                ("path_attributes", &rules.path_attributes),
                ("path_selectors", &rules.path_selectors),
                ("label_selectors", &rules.label_selectors),
            ];
            for (field, items) in lists {
                if items.iter().any(|s| s.trim().is_empty()) {
                    result.add_error(ValidationError::new(
                        format!("{}.{}", prefix, field),
                        "Entries cannot be empty",
                    ));
                }
            }

            if let Some(ref pattern) = rules.text_pattern {
                if let Err(e) = regex::Regex::new(pattern) {
                    result.add_error(ValidationError::new(
                        format!("{}.text_pattern", prefix),
                        format!("Invalid pattern: {}", e),
                    ));
                }
            }
        }
    }
}
