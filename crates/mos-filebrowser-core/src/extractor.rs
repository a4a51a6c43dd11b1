//! Path inference for candidate rows.
//!
//! Rules run in a fixed order and the first non-empty candidate wins:
//! data-attributes, then the text of a path-like descendant, then a pattern
//! search over the row text. The winning candidate is validated once; a
//! rejected candidate leaves the row without a path and later rules are not
//! consulted.

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;

use std::fmt;

use mos_filebrowser_config::{PathValidation, RowCategory, RowRulesConfig, RowsConfig};
use regex::Regex;
use serde::Serialize;
use tracing::{trace, warn};

use crate::error::EngineError;
use crate::host::HostDocument;

/// Join a selector list into one selector group, `None` when empty.
fn selector_group(selectors: &[String]) -> Option<String> {
    let parts: Vec<&str> = selectors
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Compiled detection rules for one row category.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    category: RowCategory,
    row_selector: Option<String>,
    path_attributes: Vec<String>,
    path_selector: Option<String>,
    label_selector: Option<String>,
    text_pattern: Option<Regex>,
}

impl CategoryRules {
    /// Compile one category's rules.
    pub fn compile(category: RowCategory, rules: &RowRulesConfig) -> Result<Self, EngineError> {
        let text_pattern = match rules.text_pattern.as_deref() {
            Some(pattern) => Some(
                Regex::new(pattern)
                    .map_err(|source| EngineError::InvalidPattern { category, source })?,
            ),
            None => None,
        };

        Ok(Self {
            category,
            row_selector: selector_group(&rules.selectors),
            path_attributes: rules
                .path_attributes
                .iter()
                .filter(|a| !a.trim().is_empty())
                .map(|a| a.trim().to_string())
                .collect(),
            path_selector: selector_group(&rules.path_selectors),
            label_selector: selector_group(&rules.label_selectors),
            text_pattern,
        })
    }

    /// Compile every category, in scan order.
    pub fn compile_all(rows: &RowsConfig) -> Result<Vec<Self>, EngineError> {
        RowCategory::ALL
            .iter()
            .map(|&category| Self::compile(category, rows.get(category)))
            .collect()
    }

    pub fn category(&self) -> RowCategory {
        self.category
    }

    /// Selector group locating rows, `None` when the category has none.
    pub fn row_selector(&self) -> Option<&str> {
        self.row_selector.as_deref()
    }

    pub fn path_attributes(&self) -> &[String] {
        &self.path_attributes
    }

    pub fn path_selector(&self) -> Option<&str> {
        self.path_selector.as_deref()
    }

    pub fn label_selector(&self) -> Option<&str> {
        self.label_selector.as_deref()
    }

    pub fn text_pattern(&self) -> Option<&Regex> {
        self.text_pattern.as_ref()
    }
}

/// Which rule produced a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    /// The named data-attribute.
    DataAttribute(String),
    /// Text of a path-like descendant.
    Descendant,
    /// Pattern match in the row text.
    TextContent,
}

impl fmt::Display for PathSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSource::DataAttribute(name) => write!(f, "attribute:{}", name),
            PathSource::Descendant => f.write_str("descendant"),
            PathSource::TextContent => f.write_str("text"),
        }
    }
}

/// An accepted path and the rule it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedPath {
    pub path: String,
    pub source: PathSource,
}

/// Infers the filesystem path a row stands for. Has no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathExtractor {
    validation: PathValidation,
}

impl PathExtractor {
    pub fn new(validation: PathValidation) -> Self {
        Self { validation }
    }

    pub fn validation(&self) -> PathValidation {
        self.validation
    }

    /// Path of `row`, or `None` when no rule yields an acceptable one.
    pub fn extract<D: HostDocument>(
        &self,
        doc: &D,
        row: &D::Node,
        rules: &CategoryRules,
    ) -> Option<String> {
        self.extract_with_source(doc, row, rules).map(|e| e.path)
    }

    /// Like [`extract`](Self::extract), also reporting the winning rule.
    pub fn extract_with_source<D: HostDocument>(
        &self,
        doc: &D,
        row: &D::Node,
        rules: &CategoryRules,
    ) -> Option<ExtractedPath> {
        let (path, source) = Self::candidate(doc, row, rules)?;
        if !self.accepts(&path) {
            trace!("Rejected {} candidate {:?} ({})", rules.category, path, source);
            return None;
        }
        Some(ExtractedPath { path, source })
    }

    fn candidate<D: HostDocument>(
        doc: &D,
        row: &D::Node,
        rules: &CategoryRules,
    ) -> Option<(String, PathSource)> {
        for name in &rules.path_attributes {
            if let Some(value) = doc.attribute(row, name) {
                if !value.is_empty() {
                    return Some((value, PathSource::DataAttribute(name.clone())));
                }
            }
        }

        if let Some(selector) = rules.path_selector() {
            match doc.query_first(row, selector) {
                Ok(Some(node)) => {
                    let text = doc.text_content(&node);
                    let text = text.trim();
                    if !text.is_empty() {
                        return Some((text.to_string(), PathSource::Descendant));
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping descendant rule for {} rows: {}", rules.category, e),
            }
        }

        let pattern = rules.text_pattern()?;
        let text = doc.text_content(row);
        pattern
            .find(&text)
            .map(|m| (m.as_str().to_string(), PathSource::TextContent))
    }

    /// Whether a candidate passes the configured validation.
    pub fn accepts(&self, candidate: &str) -> bool {
        if !candidate.starts_with('/') {
            return false;
        }
        match self.validation {
            PathValidation::Lenient => true,
            PathValidation::Strict => is_strict_path(candidate),
        }
    }
}

fn is_strict_path(path: &str) -> bool {
    if path == "/" {
        return false;
    }
    if path
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | '\'' | '`'))
    {
        return false;
    }
    !path.split('/').any(|segment| segment == "..")
}
