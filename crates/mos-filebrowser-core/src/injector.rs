//! Control injection.
//!
//! Every scan starts from a clean slate: all previously injected controls are
//! removed, then each category's rows are re-detected and a fresh control is
//! appended to each row's label element. Nothing is tracked across scans, so
//! running a scan twice on an unchanged document yields the same result.

#[cfg(test)]
#[path = "injector_tests.rs"]
mod tests;

use std::rc::Rc;
use std::time::Duration;

use mos_filebrowser_config::{Config, RowCategory};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::control::ControlFactory;
use crate::dispatcher::NavigationDispatcher;
use crate::error::EngineError;
use crate::extractor::{CategoryRules, PathExtractor, PathSource};
use crate::host::{HostDocument, TimerHost};
use crate::scheduler::{DebounceSlot, EngineTask, ScanReason, TimerId};

/// A row that received a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedRow {
    pub category: RowCategory,
    pub path: String,
    pub source: PathSource,
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Controls removed before rebuilding.
    pub removed: usize,
    /// Rows that received a control, in scan order.
    pub injected: Vec<InjectedRow>,
    /// Rows without an acceptable path.
    pub skipped_no_path: usize,
    /// Rows whose label element already carried a control.
    pub skipped_duplicate: usize,
}

impl ScanReport {
    pub fn injected_count(&self) -> usize {
        self.injected.len()
    }

    pub fn count_for(&self, category: RowCategory) -> usize {
        self.injected
            .iter()
            .filter(|row| row.category == category)
            .count()
    }
}

/// Scans the document and owns the debounced rebuild slot.
#[derive(Debug)]
pub struct InjectionEngine {
    categories: Vec<CategoryRules>,
    extractor: PathExtractor,
    factory: ControlFactory,
    marker_selector: String,
    rebuild: DebounceSlot,
}

impl InjectionEngine {
    pub fn new(
        categories: Vec<CategoryRules>,
        extractor: PathExtractor,
        factory: ControlFactory,
        debounce: Duration,
    ) -> Self {
        let marker_selector = format!(".{}", factory.marker_class());
        Self {
            categories,
            extractor,
            factory,
            marker_selector,
            rebuild: DebounceSlot::new(
                "rebuild",
                debounce,
                EngineTask::Rescan(ScanReason::Mutation),
            ),
        }
    }

    /// Build an engine from configuration.
    pub fn from_config(
        config: &Config,
        dispatcher: Rc<NavigationDispatcher>,
    ) -> Result<Self, EngineError> {
        let categories = CategoryRules::compile_all(&config.rows)?;
        Ok(Self::new(
            categories,
            PathExtractor::new(config.loader.path_validation),
            ControlFactory::new(dispatcher, &config.loader),
            Duration::from_millis(config.loader.debounce_ms),
        ))
    }

    pub fn categories(&self) -> &[CategoryRules] {
        &self.categories
    }

    pub fn extractor(&self) -> &PathExtractor {
        &self.extractor
    }

    pub fn marker_class(&self) -> &str {
        self.factory.marker_class()
    }

    /// Remove every injected control, then inject one per detected row.
    pub fn scan<D: HostDocument>(&self, doc: &mut D) -> ScanReport {
        let mut report = ScanReport {
            removed: self.remove_controls(doc),
            ..ScanReport::default()
        };

        for rules in &self.categories {
            self.scan_category(doc, rules, &mut report);
        }

        debug!(
            "Scan injected {} controls (removed {}, {} without path, {} duplicates)",
            report.injected_count(),
            report.removed,
            report.skipped_no_path,
            report.skipped_duplicate
        );
        report
    }

    fn remove_controls<D: HostDocument>(&self, doc: &mut D) -> usize {
        let existing = match doc.query_all(&self.marker_selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Cannot locate injected controls: {}", e);
                return 0;
            }
        };
        for node in &existing {
            doc.remove(node);
        }
        existing.len()
    }

    fn scan_category<D: HostDocument>(
        &self,
        doc: &mut D,
        rules: &CategoryRules,
        report: &mut ScanReport,
    ) {
        let Some(row_selector) = rules.row_selector() else {
            return;
        };
        let rows = match doc.query_all(row_selector) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Skipping {} rows: {}", rules.category(), e);
                return;
            }
        };

        for row in rows {
            let Some(found) = self.extractor.extract_with_source(&*doc, &row, rules) else {
                report.skipped_no_path += 1;
                continue;
            };

            let label = self.label_target(&*doc, &row, rules);
            match doc.query_first(&label, &self.marker_selector) {
                Ok(Some(_)) => {
                    trace!("{} already carries a control", found.path);
                    report.skipped_duplicate += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Duplicate check failed for {}: {}", found.path, e);
                    continue;
                }
            }

            let title = format!("Browse {}", found.path);
            let control = self.factory.build(&found.path, Some(&title));
            match doc.append_control(&label, control) {
                Ok(_) => {
                    trace!(
                        "Injected {} control for {} ({})",
                        rules.category(),
                        found.path,
                        found.source
                    );
                    report.injected.push(InjectedRow {
                        category: rules.category(),
                        path: found.path,
                        source: found.source,
                    });
                }
                Err(e) => warn!("Failed to inject control for {}: {}", found.path, e),
            }
        }
    }

    /// First label match inside the row, or the row itself.
    fn label_target<D: HostDocument>(
        &self,
        doc: &D,
        row: &D::Node,
        rules: &CategoryRules,
    ) -> D::Node {
        let Some(selector) = rules.label_selector() else {
            return row.clone();
        };
        match doc.query_first(row, selector) {
            Ok(Some(label)) => label,
            Ok(None) => row.clone(),
            Err(e) => {
                warn!("Label lookup failed for {} rows: {}", rules.category(), e);
                row.clone()
            }
        }
    }

    /// Restart the debounced rebuild timer.
    pub fn schedule_rebuild(&mut self, timers: &dyn TimerHost) -> Option<TimerId> {
        self.rebuild.schedule(timers)
    }

    /// Cancel a pending rebuild, if any.
    pub fn cancel_pending(&mut self, timers: &dyn TimerHost) {
        self.rebuild.cancel_pending(timers);
    }

    /// Acknowledge a fired rebuild timer. Stale timers return `false`.
    pub fn complete_rebuild(&mut self, id: TimerId) -> bool {
        self.rebuild.complete(id)
    }

    pub fn rebuild_pending(&self) -> bool {
        self.rebuild.is_pending()
    }
}
