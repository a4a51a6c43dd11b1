//! Document change observation.

use mos_filebrowser_config::LoaderConfig;
use tracing::{debug, trace};

use crate::host::{HostDocument, MutationRecord, TimerHost};
use crate::injector::InjectionEngine;

/// Turns mutation batches into debounced rebuild requests.
///
/// The observer only reads the batch; the rebuild itself happens when the
/// engine's timer fires.
#[derive(Debug, Clone)]
pub struct ChangeObserver {
    observing: bool,
    ignore_own_mutations: bool,
    marker_class: String,
}

impl ChangeObserver {
    pub fn new(loader: &LoaderConfig) -> Self {
        Self {
            observing: false,
            ignore_own_mutations: loader.ignore_own_mutations,
            marker_class: loader.marker_class.clone(),
        }
    }

    pub fn start(&mut self) {
        if !self.observing {
            debug!("Observing document changes");
            self.observing = true;
        }
    }

    pub fn stop(&mut self) {
        self.observing = false;
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Whether a batch should trigger a rebuild.
    pub fn qualifies<D: HostDocument>(&self, doc: &D, batch: &[MutationRecord<D::Node>]) -> bool {
        batch.iter().any(|record| {
            if !record.has_additions() {
                return false;
            }
            if !self.ignore_own_mutations {
                return true;
            }
            // Added text nodes, or any added element that is not a control.
            record.added_count > record.added_elements.len()
                || record
                    .added_elements
                    .iter()
                    .any(|node| !doc.has_class(node, &self.marker_class))
        })
    }

    /// Handle a mutation batch. Returns `true` when a rebuild was scheduled.
    pub fn on_mutations<D: HostDocument>(
        &self,
        doc: &D,
        batch: &[MutationRecord<D::Node>],
        engine: &mut InjectionEngine,
        timers: &dyn TimerHost,
    ) -> bool {
        if !self.observing || !self.qualifies(doc, batch) {
            trace!("Ignoring batch of {} mutation records", batch.len());
            return false;
        }
        engine.schedule_rebuild(timers).is_some()
    }
}
