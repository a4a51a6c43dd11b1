//! Loader lifecycle.
//!
//! [`FileBrowserLoader`] owns the document, the timers and the engine, and is
//! the single entry point for host callbacks: document readiness, mutation
//! batches, navigation signals and fired timers.

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use mos_filebrowser_config::Config;
use tracing::{debug, info, warn};

use crate::dispatcher::{DispatchSettings, NavigationDispatcher, NavigationTargets};
use crate::dom::Document;
use crate::error::EngineError;
use crate::host::{HostDocument, MutationRecord, TimerHost};
use crate::injector::{InjectionEngine, ScanReport};
use crate::observer::ChangeObserver;
use crate::scheduler::{EngineTask, ScanReason, TimerId};

/// Browser navigation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Location fragment changed.
    HashChange,
    /// History entry changed.
    PopState,
}

impl NavigationKind {
    pub const ALL: [NavigationKind; 2] = [NavigationKind::HashChange, NavigationKind::PopState];

    /// DOM event name of the signal.
    pub fn event_name(&self) -> &'static str {
        match self {
            NavigationKind::HashChange => "hashchange",
            NavigationKind::PopState => "popstate",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_name() == name)
    }
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Loader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    /// Not booted yet.
    Created,
    /// Waiting for the document to finish loading.
    Deferred,
    /// First scan done, observing changes.
    Running,
    /// Shut down; callbacks are ignored.
    Stopped,
}

/// The loader: wires the engine to a host.
pub struct FileBrowserLoader<D: HostDocument, T: TimerHost> {
    document: D,
    timers: T,
    engine: InjectionEngine,
    observer: ChangeObserver,
    dispatcher: Rc<NavigationDispatcher>,
    settle: Duration,
    navigation_timers: Vec<TimerId>,
    state: BootState,
    scan_count: u64,
}

impl<D: HostDocument, T: TimerHost> fmt::Debug for FileBrowserLoader<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBrowserLoader")
            .field("state", &self.state)
            .field("scan_count", &self.scan_count)
            .field("navigation_timers", &self.navigation_timers)
            .finish_non_exhaustive()
    }
}

impl<D: HostDocument, T: TimerHost> FileBrowserLoader<D, T> {
    /// Build a loader. Fails only on invalid row rules.
    pub fn new(
        config: &Config,
        document: D,
        timers: T,
        targets: NavigationTargets,
    ) -> Result<Self, EngineError> {
        let dispatcher = Rc::new(NavigationDispatcher::new(
            DispatchSettings::from_config(config),
            targets,
        ));
        let engine = InjectionEngine::from_config(config, dispatcher.clone())?;

        Ok(Self {
            document,
            timers,
            engine,
            observer: ChangeObserver::new(&config.loader),
            dispatcher,
            settle: Duration::from_millis(config.loader.settle_ms),
            navigation_timers: Vec::new(),
            state: BootState::Created,
            scan_count: 0,
        })
    }

    /// Start the loader, or defer until the document is ready.
    ///
    /// Returns the initial scan report when the loader started right away.
    pub fn boot(&mut self) -> Option<ScanReport> {
        if self.state != BootState::Created {
            debug!("Loader already booted ({:?})", self.state);
            return None;
        }
        if self.document.ready_state().is_loading() {
            info!("Document still loading, deferring first scan");
            self.state = BootState::Deferred;
            return None;
        }
        Some(self.start())
    }

    /// The document finished loading. Starts a deferred loader.
    pub fn on_document_ready(&mut self) -> Option<ScanReport> {
        if self.state != BootState::Deferred {
            return None;
        }
        Some(self.start())
    }

    fn start(&mut self) -> ScanReport {
        let report = self.scan_now(ScanReason::Initial);
        self.document.start_observing();
        self.observer.start();
        self.state = BootState::Running;
        info!(
            "MOS FileBrowser loader running, {} controls injected",
            report.injected_count()
        );
        report
    }

    /// Handle a mutation batch. Returns `true` when a rebuild was scheduled.
    pub fn on_mutations(&mut self, batch: &[MutationRecord<D::Node>]) -> bool {
        self.observer
            .on_mutations(&self.document, batch, &mut self.engine, &self.timers)
    }

    /// Schedule a rescan after the settle delay.
    ///
    /// Navigation signals count in every state but `Stopped`, deferred
    /// loaders included. Each signal schedules its own timer.
    pub fn on_navigation(&mut self, kind: NavigationKind) -> Option<TimerId> {
        if self.state == BootState::Stopped {
            return None;
        }
        let task = EngineTask::Rescan(ScanReason::Navigation(kind));
        match self.timers.set_timeout(self.settle, task) {
            Ok(id) => {
                debug!("{} scheduled settle rescan {}", kind, id);
                self.navigation_timers.push(id);
                Some(id)
            }
            Err(e) => {
                warn!("Cannot schedule settle rescan after {}: {}", kind, e);
                None
            }
        }
    }

    /// A host timer fired. Returns the report of the scan it triggered.
    pub fn on_timer(&mut self, id: TimerId, task: EngineTask) -> Option<ScanReport> {
        if self.state == BootState::Stopped {
            return None;
        }
        let EngineTask::Rescan(reason) = task;
        let current = match reason {
            ScanReason::Mutation => self.engine.complete_rebuild(id),
            ScanReason::Navigation(_) => {
                let before = self.navigation_timers.len();
                self.navigation_timers.retain(|&t| t != id);
                self.navigation_timers.len() != before
            }
            ScanReason::Initial => true,
        };
        if !current {
            debug!("Ignoring stale {} ({})", id, reason);
            return None;
        }
        Some(self.scan_now(reason))
    }

    /// Run a scan immediately.
    pub fn scan_now(&mut self, reason: ScanReason) -> ScanReport {
        let report = self.engine.scan(&mut self.document);
        self.scan_count += 1;
        debug!(
            "Scan #{} ({}) injected {} controls",
            self.scan_count,
            reason,
            report.injected_count()
        );
        report
    }

    /// Stop observing and cancel every pending timer.
    pub fn shutdown(&mut self) {
        self.observer.stop();
        self.engine.cancel_pending(&self.timers);
        for id in self.navigation_timers.drain(..) {
            self.timers.clear_timeout(id);
        }
        self.state = BootState::Stopped;
        info!("MOS FileBrowser loader stopped after {} scans", self.scan_count);
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_observing()
    }

    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn engine(&self) -> &InjectionEngine {
        &self.engine
    }

    pub fn dispatcher(&self) -> &Rc<NavigationDispatcher> {
        &self.dispatcher
    }

    /// Number of pending navigation settle timers.
    pub fn pending_navigation(&self) -> usize {
        self.navigation_timers.len()
    }
}

impl<T: TimerHost> FileBrowserLoader<Document, T> {
    /// Deliver the in-memory document's pending mutation records.
    pub fn flush_mutations(&mut self) -> bool {
        let batch = self.document.take_mutations();
        if batch.is_empty() {
            return false;
        }
        self.on_mutations(&batch)
    }
}
