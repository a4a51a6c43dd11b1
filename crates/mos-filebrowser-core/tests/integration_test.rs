//! End-to-end tests for the loader on the in-memory document.
//!
//! These tests drive the loader the way a browser would: boot, mutation
//! batches, navigation signals and fired timers on a virtual clock.

use std::rc::Rc;
use std::time::Duration;

use mos_filebrowser_config::Config;
use mos_filebrowser_core::dom::{Document, SnapshotNode};
use mos_filebrowser_core::host::memory::{
    BroadcastEvents, ManualTimers, MemoryLocation, MemorySessionStore, RecordingRouter,
};
use mos_filebrowser_core::host::{HostDocument, Router};
use mos_filebrowser_core::{
    ControlVisual, FileBrowserLoader, NavigationIntent, NavigationKind, NavigationTargets,
    PathSource, ScanReport,
};

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    loader: FileBrowserLoader<Document, Rc<ManualTimers>>,
    timers: Rc<ManualTimers>,
    events: BroadcastEvents,
    session: Rc<MemorySessionStore>,
    location: Rc<MemoryLocation>,
    router: Rc<RecordingRouter>,
}

impl Harness {
    fn new(json: &str) -> Self {
        Self::with(json, Config::default(), false)
    }

    fn with(json: &str, config: Config, with_router: bool) -> Self {
        let timers = Rc::new(ManualTimers::new());
        let events = BroadcastEvents::default();
        let session = Rc::new(MemorySessionStore::new());
        let location = Rc::new(MemoryLocation::new());
        let router = Rc::new(RecordingRouter::new());

        let targets = NavigationTargets {
            events: Rc::new(events.clone()),
            router: with_router.then(|| router.clone() as Rc<dyn Router>),
            session: session.clone(),
            location: location.clone(),
        };
        let doc = Document::from_json(json).unwrap();
        let loader = FileBrowserLoader::new(&config, doc, timers.clone(), targets).unwrap();

        Self {
            loader,
            timers,
            events,
            session,
            location,
            router,
        }
    }

    /// Deliver pending mutations, advance the clock, and run fired timers.
    fn advance(&mut self, ms: u64) -> Vec<ScanReport> {
        self.loader.flush_mutations();
        self.timers
            .advance(Duration::from_millis(ms))
            .into_iter()
            .filter_map(|(id, task)| self.loader.on_timer(id, task))
            .collect()
    }

    /// Simulate the host rendering a new row.
    fn render(&mut self, json: &str) {
        let node: SnapshotNode = serde_json::from_str(json).unwrap();
        let doc = self.loader.document_mut();
        let body = doc.body();
        doc.insert_snapshot(body, &node).unwrap();
    }

    fn control_paths(&self) -> Vec<String> {
        self.loader
            .document()
            .mounted_controls()
            .iter()
            .map(|(_, c)| c.path().to_string())
            .collect()
    }
}

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.loader.ignore_own_mutations = true;
    config
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_disk_row_with_data_attribute() {
    let mut h = Harness::new(
        r#"{ "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" }, "children": [
             { "tag": "span", "attrs": { "class": "v-list-item-title" }, "children": [ { "text": "Disk 1" } ] } ] }"#,
    );
    let report = h.loader.boot().unwrap();

    assert_eq!(report.injected_count(), 1);
    let doc = h.loader.document();
    let (button, control) = doc.mounted_controls()[0];
    assert_eq!(control.title(), "Browse /mnt/disk1");
    let label = doc.parent(button).unwrap();
    assert!(doc.has_class(&label, "v-list-item-title"));
    assert_eq!(doc.query_all(".mos-filebrowser-icon").unwrap().len(), 1);
}

#[test]
fn test_share_row_from_text() {
    let mut h = Harness::new(
        r#"{ "tag": "div", "attrs": { "class": "share-row" }, "children": [
             { "text": "Share: /mnt/user/media (read-only)" } ] }"#,
    );
    let report = h.loader.boot().unwrap();

    assert_eq!(report.injected[0].path, "/mnt/user/media");
    assert_eq!(report.injected[0].source, PathSource::TextContent);
    assert_eq!(h.control_paths(), vec!["/mnt/user/media"]);
}

#[test]
fn test_activation_without_router() {
    let mut h = Harness::new(r#"{ "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" } }"#);
    let mut rx = h.events.subscribe();
    h.loader.boot();

    let (button, _) = h.loader.document().mounted_controls()[0];
    let event = h.loader.document().click(button).unwrap();

    assert!(event.default_prevented);
    assert!(event.propagation_stopped);
    assert_eq!(
        h.session.get_item("mos-file-browser-path").as_deref(),
        Some("/mnt/disk1")
    );
    assert_eq!(
        h.location.hash(),
        "/plugins/mos-file-browser?path=%2Fmnt%2Fdisk1"
    );
    let emitted = rx.try_recv().unwrap();
    assert_eq!(emitted.name, "mos-open-file-browser");
    assert_eq!(emitted.intent, NavigationIntent::new("/mnt/disk1"));
    assert!(h.router.visited().is_empty());
}

#[test]
fn test_activation_with_router() {
    let mut h = Harness::with(
        r#"{ "tag": "div", "attrs": { "class": "pool-row", "data-pool-path": "/mnt/tank" } }"#,
        Config::default(),
        true,
    );
    h.loader.boot();

    let (button, _) = h.loader.document().mounted_controls()[0];
    h.loader.document().click(button);

    assert_eq!(
        h.router.visited(),
        vec!["/plugins/mos-file-browser?path=%2Fmnt%2Ftank"]
    );
    assert!(h.session.get_item("mos-file-browser-path").is_none());
    assert_eq!(h.location.hash(), "");
}

#[test]
fn test_unacceptable_path_text() {
    let mut h = Harness::new(
        r#"{ "tag": "div", "attrs": { "class": "disk-row" }, "children": [
             { "tag": "span", "attrs": { "class": "path" }, "children": [ { "text": "N/A" } ] } ] }"#,
    );
    let report = h.loader.boot().unwrap();

    assert_eq!(report.injected_count(), 0);
    assert_eq!(report.skipped_no_path, 1);
    assert!(h.control_paths().is_empty());
}

#[test]
fn test_hover_updates_style() {
    let mut h = Harness::new(r#"{ "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" } }"#);
    h.loader.boot();
    let (button, _) = h.loader.document().mounted_controls()[0];

    let doc = h.loader.document_mut();
    assert_eq!(doc.pointer_enter(button), Some(ControlVisual::Hovered));
    assert!(doc.get_attribute(button, "style").unwrap().contains("scale(1.1)"));
    assert_eq!(doc.pointer_leave(button), Some(ControlVisual::Resting));
    assert!(doc.get_attribute(button, "style").unwrap().contains("opacity: 0.7"));
}

// ============================================================================
// Idempotence and debouncing
// ============================================================================

#[test]
fn test_repeated_scans_converge() {
    let mut h = Harness::new(
        r#"[
            { "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" } },
            { "tag": "div", "attrs": { "data-share-path": "/mnt/user/a" } },
            { "tag": "div", "attrs": { "data-pool-path": "/mnt/tank" } }
        ]"#,
    );
    h.loader.boot();
    let before = h.control_paths();

    for _ in 0..3 {
        h.loader.scan_now(mos_filebrowser_core::ScanReason::Initial);
    }
    assert_eq!(h.control_paths(), before);
    assert_eq!(before, vec!["/mnt/disk1", "/mnt/user/a", "/mnt/tank"]);
    assert_eq!(
        h.loader.document().query_all(".mos-filebrowser-icon").unwrap().len(),
        3
    );
}

#[test]
fn test_mutation_burst_yields_one_scan() {
    let mut h = Harness::with("[]", quiet_config(), false);
    h.loader.boot();
    assert_eq!(h.loader.scan_count(), 1);

    // Ten renders, 100ms apart: each restarts the debounce window.
    for i in 0..10 {
        h.render(&format!(
            r#"{{ "tag": "div", "attrs": {{ "data-disk-path": "/mnt/disk{}" }} }}"#,
            i
        ));
        assert!(h.advance(100).is_empty());
    }
    assert_eq!(h.loader.scan_count(), 1);

    let reports = h.advance(200);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].injected_count(), 10);
    assert_eq!(h.loader.scan_count(), 2);

    // The scan's own appends do not re-arm the timer.
    assert!(h.advance(1_000).is_empty());
    assert_eq!(h.timers.pending_count(), 0);
}

#[test]
fn test_own_appends_rearm_by_default() {
    let mut h = Harness::new("[]");
    h.loader.boot();

    h.render(r#"{ "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" } }"#);
    let reports = h.advance(300);
    assert_eq!(reports.len(), 1);

    // Every rebuild re-inserts the control, which is itself an insertion:
    // while any control exists, a rebuild runs once per debounce window.
    for _ in 0..3 {
        let reports = h.advance(300);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].removed, 1);
        assert_eq!(h.control_paths(), vec!["/mnt/disk1"]);
    }
    assert!(h.loader.flush_mutations());
    assert!(h.loader.engine().rebuild_pending());
}

#[test]
fn test_spaced_batches_each_scan() {
    let mut h = Harness::with("[]", quiet_config(), false);
    h.loader.boot();

    // Renders further apart than the debounce window do not collapse.
    for i in 0..4 {
        h.render(&format!(
            r#"{{ "tag": "div", "attrs": {{ "data-disk-path": "/mnt/disk{}" }} }}"#,
            i
        ));
        let reports = h.advance(400);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].injected_count(), i + 1);
    }
    assert_eq!(h.loader.scan_count(), 5);
}

#[test]
fn test_removal_only_changes_ignored() {
    let mut h = Harness::with(
        r#"[
            { "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" } },
            { "tag": "p", "children": [ { "text": "footer" } ] }
        ]"#,
        quiet_config(),
        false,
    );
    h.loader.boot();

    let footer = h.loader.document().query_all("p").unwrap()[0];
    h.loader.document_mut().remove(&footer);
    assert!(h.advance(1_000).is_empty());
    assert_eq!(h.loader.scan_count(), 1);
}

#[test]
fn test_navigation_rescans_after_settle() {
    let mut h = Harness::with(
        r#"{ "tag": "div", "attrs": { "id": "view" } }"#,
        quiet_config(),
        false,
    );
    h.loader.boot();

    // A route swap that changes attributes only: no insertion is observed.
    let view = h.loader.document().query_all("#view").unwrap()[0];
    h.loader
        .document_mut()
        .set_attribute(view, "data-pool-path", "/mnt/tank");
    h.loader.on_navigation(NavigationKind::HashChange);

    assert!(h.advance(499).is_empty());
    let reports = h.advance(1);
    assert_eq!(reports.len(), 1);
    assert_eq!(h.control_paths(), vec!["/mnt/tank"]);
}

#[test]
fn test_deferred_boot_then_ready() {
    let mut h = Harness::new(r#"{ "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" } }"#);
    h.loader
        .document_mut()
        .set_ready_state(mos_filebrowser_core::host::ReadyState::Loading);

    assert!(h.loader.boot().is_none());
    assert!(h.control_paths().is_empty());

    let report = h.loader.on_document_ready().unwrap();
    assert_eq!(report.injected_count(), 1);
    assert!(h.loader.is_observing());
}
