//! In-memory document.
//!
//! An arena-backed element tree implementing
//! [`HostDocument`](crate::host::HostDocument). It backs the
//! CLI's snapshot scans and the test suite, and behaves like the browser
//! where the engine can observe it: document-order queries, descendant-only
//! scoped queries, concatenated text content, and mutation records for every
//! append and removal.

mod document;
mod selector;
mod snapshot;

pub use document::{Document, NodeId, RecordedActivation};
pub use selector::SelectorList;
pub use snapshot::SnapshotNode;

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
