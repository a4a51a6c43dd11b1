//! Host abstraction.
//!
//! The engine never touches a concrete page. Everything it reads or mutates
//! goes through these traits: the document, timers, and the four navigation
//! channels. The browser build binds them to `web-sys`; the in-memory
//! implementations in [`memory`] and [`crate::dom`] back the CLI and tests.

pub mod memory;

use std::fmt;
use std::time::Duration;

use crate::control::BrowseControl;
use crate::dispatcher::NavigationIntent;
use crate::error::HostError;
use crate::scheduler::{EngineTask, TimerId};

/// Document loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Parse `document.readyState`; unknown values count as complete.
    pub fn parse(value: &str) -> Self {
        match value {
            "loading" => ReadyState::Loading,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Complete,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ReadyState::Loading)
    }
}

/// One structural mutation observed on the document subtree.
#[derive(Debug, Clone)]
pub struct MutationRecord<N> {
    /// Added element nodes.
    pub added_elements: Vec<N>,
    /// Total added nodes, text nodes included.
    pub added_count: usize,
    /// Total removed nodes.
    pub removed_count: usize,
}

impl<N> MutationRecord<N> {
    /// A record of added elements.
    pub fn added(elements: Vec<N>) -> Self {
        let added_count = elements.len();
        Self {
            added_elements: elements,
            added_count,
            removed_count: 0,
        }
    }

    /// A record of removals only.
    pub fn removed(count: usize) -> Self {
        Self {
            added_elements: Vec::new(),
            added_count: 0,
            removed_count: count,
        }
    }

    pub fn has_additions(&self) -> bool {
        self.added_count > 0
    }
}

/// Read and mutate access to the host document.
pub trait HostDocument {
    /// Element handle. Handles are compared by identity.
    type Node: Clone + PartialEq + fmt::Debug;

    fn ready_state(&self) -> ReadyState;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, HostError>;

    /// First descendant of `scope` matching `selector`, in document order.
    fn query_first(&self, scope: &Self::Node, selector: &str)
        -> Result<Option<Self::Node>, HostError>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Concatenated text of the node and its descendants.
    fn text_content(&self, node: &Self::Node) -> String;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Materialize `control` as the last child of `target`.
    fn append_control(
        &mut self,
        target: &Self::Node,
        control: BrowseControl,
    ) -> Result<Self::Node, HostError>;

    /// Detach `node` from the document. Detached nodes are ignored.
    fn remove(&mut self, node: &Self::Node);

    /// Called when change observation starts. Mutations that happened
    /// before this call are never delivered.
    fn start_observing(&mut self) {}
}

/// One-shot timers carrying an engine task.
///
/// When a timer fires, the host hands `(id, task)` back to
/// [`crate::FileBrowserLoader::on_timer`].
pub trait TimerHost {
    fn set_timeout(&self, delay: Duration, task: EngineTask) -> Result<TimerId, HostError>;

    /// Cancel a pending timer. Unknown or already fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

/// Process-wide notification channel.
pub trait EventChannel {
    fn emit(&self, event_name: &str, intent: &NavigationIntent) -> Result<(), HostError>;
}

/// Router handle exposed by the host application.
pub trait Router {
    fn navigate(&self, url: &str) -> Result<(), HostError>;
}

/// Session-scoped key-value storage.
pub trait SessionStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError>;
}

/// The document's location fragment.
pub trait LocationFragment {
    /// Replace the fragment. `fragment` carries no leading `#`.
    fn set_hash(&self, fragment: &str) -> Result<(), HostError>;
}
