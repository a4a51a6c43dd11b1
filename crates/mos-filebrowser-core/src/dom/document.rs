//! Arena-backed element tree.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use super::selector::SelectorList;
use crate::control::{ActivationEvent, BrowseControl, ControlVisual, FOLDER_ICON_PATH};
use crate::error::HostError;
use crate::host::{HostDocument, MutationRecord, ReadyState};

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Activation event recorded by [`Document::click`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordedActivation {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl ActivationEvent for RecordedActivation {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// In-memory document rooted at `<html><body>`.
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    ready_state: ReadyState,
    controls: HashMap<NodeId, BrowseControl>,
    mutations: Vec<MutationRecord<NodeId>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("ready_state", &self.ready_state)
            .field("controls", &self.controls.len())
            .finish()
    }
}

impl Document {
    /// Empty, fully loaded document.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            ready_state: ReadyState::Complete,
            controls: HashMap::new(),
            mutations: Vec::new(),
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.link(doc.root, doc.body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub(super) fn link(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return false;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        true
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        if !matches!(self.nodes[parent.0].kind, NodeKind::Element { .. }) {
            return Err(HostError::Dom(format!("{} cannot have children", parent)));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(HostError::Dom(format!("{} would contain itself", child)));
        }
        self.link(parent, child);
        let record = if self.tag_name(child).is_some() {
            MutationRecord::added(vec![child])
        } else {
            MutationRecord {
                added_elements: Vec::new(),
                added_count: 1,
                removed_count: 0,
            }
        };
        self.mutations.push(record);
        Ok(())
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId, HostError> {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value);
        }
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, HostError> {
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Set an attribute. Ignored on text nodes.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            let name = name.to_ascii_lowercase();
            match attributes.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => attributes.push((name, value.to_string())),
            }
        }
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Lowercase tag name, `None` for text nodes.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_class_name(&self, node: NodeId, class: &str) -> bool {
        self.get_attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Parent element, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Whether the node is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.root || self.is_ancestor(self.root, node)
    }

    /// Descendant elements of `node` in document order, `node` excluded.
    pub fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.tag_name(current).is_some() {
                out.push(current);
            }
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Elements matching `selector` anywhere in the document.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, HostError> {
        let list = SelectorList::parse(selector).map_err(|m| HostError::selector(selector, m))?;
        Ok(self
            .descendant_elements(self.root)
            .into_iter()
            .filter(|&n| list.matches(self, n))
            .collect())
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &self.nodes[node.0].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Control mounted at `node`, if it is still attached.
    pub fn control(&self, node: NodeId) -> Option<&BrowseControl> {
        if !self.is_connected(node) {
            return None;
        }
        self.controls.get(&node)
    }

    /// Mounted, attached controls in document order.
    pub fn mounted_controls(&self) -> Vec<(NodeId, &BrowseControl)> {
        self.descendant_elements(self.root)
            .into_iter()
            .filter_map(|n| self.controls.get(&n).map(|c| (n, c)))
            .collect()
    }

    /// Activate the control mounted at `node`, as a pointer click would.
    pub fn click(&self, node: NodeId) -> Option<RecordedActivation> {
        let control = self.control(node)?;
        let mut event = RecordedActivation::default();
        control.activate(&mut event);
        Some(event)
    }

    /// Deliver pointer-enter to the control at `node`.
    pub fn pointer_enter(&mut self, node: NodeId) -> Option<ControlVisual> {
        let control = self.control(node)?;
        let visual = control.pointer_enter();
        let style = control.style();
        self.set_attribute(node, "style", &style);
        Some(visual)
    }

    /// Deliver pointer-leave to the control at `node`.
    pub fn pointer_leave(&mut self, node: NodeId) -> Option<ControlVisual> {
        let control = self.control(node)?;
        let visual = control.pointer_leave();
        let style = control.style();
        self.set_attribute(node, "style", &style);
        Some(visual)
    }

    /// Drain the mutation records accumulated since the last call.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord<NodeId>> {
        std::mem::take(&mut self.mutations)
    }

    fn build_control_element(&mut self, control: &BrowseControl) -> NodeId {
        let button = self.create_element("button");
        self.set_attribute(button, "class", control.marker_class());
        self.set_attribute(button, "type", "button");
        self.set_attribute(button, "title", control.title());
        self.set_attribute(button, "style", &control.style());

        let svg = self.create_element("svg");
        for (name, value) in [
            ("xmlns", "http://www.w3.org/2000/svg"),
            ("viewBox", "0 0 24 24"),
            ("width", "20"),
            ("height", "20"),
            ("fill", "currentColor"),
        ] {
            self.set_attribute(svg, name, value);
        }
        let path = self.create_element("path");
        self.set_attribute(path, "d", FOLDER_ICON_PATH);
        self.link(svg, path);
        self.link(button, svg);
        button
    }
}

impl HostDocument for Document {
    type Node = NodeId;

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, HostError> {
        self.select(selector)
    }

    fn query_first(&self, scope: &NodeId, selector: &str) -> Result<Option<NodeId>, HostError> {
        let list = SelectorList::parse(selector).map_err(|m| HostError::selector(selector, m))?;
        Ok(self
            .descendant_elements(*scope)
            .into_iter()
            .find(|&n| list.matches(self, n)))
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.get_attribute(*node, name).map(str::to_string)
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.collect_text(*node, &mut out);
        out
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.has_class_name(*node, class)
    }

    fn append_control(
        &mut self,
        target: &NodeId,
        control: BrowseControl,
    ) -> Result<NodeId, HostError> {
        let button = self.build_control_element(&control);
        self.append_child(*target, button)?;
        trace!("mounted control for {} at {}", control.path(), button);
        self.controls.insert(button, control);
        Ok(button)
    }

    fn remove(&mut self, node: &NodeId) {
        if !self.detach(*node) {
            return;
        }
        self.controls.remove(node);
        for descendant in self.descendant_elements(*node) {
            self.controls.remove(&descendant);
        }
        self.mutations.push(MutationRecord::removed(1));
    }

    fn start_observing(&mut self) {
        self.mutations.clear();
    }
}
