//! JSON snapshots of host markup.
//!
//! ```json
//! { "tag": "div", "attrs": { "data-disk-path": "/mnt/disk1" },
//!   "children": [ { "tag": "span", "attrs": { "class": "v-list-item-title" },
//!                   "children": [ { "text": "Disk 1" } ] } ] }
//! ```
//!
//! A snapshot is either one node or an array of nodes. A top-level `body`
//! element merges into the document body instead of nesting a second one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Document, NodeId};
use crate::error::HostError;

/// One node of a document snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotNode {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<SnapshotNode>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotRoot {
    Many(Vec<SnapshotNode>),
    One(SnapshotNode),
}

impl Document {
    /// Build a document from snapshot nodes appended to the body.
    pub fn from_snapshot(nodes: &[SnapshotNode]) -> Result<Self, HostError> {
        let mut doc = Document::new();
        let body = doc.body();
        for node in nodes {
            match node {
                SnapshotNode::Element {
                    tag,
                    attrs,
                    children,
                } if tag.eq_ignore_ascii_case("body") => {
                    for (name, value) in attrs {
                        doc.set_attribute(body, name, value);
                    }
                    for child in children {
                        doc.insert_snapshot(body, child)?;
                    }
                }
                other => {
                    doc.insert_snapshot(body, other)?;
                }
            }
        }
        doc.take_mutations();
        Ok(doc)
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        match serde_json::from_str::<SnapshotRoot>(json)? {
            SnapshotRoot::Many(nodes) => Self::from_snapshot(&nodes),
            SnapshotRoot::One(node) => Self::from_snapshot(std::slice::from_ref(&node)),
        }
    }

    /// Parse a snapshot from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, HostError> {
        match serde_json::from_value::<SnapshotRoot>(value)? {
            SnapshotRoot::Many(nodes) => Self::from_snapshot(&nodes),
            SnapshotRoot::One(node) => Self::from_snapshot(std::slice::from_ref(&node)),
        }
    }

    /// Append a snapshot subtree under `parent`, returning its root node.
    ///
    /// The subtree is built detached and attached in one step, so it shows
    /// up as a single mutation record.
    pub fn insert_snapshot(
        &mut self,
        parent: NodeId,
        node: &SnapshotNode,
    ) -> Result<NodeId, HostError> {
        let root = self.build_snapshot(node);
        self.append_child(parent, root)?;
        Ok(root)
    }

    fn build_snapshot(&mut self, node: &SnapshotNode) -> NodeId {
        match node {
            SnapshotNode::Text { text } => self.create_text(text),
            SnapshotNode::Element {
                tag,
                attrs,
                children,
            } => {
                let element = self.create_element(tag);
                for (name, value) in attrs {
                    self.set_attribute(element, name, value);
                }
                for child in children {
                    let child = self.build_snapshot(child);
                    self.link(element, child);
                }
                element
            }
        }
    }
}
