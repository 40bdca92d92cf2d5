use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::document::{AssignMode, FieldEvent, HostDocument, NodeRef, NodeSnapshot};

/// A node of an in-memory host page
#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    pub visible: bool,
    pub read_only: bool,
    pub disabled: bool,
    pub value: String,
    pub label_text: Option<String>,
    pub preceding_text: Option<String>,
    pub parent_text: Option<String>,
    pub parent: Option<NodeRef>,
}

impl Default for MemoryNode {
    fn default() -> Self {
        Self {
            tag: "textarea".to_string(),
            attrs: HashMap::new(),
            visible: true,
            read_only: false,
            disabled: false,
            value: String::new(),
            label_text: None,
            preceding_text: None,
            parent_text: None,
            parent: None,
        }
    }
}

impl MemoryNode {
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }
}

struct Stored {
    node: MemoryNode,
    removed: bool,
}

#[derive(Default)]
struct Inner {
    nodes: Vec<(NodeRef, Stored)>,
    next_id: u64,
    listener_installed: bool,
    events: Vec<(NodeRef, FieldEvent)>,
    assignments: Vec<(NodeRef, AssignMode, String)>,
}

/// In-memory host document
///
/// Stands in for the uncontrolled page embedding the widget: the demo
/// service builds a sample form out of it, and tests use it to script
/// arbitrary host markup, re-renders, and cross-origin refusals.
pub struct MemoryDocument {
    inner: Mutex<Inner>,
    same_origin: bool,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            same_origin: true,
        }
    }

    /// A document the widget has no same-origin access to
    pub fn cross_origin() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            same_origin: false,
        }
    }

    /// Add a node, returning its handle
    pub fn add(&self, node: MemoryNode) -> NodeRef {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = NodeRef(inner.next_id);
        inner.nodes.push((
            id,
            Stored {
                node,
                removed: false,
            },
        ));
        id
    }

    /// Drop a node, simulating a host re-render that invalidated it
    pub fn remove(&self, node: NodeRef) {
        let mut inner = self.inner.lock().unwrap();
        if let Some((_, stored)) = inner.nodes.iter_mut().find(|(id, _)| *id == node) {
            stored.removed = true;
        }
    }

    /// Events dispatched so far, in order
    pub fn events(&self) -> Vec<(NodeRef, FieldEvent)> {
        self.inner.lock().unwrap().events.clone()
    }

    /// Value assignments so far, in order
    pub fn assignments(&self) -> Vec<(NodeRef, AssignMode, String)> {
        self.inner.lock().unwrap().assignments.clone()
    }

    pub fn listener_installed(&self) -> bool {
        self.inner.lock().unwrap().listener_installed
    }

    /// The host page the demo service embeds the widget into: identity
    /// inputs plus a read-only answer area behind a wrapper carrying the
    /// stable field identifier.
    pub fn sample_form(answer_field_id: &str) -> Self {
        let doc = Self::new();

        doc.add(MemoryNode {
            tag: "input".to_string(),
            label_text: Some("Name".to_string()),
            value: "Jordan Example".to_string(),
            ..MemoryNode::default()
        }
        .with_attr("type", "text")
        .with_attr("name", "name")
        .with_attr("id", "respondent-name"));

        doc.add(MemoryNode {
            tag: "input".to_string(),
            label_text: Some("Email".to_string()),
            value: "jordan@example.com".to_string(),
            ..MemoryNode::default()
        }
        .with_attr("type", "email")
        .with_attr("name", "email")
        .with_attr("id", "respondent-email"));

        let wrapper = doc.add(MemoryNode {
            tag: "div".to_string(),
            ..MemoryNode::default()
        }
        .with_attr("data-question-field-id", answer_field_id));

        doc.add(MemoryNode {
            tag: "textarea".to_string(),
            read_only: true,
            label_text: Some("Voice Response".to_string()),
            parent_text: Some("Voice Response required".to_string()),
            parent: Some(wrapper),
            ..MemoryNode::default()
        });

        doc
    }

    fn snapshot_of(stored: &Stored) -> NodeSnapshot {
        NodeSnapshot {
            tag: stored.node.tag.clone(),
            visible: stored.node.visible,
            read_only: stored.node.read_only,
            disabled: stored.node.disabled,
            value: stored.node.value.clone(),
            label_text: stored.node.label_text.clone(),
            preceding_text: stored.node.preceding_text.clone(),
            parent_text: stored.node.parent_text.clone(),
            attrs: stored.node.attrs.clone(),
        }
    }

    fn is_under(inner: &Inner, node: NodeRef, ancestor: NodeRef) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = inner
                .nodes
                .iter()
                .find(|(nid, _)| *nid == id)
                .and_then(|(_, stored)| stored.node.parent);
        }
        false
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDocument for MemoryDocument {
    fn find_by_attr(&self, attr: &str, value: &str) -> Vec<NodeRef> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .iter()
            .filter(|(_, stored)| {
                !stored.removed && stored.node.attrs.get(attr).map(String::as_str) == Some(value)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn find_by_partial_id(&self, fragment: &str) -> Vec<NodeRef> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .iter()
            .filter(|(_, stored)| {
                !stored.removed
                    && stored
                        .node
                        .attrs
                        .get("id")
                        .map(|id| id.contains(fragment))
                        .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn text_inputs(&self) -> Vec<NodeRef> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .iter()
            .filter(|(_, stored)| !stored.removed && Self::snapshot_of(stored).is_text_input())
            .map(|(id, _)| *id)
            .collect()
    }

    fn descendant_text_inputs(&self, node: NodeRef) -> Vec<NodeRef> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .iter()
            .filter(|(id, stored)| {
                !stored.removed
                    && *id != node
                    && Self::snapshot_of(stored).is_text_input()
                    && Self::is_under(&inner, *id, node)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn probe(&self, node: NodeRef) -> Option<NodeSnapshot> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .iter()
            .find(|(id, stored)| *id == node && !stored.removed)
            .map(|(_, stored)| Self::snapshot_of(stored))
    }

    fn clear_read_only(&self, node: NodeRef) {
        let mut inner = self.inner.lock().unwrap();
        if let Some((_, stored)) = inner
            .nodes
            .iter_mut()
            .find(|(id, stored)| *id == node && !stored.removed)
        {
            stored.node.read_only = false;
            stored.node.disabled = false;
        }
    }

    fn set_value(&self, node: NodeRef, value: &str, mode: AssignMode) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let found = inner
            .nodes
            .iter_mut()
            .find(|(id, stored)| *id == node && !stored.removed)
            .map(|(_, stored)| {
                stored.node.value = value.to_string();
            })
            .is_some();

        if found {
            inner.assignments.push((node, mode, value.to_string()));
        }
        found
    }

    fn dispatch(&self, node: NodeRef, event: FieldEvent) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let alive = inner
            .nodes
            .iter()
            .any(|(id, stored)| *id == node && !stored.removed);

        if alive {
            inner.events.push((node, event));
        }
        alive
    }

    fn read_value(&self, node: NodeRef) -> Option<String> {
        self.probe(node).map(|snapshot| snapshot.value)
    }

    fn same_origin(&self) -> bool {
        self.same_origin
    }

    fn install_ready_listener(&self) -> Result<()> {
        if !self.same_origin {
            anyhow::bail!("host document is cross-origin");
        }
        self.inner.lock().unwrap().listener_installed = true;
        Ok(())
    }

    fn deliver_ready(&self, question_id: &str, transcript: &str, field_id: Option<&str>) -> bool {
        if !self.listener_installed() {
            return false;
        }

        // The cooperating listener copies the transcript into the field
        // it can find, using the same attribute conventions; an identifier
        // on a wrapper leads to its first text descendant
        let target = field_id
            .and_then(|id| {
                ["data-question-field-id", "name", "id"]
                    .iter()
                    .flat_map(|attr| self.find_by_attr(attr, id))
                    .find_map(|node| {
                        let snapshot = self.probe(node)?;
                        if snapshot.is_text_input() {
                            Some(node)
                        } else {
                            self.descendant_text_inputs(node).into_iter().next()
                        }
                    })
            })
            .or_else(|| {
                let inputs = self.text_inputs();
                inputs
                    .iter()
                    .copied()
                    .find(|node| {
                        self.probe(*node)
                            .map(|snapshot| snapshot.tag == "textarea")
                            .unwrap_or(false)
                    })
                    .or_else(|| inputs.into_iter().next())
            });

        match target {
            Some(node) => {
                self.clear_read_only(node);
                let applied = self.set_value(node, transcript, AssignMode::Plain);
                debug!(question_id, applied, "host listener handled ready broadcast");
                applied
            }
            None => false,
        }
    }
}
