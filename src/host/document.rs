use anyhow::Result;
use std::collections::HashMap;

/// Weak handle into the host document
///
/// The host framework may re-render and invalidate any node at any time,
/// so a `NodeRef` is never cached across write attempts; every use
/// re-probes the live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub u64);

/// How to assign a value into a field
///
/// `Descriptor` bypasses framework-intercepted setters by writing through
/// the underlying property descriptor; writers attempt both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignMode {
    Plain,
    Descriptor,
}

/// Events the host framework needs to notice a value change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Focus,
    Input,
    Change,
    Blur,
}

/// What a probe of a live node returns
#[derive(Debug, Clone, Default)]
pub struct NodeSnapshot {
    /// Element kind, e.g. "textarea", "input", "div"
    pub tag: String,
    pub visible: bool,
    pub read_only: bool,
    pub disabled: bool,
    pub value: String,
    /// Text of an associated label element, if any
    pub label_text: Option<String>,
    /// Text of the preceding sibling, if any
    pub preceding_text: Option<String>,
    /// Text content of the parent element, if any
    pub parent_text: Option<String>,
    pub attrs: HashMap<String, String>,
}

impl NodeSnapshot {
    /// Whether this node accepts free text (the resolver only ever writes
    /// into text-area-like elements)
    pub fn is_text_input(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => matches!(
                self.attrs.get("type").map(String::as_str),
                None | Some("") | Some("text") | Some("email") | Some("search")
            ),
            _ => false,
        }
    }

    /// All nearby text a label-based search may match against
    pub fn context_text(&self) -> String {
        [
            self.label_text.as_deref(),
            self.preceding_text.as_deref(),
            self.parent_text.as_deref(),
        ]
        .iter()
        .flatten()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A document the widget does not own
///
/// All access is read-mostly and best-effort: queries return handles that
/// may already be stale, probes return `None` for nodes that are gone,
/// and mutations report plain success/failure instead of erroring.
pub trait HostDocument: Send + Sync {
    /// Nodes whose attribute `attr` equals `value`, in document order
    fn find_by_attr(&self, attr: &str, value: &str) -> Vec<NodeRef>;

    /// Nodes whose `id` attribute contains `fragment`
    fn find_by_partial_id(&self, fragment: &str) -> Vec<NodeRef>;

    /// All text-area-like elements in document order
    fn text_inputs(&self) -> Vec<NodeRef>;

    /// Text-area-like descendants of `node` in document order
    fn descendant_text_inputs(&self, node: NodeRef) -> Vec<NodeRef>;

    /// Inspect a node; `None` when it no longer exists
    fn probe(&self, node: NodeRef) -> Option<NodeSnapshot>;

    /// Remove read-only/disabled attributes so the node accepts a write
    fn clear_read_only(&self, node: NodeRef);

    /// Assign a value; `false` when the node is gone
    fn set_value(&self, node: NodeRef, value: &str, mode: AssignMode) -> bool;

    /// Dispatch a field event; `false` when the node is gone
    fn dispatch(&self, node: NodeRef, event: FieldEvent) -> bool;

    /// Read the current value back; `None` when the node is gone
    fn read_value(&self, node: NodeRef) -> Option<String>;

    /// Whether the widget has same-origin access to this document
    fn same_origin(&self) -> bool;

    /// Install the cooperating ready-listener into the document.
    /// Fails when cross-origin; callers degrade silently.
    fn install_ready_listener(&self) -> Result<()>;

    /// Hand a finalized-transcript broadcast to an installed listener.
    /// Returns whether a listener was present to handle it.
    fn deliver_ready(&self, question_id: &str, transcript: &str, field_id: Option<&str>) -> bool;
}
