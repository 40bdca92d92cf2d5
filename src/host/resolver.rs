use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::document::{AssignMode, FieldEvent, HostDocument, NodeRef, NodeSnapshot};

/// Which heuristic located the answer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Stable identifier matched an attribute convention directly
    DirectAttribute,
    /// Identifier matched a wrapper; first writable descendant used
    WrapperDescendant,
    /// Label/nearby text carried the marker phrase and required marker
    LabelMarker,
    /// First visible, empty-or-read-only text input in the document
    EmptyFallback,
    /// First visible text input at all
    AnyVisible,
}

/// A resolved answer field
///
/// Holds a weak handle; it is valid for one write attempt and is never
/// reused across deliveries.
#[derive(Debug, Clone)]
pub struct FieldTarget {
    pub node: NodeRef,
    pub strategy: ResolutionStrategy,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no writable answer field found in host document")]
    FieldNotFound,
}

/// Resolver tuning
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Expected field caption for the label-based search
    pub marker_phrase: String,
    /// Independent marker that must also appear near the field
    pub required_marker: String,
    /// Fixed delays before re-running the whole resolve-and-write attempt
    pub retry_delays: Vec<Duration>,
    /// Pause before dispatching blur, letting the host framework's own
    /// debounced handlers run first
    pub blur_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            marker_phrase: "voice response".to_string(),
            required_marker: "required".to_string(),
            retry_delays: vec![
                Duration::from_millis(200),
                Duration::from_millis(500),
                Duration::from_millis(1000),
            ],
            blur_delay: Duration::from_millis(150),
        }
    }
}

/// Locates the writable answer field in the host document and writes the
/// transcript into it
///
/// The host document offers no reliable contract, so resolution is an
/// ordered cascade of heuristics, retried after fixed delays because the
/// host's own rendering may not be ready yet. Exhausting every strategy
/// is non-fatal: the transcript stays visible in the widget and the
/// submission record is sent regardless.
pub struct FieldResolver {
    doc: Arc<dyn HostDocument>,
    config: ResolverConfig,
}

impl FieldResolver {
    pub fn new(doc: Arc<dyn HostDocument>, config: ResolverConfig) -> Self {
        Self { doc, config }
    }

    /// Run the resolution cascade once
    pub fn resolve(&self, field_id: Option<&str>) -> Option<FieldTarget> {
        if let Some(id) = field_id.filter(|id| !id.is_empty()) {
            if let Some(target) = self.resolve_direct(id) {
                return Some(target);
            }
        }

        self.resolve_by_label()
            .or_else(|| self.resolve_fallback())
    }

    /// Strategies 1 and 2: direct lookup by the stable identifier across
    /// attribute conventions, descending into wrapper elements
    fn resolve_direct(&self, id: &str) -> Option<FieldTarget> {
        let mut matches: Vec<NodeRef> = Vec::new();

        for attr in ["data-question-field-id", "name", "id"] {
            matches.extend(self.doc.find_by_attr(attr, id));
        }
        matches.extend(self.doc.find_by_partial_id(id));

        for node in matches {
            let Some(snapshot) = self.doc.probe(node) else {
                continue;
            };

            if snapshot.is_text_input() {
                return Some(FieldTarget {
                    node,
                    strategy: ResolutionStrategy::DirectAttribute,
                });
            }

            // The identifier sits on a wrapper; take its first writable
            // text descendant
            if let Some(descendant) = self
                .doc
                .descendant_text_inputs(node)
                .into_iter()
                .find(|n| self.doc.probe(*n).is_some())
            {
                return Some(FieldTarget {
                    node: descendant,
                    strategy: ResolutionStrategy::WrapperDescendant,
                });
            }
        }

        None
    }

    /// Strategy 3: scan every text input for the marker phrase plus the
    /// independent required marker in its label/preceding/parent text,
    /// preferring fields that show as empty or read-only
    fn resolve_by_label(&self) -> Option<FieldTarget> {
        let marker = self.config.marker_phrase.to_lowercase();
        let required = self.config.required_marker.to_lowercase();

        let mut candidates: Vec<(NodeRef, NodeSnapshot)> = Vec::new();

        for node in self.doc.text_inputs() {
            let Some(snapshot) = self.doc.probe(node) else {
                continue;
            };

            let context = snapshot.context_text();
            if context.contains(&marker) && context.contains(&required) {
                candidates.push((node, snapshot));
            }
        }

        let preferred = candidates
            .iter()
            .find(|(_, snapshot)| snapshot.value.is_empty() || snapshot.read_only)
            .map(|(node, _)| *node);

        preferred
            .or_else(|| candidates.first().map(|(node, _)| *node))
            .map(|node| FieldTarget {
                node,
                strategy: ResolutionStrategy::LabelMarker,
            })
    }

    /// Strategies 4 and 5: positional fallbacks. Known correctness risk on
    /// pages with several empty textareas; kept as heuristic behavior.
    fn resolve_fallback(&self) -> Option<FieldTarget> {
        let mut first_visible = None;

        for node in self.doc.text_inputs() {
            let Some(snapshot) = self.doc.probe(node) else {
                continue;
            };

            if !snapshot.visible {
                continue;
            }

            if snapshot.value.is_empty() || snapshot.read_only {
                return Some(FieldTarget {
                    node,
                    strategy: ResolutionStrategy::EmptyFallback,
                });
            }

            if first_visible.is_none() {
                first_visible = Some(node);
            }
        }

        first_visible.map(|node| FieldTarget {
            node,
            strategy: ResolutionStrategy::AnyVisible,
        })
    }

    /// Resolve the answer field and write `value` into it, retrying after
    /// fixed delays while the host document may still be rendering
    pub async fn deliver(
        &self,
        field_id: Option<&str>,
        value: &str,
    ) -> Result<FieldTarget, ResolveError> {
        let mut attempt = 0usize;

        loop {
            if let Some(target) = self.resolve(field_id) {
                debug!(
                    attempt,
                    strategy = ?target.strategy,
                    "answer field resolved"
                );
                self.write(&target, value).await;
                return Ok(target);
            }

            match self.config.retry_delays.get(attempt) {
                Some(delay) => {
                    debug!(attempt, "answer field not found; retrying after {:?}", delay);
                    tokio::time::sleep(*delay).await;
                    attempt += 1;
                }
                None => {
                    warn!("answer field not found after {} attempts", attempt + 1);
                    return Err(ResolveError::FieldNotFound);
                }
            }
        }
    }

    /// Write sequence: unlock, assign through both modes, fire the event
    /// sequence the host framework listens for, then verify by re-reading
    async fn write(&self, target: &FieldTarget, value: &str) {
        let node = target.node;

        self.doc.clear_read_only(node);

        self.doc.set_value(node, value, AssignMode::Plain);
        self.doc.set_value(node, value, AssignMode::Descriptor);

        self.doc.dispatch(node, FieldEvent::Focus);
        self.doc.dispatch(node, FieldEvent::Input);
        self.doc.dispatch(node, FieldEvent::Change);

        tokio::time::sleep(self.config.blur_delay).await;
        self.doc.dispatch(node, FieldEvent::Blur);

        match self.doc.read_value(node) {
            Some(read_back) if read_back == value => {
                debug!(strategy = ?target.strategy, "transcript write verified");
            }
            Some(read_back) => {
                warn!(
                    expected_len = value.len(),
                    actual_len = read_back.len(),
                    "transcript write verification mismatch"
                );
            }
            None => {
                warn!("answer field disappeared before write verification");
            }
        }
    }
}
