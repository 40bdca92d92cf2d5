// Tests for heuristic answer-field resolution
//
// The host document offers no markup contract, so these tests pin the
// cascade order, the retry behavior, and the write/verify sequence
// against scripted in-memory host pages.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use voiceform::{
    AssignMode, FieldEvent, FieldResolver, HostDocument, MemoryDocument, MemoryNode,
    ResolveError, ResolverConfig, ResolutionStrategy,
};

fn test_config() -> ResolverConfig {
    ResolverConfig {
        retry_delays: vec![Duration::from_millis(50), Duration::from_millis(50)],
        blur_delay: Duration::from_millis(10),
        ..ResolverConfig::default()
    }
}

fn resolver_for(doc: &Arc<MemoryDocument>) -> FieldResolver {
    FieldResolver::new(Arc::clone(doc) as Arc<dyn HostDocument>, test_config())
}

#[test]
fn test_direct_lookup_by_data_attribute() {
    let doc = Arc::new(MemoryDocument::new());
    doc.add(MemoryNode::default()); // decoy textarea, first in document order
    let target = doc.add(MemoryNode::default().with_attr("data-question-field-id", "fld-1"));

    let resolved = resolver_for(&doc).resolve(Some("fld-1")).unwrap();

    assert_eq!(resolved.node, target);
    assert_eq!(resolved.strategy, ResolutionStrategy::DirectAttribute);
}

#[test]
fn test_direct_lookup_by_name_and_partial_id() {
    let doc = Arc::new(MemoryDocument::new());
    let by_name = doc.add(MemoryNode::default().with_attr("name", "fld-2"));
    let by_partial = doc.add(MemoryNode::default().with_attr("id", "question-fld-3-input"));

    let resolver = resolver_for(&doc);

    assert_eq!(resolver.resolve(Some("fld-2")).unwrap().node, by_name);
    assert_eq!(resolver.resolve(Some("fld-3")).unwrap().node, by_partial);
}

#[test]
fn test_wrapper_match_descends_to_text_input() {
    let doc = Arc::new(MemoryDocument::new());
    let wrapper = doc.add(MemoryNode {
        tag: "div".to_string(),
        ..MemoryNode::default()
    }
    .with_attr("data-question-field-id", "fld-4"));
    let inner = doc.add(MemoryNode {
        parent: Some(wrapper),
        ..MemoryNode::default()
    });

    let resolved = resolver_for(&doc).resolve(Some("fld-4")).unwrap();

    assert_eq!(resolved.node, inner);
    assert_eq!(resolved.strategy, ResolutionStrategy::WrapperDescendant);
}

#[test]
fn test_label_marker_beats_positional_fallback() {
    let doc = Arc::new(MemoryDocument::new());

    // An empty, visible textarea earlier in document order: the positional
    // fallback would grab it
    doc.add(MemoryNode {
        label_text: Some("Comments".to_string()),
        ..MemoryNode::default()
    });

    let marked = doc.add(MemoryNode {
        label_text: Some("Voice Response".to_string()),
        parent_text: Some("Voice Response required".to_string()),
        ..MemoryNode::default()
    });

    let resolved = resolver_for(&doc).resolve(Some("no-such-id")).unwrap();

    assert_eq!(resolved.node, marked);
    assert_eq!(resolved.strategy, ResolutionStrategy::LabelMarker);
}

#[test]
fn test_label_marker_requires_both_markers() {
    let doc = Arc::new(MemoryDocument::new());

    // Marker phrase present but no required marker: strategy 3 must not
    // match, leaving the positional fallback to pick it up instead
    doc.add(MemoryNode {
        label_text: Some("Voice Response".to_string()),
        ..MemoryNode::default()
    });

    let resolved = resolver_for(&doc).resolve(None).unwrap();

    assert_eq!(resolved.strategy, ResolutionStrategy::EmptyFallback);
}

#[test]
fn test_label_marker_prefers_empty_or_read_only_candidates() {
    let doc = Arc::new(MemoryDocument::new());

    doc.add(MemoryNode {
        label_text: Some("Voice Response required".to_string()),
        value: "already answered".to_string(),
        ..MemoryNode::default()
    });
    let empty = doc.add(MemoryNode {
        label_text: Some("Voice Response required".to_string()),
        ..MemoryNode::default()
    });

    let resolved = resolver_for(&doc).resolve(None).unwrap();

    assert_eq!(resolved.node, empty);
    assert_eq!(resolved.strategy, ResolutionStrategy::LabelMarker);
}

#[test]
fn test_fallback_prefers_empty_or_read_only_then_any_visible() {
    let doc = Arc::new(MemoryDocument::new());
    let filled = doc.add(MemoryNode {
        value: "filled".to_string(),
        ..MemoryNode::default()
    });
    let empty = doc.add(MemoryNode::default());

    let resolver = resolver_for(&doc);

    let resolved = resolver.resolve(None).unwrap();
    assert_eq!(resolved.node, empty);
    assert_eq!(resolved.strategy, ResolutionStrategy::EmptyFallback);

    // With every visible field filled, the last resort is the first one
    doc.remove(empty);
    let resolved = resolver.resolve(None).unwrap();
    assert_eq!(resolved.node, filled);
    assert_eq!(resolved.strategy, ResolutionStrategy::AnyVisible);
}

#[test]
fn test_fallback_skips_invisible_fields() {
    let doc = Arc::new(MemoryDocument::new());
    doc.add(MemoryNode {
        visible: false,
        ..MemoryNode::default()
    });
    let visible = doc.add(MemoryNode::default());

    let resolved = resolver_for(&doc).resolve(None).unwrap();

    assert_eq!(resolved.node, visible);
}

#[tokio::test]
async fn test_deliver_writes_unlocks_and_fires_event_sequence() -> Result<()> {
    let doc = Arc::new(MemoryDocument::new());
    let target = doc.add(MemoryNode {
        read_only: true,
        ..MemoryNode::default()
    }
    .with_attr("data-question-field-id", "fld-9"));

    let resolver = resolver_for(&doc);
    resolver.deliver(Some("fld-9"), "the transcript").await?;

    assert_eq!(doc.read_value(target).unwrap(), "the transcript");
    assert!(!doc.probe(target).unwrap().read_only);

    // Both assignment modes attempted, in order
    let modes: Vec<AssignMode> = doc
        .assignments()
        .iter()
        .map(|(_, mode, _)| *mode)
        .collect();
    assert_eq!(modes, vec![AssignMode::Plain, AssignMode::Descriptor]);

    // Focus, input, change, then the delayed blur
    let events: Vec<FieldEvent> = doc.events().iter().map(|(_, event)| *event).collect();
    assert_eq!(
        events,
        vec![
            FieldEvent::Focus,
            FieldEvent::Input,
            FieldEvent::Change,
            FieldEvent::Blur
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_deliver_retries_until_host_renders_the_field() -> Result<()> {
    let doc = Arc::new(MemoryDocument::new());

    // The host page renders its answer field late
    let late_doc = Arc::clone(&doc);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        late_doc.add(MemoryNode::default().with_attr("data-question-field-id", "late-field"));
    });

    let resolver = resolver_for(&doc);
    let target = resolver.deliver(Some("late-field"), "made it").await?;

    assert_eq!(doc.read_value(target.node).unwrap(), "made it");

    Ok(())
}

#[tokio::test]
async fn test_deliver_exhausts_retries_without_a_field() {
    let doc = Arc::new(MemoryDocument::new());

    let resolver = resolver_for(&doc);
    let result = resolver.deliver(Some("nothing-here"), "transcript").await;

    assert!(matches!(result, Err(ResolveError::FieldNotFound)));
}

#[tokio::test]
async fn test_deliver_re_resolves_after_host_re_render() -> Result<()> {
    let doc = Arc::new(MemoryDocument::new());
    let first = doc.add(MemoryNode::default().with_attr("data-question-field-id", "fld-r"));

    let resolver = resolver_for(&doc);
    resolver.deliver(Some("fld-r"), "first write").await?;
    assert_eq!(doc.read_value(first).unwrap(), "first write");

    // Host re-render: the old node dies, a replacement appears
    doc.remove(first);
    let second = doc.add(MemoryNode::default().with_attr("data-question-field-id", "fld-r"));

    resolver.deliver(Some("fld-r"), "second write").await?;

    assert!(doc.read_value(first).is_none());
    assert_eq!(doc.read_value(second).unwrap(), "second write");

    Ok(())
}

#[tokio::test]
async fn test_idempotent_overwrite_last_write_wins() -> Result<()> {
    let doc = Arc::new(MemoryDocument::new());
    let target = doc.add(MemoryNode::default().with_attr("name", "fld-w"));

    let resolver = resolver_for(&doc);
    resolver.deliver(Some("fld-w"), "version one").await?;
    resolver.deliver(Some("fld-w"), "version two").await?;

    assert_eq!(doc.read_value(target).unwrap(), "version two");

    Ok(())
}
