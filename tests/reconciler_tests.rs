// Tests for transcript reconciliation
//
// Continuous recognizers re-emit overlapping and superset variants of
// text already delivered as final; these tests pin down the dedup,
// subsumption, and append behavior that keeps the transcript clean.

use voiceform::{FinalOutcome, TranscriptReconciler};

#[test]
fn test_single_final_segment_commits() {
    let mut reconciler = TranscriptReconciler::new();

    let outcome = reconciler.push_final("the sky is blue");

    assert_eq!(outcome, FinalOutcome::Appended);
    assert_eq!(reconciler.committed_text(), "the sky is blue");
    assert_eq!(reconciler.word_count(), 4);
}

#[test]
fn test_duplicate_final_segment_is_idempotent() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("the sky is blue");
    let outcome = reconciler.push_final("the sky is blue");

    assert_eq!(outcome, FinalOutcome::Discarded);
    assert_eq!(reconciler.committed_text(), "the sky is blue");
}

#[test]
fn test_duplicate_detection_ignores_case_and_punctuation() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("The sky is blue.");
    let outcome = reconciler.push_final("the sky, is blue");

    assert_eq!(outcome, FinalOutcome::Discarded);
    assert_eq!(reconciler.committed_text(), "The sky is blue.");
}

#[test]
fn test_subsumption_replaces_instead_of_appending() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("the sky");
    let outcome = reconciler.push_final("the sky is blue");

    assert_eq!(outcome, FinalOutcome::Replaced);
    assert_eq!(reconciler.committed_text(), "the sky is blue");
}

#[test]
fn test_substring_of_committed_is_discarded() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("the sky is blue today");
    let outcome = reconciler.push_final("sky is blue");

    assert_eq!(outcome, FinalOutcome::Discarded);
    assert_eq!(reconciler.committed_text(), "the sky is blue today");
}

#[test]
fn test_independent_segments_append_with_single_space() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("hello there");
    let outcome = reconciler.push_final("how are you");

    assert_eq!(outcome, FinalOutcome::Appended);
    assert_eq!(reconciler.committed_text(), "hello there how are you");
}

#[test]
fn test_reprocessing_same_batch_yields_same_transcript() {
    let segments = ["hello there", "how are you", "hello there"];

    let mut once = TranscriptReconciler::new();
    for segment in segments {
        once.push_final(segment);
    }

    let mut twice = TranscriptReconciler::new();
    for segment in segments.iter().chain(segments.iter()) {
        twice.push_final(segment);
    }

    assert_eq!(once.committed_text(), twice.committed_text());
}

#[test]
fn test_empty_and_punctuation_only_segments_are_discarded() {
    let mut reconciler = TranscriptReconciler::new();

    assert_eq!(reconciler.push_final(""), FinalOutcome::Discarded);
    assert_eq!(reconciler.push_final("   "), FinalOutcome::Discarded);
    assert_eq!(reconciler.push_final("?!..."), FinalOutcome::Discarded);
    assert_eq!(reconciler.committed_text(), "");
    assert!(reconciler.is_empty());
}

#[test]
fn test_interim_is_displayed_but_never_committed() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("first part");
    reconciler.push_interim("second par");

    assert_eq!(reconciler.committed_text(), "first part");
    assert_eq!(reconciler.display_text(), "first part second par");
}

#[test]
fn test_interim_is_replaced_wholesale() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_interim("he");
    reconciler.push_interim("hello wor");

    assert_eq!(reconciler.interim_text(), "hello wor");
    assert_eq!(reconciler.display_text(), "hello wor");
}

#[test]
fn test_final_clears_interim() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_interim("hello wor");
    reconciler.push_final("hello world");

    assert_eq!(reconciler.interim_text(), "");
    assert_eq!(reconciler.display_text(), "hello world");
}

#[test]
fn test_interim_does_not_poison_dedup() {
    let mut reconciler = TranscriptReconciler::new();

    // An interim sighting of a phrase must not suppress its final form
    reconciler.push_interim("good morning");
    let outcome = reconciler.push_final("good morning");

    assert_eq!(outcome, FinalOutcome::Appended);
    assert_eq!(reconciler.committed_text(), "good morning");
}

#[test]
fn test_reset_clears_seen_keys_for_session_isolation() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("the sky is blue");
    reconciler.reset();

    assert_eq!(reconciler.committed_text(), "");

    // A segment seen in session 1 is not suppressed in session 2
    let outcome = reconciler.push_final("the sky is blue");
    assert_eq!(outcome, FinalOutcome::Appended);
    assert_eq!(reconciler.committed_text(), "the sky is blue");
}

#[test]
fn test_word_count_tracks_committed_only() {
    let mut reconciler = TranscriptReconciler::new();

    reconciler.push_final("one two three");
    reconciler.push_interim("four five");

    assert_eq!(reconciler.word_count(), 3);
}
