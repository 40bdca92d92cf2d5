use std::collections::HashSet;
use tracing::debug;

/// How a final segment was folded into the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalOutcome {
    /// Already seen, already represented, or normalized to nothing
    Discarded,
    /// Appended to the committed text with a separating space
    Appended,
    /// The segment subsumed everything committed so far and replaced it
    Replaced,
}

/// Normalize text into a dedup key: trim, lowercase, strip punctuation,
/// collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    let stripped: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses raw recognition results into one deduplicated transcript
///
/// Committed text is append-only within a session: a final segment is
/// discarded when already represented, replaces the committed text when
/// it subsumes it, and is appended otherwise. Interim text is tracked
/// separately and never enters the committed text or the seen set.
#[derive(Debug, Default)]
pub struct TranscriptReconciler {
    committed: String,
    interim: String,
    seen_keys: HashSet<String>,
}

impl TranscriptReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a final segment into the committed transcript
    pub fn push_final(&mut self, text: &str) -> FinalOutcome {
        // Any final settles the utterance the interim text belonged to
        self.interim.clear();

        let key = normalize(text);
        if key.is_empty() {
            return FinalOutcome::Discarded;
        }

        if self.seen_keys.contains(&key) {
            debug!(segment = %key, "duplicate final segment discarded");
            return FinalOutcome::Discarded;
        }

        let committed_key = normalize(&self.committed);

        let outcome = if self.committed.is_empty() {
            self.committed = text.trim().to_string();
            FinalOutcome::Appended
        } else if committed_key.contains(&key) {
            // Already represented inside the committed text
            debug!(segment = %key, "final segment already represented; discarded");
            FinalOutcome::Discarded
        } else if key.contains(&committed_key) {
            // The engine re-emitted a longer version subsuming everything
            // so far; replacing avoids duplication while keeping the more
            // complete utterance
            debug!(segment = %key, "final segment subsumes committed text; replaced");
            self.committed = text.trim().to_string();
            FinalOutcome::Replaced
        } else {
            self.committed.push(' ');
            self.committed.push_str(text.trim());
            FinalOutcome::Appended
        };

        self.seen_keys.insert(key);

        outcome
    }

    /// Replace the interim (not-yet-final) text wholesale
    pub fn push_interim(&mut self, text: &str) {
        self.interim = text.trim().to_string();
    }

    /// Clear all transcript state. Called when a new session starts; the
    /// seen-key set is cleared here and nowhere else.
    pub fn reset(&mut self) {
        self.committed.clear();
        self.interim.clear();
        self.seen_keys.clear();
    }

    /// Final transcript accumulated so far
    pub fn committed_text(&self) -> &str {
        &self.committed
    }

    /// Committed text with the current interim text appended for display
    pub fn display_text(&self) -> String {
        if self.interim.is_empty() {
            self.committed.clone()
        } else if self.committed.is_empty() {
            self.interim.clone()
        } else {
            format!("{} {}", self.committed, self.interim)
        }
    }

    pub fn interim_text(&self) -> &str {
        &self.interim
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Whitespace-separated word count of the committed text
    pub fn word_count(&self) -> usize {
        self.committed.split_whitespace().count()
    }
}
