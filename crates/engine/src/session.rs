//! Per-session state: guided question selection and chat transcript.

use crate::requests::QuestionRequest;
use crate::Engine;
use indexmap::IndexSet;
use pris_core::AppResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of guided questions in one report.
pub const MAX_SELECTED: usize = 3;

/// Result of a single [`SelectionState::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Whether the toggled question is selected afterwards.
    pub selected: bool,
    /// The limit was exceeded and older selections were dropped.
    pub warning_raised: bool,
    /// Questions dropped to restore the limit, oldest first.
    pub evicted: Vec<String>,
}

/// Clamp a selection to [`MAX_SELECTED`], dropping the oldest entries.
pub fn enforce_limit(mut set: IndexSet<String>) -> (IndexSet<String>, bool) {
    let exceeded = set.len() > MAX_SELECTED;
    while set.len() > MAX_SELECTED {
        set.shift_remove_index(0);
    }
    (set, exceeded)
}

/// Guided questions chosen for the next report, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: IndexSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `question`, then enforce the limit.
    pub fn toggle(&mut self, question: &str) -> ToggleOutcome {
        let mut next = std::mem::take(&mut self.selected);
        if !next.shift_remove(question) {
            next.insert(question.to_string());
        }

        let before = next.clone();
        let (clamped, warning_raised) = enforce_limit(next);
        let evicted: Vec<String> = before
            .into_iter()
            .filter(|q| !clamped.contains(q))
            .collect();

        if warning_raised {
            tracing::warn!(
                "Please select only up to {} questions; dropped {} older selection(s)",
                MAX_SELECTED,
                evicted.len()
            );
        }

        self.selected = clamped;
        ToggleOutcome {
            selected: self.selected.contains(question),
            warning_raised,
            evicted,
        }
    }

    pub fn contains(&self, question: &str) -> bool {
        self.selected.contains(question)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn questions(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Append-only chat history for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTranscript {
    turns: Vec<ChatTurn>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: ChatRole, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// State owned by one interactive user.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub country: String,
    pub selection: SelectionState,
    pub transcript: ChatTranscript,
}

impl Session {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            country: country.into(),
            selection: SelectionState::new(),
            transcript: ChatTranscript::new(),
        }
    }

    /// Ask a free-form question and record both turns.
    ///
    /// If synthesis fails the user turn is kept and no assistant turn is added.
    pub async fn submit_chat(&mut self, engine: &Engine, question: &str) -> AppResult<String> {
        self.transcript.append(ChatRole::User, question);

        let request = QuestionRequest {
            country: self.country.clone(),
            question: question.to_string(),
        };
        let response = engine.answer(&request).await?;

        self.transcript.append(ChatRole::Assistant, response.text.clone());
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> IndexSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_enforce_limit_keeps_most_recent() {
        let (clamped, warned) = enforce_limit(set(&["a", "b", "c", "d", "e"]));
        assert!(warned);
        assert_eq!(clamped, set(&["c", "d", "e"]));

        let (clamped, warned) = enforce_limit(set(&["a", "b"]));
        assert!(!warned);
        assert_eq!(clamped, set(&["a", "b"]));
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut selection = SelectionState::new();

        let outcome = selection.toggle("q1");
        assert!(outcome.selected);
        assert!(!outcome.warning_raised);
        assert!(selection.contains("q1"));

        let outcome = selection.toggle("q1");
        assert!(!outcome.selected);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_original() {
        let mut selection = SelectionState::new();
        selection.toggle("a");
        selection.toggle("b");
        let original = selection.clone();

        for q in ["a", "b", "c"] {
            selection.toggle(q);
            selection.toggle(q);
            assert_eq!(selection, original, "toggling {} twice", q);
        }
    }

    #[test]
    fn test_fourth_selection_warns_and_evicts_oldest() {
        let mut selection = SelectionState::new();
        for q in ["q1", "q2", "q3"] {
            assert!(!selection.toggle(q).warning_raised);
        }

        let outcome = selection.toggle("q4");
        assert!(outcome.warning_raised);
        assert!(outcome.selected);
        assert_eq!(outcome.evicted, vec!["q1".to_string()]);
        assert_eq!(selection.questions(), vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_limit_holds_under_rapid_toggling() {
        let mut selection = SelectionState::new();
        let questions: Vec<String> = (0..12).map(|i| format!("q{}", i)).collect();

        for round in 0..5 {
            for (i, q) in questions.iter().enumerate() {
                if (i + round) % 3 != 0 {
                    selection.toggle(q);
                }
                assert!(selection.len() <= MAX_SELECTED);
            }
        }
    }

    #[test]
    fn test_transcript_appends_in_order() {
        let mut transcript = ChatTranscript::new();
        transcript.append(ChatRole::User, "hello");
        transcript.append(ChatRole::Assistant, "hi");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0].role, ChatRole::User);
        assert_eq!(transcript.turns()[1].content, "hi");
    }

    #[test]
    fn test_chat_role_serializes_lowercase() {
        let turn = ChatTurn {
            role: ChatRole::Assistant,
            content: "x".into(),
        };
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
