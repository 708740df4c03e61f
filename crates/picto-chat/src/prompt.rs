//! Prompt composition and conversation history projection.
//!
//! Builds the exact text handed to the inference client: the fixed system
//! preamble, the response word budget, a window of recent turns, and the
//! user's message with the multi-image count disclosure when the session
//! holds more than one image.

use picto_core::config::ChatConfig;
use picto_core::types::{ChatMessage, HistoryEntry};

/// Project messages into the role/content list sent to inference.
///
/// Oldest first, no limit at this layer: truncation against the model's
/// context window is the inference client's own policy.
pub fn project_history(messages: &[ChatMessage]) -> Vec<HistoryEntry> {
    messages.iter().map(HistoryEntry::from).collect()
}

/// Composes the outgoing prompt text for one turn.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
    max_history_turns: usize,
    response_word_budget: usize,
}

impl PromptBuilder {
    /// Build from the chat section of the configuration.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            preamble: config.preamble.clone(),
            max_history_turns: config.max_history_turns,
            response_word_budget: config.response_word_budget,
        }
    }

    /// Compose the full prompt for a user message.
    ///
    /// `history` is the projection of every message before this one; only
    /// the most recent `max_history_turns` turns are inlined.
    pub fn compose(&self, user_text: &str, image_count: usize, history: &[HistoryEntry]) -> String {
        let mut sections = Vec::with_capacity(4);
        sections.push(self.preamble.clone());
        sections.push(format!(
            "Keep your reply under {} words.",
            self.response_word_budget
        ));

        let window = self.window(history);
        if !window.is_empty() {
            let lines: Vec<String> = window
                .iter()
                .map(|entry| format!("{}: {}", entry.role, entry.content))
                .collect();
            sections.push(format!("Conversation so far:\n{}", lines.join("\n")));
        }

        sections.push(Self::disclose(user_text, image_count));
        sections.join("\n\n")
    }

    /// Prefix the user's text with the image count disclosure when more
    /// than one image is held. Only the first image is transmitted; the
    /// disclosure tells the model about the rest.
    pub fn disclose(user_text: &str, image_count: usize) -> String {
        if image_count > 1 {
            format!("I have {} images to analyze. {}", image_count, user_text)
        } else {
            user_text.to_string()
        }
    }

    /// The most recent `max_history_turns` turns, two entries per turn.
    fn window<'a>(&self, history: &'a [HistoryEntry]) -> &'a [HistoryEntry] {
        let keep = self.max_history_turns.saturating_mul(2);
        &history[history.len().saturating_sub(keep)..]
    }
}

// =============================================================================
// Tests
// =============================================================================
