//! Conversation session state machine.
//!
//! A session owns a bounded, ordered set of images and the ordered message
//! history built against them. Image mutations of any kind reset the
//! history, so analysis turns never mix against inconsistent image sets,
//! and every mutation bumps a generation counter so a reply that settles
//! after a reset is discarded instead of appended.
//!
//! Turn lifecycle:
//! - Idle -> AwaitingReply (message dispatched to inference)
//! - AwaitingReply -> Idle (call settled, success or failure)
//!
//! A `send_message` arriving while a turn is awaiting its reply is rejected
//! by the state machine itself, not merely by UI button state.

use std::fmt;
use std::sync::{Arc, Mutex};

use picto_core::config::ChatConfig;
use picto_core::types::{ChatMessage, HistoryEntry, ImagePayload};

use crate::error::ChatError;
use crate::inference::InferenceClient;
use crate::prompt::{project_history, PromptBuilder};

/// Canned assistant reply when the user sends text before any image.
pub const NO_IMAGE_REPLY: &str =
    "Please capture or upload a photo first, then ask me about it.";

// =============================================================================
// Turn state machine
// =============================================================================

/// State of the pending turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    /// No turn in flight. Ready to send.
    Idle,
    /// A message was dispatched; awaiting the inference reply.
    AwaitingReply,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnState::Idle => write!(f, "Idle"),
            TurnState::AwaitingReply => write!(f, "AwaitingReply"),
        }
    }
}

impl TurnState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &TurnState) -> bool {
        matches!(
            (self, target),
            (TurnState::Idle, TurnState::AwaitingReply)
                | (TurnState::AwaitingReply, TurnState::Idle)
        )
    }
}

/// Thread-safe guard over the turn state.
///
/// All transitions are validated before being applied; an attempt to begin
/// a turn while one is in flight fails instead of overlapping.
#[derive(Debug, Clone)]
pub struct TurnGuard {
    state: Arc<Mutex<TurnState>>,
}

impl Default for TurnGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnGuard {
    /// Create a guard initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TurnState::Idle)),
        }
    }

    /// Returns the current state.
    pub fn current(&self) -> TurnState {
        *self.state.lock().expect("turn state mutex poisoned")
    }

    /// Attempt to transition to the target state.
    pub fn transition(&self, target: TurnState) -> Result<(), ChatError> {
        let mut state = self.state.lock().expect("turn state mutex poisoned");
        if state.can_transition_to(&target) {
            tracing::debug!("Turn state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(ChatError::InvalidTransition(format!(
                "{} -> {}",
                *state, target
            )))
        }
    }

    /// Force the guard back to Idle, whatever the current state.
    pub fn settle(&self) {
        let mut state = self.state.lock().expect("turn state mutex poisoned");
        *state = TurnState::Idle;
    }
}

// =============================================================================
// Session
// =============================================================================

/// Result of a completed `send_message` call.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The model replied and the message was appended.
    Replied(ChatMessage),
    /// No image was held; the canned assistant prompt was appended instead
    /// and no inference call was made.
    NeedsImage(ChatMessage),
    /// The reply arrived after the image set changed and was discarded.
    Superseded,
}

#[derive(Debug, Default)]
struct SessionState {
    images: Vec<ImagePayload>,
    messages: Vec<ChatMessage>,
    /// Bumped on every image mutation; replies settling against a stale
    /// generation are discarded.
    generation: u64,
}

/// One conversation session: a bounded image set, the message history built
/// against it, and the single-flight turn guard.
///
/// Collaborators are injected; the session performs no I/O of its own
/// beyond the inference call.
pub struct ChatSession<I: InferenceClient> {
    state: Mutex<SessionState>,
    turn: TurnGuard,
    prompt: PromptBuilder,
    client: I,
    config: ChatConfig,
}

impl<I: InferenceClient> ChatSession<I> {
    /// Create a session with the given configuration and inference client.
    pub fn new(config: ChatConfig, client: I) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            turn: TurnGuard::new(),
            prompt: PromptBuilder::new(&config),
            client,
            config,
        }
    }

    /// Add an image to the session.
    ///
    /// An empty payload is the "clear all" sentinel. Otherwise the payload
    /// is appended, the set is truncated to the most recent `max_images`
    /// (oldest evicted first), and the message history is cleared.
    pub fn add_image(&self, payload: ImagePayload) {
        let mut state = self.state.lock().expect("session mutex poisoned");
        if payload.is_empty() {
            let dropped = state.images.len();
            state.images.clear();
            state.messages.clear();
            state.generation += 1;
            tracing::debug!(dropped, "Image set cleared via sentinel");
            return;
        }

        state.images.push(payload);
        let overflow = state.images.len().saturating_sub(self.config.max_images);
        if overflow > 0 {
            state.images.drain(..overflow);
        }
        state.messages.clear();
        state.generation += 1;
        tracing::debug!(images = state.images.len(), "Image added");
    }

    /// Remove the image at `index` and clear the message history.
    ///
    /// Out-of-range indices are a no-op: removal is total over any index,
    /// never an error.
    pub fn remove_image(&self, index: usize) {
        let mut state = self.state.lock().expect("session mutex poisoned");
        if index >= state.images.len() {
            tracing::debug!(
                index,
                held = state.images.len(),
                "Ignoring out-of-range image removal"
            );
            return;
        }
        state.images.remove(index);
        state.messages.clear();
        state.generation += 1;
    }

    /// Clear all images and the message history.
    pub fn clear_images(&self) {
        let mut state = self.state.lock().expect("session mutex poisoned");
        state.images.clear();
        state.messages.clear();
        state.generation += 1;
        tracing::debug!("Image set cleared");
    }

    /// Send a user message and await the model's reply.
    ///
    /// With no image held, a canned assistant prompt is appended and no
    /// inference call is made. On inference failure the session keeps the
    /// user's message and appends nothing. A reply settling after the image
    /// set changed is discarded.
    pub async fn send_message(&self, text: &str) -> Result<TurnOutcome, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        // Claim the turn before touching state, so concurrent sends cannot
        // interleave even on the no-image path.
        self.turn
            .transition(TurnState::AwaitingReply)
            .map_err(|_| ChatError::TurnInProgress)?;

        let (prompt_text, first_image, history, generation) = {
            let mut state = self.state.lock().expect("session mutex poisoned");
            if state.images.is_empty() {
                let reply = ChatMessage::assistant(NO_IMAGE_REPLY);
                state.messages.push(reply.clone());
                drop(state);
                self.turn.settle();
                return Ok(TurnOutcome::NeedsImage(reply));
            }

            let history = project_history(&state.messages);
            let first_image = state.images[0].clone();
            let user = ChatMessage::user(trimmed).with_image(first_image.data());
            state.messages.push(user);
            let prompt_text = self.prompt.compose(trimmed, state.images.len(), &history);
            (prompt_text, first_image, history, state.generation)
        };

        tracing::debug!(chars = prompt_text.len(), "Dispatching turn to inference");
        let result = self
            .client
            .infer(&prompt_text, Some(&first_image), &history)
            .await;
        self.turn.settle();

        match result {
            Ok(reply) => {
                let mut state = self.state.lock().expect("session mutex poisoned");
                if state.generation != generation {
                    tracing::debug!("Discarding reply for a superseded image set");
                    return Ok(TurnOutcome::Superseded);
                }
                let message = ChatMessage::assistant(reply.text);
                state.messages.push(message.clone());
                Ok(TurnOutcome::Replied(message))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Inference failed; keeping only the user message");
                Err(e)
            }
        }
    }

    /// Whether a turn is currently awaiting its reply.
    pub fn is_busy(&self) -> bool {
        self.turn.current() == TurnState::AwaitingReply
    }

    /// Images currently held, oldest first.
    pub fn images(&self) -> Vec<ImagePayload> {
        self.state
            .lock()
            .expect("session mutex poisoned")
            .images
            .clone()
    }

    /// Number of images currently held.
    pub fn image_count(&self) -> usize {
        self.state.lock().expect("session mutex poisoned").images.len()
    }

    /// The full message history, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state
            .lock()
            .expect("session mutex poisoned")
            .messages
            .clone()
    }

    /// The conversation history projection over the current messages.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let state = self.state.lock().expect("session mutex poisoned");
        project_history(&state.messages)
    }
}

// =============================================================================
// Tests
// =============================================================================
