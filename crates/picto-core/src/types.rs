use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person holding the camera.
    User,
    /// The model's reply.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

// =============================================================================
// Image payload
// =============================================================================

/// An opaque encoded image, typically a data URI produced by an
/// [`ImageSource`](https://docs.rs/picto-capture) implementation.
///
/// The engine never decodes or inspects the payload; encoding and size
/// normalization are the acquisition side's responsibility.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    data: String,
    /// When the image was captured or uploaded.
    pub captured_at: DateTime<Utc>,
}

impl ImagePayload {
    /// Wrap an encoded image payload, timestamped now.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            captured_at: Utc::now(),
        }
    }

    /// The raw encoded payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// An empty payload is the "clear all images" sentinel.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// =============================================================================
// Messages
// =============================================================================

/// One message in a conversation session. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Encoded image shown alongside the message, if any.
    pub image: Option<String>,
    /// Reference to an audio rendition of the message, if any.
    pub audio: Option<String>,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            image: None,
            audio: None,
        }
    }

    /// Attach an image reference for display.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Attach an audio reference.
    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }
}

/// One row of the conversation history projection sent to inference:
/// just the role and the text, nothing else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
