//! Picto Chat crate - The conversation-and-image session engine.
//!
//! Owns the bounded image set and ordered message history for one session,
//! projects that state into each inference call, and enforces the
//! single-flight turn lifecycle. Image acquisition, speech I/O, and the
//! model itself are injected collaborators defined by trait contracts.

pub mod error;
pub mod inference;
pub mod prompt;
pub mod session;
pub mod voice;

pub use error::ChatError;
pub use inference::{InferenceClient, InferenceReply, MockInferenceClient, RecordedCall};
pub use prompt::{project_history, PromptBuilder};
pub use session::{ChatSession, TurnGuard, TurnOutcome, TurnState, NO_IMAGE_REPLY};
pub use voice::run_voice_turn;
