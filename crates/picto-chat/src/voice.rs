//! Voice turn helper: one round of speech in, reply out.
//!
//! Drains a single recognition pass into an utterance, sends it through the
//! session, and speaks a successful reply. Speech being unavailable is not
//! an error for the conversation: the turn is simply skipped and text entry
//! remains the caller's fallback.

use picto_speech::{SpeechInput, SpeechOutput, SpeechStatus};

use crate::error::ChatError;
use crate::inference::InferenceClient;
use crate::session::{ChatSession, TurnOutcome};

/// Run one voice turn against the session.
///
/// Returns `Ok(None)` when speech is unavailable or the recognition pass
/// produced no final text; otherwise the outcome of the sent message.
/// Replies are spoken best-effort; playback failures never surface here.
pub async fn run_voice_turn<I, In, Out>(
    session: &ChatSession<I>,
    input: &In,
    output: &Out,
) -> Result<Option<TurnOutcome>, ChatError>
where
    I: InferenceClient,
    In: SpeechInput,
    Out: SpeechOutput,
{
    if input.status() != SpeechStatus::Available {
        tracing::info!(status = %input.status(), "Speech unavailable; voice turn skipped");
        return Ok(None);
    }

    let mut stream = input.transcribe().await?;
    let mut utterance = String::new();
    while let Some(fragment) = stream.next().await {
        // Interim fragments get revised later; only final ones count.
        if !fragment.is_final {
            continue;
        }
        if !utterance.is_empty() {
            utterance.push(' ');
        }
        utterance.push_str(fragment.text.trim());
    }

    if utterance.trim().is_empty() {
        tracing::debug!("Recognition pass ended with no final text");
        return Ok(None);
    }

    let outcome = session.send_message(&utterance).await?;
    if let TurnOutcome::Replied(message) = &outcome {
        output.speak(&message.content).await;
    }
    Ok(Some(outcome))
}

// =============================================================================
// Tests
// =============================================================================
