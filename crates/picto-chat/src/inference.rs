//! AI inference contract.
//!
//! The engine composes one prompt per turn and hands it, the first held
//! image, and the conversation history projection to a stateless
//! [`InferenceClient`]. A single attempt is made per turn; retry and
//! history windowing are the client's own concerns.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use picto_core::types::{HistoryEntry, ImagePayload};

use crate::error::ChatError;

// =============================================================================
// Types
// =============================================================================

/// A successful model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceReply {
    /// Reply text, ready for display and text-to-speech.
    pub text: String,
}

// =============================================================================
// Trait
// =============================================================================

/// Stateless text+image completion call.
///
/// Implementations wrap a provider SDK. The trait abstracts over the
/// provider so tests can script replies with the mock.
pub trait InferenceClient: Send + Sync {
    /// Run one completion.
    ///
    /// # Arguments
    /// * `prompt` - Fully composed prompt text including preamble and history window.
    /// * `image` - The image under discussion, if any.
    /// * `history` - Full conversation history projection, oldest first.
    fn infer(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
        history: &[HistoryEntry],
    ) -> impl Future<Output = Result<InferenceReply, ChatError>> + Send;
}

// =============================================================================
// Mock implementation
// =============================================================================

/// One recorded `infer` invocation, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub image: Option<String>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone)]
enum ScriptedOutcome {
    Reply(String),
    Failure(String),
}

/// Mock inference client replaying a scripted sequence of outcomes.
///
/// Records every call it receives. When the script runs out it answers with
/// a fixed placeholder reply. An optional gate lets tests hold a call in
/// flight until they release it, to exercise mid-flight session resets.
#[derive(Debug, Default)]
pub struct MockInferenceClient {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Notify>>,
}

impl MockInferenceClient {
    /// A client that always answers with the placeholder reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose next call succeeds with the given text.
    pub fn with_reply(text: &str) -> Self {
        Self::with_script(vec![ScriptedOutcome::Reply(text.to_string())])
    }

    /// A client answering the given texts in order.
    pub fn with_replies(texts: &[&str]) -> Self {
        Self::with_script(
            texts
                .iter()
                .map(|t| ScriptedOutcome::Reply(t.to_string()))
                .collect(),
        )
    }

    /// A client whose next call fails with the given detail.
    pub fn with_failure(detail: &str) -> Self {
        Self::with_script(vec![ScriptedOutcome::Failure(detail.to_string())])
    }

    /// A client whose calls block until the returned handle is notified.
    pub fn gated(text: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut client = Self::with_reply(text);
        client.gate = Some(Arc::clone(&gate));
        (client, gate)
    }

    fn with_script(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls mutex poisoned").len()
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

impl InferenceClient for MockInferenceClient {
    async fn infer(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
        history: &[HistoryEntry],
    ) -> Result<InferenceReply, ChatError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(RecordedCall {
                prompt: prompt.to_string(),
                image: image.map(|i| i.data().to_string()),
                history: history.to_vec(),
            });

        let outcome = self
            .script
            .lock()
            .expect("script mutex poisoned")
            .pop_front();

        match outcome {
            Some(ScriptedOutcome::Reply(text)) => Ok(InferenceReply { text }),
            Some(ScriptedOutcome::Failure(detail)) => Err(ChatError::InferenceFailed(detail)),
            None => Ok(InferenceReply {
                text: "[mock reply]".to_string(),
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scripted_reply() {
        let client = MockInferenceClient::with_reply("A cat");
        let reply = client.infer("describe", None, &[]).await.unwrap();
        assert_eq!(reply.text, "A cat");
    }

    #[tokio::test]
    async fn test_mock_replies_in_order() {
        let client = MockInferenceClient::with_replies(&["first", "second"]);
        assert_eq!(client.infer("a", None, &[]).await.unwrap().text, "first");
        assert_eq!(client.infer("b", None, &[]).await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let client = MockInferenceClient::with_failure("model overloaded");
        let err = client.infer("describe", None, &[]).await.unwrap_err();
        assert!(matches!(err, ChatError::InferenceFailed(_)));
        assert!(err.to_string().contains("model overloaded"));
    }

    #[tokio::test]
    async fn test_mock_exhausted_script_uses_placeholder() {
        let client = MockInferenceClient::with_reply("once");
        client.infer("a", None, &[]).await.unwrap();
        let reply = client.infer("b", None, &[]).await.unwrap();
        assert_eq!(reply.text, "[mock reply]");
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let client = MockInferenceClient::new();
        let image = ImagePayload::new("data:image/jpeg;base64,AAAA");
        let history = vec![HistoryEntry {
            role: picto_core::types::Role::User,
            content: "earlier".to_string(),
        }];

        client
            .infer("the prompt", Some(&image), &history)
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "the prompt");
        assert_eq!(calls[0].image.as_deref(), Some("data:image/jpeg;base64,AAAA"));
        assert_eq!(calls[0].history, history);
    }

    #[tokio::test]
    async fn test_mock_gate_holds_call() {
        let (client, gate) = MockInferenceClient::gated("held");
        let client = Arc::new(client);

        let worker = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.infer("p", None, &[]).await })
        };

        // The call is parked on the gate until released.
        tokio::task::yield_now().await;
        assert_eq!(client.call_count(), 0);

        gate.notify_one();
        let reply = worker.await.unwrap().unwrap();
        assert_eq!(reply.text, "held");
        assert_eq!(client.call_count(), 1);
    }
}
