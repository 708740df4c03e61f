//! Picto Speech crate - Speech input/output contracts for the conversation engine.
//!
//! Provides trait-based abstractions for speech-to-text (a lazy, restartable
//! stream of recognized fragments) and text-to-speech (best-effort,
//! fire-and-forget playback), plus mock implementations for testing without
//! a real recognizer or audio device.
//!
//! Unsupported environments and denied microphone permission are reported as
//! a [`SpeechStatus`], not an error: voice becomes unavailable while text
//! entry stays functional.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use picto_core::error::PictoError;

// =============================================================================
// Status
// =============================================================================

/// Availability of speech recognition in the current environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeechStatus {
    /// Recognition is available and permitted.
    Available,
    /// The environment has no speech recognition support.
    Unsupported,
    /// The user denied microphone permission.
    PermissionDenied,
}

impl std::fmt::Display for SpeechStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechStatus::Available => write!(f, "available"),
            SpeechStatus::Unsupported => write!(f, "unsupported"),
            SpeechStatus::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

// =============================================================================
// Transcript stream
// =============================================================================

/// One recognized fragment of speech.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptFragment {
    /// Recognized text.
    pub text: String,
    /// Whether the recognizer considers this fragment settled. Interim
    /// fragments may be revised by a later final one.
    pub is_final: bool,
}

impl TranscriptFragment {
    /// A settled fragment.
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// An interim fragment that may still be revised.
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Create a bounded transcript channel.
///
/// The sink side is held by the recognizer; the stream side by the consumer.
/// Dropping the sink (silence, recognizer stop) terminates the stream, and
/// calling [`TranscriptStream::stop`] tells the producer to cease.
pub fn transcript_channel(capacity: usize) -> (TranscriptSink, TranscriptStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let stopped = Arc::new(AtomicBool::new(false));
    (
        TranscriptSink {
            tx,
            stopped: Arc::clone(&stopped),
        },
        TranscriptStream { rx, stopped },
    )
}

/// Producer side of a transcript stream.
#[derive(Debug, Clone)]
pub struct TranscriptSink {
    tx: mpsc::Sender<TranscriptFragment>,
    stopped: Arc<AtomicBool>,
}

impl TranscriptSink {
    /// Deliver a fragment to the consumer.
    ///
    /// Returns `false` when the stream was stopped or dropped, in which case
    /// the producer should cease recognition.
    pub async fn push(&self, fragment: TranscriptFragment) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return false;
        }
        self.tx.send(fragment).await.is_ok()
    }

    /// Whether the consumer asked the stream to stop.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Consumer side of a transcript stream.
///
/// Yields fragments until the recognizer stops on silence or the consumer
/// cancels via [`stop`](TranscriptStream::stop).
#[derive(Debug)]
pub struct TranscriptStream {
    rx: mpsc::Receiver<TranscriptFragment>,
    stopped: Arc<AtomicBool>,
}

impl TranscriptStream {
    /// Receive the next fragment, or `None` once the stream has terminated.
    pub async fn next(&mut self) -> Option<TranscriptFragment> {
        if self.stopped.load(Ordering::Relaxed) {
            return None;
        }
        self.rx.recv().await
    }

    /// Cancel the stream. The producer observes the flag and ceases;
    /// subsequent `next` calls return `None`.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Relaxed);
        self.rx.close();
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Speech-to-text input.
///
/// `transcribe` is restartable: each call begins a fresh recognition pass
/// and yields a fresh stream.
pub trait SpeechInput: Send + Sync {
    /// Availability in the current environment.
    fn status(&self) -> SpeechStatus;

    /// Start a recognition pass.
    ///
    /// Returns an error when recognition is unsupported or not permitted.
    fn transcribe(&self) -> impl Future<Output = Result<TranscriptStream, PictoError>> + Send;
}

/// Text-to-speech output. Best-effort: playback failures are logged by the
/// implementation and never surfaced to the caller.
pub trait SpeechOutput: Send + Sync {
    /// Speak the given text, fire-and-forget.
    fn speak(&self, text: &str) -> impl Future<Output = ()> + Send;
}

// =============================================================================
// Mock implementations
// =============================================================================

/// Mock speech input that replays a scripted sequence of fragments.
///
/// Each `transcribe` call yields a fresh stream over the same script, so
/// restartability can be exercised in tests.
#[derive(Debug, Clone)]
pub struct MockSpeechInput {
    status: SpeechStatus,
    fragments: Vec<TranscriptFragment>,
    starts: Arc<AtomicUsize>,
}

impl MockSpeechInput {
    /// A mock that recognizes the given utterances as final fragments.
    pub fn with_utterances(utterances: &[&str]) -> Self {
        Self {
            status: SpeechStatus::Available,
            fragments: utterances
                .iter()
                .map(|u| TranscriptFragment::final_text(*u))
                .collect(),
            starts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A mock that replays the given fragments verbatim.
    pub fn with_fragments(fragments: Vec<TranscriptFragment>) -> Self {
        Self {
            status: SpeechStatus::Available,
            fragments,
            starts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A mock reporting the given non-available status.
    pub fn unavailable(status: SpeechStatus) -> Self {
        Self {
            status,
            fragments: Vec::new(),
            starts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of recognition passes started.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::Relaxed)
    }
}

impl SpeechInput for MockSpeechInput {
    fn status(&self) -> SpeechStatus {
        self.status
    }

    async fn transcribe(&self) -> Result<TranscriptStream, PictoError> {
        if self.status != SpeechStatus::Available {
            return Err(PictoError::Speech(format!(
                "Speech recognition {}",
                self.status
            )));
        }
        self.starts.fetch_add(1, Ordering::Relaxed);

        let (sink, stream) = transcript_channel(self.fragments.len() + 1);
        for fragment in &self.fragments {
            if !sink.push(fragment.clone()).await {
                break;
            }
        }
        // Sink drops here, terminating the stream after the script.
        Ok(stream)
    }
}

/// Mock speech output that records everything spoken.
#[derive(Debug, Clone, Default)]
pub struct MockSpeechOutput {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl MockSpeechOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().expect("spoken mutex poisoned").clone()
    }
}

impl SpeechOutput for MockSpeechOutput {
    async fn speak(&self, text: &str) {
        tracing::debug!(chars = text.len(), "Mock speech output");
        self.spoken
            .lock()
            .expect("spoken mutex poisoned")
            .push(text.to_string());
    }
}

// =============================================================================
// Tests
// =============================================================================
