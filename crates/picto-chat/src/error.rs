//! Error types for the conversation engine.

use picto_core::error::PictoError;

/// Errors from the conversation engine.
///
/// An empty image set is deliberately not represented here: sending text
/// without an image is handled locally with a canned assistant reply, not
/// surfaced as a failure.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("a turn is already awaiting its reply")]
    TurnInProgress,
    #[error("invalid turn state transition: {0}")]
    InvalidTransition(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("speech unavailable: {0}")]
    SpeechUnavailable(String),
}

impl From<PictoError> for ChatError {
    fn from(err: PictoError) -> Self {
        match err {
            PictoError::Speech(msg) => ChatError::SpeechUnavailable(msg),
            other => ChatError::InferenceFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::EmptyMessage;
        assert_eq!(err.to_string(), "message cannot be empty");

        let err = ChatError::TurnInProgress;
        assert_eq!(err.to_string(), "a turn is already awaiting its reply");

        let err = ChatError::InvalidTransition("Idle -> Idle".to_string());
        assert_eq!(
            err.to_string(),
            "invalid turn state transition: Idle -> Idle"
        );

        let err = ChatError::InferenceFailed("model overloaded".to_string());
        assert_eq!(err.to_string(), "inference failed: model overloaded");

        let err = ChatError::SpeechUnavailable("permission denied".to_string());
        assert_eq!(err.to_string(), "speech unavailable: permission denied");
    }

    #[test]
    fn test_from_picto_speech_error() {
        let err: ChatError = PictoError::Speech("no microphone".to_string()).into();
        assert!(matches!(err, ChatError::SpeechUnavailable(_)));
        assert!(err.to_string().contains("no microphone"));
    }

    #[test]
    fn test_from_other_picto_errors() {
        let err: ChatError = PictoError::Inference("timeout".to_string()).into();
        assert!(matches!(err, ChatError::InferenceFailed(_)));
        assert!(err.to_string().contains("timeout"));

        let err: ChatError = PictoError::Capture("camera gone".to_string()).into();
        assert!(matches!(err, ChatError::InferenceFailed(_)));
    }

    #[test]
    fn test_errors_implement_debug() {
        let dbg = format!("{:?}", ChatError::TurnInProgress);
        assert!(dbg.contains("TurnInProgress"));
    }
}
