//! Picto Capture crate - Image acquisition contract and normalization policy.
//!
//! Provides the ImageSource trait the conversation engine consumes, a
//! MockImageSource for testing, and the NormalizationPolicy describing the
//! downscaling/compression contract acquisition implementations honor.
//!
//! Real implementations (camera, file picker) live in the embedding shell;
//! the engine only sees opaque encoded payloads.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use picto_core::config::CaptureConfig;
use picto_core::error::PictoError;
use picto_core::types::ImagePayload;

// =============================================================================
// Normalization policy
// =============================================================================

/// Downscaling and compression bounds an [`ImageSource`] applies before
/// handing a payload to the session.
///
/// The session relies on the resulting size bound but never on a specific
/// encoding, so these are advisory targets, not wire format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationPolicy {
    /// Maximum image width in pixels after downscaling.
    pub max_width: u32,
    /// JPEG quality factor in (0.0, 1.0].
    pub jpeg_quality: f32,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            max_width: 800,
            jpeg_quality: 0.7,
        }
    }
}

impl NormalizationPolicy {
    /// Build a policy from the capture section of the configuration.
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            max_width: config.max_width,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// A policy is valid when the width is nonzero and the quality factor
    /// is within (0.0, 1.0].
    pub fn is_valid(&self) -> bool {
        self.max_width > 0 && self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Source of encoded image payloads.
///
/// Implementations wrap a camera or file picker and perform downscaling and
/// compression per their [`NormalizationPolicy`]. The trait abstracts over
/// the acquisition mechanism so tests can use the mock.
pub trait ImageSource: Send + Sync {
    /// Acquire one encoded image.
    fn capture(&self) -> impl Future<Output = Result<ImagePayload, PictoError>> + Send;

    /// Discard any held preview or staged image state.
    fn clear(&self);
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock image source for testing.
///
/// Returns deterministic data-URI payloads without touching any hardware,
/// and counts capture and clear calls so tests can assert interaction.
#[derive(Debug, Clone)]
pub struct MockImageSource {
    payload: String,
    captures: Arc<AtomicUsize>,
    clears: Arc<AtomicUsize>,
}

impl Default for MockImageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageSource {
    /// Create a mock source yielding a fixed dummy payload.
    pub fn new() -> Self {
        Self::with_payload("data:image/jpeg;base64,bW9jaw==")
    }

    /// Create a mock source yielding the given payload.
    pub fn with_payload(payload: &str) -> Self {
        Self {
            payload: payload.to_string(),
            captures: Arc::new(AtomicUsize::new(0)),
            clears: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of captures performed so far.
    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::Relaxed)
    }

    /// Number of times `clear` was called.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::Relaxed)
    }
}

impl ImageSource for MockImageSource {
    async fn capture(&self) -> Result<ImagePayload, PictoError> {
        if self.payload.is_empty() {
            return Err(PictoError::Capture(
                "Mock source has no payload configured".to_string(),
            ));
        }
        self.captures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(bytes = self.payload.len(), "Mock image captured");
        Ok(ImagePayload::new(self.payload.clone()))
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- NormalizationPolicy ----

    #[test]
    fn test_policy_default() {
        let policy = NormalizationPolicy::default();
        assert_eq!(policy.max_width, 800);
        assert!((policy.jpeg_quality - 0.7).abs() < f32::EPSILON);
        assert!(policy.is_valid());
    }

    #[test]
    fn test_policy_from_config() {
        let config = CaptureConfig {
            max_width: 1024,
            jpeg_quality: 0.8,
        };
        let policy = NormalizationPolicy::from_config(&config);
        assert_eq!(policy.max_width, 1024);
        assert!((policy.jpeg_quality - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_policy_invalid_zero_width() {
        let policy = NormalizationPolicy {
            max_width: 0,
            jpeg_quality: 0.7,
        };
        assert!(!policy.is_valid());
    }

    #[test]
    fn test_policy_invalid_quality_bounds() {
        let too_low = NormalizationPolicy {
            max_width: 800,
            jpeg_quality: 0.0,
        };
        assert!(!too_low.is_valid());

        let too_high = NormalizationPolicy {
            max_width: 800,
            jpeg_quality: 1.5,
        };
        assert!(!too_high.is_valid());

        let at_max = NormalizationPolicy {
            max_width: 800,
            jpeg_quality: 1.0,
        };
        assert!(at_max.is_valid());
    }

    // ---- MockImageSource ----

    #[tokio::test]
    async fn test_mock_capture() {
        let source = MockImageSource::new();
        let image = source.capture().await.unwrap();
        assert!(image.data().starts_with("data:image/jpeg;base64,"));
        assert_eq!(source.capture_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_capture_custom_payload() {
        let source = MockImageSource::with_payload("data:image/png;base64,cGc=");
        let image = source.capture().await.unwrap();
        assert_eq!(image.data(), "data:image/png;base64,cGc=");
    }

    #[tokio::test]
    async fn test_mock_capture_counts() {
        let source = MockImageSource::new();
        source.capture().await.unwrap();
        source.capture().await.unwrap();
        source.capture().await.unwrap();
        assert_eq!(source.capture_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_capture_empty_payload_errors() {
        let source = MockImageSource::with_payload("");
        let result = source.capture().await;
        assert!(result.is_err());
        assert_eq!(source.capture_count(), 0);
    }

    #[test]
    fn test_mock_clear_counts() {
        let source = MockImageSource::new();
        source.clear();
        source.clear();
        assert_eq!(source.clear_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_clone_shares_counters() {
        let source = MockImageSource::new();
        let clone = source.clone();
        clone.capture().await.unwrap();
        assert_eq!(source.capture_count(), 1);
    }
}
