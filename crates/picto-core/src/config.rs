use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PictoError, Result};

/// Default system preamble prepended to every inference prompt.
pub const DEFAULT_PREAMBLE: &str = "You are a helpful visual assistant. \
Answer questions about the photo the user has shared, describing only what \
you can actually see.";

/// Top-level configuration for a Picto deployment.
///
/// Loaded from a TOML file by the embedding shell. Each section corresponds
/// to one subsystem crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PictoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl PictoConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PictoConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PictoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Image acquisition settings.
///
/// These describe the normalization policy acquisition implementations
/// apply before handing a payload to the session; the session itself only
/// relies on the resulting size bound, never on a specific encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Maximum image width in pixels after downscaling.
    pub max_width: u32,
    /// JPEG quality factor in (0.0, 1.0].
    pub jpeg_quality: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            jpeg_quality: 0.7,
        }
    }
}

/// Speech input/output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether voice interaction is enabled at all.
    pub enabled: bool,
    /// Recognition language code (e.g., "en-US").
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en-US".to_string(),
        }
    }
}

/// Conversation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum number of images a session holds; the oldest is evicted first.
    pub max_images: usize,
    /// Number of recent turns inlined into the composed prompt.
    pub max_history_turns: usize,
    /// Word budget the model is asked to keep its replies within.
    pub response_word_budget: usize,
    /// Fixed system preamble prepended to every prompt.
    pub preamble: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_images: 3,
            max_history_turns: 10,
            response_word_budget: 100,
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PictoConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.capture.max_width, 800);
        assert!((config.capture.jpeg_quality - 0.7).abs() < f32::EPSILON);
        assert!(config.speech.enabled);
        assert_eq!(config.speech.language, "en-US");
        assert_eq!(config.chat.max_images, 3);
        assert_eq!(config.chat.max_history_turns, 10);
        assert_eq!(config.chat.response_word_budget, 100);
        assert_eq!(config.chat.preamble, DEFAULT_PREAMBLE);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = PictoConfig::default();
        config.chat.max_images = 5;
        config.chat.response_word_budget = 40;
        config.speech.language = "fr-FR".to_string();
        config.save(&path).unwrap();

        let loaded = PictoConfig::load(&path).unwrap();
        assert_eq!(loaded.chat.max_images, 5);
        assert_eq!(loaded.chat.response_word_budget, 40);
        assert_eq!(loaded.speech.language, "fr-FR");
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(PictoConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = PictoConfig::load_or_default(&path);
        assert_eq!(config.chat.max_images, 3);
    }

    #[test]
    fn test_load_or_default_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not [ valid toml").unwrap();
        let config = PictoConfig::load_or_default(&path);
        assert_eq!(config.chat.max_history_turns, 10);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[chat]\nmax_images = 2\n").unwrap();

        let config = PictoConfig::load(&path).unwrap();
        assert_eq!(config.chat.max_images, 2);
        // Everything unspecified falls back to defaults.
        assert_eq!(config.chat.response_word_budget, 100);
        assert_eq!(config.capture.max_width, 800);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("config.toml");
        PictoConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }
}
