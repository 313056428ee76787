//! Application Configuration
//!
//! User settings and preferences stored in TOML format. Missing sections
//! or keys fall back to their defaults, so a partial file still loads.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition settings
    pub recognition: RecognitionSettings,
    /// Capture settings
    pub capture: CaptureSettings,
    /// Vehicle lookup settings
    pub lookup: LookupSettings,
    /// Recent-plates history settings
    pub history: HistorySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recognition: RecognitionSettings::default(),
            capture: CaptureSettings::default(),
            lookup: LookupSettings::default(),
            history: HistorySettings::default(),
        }
    }
}

/// Text recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// OCR language code
    pub language: String,
    /// Characters the recognizer may output, empty disables the whitelist
    pub char_whitelist: String,
    /// Tesseract page segmentation mode (11 = sparse text)
    pub page_seg_mode: u32,
    /// Observations below this confidence are dropped (0.0 - 1.0)
    pub min_confidence: f32,
    /// Image preprocessing applied before recognition
    pub preprocess: PreprocessSettings,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            char_whitelist: "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-".to_string(),
            page_seg_mode: 11,
            min_confidence: 0.0,
            preprocess: PreprocessSettings::default(),
        }
    }
}

/// Image preprocessing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessSettings {
    /// Preprocessing enabled
    pub enabled: bool,
    /// Integer upscale factor, 1 leaves the image alone
    pub scale: u32,
    /// Contrast stretch factor, 1.0 leaves the image alone
    pub contrast: f32,
    /// Convert to grayscale before recognition
    pub grayscale: bool,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 2,
            contrast: 1.3,
            grayscale: true,
        }
    }
}

/// Capture-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Directory of frames to replay, or empty for no capture input
    pub replay_dir: Option<String>,
    /// Maximum frames per second pulled from the source
    pub max_fps: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            replay_dir: None,
            max_fps: 30,
        }
    }
}

/// Vehicle lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Base URL of the vehicle registry
    pub base_url: String,
    /// Request path on the registry
    pub path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            path: "/search".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Recent-plates history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of plates kept
    pub cap: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { cap: 10 }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check recognition defaults
        assert_eq!(config.recognition.language, "eng");
        assert_eq!(
            config.recognition.char_whitelist,
            "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-"
        );
        assert_eq!(config.recognition.page_seg_mode, 11);
        assert!(config.recognition.min_confidence.abs() < 0.01);

        // Check preprocessing defaults
        assert!(config.recognition.preprocess.enabled);
        assert_eq!(config.recognition.preprocess.scale, 2);
        assert!((config.recognition.preprocess.contrast - 1.3).abs() < 0.01);
        assert!(config.recognition.preprocess.grayscale);

        // Check capture defaults
        assert!(config.capture.replay_dir.is_none());
        assert_eq!(config.capture.max_fps, 30);

        // Check lookup defaults
        assert_eq!(config.lookup.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.lookup.path, "/search");
        assert_eq!(config.lookup.timeout_secs, 10);

        // Check history defaults
        assert_eq!(config.history.cap, 10);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        // Serialize to TOML
        let toml_str = toml::to_string_pretty(&config).unwrap();

        // Deserialize back
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        // Verify values match
        assert_eq!(config.recognition.language, parsed.recognition.language);
        assert_eq!(config.capture.max_fps, parsed.capture.max_fps);
        assert_eq!(config.lookup.base_url, parsed.lookup.base_url);
        assert_eq!(config.history.cap, parsed.history.cap);
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.capture.replay_dir = Some("/tmp/frames".to_string());
        config.capture.max_fps = 10;
        config.recognition.min_confidence = 0.4;

        // Serialize and deserialize
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.capture.replay_dir, Some("/tmp/frames".to_string()));
        assert_eq!(parsed.capture.max_fps, 10);
        assert!((parsed.recognition.min_confidence - 0.4).abs() < 0.01);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let partial = r#"
            [recognition]
            language = "ukr"
        "#;

        let config: AppConfig = toml::from_str(partial).unwrap();

        assert_eq!(config.recognition.language, "ukr");
        assert_eq!(config.recognition.page_seg_mode, 11);
        assert_eq!(config.lookup.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.history.cap, 10);
    }

    #[test]
    fn test_save_and_load_config() {
        let config = AppConfig::default();

        // Create a temporary file
        let temp_file = NamedTempFile::new().unwrap();

        // Save config
        save_config(&config, temp_file.path()).unwrap();

        // Load config
        let loaded = load_config(temp_file.path()).unwrap();

        // Verify
        assert_eq!(config.recognition.language, loaded.recognition.language);
        assert_eq!(config.capture.max_fps, loaded.capture.max_fps);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_settings_clone() {
        let settings = LookupSettings {
            base_url: "http://registry.local".to_string(),
            path: "/vehicles".to_string(),
            timeout_secs: 3,
        };

        let cloned = settings.clone();
        assert_eq!(settings.base_url, cloned.base_url);
        assert_eq!(settings.timeout_secs, cloned.timeout_secs);
    }
}
