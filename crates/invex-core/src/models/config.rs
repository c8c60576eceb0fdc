//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{InvexError, Result};

use super::invoice::{DEFAULT_CURRENCY, RAW_TEXT_LIMIT};

/// Main configuration for invex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Maximum image dimension (longer side) handed to the recognizer.
    pub max_image_size: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            max_image_size: 2048,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Run pdf-extract over the whole document when lopdf finds no page text.
    pub fallback_to_pdf_extract: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            fallback_to_pdf_extract: true,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency reported when no amount is detected.
    pub default_currency: String,

    /// Number of input characters kept as `rawText`.
    pub raw_text_limit: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            raw_text_limit: RAW_TEXT_LIMIT,
        }
    }
}

/// OCR model file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 60,
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| InvexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether the OCR model files exist under `model_dir`.
    pub fn has_ocr_models(&self, model_dir: &Path) -> bool {
        [
            &self.models.detection_model,
            &self.models.recognition_model,
            &self.models.dictionary,
        ]
        .iter()
        .all(|name| model_dir.join(name).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: InvexConfig =
            serde_json::from_str(r#"{"extraction":{"raw_text_limit":10},"server":{"port":9000}}"#)
                .unwrap();

        assert_eq!(config.extraction.raw_text_limit, 10);
        assert_eq!(config.extraction.default_currency, "USD");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.models, ModelConfig::default());
    }

    #[test]
    fn test_from_missing_file_is_io_error() {
        let err = InvexConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, InvexError::Io(_)));
    }
}
