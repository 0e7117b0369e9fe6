//! Configuration management for the exam generator

use crate::error::{ExamGeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub questions: QuestionConfig,
    pub segmentation: SegmentationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    pub tesseract_path: PathBuf,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub multiple_choice_weight: f64,
    pub short_answer_weight: f64,
    pub true_false_weight: f64,
    pub distractors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SegmentationConfig {
    /// Additional abbreviations (without the trailing period) that never end a sentence
    #[serde(default)]
    pub extra_abbreviations: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_bytes: 50 * 1024 * 1024,
            },
            ocr: OcrConfig {
                tesseract_path: PathBuf::from("tesseract"),
                language: "eng".to_string(),
            },
            questions: QuestionConfig {
                // P(MC) = 0.33, the remaining 0.67 split evenly
                multiple_choice_weight: 0.33,
                short_answer_weight: 0.335,
                true_false_weight: 0.335,
                distractors: vec![
                    "Example A".to_string(),
                    "Example B".to_string(),
                    "Example C".to_string(),
                ],
            },
            segmentation: SegmentationConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from the user config directory, writing the
    /// defaults there on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::read(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load an explicit configuration file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::read(path)
        } else {
            log::warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ExamGeneratorError::Configuration(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ExamGeneratorError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("exam-generator")
            .join("config.toml")
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ExamGeneratorError::Configuration(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.ocr.tesseract_path.as_os_str().is_empty() {
            return Err(ExamGeneratorError::Configuration(
                "ocr.tesseract_path must not be empty".to_string(),
            ));
        }

        let q = &self.questions;
        let weights = [
            q.multiple_choice_weight,
            q.short_answer_weight,
            q.true_false_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ExamGeneratorError::Configuration(
                "question weights must be finite and non-negative".to_string(),
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ExamGeneratorError::Configuration(
                "at least one question weight must be positive".to_string(),
            ));
        }

        if q.distractors.iter().all(|d| d.trim().is_empty()) {
            return Err(ExamGeneratorError::Configuration(
                "questions.distractors must contain at least one entry".to_string(),
            ));
        }

        Ok(())
    }
}
