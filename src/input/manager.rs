//! Input manager: format detection and dispatch to the matching extractor

use crate::error::{ExamGeneratorError, Result};
use crate::input::file_detector::{DocumentType, FileTypeDetector};
use crate::input::ocr::OcrEngine;
use crate::input::text_extractor::Extractors;
use bytes::Bytes;
use log::info;
use std::path::Path;
use std::sync::Arc;

/// A file received for question generation.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    filename: String,
    content: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Read a document from disk
    pub async fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ExamGeneratorError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let content = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, content))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Upload size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

pub struct InputManager {
    detector: FileTypeDetector,
    extractors: Extractors,
}

impl InputManager {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self::with_extractors(Extractors::new(ocr))
    }

    pub fn with_extractors(extractors: Extractors) -> Self {
        Self {
            detector: FileTypeDetector::new(),
            extractors,
        }
    }

    pub fn detect_file_type(&self, document: &UploadedDocument) -> DocumentType {
        info!("Detecting file type...");
        self.detector.detect(document.content())
    }

    /// Extract the full text of a document. Unsupported formats fail before
    /// any extractor runs.
    pub fn extract_text(&self, document: &UploadedDocument) -> Result<String> {
        let document_type = self.detect_file_type(document);

        let extractor = self
            .extractors
            .for_type(document_type)
            .ok_or_else(ExamGeneratorError::unsupported_format)?;

        info!(
            "Extracting {} text from {} ({} bytes)",
            document_type,
            document.filename(),
            document.size()
        );
        extractor.extract(document.content())
    }
}
