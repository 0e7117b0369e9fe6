//! Error handling for the exam generator

use thiserror::Error;

/// Message returned to callers for any failure that is not user-actionable.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Message returned when the uploaded file is not a PDF, Word or PowerPoint document.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file type. Please upload a PDF, Word, or PowerPoint file.";

#[derive(Error, Debug)]
pub enum ExamGeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Word extraction error: {0}")]
    WordExtraction(String),

    #[error("PowerPoint extraction error: {0}")]
    PowerPointExtraction(String),

    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl ExamGeneratorError {
    /// Build the standard unsupported-format error.
    pub fn unsupported_format() -> Self {
        ExamGeneratorError::UnsupportedFormat(UNSUPPORTED_FORMAT_MESSAGE.to_string())
    }

    /// Whether the error message may be shown to the person who uploaded the file.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ExamGeneratorError::UnsupportedFormat(_)
                | ExamGeneratorError::InvalidInput(_)
                | ExamGeneratorError::UploadTooLarge(_)
        )
    }

    /// The message exposed outside the process. Internal causes are replaced
    /// by a generic message and only ever reach the logs.
    pub fn public_message(&self) -> String {
        match self {
            ExamGeneratorError::UnsupportedFormat(msg) => msg.clone(),
            ExamGeneratorError::InvalidInput(msg) => msg.clone(),
            ExamGeneratorError::UploadTooLarge(msg) => msg.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExamGeneratorError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for ExamGeneratorError {
    fn from(err: anyhow::Error) -> Self {
        ExamGeneratorError::Processing(err.to_string())
    }
}

impl From<lopdf::Error> for ExamGeneratorError {
    fn from(err: lopdf::Error) -> Self {
        ExamGeneratorError::PdfExtraction(err.to_string())
    }
}

impl From<zip::result::ZipError> for ExamGeneratorError {
    fn from(err: zip::result::ZipError) -> Self {
        ExamGeneratorError::PowerPointExtraction(err.to_string())
    }
}

impl From<image::ImageError> for ExamGeneratorError {
    fn from(err: image::ImageError) -> Self {
        ExamGeneratorError::ImageDecode(err.to_string())
    }
}
