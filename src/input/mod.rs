//! Input processing module
//! Handles file type detection, per-format text extraction, and OCR

pub mod file_detector;
pub mod manager;
pub mod ocr;
pub mod pdf;
pub mod powerpoint;
pub mod text_extractor;
pub mod word;

pub use file_detector::{DocumentType, FileTypeDetector};
pub use manager::{InputManager, UploadedDocument};
pub use ocr::{OcrEngine, TesseractOcr};
pub use text_extractor::{Extractors, TextExtractor};
