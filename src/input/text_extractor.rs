//! Text extraction from the supported document formats

use crate::error::Result;
use crate::input::file_detector::DocumentType;
use crate::input::ocr::OcrEngine;
use crate::input::pdf::PdfExtractor;
use crate::input::powerpoint::PowerPointExtractor;
use crate::input::word::WordExtractor;
use std::sync::Arc;

/// Extract plain text from a document buffer of a known format.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, data: &[u8]) -> Result<String>;
}

/// One extractor per supported [`DocumentType`].
pub struct Extractors {
    pdf: Box<dyn TextExtractor>,
    word: Box<dyn TextExtractor>,
    powerpoint: Box<dyn TextExtractor>,
}

impl Extractors {
    /// Standard extractors, with PDF images recognized by `ocr`.
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            pdf: Box::new(PdfExtractor::new(ocr)),
            word: Box::new(WordExtractor),
            powerpoint: Box::new(PowerPointExtractor),
        }
    }

    pub fn from_parts(
        pdf: Box<dyn TextExtractor>,
        word: Box<dyn TextExtractor>,
        powerpoint: Box<dyn TextExtractor>,
    ) -> Self {
        Self {
            pdf,
            word,
            powerpoint,
        }
    }

    pub fn for_type(&self, document_type: DocumentType) -> Option<&dyn TextExtractor> {
        match document_type {
            DocumentType::Pdf => Some(self.pdf.as_ref()),
            DocumentType::Word => Some(self.word.as_ref()),
            DocumentType::PowerPoint => Some(self.powerpoint.as_ref()),
            DocumentType::Unsupported => None,
        }
    }
}
