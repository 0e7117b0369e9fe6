//! Word (.docx) text extraction

use crate::error::{ExamGeneratorError, Result};
use crate::input::text_extractor::TextExtractor;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

/// Body paragraphs in document order, one per line.
pub struct WordExtractor;

impl WordExtractor {
    fn paragraph_text(paragraph: &Paragraph) -> String {
        let mut text = String::new();
        for child in &paragraph.children {
            if let ParagraphChild::Run(run) = child {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
        }
        text
    }
}

impl TextExtractor for WordExtractor {
    fn extract(&self, data: &[u8]) -> Result<String> {
        log::info!("Extracting text from Word document...");
        let docx = docx_rs::read_docx(data)
            .map_err(|e| ExamGeneratorError::WordExtraction(e.to_string()))?;

        // Tables and other block content are not part of the paragraph stream
        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(Self::paragraph_text(p)),
                _ => None,
            })
            .collect();

        log::debug!("Read {} paragraphs", paragraphs.len());
        Ok(paragraphs.join("\n"))
    }
}
