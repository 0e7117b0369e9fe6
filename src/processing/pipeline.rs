//! End-to-end exam generation: extract, segment, generate

use crate::config::Config;
use crate::error::Result;
use crate::input::{InputManager, OcrEngine, UploadedDocument};
use crate::processing::generator::QuestionGenerator;
use crate::processing::question::Question;
use crate::processing::sentence::{SentenceModel, SentenceSegmenter};
use log::info;
use rand::Rng;
use std::sync::Arc;

pub struct ExamPipeline {
    input: InputManager,
    segmenter: SentenceSegmenter,
    generator: QuestionGenerator,
}

impl ExamPipeline {
    pub fn new(input: InputManager, segmenter: SentenceSegmenter, generator: QuestionGenerator) -> Self {
        Self {
            input,
            segmenter,
            generator,
        }
    }

    /// Build the pipeline from configuration with the given OCR engine and
    /// sentence model.
    pub fn from_config(
        config: &Config,
        ocr: Arc<dyn OcrEngine>,
        model: Arc<dyn SentenceModel>,
    ) -> Result<Self> {
        Ok(Self::new(
            InputManager::new(ocr),
            SentenceSegmenter::new(model),
            QuestionGenerator::from_config(&config.questions)?,
        ))
    }

    /// Generate one question per sentence of the document. Any failure aborts
    /// the whole run; there are no partial results.
    pub fn generate_exam<R: Rng + ?Sized>(
        &self,
        document: &UploadedDocument,
        rng: &mut R,
    ) -> Result<Vec<Question>> {
        let text = self.input.extract_text(document)?;
        info!("Extracted {} characters from {}", text.len(), document.filename());

        info!("Segmenting text into sentences...");
        let sentences = self.segmenter.segment(&text);
        info!("Found {} sentences", sentences.len());

        info!("Generating questions...");
        Ok(self.generator.generate(&sentences, rng))
    }

    /// Same as [`generate_exam`](Self::generate_exam), rendered to display strings.
    pub fn generate_exam_strings<R: Rng + ?Sized>(
        &self,
        document: &UploadedDocument,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        let questions = self.generate_exam(document, rng)?;
        Ok(questions.iter().map(ToString::to_string).collect())
    }
}
