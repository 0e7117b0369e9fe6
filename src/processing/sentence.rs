//! Sentence segmentation

use crate::error::{ExamGeneratorError, Result};
use regex::Regex;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// Abbreviations that end with a period but do not end a sentence.
const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "rev", "hon", "gen", "col",
    "lt", "sgt", "capt", "cmdr", "gov", "sen", "rep", "fig", "figs", "eq", "approx", "dept",
    "est", "inc", "ltd", "corp", "co", "e.g", "i.e", "cf", "al", "u.s", "u.k", "ph.d",
];

/// Sentence boundary detection over free text.
///
/// Implementations are built once and shared read-only between requests.
pub trait SentenceModel: Send + Sync {
    /// Split `text` into contiguous sentence spans, in order.
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Unicode (UAX #29) sentence boundaries with an abbreviation pass on top.
///
/// UAX #29 already keeps decimals like `3.14` and lowercase continuations like
/// `e.g. the` together; the abbreviation pass rejoins breaks after titles and
/// initials such as `Dr. Smith` or `J. Watson`.
pub struct RuleBasedSentenceModel {
    no_break: Regex,
}

impl RuleBasedSentenceModel {
    pub fn new(extra_abbreviations: &[String]) -> Result<Self> {
        let mut alternatives: Vec<String> = DEFAULT_ABBREVIATIONS
            .iter()
            .map(|a| regex::escape(a))
            .collect();
        alternatives.extend(
            extra_abbreviations
                .iter()
                .map(|a| a.trim().trim_end_matches('.'))
                .filter(|a| !a.is_empty())
                .map(regex::escape),
        );

        let pattern = format!(
            r#"(?i:(?:^|[\s(\["'])(?:{})\.["')\]]*\s*$)|(?:^|\s)\p{{Lu}}\.\s*$"#,
            alternatives.join("|")
        );
        let no_break = Regex::new(&pattern).map_err(|e| {
            ExamGeneratorError::Configuration(format!("Invalid abbreviation list: {}", e))
        })?;

        Ok(Self { no_break })
    }

    fn ends_with_abbreviation(&self, span: &str) -> bool {
        self.no_break.is_match(span)
    }
}

impl Default for RuleBasedSentenceModel {
    fn default() -> Self {
        Self::new(&[]).expect("default abbreviation pattern is valid")
    }
}

impl SentenceModel for RuleBasedSentenceModel {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut spans = Vec::new();
        let mut start: Option<usize> = None;

        for (offset, piece) in text.split_sentence_bound_indices() {
            let span_start = *start.get_or_insert(offset);
            let end = offset + piece.len();
            let span = &text[span_start..end];

            // A paragraph break always ends the sentence
            if piece.ends_with(['\n', '\r']) || !self.ends_with_abbreviation(span) {
                spans.push(span);
                start = None;
            }
        }

        if let Some(span_start) = start {
            spans.push(&text[span_start..]);
        }

        spans
    }
}

/// Turns extracted text into trimmed, non-empty sentences.
#[derive(Clone)]
pub struct SentenceSegmenter {
    model: Arc<dyn SentenceModel>,
}

impl SentenceSegmenter {
    pub fn new(model: Arc<dyn SentenceModel>) -> Self {
        Self { model }
    }

    pub fn segment(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let sentences: Vec<String> = self
            .model
            .sentences(text)
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        log::debug!("Segmented {} characters into {} sentences", text.len(), sentences.len());
        sentences
    }
}
