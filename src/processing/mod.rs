//! Text processing module
//! Sentence segmentation and question generation

pub mod generator;
pub mod pipeline;
pub mod question;
pub mod sentence;

pub use generator::{KindPolicy, QuestionGenerator};
pub use pipeline::ExamPipeline;
pub use question::{Question, QuestionKind};
pub use sentence::{RuleBasedSentenceModel, SentenceModel, SentenceSegmenter};
