//! Exam generator library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;
pub mod server;

pub use config::Config;
pub use error::{ExamGeneratorError, Result};
pub use processing::{ExamPipeline, Question, QuestionKind};
