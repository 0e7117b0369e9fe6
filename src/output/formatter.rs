//! Output formatters for generated exams

use crate::error::{ExamGeneratorError, Result};
use crate::processing::question::Question;
use colored::{Color, Colorize};
use serde::Serialize;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

/// Questions generated from one document
#[derive(Debug, Clone, Serialize)]
pub struct ExamReport {
    pub source: String,
    pub questions: Vec<Question>,
}

impl ExamReport {
    pub fn new(source: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            source: source.into(),
            questions,
        }
    }
}

pub trait OutputFormatter {
    fn format_exam(&self, report: &ExamReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors and an answer key per question
pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, report: &ExamReport) -> String {
        let title = format!(
            "Exam for {} ({} questions)",
            report.source,
            report.questions.len()
        );
        if self.use_colors {
            format!("{}\n", title.color(Color::Blue).bold())
        } else {
            format!("{}\n", title)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_exam(&self, report: &ExamReport) -> Result<String> {
        let mut output = self.format_header(report);

        if report.questions.is_empty() {
            output.push_str(&self.colorize("\nNo sentences found in the document.\n", Color::Yellow));
            return Ok(output);
        }

        for (i, question) in report.questions.iter().enumerate() {
            let label = format!("[{}]", question.kind());
            output.push_str(&format!(
                "\n{}. {}\n{}\n",
                i + 1,
                self.colorize(&label, Color::Cyan),
                question
            ));
            // True/false already prints its answer line
            if let (Question::MultipleChoice { .. }, Some(answer)) = (question, question.answer_label()) {
                output.push_str(&self.colorize(&format!("Answer: {}\n", answer), Color::Green));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_exam(&self, report: &ExamReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Pick the formatter for an output format
pub fn formatter_for(format: OutputFormat, use_colors: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

/// Colors only go to an interactive stdout and can be switched off explicitly.
pub fn use_colors(no_color: bool) -> bool {
    !no_color && std::io::stdout().is_terminal()
}

/// Parse an output format name as given on the command line
pub fn parse_output_format(format: &str) -> Result<OutputFormat> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(ExamGeneratorError::InvalidInput(format!(
            "Invalid output format: {}. Supported: console, json",
            format
        ))),
    }
}
