//! Output formatting for the command line

pub mod formatter;

pub use formatter::{
    formatter_for, parse_output_format, use_colors, ConsoleFormatter, ExamReport, JsonFormatter,
    OutputFormat, OutputFormatter,
};
