//! Question types and their display format

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SHORT_ANSWER_INSTRUCTION: &str = "(Provide your answer here.)";
pub const TRUE_FALSE_LINE: &str = "- True / False";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    ShortAnswer,
    TrueFalse,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 3] = [
        QuestionKind::MultipleChoice,
        QuestionKind::ShortAnswer,
        QuestionKind::TrueFalse,
    ];
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionKind::MultipleChoice => "multiple choice",
            QuestionKind::ShortAnswer => "short answer",
            QuestionKind::TrueFalse => "true/false",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Question {
    MultipleChoice {
        prompt: String,
        choices: Vec<String>,
        /// Index into `choices` of the correct answer
        answer: usize,
    },
    ShortAnswer {
        prompt: String,
    },
    TrueFalse {
        prompt: String,
        answer: bool,
    },
}

impl Question {
    pub fn multiple_choice_prompt(sentence: &str) -> String {
        format!("What does the following mean: '{}'?", sentence)
    }

    pub fn short_answer_prompt(sentence: &str) -> String {
        format!("Explain: '{}'", sentence)
    }

    pub fn true_false_prompt(sentence: &str) -> String {
        format!("Is the following correct? '{}'", sentence)
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Question::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            Question::TrueFalse { .. } => QuestionKind::TrueFalse,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Question::MultipleChoice { prompt, .. }
            | Question::ShortAnswer { prompt }
            | Question::TrueFalse { prompt, .. } => prompt,
        }
    }

    /// The correct choice of a multiple-choice question
    pub fn correct_choice(&self) -> Option<&str> {
        match self {
            Question::MultipleChoice { choices, answer, .. } => choices.get(*answer).map(String::as_str),
            _ => None,
        }
    }

    /// Answer-key label, e.g. `B` or `True`. Short-answer questions have none.
    pub fn answer_label(&self) -> Option<String> {
        match self {
            Question::MultipleChoice { answer, .. } => Some(choice_label(*answer).to_string()),
            Question::ShortAnswer { .. } => None,
            Question::TrueFalse { answer, .. } => Some(bool_label(*answer).to_string()),
        }
    }
}

fn choice_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Question::MultipleChoice { prompt, choices, .. } => {
                write!(f, "{}", prompt)?;
                for (i, choice) in choices.iter().enumerate() {
                    write!(f, "\n{}) {}", choice_label(i), choice)?;
                }
                Ok(())
            }
            Question::ShortAnswer { prompt } => {
                write!(f, "{}\n{}", prompt, SHORT_ANSWER_INSTRUCTION)
            }
            Question::TrueFalse { prompt, answer } => {
                write!(
                    f,
                    "{}\n{}\nCorrect Answer: {}",
                    prompt,
                    TRUE_FALSE_LINE,
                    bool_label(*answer)
                )
            }
        }
    }
}
