//! Heuristic question generation from sentences

use crate::config::QuestionConfig;
use crate::error::{ExamGeneratorError, Result};
use crate::processing::question::{Question, QuestionKind};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of incorrect choices offered with each multiple-choice question.
pub const DISTRACTOR_COUNT: usize = 3;

/// Used only when the configured pool cannot supply enough distinct distractors.
const FALLBACK_DISTRACTORS: &[&str] = &[
    "None of the above",
    "All of the above",
    "Not stated in the text",
    "Cannot be determined",
];

/// Relative weight of each question kind, sampled once per sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindPolicy {
    pub multiple_choice: f64,
    pub short_answer: f64,
    pub true_false: f64,
}

impl Default for KindPolicy {
    /// `P(MC) = 0.33`, the rest split evenly between short answer and true/false.
    fn default() -> Self {
        Self {
            multiple_choice: 0.33,
            short_answer: 0.335,
            true_false: 0.335,
        }
    }
}

impl KindPolicy {
    pub fn from_config(config: &QuestionConfig) -> Self {
        Self {
            multiple_choice: config.multiple_choice_weight,
            short_answer: config.short_answer_weight,
            true_false: config.true_false_weight,
        }
    }

    /// A policy that always yields `kind`.
    pub fn only(kind: QuestionKind) -> Self {
        let mut policy = Self {
            multiple_choice: 0.0,
            short_answer: 0.0,
            true_false: 0.0,
        };
        match kind {
            QuestionKind::MultipleChoice => policy.multiple_choice = 1.0,
            QuestionKind::ShortAnswer => policy.short_answer = 1.0,
            QuestionKind::TrueFalse => policy.true_false = 1.0,
        }
        policy
    }

    fn weights(&self) -> [f64; 3] {
        // Same order as QuestionKind::ALL
        [self.multiple_choice, self.short_answer, self.true_false]
    }

    /// Probability of each kind after normalization.
    pub fn probability(&self, kind: QuestionKind) -> f64 {
        let weights = self.weights();
        let total: f64 = weights.iter().sum();
        let index = QuestionKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        if total > 0.0 {
            weights[index] / total
        } else {
            0.0
        }
    }
}

pub struct QuestionGenerator {
    policy: KindPolicy,
    kinds: WeightedIndex<f64>,
    distractors: Vec<String>,
}

impl QuestionGenerator {
    pub fn new(policy: KindPolicy, distractors: Vec<String>) -> Result<Self> {
        let kinds = WeightedIndex::new(policy.weights()).map_err(|e| {
            ExamGeneratorError::Configuration(format!("Invalid question weights: {}", e))
        })?;

        let mut pool: Vec<String> = Vec::with_capacity(distractors.len());
        for distractor in distractors {
            let distractor = distractor.trim().to_string();
            if !distractor.is_empty() && !pool.contains(&distractor) {
                pool.push(distractor);
            }
        }
        if pool.is_empty() {
            return Err(ExamGeneratorError::Configuration(
                "Distractor pool is empty".to_string(),
            ));
        }

        Ok(Self {
            policy,
            kinds,
            distractors: pool,
        })
    }

    pub fn from_config(config: &QuestionConfig) -> Result<Self> {
        Self::new(KindPolicy::from_config(config), config.distractors.clone())
    }

    pub fn policy(&self) -> &KindPolicy {
        &self.policy
    }

    /// One question per sentence, in sentence order.
    pub fn generate<R: Rng + ?Sized>(&self, sentences: &[String], rng: &mut R) -> Vec<Question> {
        let questions: Vec<Question> = sentences
            .iter()
            .map(|sentence| self.generate_one(sentence, rng))
            .collect();
        log::info!("Question generation complete: {} questions", questions.len());
        questions
    }

    pub fn generate_one<R: Rng + ?Sized>(&self, sentence: &str, rng: &mut R) -> Question {
        match self.sample_kind(rng) {
            QuestionKind::MultipleChoice => self.multiple_choice(sentence, rng),
            QuestionKind::ShortAnswer => Question::ShortAnswer {
                prompt: Question::short_answer_prompt(sentence),
            },
            QuestionKind::TrueFalse => Question::TrueFalse {
                prompt: Question::true_false_prompt(sentence),
                // Not a judgement of the sentence
                answer: rng.gen_bool(0.5),
            },
        }
    }

    pub fn sample_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> QuestionKind {
        QuestionKind::ALL[self.kinds.sample(rng)]
    }

    fn multiple_choice<R: Rng + ?Sized>(&self, sentence: &str, rng: &mut R) -> Question {
        let candidates: Vec<&String> = self
            .distractors
            .iter()
            .filter(|d| d.as_str() != sentence)
            .collect();

        let mut choices: Vec<String> = Vec::with_capacity(DISTRACTOR_COUNT + 1);
        choices.push(sentence.to_string());
        choices.extend(
            candidates
                .choose_multiple(rng, DISTRACTOR_COUNT)
                .map(|d| d.to_string()),
        );
        for fallback in FALLBACK_DISTRACTORS {
            if choices.len() > DISTRACTOR_COUNT {
                break;
            }
            if !choices.iter().any(|c| c == fallback) {
                choices.push(fallback.to_string());
            }
        }

        choices.shuffle(rng);
        let answer = choices
            .iter()
            .position(|c| c == sentence)
            .unwrap_or_default();

        Question::MultipleChoice {
            prompt: Question::multiple_choice_prompt(sentence),
            choices,
            answer,
        }
    }
}
