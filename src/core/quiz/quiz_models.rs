// Quiz/poll questions, uploaded to `/questions` as a YAML file.
//
// ```yaml
// - question: "What is the best programming language?"
//   answers:
//     - answer: JavaScript
//     - answer: TypeScript
//       correct: true
// ```
//
// A file holds either one question or a list of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::commands::CommandError;

/// Select menus accept at most 25 options.
pub const MAX_ANSWERS: usize = 25;
/// Select option labels are at most 100 characters.
pub const MAX_ANSWER_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("{0}")]
    Parse(String),

    #[error("Invalid question ID.")]
    UnknownQuestion,
}

impl From<QuizError> for CommandError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::Parse(detail) => CommandError::Parse {
                what: "YAML".to_string(),
                detail,
            },
            QuizError::UnknownQuestion => CommandError::Validation(err.to_string()),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// No correct answer.
    Poll,
    /// Exactly one correct answer; one selection allowed.
    SingleChoice,
    /// Several correct answers; up to all answers may be selected.
    MultipleChoice,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self.answers.iter().filter(|a| a.correct).count() {
            0 => QuestionKind::Poll,
            1 => QuestionKind::SingleChoice,
            _ => QuestionKind::MultipleChoice,
        }
    }

    /// Most answers a user may select at once.
    pub fn max_selections(&self) -> usize {
        match self.kind() {
            QuestionKind::MultipleChoice => self.answers.len(),
            _ => 1,
        }
    }

    pub fn correct_answers(&self) -> Vec<&str> {
        self.answers
            .iter()
            .filter(|a| a.correct)
            .map(|a| a.answer.as_str())
            .collect()
    }

    pub fn has_answer(&self, label: &str) -> bool {
        self.answers.iter().any(|a| a.answer == label)
    }

    fn check(&self, number: usize) -> Result<(), QuizError> {
        if self.question.trim().is_empty() {
            return Err(QuizError::Parse(format!("question {} has no text", number)));
        }
        if self.answers.is_empty() || self.answers.len() > MAX_ANSWERS {
            return Err(QuizError::Parse(format!(
                "question {} must have between 1 and {} answers",
                number, MAX_ANSWERS
            )));
        }
        for answer in &self.answers {
            let len = answer.answer.chars().count();
            if len == 0 || len > MAX_ANSWER_LEN {
                return Err(QuizError::Parse(format!(
                    "answers of question {} must be between 1 and {} characters",
                    number, MAX_ANSWER_LEN
                )));
            }
        }
        let mut labels: Vec<&str> = self.answers.iter().map(|a| a.answer.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != self.answers.len() {
            return Err(QuizError::Parse(format!(
                "question {} has duplicate answers",
                number
            )));
        }
        Ok(())
    }
}

/// Parse an uploaded question file.
///
/// The document is read as a generic value first and then decoded as a list
/// or a single question depending on its shape, so a missing or mistyped
/// field is reported with the parser's own message.
pub fn parse_questions(yaml: &str) -> Result<Vec<Question>, QuizError> {
    let parse_error = |e: serde_yaml::Error| QuizError::Parse(e.to_string());

    let document: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(parse_error)?;
    let questions = if document.is_sequence() {
        serde_yaml::from_value::<Vec<Question>>(document).map_err(parse_error)?
    } else {
        vec![serde_yaml::from_value::<Question>(document).map_err(parse_error)?]
    };

    if questions.is_empty() {
        return Err(QuizError::Parse("the file contains no questions".to_string()));
    }
    for (i, question) in questions.iter().enumerate() {
        question.check(i + 1)?;
    }
    Ok(questions)
}

/// One question of each kind, used in the `/questions` usage text.
pub fn sample_questions() -> Vec<Question> {
    fn answers(list: &[(&str, bool)]) -> Vec<Answer> {
        list.iter()
            .map(|(answer, correct)| Answer {
                answer: answer.to_string(),
                correct: *correct,
            })
            .collect()
    }

    vec![
        Question {
            question: "Single choice question: What is the best programming language?".into(),
            answers: answers(&[("JavaScript", false), ("TypeScript", true), ("CoffeeScript", false)]),
        },
        Question {
            question: "Multiple choice question: What are the best programming languages?".into(),
            answers: answers(&[("JavaScript", true), ("TypeScript", true), ("CoffeeScript", false)]),
        },
        Question {
            question: "Poll question: What is the best programming language?".into(),
            answers: answers(&[("TypeScript", false), ("JavaScript", false), ("CoffeeScript", false)]),
        },
    ]
}

pub fn sample_questions_yaml() -> String {
    serde_yaml::to_string(&sample_questions()).unwrap_or_default()
}
