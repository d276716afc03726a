// Live questions posted to channels and the answers collected for them.
//
// Keyed by the id of the message carrying the question. Entries stay until
// `/closequestion` removes them.

use super::quiz_models::{Question, QuestionKind, QuizError};
use crate::core::commands::ComponentHandle;
use dashmap::DashMap;

/// Component id of the select menu for question `index` posted as `message_id`.
pub fn component_id(message_id: u64, index: usize) -> String {
    format!("question_{}_{}", message_id, index)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResponse {
    pub user_id: u64,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct PostedQuestion {
    pub message_id: u64,
    pub channel_id: u64,
    pub index: usize,
    pub question: Question,
    pub handle: Option<ComponentHandle>,
    pub responses: Vec<QuizResponse>,
}

impl PostedQuestion {
    /// Distinct users who answered.
    pub fn respondents(&self) -> usize {
        let mut users: Vec<u64> = self.responses.iter().map(|r| r.user_id).collect();
        users.sort_unstable();
        users.dedup();
        users.len()
    }
}

/// One user's answers to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAnswers {
    pub user_id: u64,
    pub answers: Vec<String>,
    /// `None` for polls.
    pub correct: Option<bool>,
}

#[derive(Default)]
pub struct QuizBoard {
    questions: DashMap<u64, PostedQuestion>,
}

impl QuizBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, message_id: u64, channel_id: u64, index: usize, question: Question) {
        self.questions.insert(
            message_id,
            PostedQuestion {
                message_id,
                channel_id,
                index,
                question,
                handle: None,
                responses: Vec::new(),
            },
        );
    }

    pub fn attach_handle(&self, message_id: u64, handle: ComponentHandle) {
        if let Some(mut posted) = self.questions.get_mut(&message_id) {
            posted.handle = Some(handle);
        }
    }

    pub fn get(&self, message_id: u64) -> Option<PostedQuestion> {
        self.questions.get(&message_id).map(|p| p.clone())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Replace `user_id`'s answers with `selected` and return the number of
    /// distinct respondents. Labels that are not answers of the question are
    /// dropped.
    pub fn record_answer(
        &self,
        message_id: u64,
        user_id: u64,
        selected: &[String],
    ) -> Result<usize, QuizError> {
        let mut posted = self
            .questions
            .get_mut(&message_id)
            .ok_or(QuizError::UnknownQuestion)?;

        let limit = posted.question.max_selections();
        let answers: Vec<String> = selected
            .iter()
            .filter(|label| posted.question.has_answer(label))
            .take(limit)
            .cloned()
            .collect();

        posted.responses.retain(|r| r.user_id != user_id);
        posted
            .responses
            .extend(answers.into_iter().map(|answer| QuizResponse { user_id, answer }));

        Ok(posted.respondents())
    }

    /// Answers grouped by user, in the order users first answered.
    pub fn responses(&self, message_id: u64) -> Result<Vec<UserAnswers>, QuizError> {
        let posted = self
            .questions
            .get(&message_id)
            .ok_or(QuizError::UnknownQuestion)?;
        Ok(group_responses(&posted))
    }

    /// Forget the question and return its final state.
    pub fn close(&self, message_id: u64) -> Result<PostedQuestion, QuizError> {
        self.questions
            .remove(&message_id)
            .map(|(_, posted)| posted)
            .ok_or(QuizError::UnknownQuestion)
    }
}

fn group_responses(posted: &PostedQuestion) -> Vec<UserAnswers> {
    let mut grouped: Vec<UserAnswers> = Vec::new();
    for response in &posted.responses {
        match grouped.iter_mut().find(|g| g.user_id == response.user_id) {
            Some(group) => group.answers.push(response.answer.clone()),
            None => grouped.push(UserAnswers {
                user_id: response.user_id,
                answers: vec![response.answer.clone()],
                correct: None,
            }),
        }
    }

    if posted.question.kind() != QuestionKind::Poll {
        let mut expected = posted.question.correct_answers();
        expected.sort_unstable();
        for group in &mut grouped {
            let mut given: Vec<&str> = group.answers.iter().map(String::as_str).collect();
            given.sort_unstable();
            group.correct = Some(given == expected);
        }
    }

    grouped
}
