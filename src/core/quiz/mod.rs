// Quiz and poll questions answered through select menus.

pub mod quiz_board;
pub mod quiz_models;

pub use quiz_board::{component_id, PostedQuestion, QuizBoard, QuizResponse, UserAnswers};
pub use quiz_models::{
    parse_questions, sample_questions, sample_questions_yaml, Answer, Question, QuestionKind,
    QuizError,
};
