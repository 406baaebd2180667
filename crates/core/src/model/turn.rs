use crate::model::{Question, QuestionError};

/// One completed question-answer exchange, recorded immutably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    question: Question,
    user_answer: String,
    is_correct: bool,
}

impl Turn {
    /// Build a turn from a question and the option the user picked.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::IndexOutOfRange` if the selection does not
    /// point at an option.
    pub fn new(question: Question, selected_option: usize) -> Result<Self, QuestionError> {
        let user_answer = question
            .options()
            .get(selected_option)
            .ok_or(QuestionError::IndexOutOfRange {
                index: selected_option,
            })?
            .clone();
        let is_correct = selected_option == question.correct_option_index();

        Ok(Self {
            question,
            user_answer,
            is_correct,
        })
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Text of the option the user chose.
    #[must_use]
    pub fn user_answer(&self) -> &str {
        &self.user_answer
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}
