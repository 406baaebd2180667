use serde::Deserialize;
use thiserror::Error;

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Raw generator payload for a single question, prior to validation.
///
/// Field names match the JSON schema the generator is asked to follow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, the option count is
    /// not exactly four, or the correct index does not point at an option.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let text = self.question_text.trim();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.len() != OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount {
                len: self.options.len(),
            });
        }
        if self.correct_option_index >= OPTION_COUNT {
            return Err(QuestionError::IndexOutOfRange {
                index: self.correct_option_index,
            });
        }

        Ok(Question {
            text: text.to_string(),
            options: self.options,
            correct_option_index: self.correct_option_index,
            explanation: self.explanation,
        })
    }
}

/// A validated multiple-choice question.
///
/// Construction goes through `QuestionDraft::validate`, so the option count
/// and correct index invariants hold for every live value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_option_index: usize,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option_index(&self) -> usize {
        self.correct_option_index
    }

    /// Text of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_option_index]
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("expected exactly 4 options, got {len}")]
    WrongOptionCount { len: usize },

    #[error("correct option index {index} is out of range")]
    IndexOutOfRange { index: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            question_text: "Which planet is known as the Red Planet?".into(),
            options: vec!["Venus".into(), "Mars".into(), "Jupiter".into(), "Saturn".into()],
            correct_option_index: 1,
            explanation: "Iron oxide dust gives Mars its color.".into(),
        }
    }

    #[test]
    fn valid_draft_becomes_question() {
        let question = draft().validate().unwrap();

        assert_eq!(question.text(), "Which planet is known as the Red Planet?");
        assert_eq!(question.options().len(), OPTION_COUNT);
        assert_eq!(question.correct_option_index(), 1);
        assert_eq!(question.correct_option(), "Mars");
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut bad = draft();
        bad.question_text = "   ".into();

        let err = bad.validate().unwrap_err();
        assert!(matches!(err, QuestionError::EmptyText));
    }

    #[test]
    fn wrong_option_count_is_rejected() {
        let mut bad = draft();
        bad.options.pop();

        let err = bad.validate().unwrap_err();
        assert!(matches!(err, QuestionError::WrongOptionCount { len: 3 }));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut bad = draft();
        bad.correct_option_index = 4;

        let err = bad.validate().unwrap_err();
        assert!(matches!(err, QuestionError::IndexOutOfRange { index: 4 }));
    }

    #[test]
    fn draft_deserializes_from_generator_json() {
        let raw = r#"{
            "question_text": "Q",
            "options": ["a", "b", "c", "d"],
            "correct_option_index": 2,
            "explanation": "because"
        }"#;

        let parsed: QuestionDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.correct_option_index, 2);
    }
}
