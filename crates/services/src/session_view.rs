use curio_core::model::{Phase, QUESTIONS_PER_QUIZ, Session};

/// Presentation-agnostic snapshot of a quiz session.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no layout assumptions
///
/// The front end decides how to render each phase. The correct option and
/// explanation are withheld until the question is answered, so a rendering
/// bug cannot leak them early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: Phase,
    pub topic: String,
    /// 1-based position of the question on screen, capped at the quiz length.
    pub question_number: usize,
    pub total_questions: usize,
    pub question: Option<QuestionView>,
    pub summary: Option<String>,
    pub error: Option<String>,
}

/// Snapshot of the question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    pub selected_option: Option<usize>,
    pub is_answered: bool,
    pub correct_option_index: Option<usize>,
    pub explanation: Option<String>,
}

impl SessionView {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let question = session.current_question().map(|question| QuestionView {
            text: question.text().to_string(),
            options: question.options().to_vec(),
            selected_option: session.selected_option(),
            is_answered: session.is_answered(),
            correct_option_index: session
                .is_answered()
                .then(|| question.correct_option_index()),
            explanation: session
                .is_answered()
                .then(|| question.explanation().to_string()),
        });

        Self {
            phase: session.phase(),
            topic: session.topic().to_string(),
            question_number: (session.history().len() + 1).min(QUESTIONS_PER_QUIZ),
            total_questions: QUESTIONS_PER_QUIZ,
            question,
            summary: session.summary().map(|summary| summary.text().to_string()),
            error: session.error().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_core::model::QuestionDraft;
    use curio_core::time::fixed_now;

    fn session_with_question() -> Session {
        let mut session = Session::new(fixed_now());
        session.begin("tea").unwrap();
        let question = QuestionDraft {
            question_text: "Q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index: 3,
            explanation: "e".into(),
        }
        .validate()
        .unwrap();
        session.install_question(question).unwrap();
        session
    }

    #[test]
    fn unanswered_view_withholds_the_answer() {
        let session = session_with_question();

        let view = SessionView::from_session(&session);
        let question = view.question.unwrap();

        assert_eq!(view.question_number, 1);
        assert_eq!(view.total_questions, QUESTIONS_PER_QUIZ);
        assert!(!question.is_answered);
        assert!(question.correct_option_index.is_none());
        assert!(question.explanation.is_none());
    }

    #[test]
    fn answered_view_reveals_the_answer() {
        let mut session = session_with_question();
        session.select_option(1).unwrap();

        let view = SessionView::from_session(&session);
        let question = view.question.unwrap();

        assert!(question.is_answered);
        assert_eq!(question.selected_option, Some(1));
        assert_eq!(question.correct_option_index, Some(3));
        assert_eq!(question.explanation.as_deref(), Some("e"));
    }

    #[test]
    fn question_number_caps_at_quiz_length() {
        let mut session = session_with_question();
        for _ in 0..QUESTIONS_PER_QUIZ {
            session.select_option(0).unwrap();
            if !session.record_turn().unwrap() {
                let question = session.current_question().unwrap().clone();
                session.install_question(question).unwrap();
            }
        }

        let view = SessionView::from_session(&session);
        assert_eq!(view.question_number, QUESTIONS_PER_QUIZ);
        assert_eq!(view.phase, Phase::Summary);
    }
}
