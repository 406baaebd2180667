use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Question, QuestionError, Summary, Turn};

/// Number of questions in a full quiz. Fixed policy, not user-configurable.
pub const QUESTIONS_PER_QUIZ: usize = 5;

/// Coarse state of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Start,
    Quiz,
    Summary,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("quiz is already in progress")]
    AlreadyStarted,

    #[error("no question is active")]
    NoQuestion,

    #[error("question is already answered")]
    AlreadyAnswered,

    #[error("no answer selected")]
    NoAnswer,

    #[error("option {index} is out of range")]
    OptionOutOfRange { index: usize },

    #[error("quiz has already finished")]
    Finished,

    #[error("quiz is not finished yet")]
    NotFinished,

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State of one interactive quiz, from topic entry to the closing analysis.
///
/// All transitions are synchronous and in-memory; generator calls live in the
/// services layer, which installs their results here. One session per user,
/// discarded or restarted at will.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    topic: String,
    history: Vec<Turn>,
    current_question: Option<Question>,
    summary: Option<Summary>,
    selected_option: Option<usize>,
    is_answered: bool,
    // Set once the current question's turn is in `history`, so retrying a
    // failed follow-up generation cannot append the same turn twice.
    turn_recorded: bool,
    error: Option<String>,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session in the start phase.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Start,
            topic: String::new(),
            history: Vec::new(),
            current_question: None,
            summary: None,
            selected_option: None,
            is_answered: false,
            turn_recorded: false,
            error: None,
            started_at,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.is_answered
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// True once the full set of turns has been recorded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.history.len() >= QUESTIONS_PER_QUIZ
    }

    /// Accept a topic and prepare for the first question.
    ///
    /// Stays in the start phase; the quiz phase is entered when the first
    /// question is installed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` outside the start phase and
    /// `SessionError::EmptyTopic` for a blank topic. State is untouched on
    /// error.
    pub fn begin(&mut self, topic: &str) -> Result<(), SessionError> {
        if self.phase != Phase::Start {
            return Err(SessionError::AlreadyStarted);
        }
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SessionError::EmptyTopic);
        }

        self.topic = topic.to_string();
        self.history.clear();
        Ok(())
    }

    /// Install a freshly generated question and reset per-turn state.
    ///
    /// Enters the quiz phase when called from the start phase.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` once the summary phase is reached.
    pub fn install_question(&mut self, question: Question) -> Result<(), SessionError> {
        if self.phase == Phase::Summary {
            return Err(SessionError::Finished);
        }

        self.phase = Phase::Quiz;
        self.current_question = Some(question);
        self.reset_turn_state();
        Ok(())
    }

    /// Record the user's selection for the current question. No generator
    /// call is involved.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestion` without an active question,
    /// `SessionError::AlreadyAnswered` on double submission, and
    /// `SessionError::OptionOutOfRange` for a bad index. State is untouched
    /// on error.
    pub fn select_option(&mut self, index: usize) -> Result<(), SessionError> {
        let Some(question) = &self.current_question else {
            return Err(SessionError::NoQuestion);
        };
        if self.is_answered {
            return Err(SessionError::AlreadyAnswered);
        }
        if index >= question.options().len() {
            return Err(SessionError::OptionOutOfRange { index });
        }

        self.selected_option = Some(index);
        self.is_answered = true;
        Ok(())
    }

    /// Append the answered question to history, flipping to the summary
    /// phase once the quiz is complete.
    ///
    /// The current question and answered flag stay in place so a failed
    /// follow-up generation can be retried; the retry is a no-op append.
    /// Returns whether the quiz is now complete.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` in the summary phase,
    /// `SessionError::NoQuestion` without an active question, and
    /// `SessionError::NoAnswer` when nothing has been selected.
    pub fn record_turn(&mut self) -> Result<bool, SessionError> {
        if self.phase == Phase::Summary {
            return Err(SessionError::Finished);
        }
        let Some(question) = self.current_question.clone() else {
            return Err(SessionError::NoQuestion);
        };
        let Some(selected) = self.selected_option else {
            return Err(SessionError::NoAnswer);
        };

        if !self.turn_recorded {
            let turn = Turn::new(question, selected)?;
            self.history.push(turn);
            self.turn_recorded = true;
        }

        if self.is_complete() {
            self.phase = Phase::Summary;
            return Ok(true);
        }
        Ok(false)
    }

    /// Install the closing analysis.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` outside the summary phase.
    pub fn install_summary(&mut self, summary: Summary) -> Result<(), SessionError> {
        if self.phase != Phase::Summary {
            return Err(SessionError::NotFinished);
        }

        self.summary = Some(summary);
        self.current_question = None;
        self.reset_turn_state();
        Ok(())
    }

    /// Record a user-visible error message on the session.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Reset the whole session back to the start phase. Valid from any phase.
    pub fn restart(&mut self) {
        self.phase = Phase::Start;
        self.topic.clear();
        self.history.clear();
        self.current_question = None;
        self.summary = None;
        self.reset_turn_state();
    }

    fn reset_turn_state(&mut self) {
        self.selected_option = None;
        self.is_answered = false;
        self.turn_recorded = false;
        self.error = None;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;
    use crate::time::fixed_now;

    fn build_question(correct_option_index: usize) -> Question {
        QuestionDraft {
            question_text: "Q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index,
            explanation: "e".into(),
        }
        .validate()
        .unwrap()
    }

    fn started_session(topic: &str) -> Session {
        let mut session = Session::new(fixed_now());
        session.begin(topic).unwrap();
        session.install_question(build_question(2)).unwrap();
        session
    }

    #[test]
    fn begin_rejects_blank_topic() {
        let mut session = Session::new(fixed_now());

        let err = session.begin("   ").unwrap_err();

        assert!(matches!(err, SessionError::EmptyTopic));
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.topic().is_empty());
    }

    #[test]
    fn first_question_enters_quiz_phase() {
        let session = started_session("astronomy");

        assert_eq!(session.phase(), Phase::Quiz);
        assert_eq!(session.topic(), "astronomy");
        assert!(session.history().is_empty());
        assert_eq!(session.current_question().unwrap().options().len(), 4);
        assert!(!session.is_answered());
    }

    #[test]
    fn begin_is_rejected_mid_quiz() {
        let mut session = started_session("astronomy");

        let err = session.begin("chemistry").unwrap_err();
        assert!(matches!(err, SessionError::AlreadyStarted));
    }

    #[test]
    fn select_option_validates_range() {
        let mut session = started_session("astronomy");

        let err = session.select_option(4).unwrap_err();

        assert!(matches!(err, SessionError::OptionOutOfRange { index: 4 }));
        assert!(!session.is_answered());
    }

    #[test]
    fn double_submission_is_rejected() {
        let mut session = started_session("astronomy");
        session.select_option(1).unwrap();

        let err = session.select_option(3).unwrap_err();

        assert!(matches!(err, SessionError::AlreadyAnswered));
        assert_eq!(session.selected_option(), Some(1));
    }

    #[test]
    fn matching_selection_records_correct_turn() {
        let mut session = started_session("astronomy");
        session.select_option(2).unwrap();

        let complete = session.record_turn().unwrap();

        assert!(!complete);
        assert_eq!(session.history().len(), 1);
        assert!(session.history()[0].is_correct());
        assert_eq!(session.history()[0].user_answer(), "c");
    }

    #[test]
    fn mismatched_selection_records_incorrect_turn() {
        let mut session = started_session("astronomy");
        session.select_option(0).unwrap();

        session.record_turn().unwrap();

        assert!(!session.history()[0].is_correct());
    }

    #[test]
    fn record_turn_requires_an_answer() {
        let mut session = started_session("astronomy");

        let err = session.record_turn().unwrap_err();
        assert!(matches!(err, SessionError::NoAnswer));
        assert!(session.history().is_empty());
    }

    #[test]
    fn record_turn_retry_does_not_duplicate() {
        let mut session = started_session("astronomy");
        session.select_option(2).unwrap();

        session.record_turn().unwrap();
        session.record_turn().unwrap();

        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn fifth_turn_flips_to_summary() {
        let mut session = started_session("astronomy");

        for i in 0..QUESTIONS_PER_QUIZ {
            session.select_option(2).unwrap();
            let complete = session.record_turn().unwrap();
            assert_eq!(complete, i == QUESTIONS_PER_QUIZ - 1);
            if !complete {
                session.install_question(build_question(2)).unwrap();
            }
        }

        assert_eq!(session.phase(), Phase::Summary);
        assert_eq!(session.history().len(), QUESTIONS_PER_QUIZ);
        assert!(session.is_complete());
    }

    #[test]
    fn no_question_can_be_installed_after_summary_phase() {
        let mut session = started_session("astronomy");
        for _ in 0..QUESTIONS_PER_QUIZ {
            session.select_option(0).unwrap();
            if !session.record_turn().unwrap() {
                session.install_question(build_question(0)).unwrap();
            }
        }

        let err = session.install_question(build_question(0)).unwrap_err();
        assert!(matches!(err, SessionError::Finished));
    }

    #[test]
    fn summary_installs_only_when_finished() {
        let mut session = started_session("astronomy");

        let err = session
            .install_summary(Summary::new("done").unwrap())
            .unwrap_err();
        assert!(matches!(err, SessionError::NotFinished));
    }

    #[test]
    fn summary_clears_leftover_turn_state() {
        let mut session = started_session("astronomy");
        for _ in 0..QUESTIONS_PER_QUIZ {
            session.select_option(0).unwrap();
            if !session.record_turn().unwrap() {
                session.install_question(build_question(0)).unwrap();
            }
        }
        session.set_error("summary generation failed");

        session
            .install_summary(Summary::new("### Summary of Topics").unwrap())
            .unwrap();

        assert!(session.current_question().is_none());
        assert!(session.error().is_none());
        assert!(session.summary().is_some());
    }

    #[test]
    fn restart_clears_mid_quiz_session() {
        let mut session = started_session("astronomy");
        for _ in 0..3 {
            session.select_option(1).unwrap();
            session.record_turn().unwrap();
            session.install_question(build_question(1)).unwrap();
        }
        session.set_error("boom");

        session.restart();

        assert_eq!(session.phase(), Phase::Start);
        assert!(session.topic().is_empty());
        assert!(session.history().is_empty());
        assert!(session.current_question().is_none());
        assert!(session.error().is_none());
        assert!(!session.is_answered());
    }

    #[test]
    fn restart_clears_finished_session() {
        let mut session = started_session("astronomy");
        for _ in 0..QUESTIONS_PER_QUIZ {
            session.select_option(0).unwrap();
            if !session.record_turn().unwrap() {
                session.install_question(build_question(0)).unwrap();
            }
        }
        session
            .install_summary(Summary::new("analysis").unwrap())
            .unwrap();

        session.restart();

        assert_eq!(session.phase(), Phase::Start);
        assert!(session.summary().is_none());
        assert!(session.history().is_empty());
    }
}
