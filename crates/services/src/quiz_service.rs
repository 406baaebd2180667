use std::sync::Arc;

use tracing::{info, warn};

use curio_core::Clock;
use curio_core::model::{Phase, Question, QuestionDraft, Session, SessionError, Summary};
use curio_core::prompt::{self, Message};

use crate::config::{DEFAULT_QUESTION_MODEL, DEFAULT_SUMMARY_MODEL};
use crate::error::QuizError;
use crate::generator::{ContentGenerator, question_schema};

/// Acknowledgement for the reserved follow-up intent.
const DIG_DEEPER_ACK: &str = "This feature is coming in V2!";

/// Orchestrates quiz progression against the content generator.
///
/// Owns the time source and the generator; every session mutation funnels
/// through one of the five intents, and the presentation layer reads a
/// `SessionView` back after each. Generation and parse failures are written
/// to the session's error field and leave the rest of the state unchanged,
/// so the triggering intent can simply be retried.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    generator: Arc<dyn ContentGenerator>,
    question_model: String,
    summary_model: String,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            clock,
            generator,
            question_model: DEFAULT_QUESTION_MODEL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_models(
        mut self,
        question_model: impl Into<String>,
        summary_model: impl Into<String>,
    ) -> Self {
        self.question_model = question_model.into();
        self.summary_model = summary_model.into();
        self
    }

    /// Create a session stamped with the service clock.
    #[must_use]
    pub fn new_session(&self) -> Session {
        Session::new(self.clock.now())
    }

    /// Start a quiz on the given topic by fetching the first question.
    ///
    /// On success the session enters the quiz phase with an empty history.
    /// On generation or parse failure the session keeps its start phase and
    /// carries the user-visible error; retrying means calling this again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for a blank topic (state untouched), or
    /// the generation/parse failure recorded on the session.
    pub async fn start_quiz(&self, session: &mut Session, topic: &str) -> Result<(), QuizError> {
        session.begin(topic)?;

        let messages = prompt::first_question(session.topic());
        let question = self.record_failure(session, self.fetch_question(&messages).await)?;
        session.install_question(question)?;

        info!(topic = session.topic(), "quiz started");
        Ok(())
    }

    /// Record the user's option selection. No generator call.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for an out-of-range index, a double
    /// submission, or a missing question; session state is untouched.
    pub fn submit_answer(&self, session: &mut Session, index: usize) -> Result<(), QuizError> {
        session.select_option(index)?;
        Ok(())
    }

    /// Move past the answered question: append its turn, then fetch either
    /// the next question or, once five turns are recorded, the closing
    /// analysis.
    ///
    /// The turn is appended before any generator call, so a failure here
    /// leaves it in history; retrying this intent resumes at the fetch.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when there is nothing to advance past,
    /// or the generation/parse failure recorded on the session.
    pub async fn advance(&self, session: &mut Session) -> Result<(), QuizError> {
        if session.summary().is_some() {
            return Err(QuizError::Session(SessionError::Finished));
        }

        let complete = if session.phase() == Phase::Summary {
            // A previous summary fetch failed; the turns are all recorded.
            true
        } else {
            session.record_turn()?
        };

        if complete {
            self.finish_quiz(session).await
        } else {
            self.next_question(session).await
        }
    }

    /// Reset the session back to the topic form. Valid from any phase.
    pub fn restart(&self, session: &mut Session) {
        session.restart();
        info!("session restarted");
    }

    /// Reserved follow-up intent; acknowledged without doing anything.
    #[must_use]
    pub fn dig_deeper(&self) -> &'static str {
        DIG_DEEPER_ACK
    }

    async fn next_question(&self, session: &mut Session) -> Result<(), QuizError> {
        let messages = prompt::next_question(session.history());
        let question = self.record_failure(session, self.fetch_question(&messages).await)?;
        session.install_question(question)?;
        Ok(())
    }

    async fn finish_quiz(&self, session: &mut Session) -> Result<(), QuizError> {
        let messages = prompt::summary_request(session.topic(), session.history());
        let summary = self.record_failure(session, self.fetch_summary(&messages).await)?;

        let elapsed_seconds = (self.clock.now() - session.started_at()).num_seconds();
        session.install_summary(summary)?;
        info!(
            topic = session.topic(),
            turns = session.history().len(),
            elapsed_seconds,
            "quiz completed"
        );
        Ok(())
    }

    async fn fetch_question(&self, messages: &[Message]) -> Result<Question, QuizError> {
        let schema = question_schema();
        let raw = self
            .generator
            .generate(&self.question_model, messages, Some(&schema))
            .await?;
        let draft: QuestionDraft = serde_json::from_str(&raw)?;
        Ok(draft.validate()?)
    }

    async fn fetch_summary(&self, messages: &[Message]) -> Result<Summary, QuizError> {
        let raw = self
            .generator
            .generate(&self.summary_model, messages, None)
            .await?;
        Ok(Summary::new(raw)?)
    }

    fn record_failure<T>(
        &self,
        session: &mut Session,
        result: Result<T, QuizError>,
    ) -> Result<T, QuizError> {
        if let Err(err) = &result {
            if err.is_generation_failure() {
                warn!(error = %err, phase = ?session.phase(), "generation failed");
                session.set_error(err.to_string());
            }
        }
        result
    }
}
