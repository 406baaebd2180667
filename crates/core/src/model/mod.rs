mod question;
mod session;
mod summary;
mod turn;

pub use question::{OPTION_COUNT, Question, QuestionDraft, QuestionError};
pub use session::{Phase, QUESTIONS_PER_QUIZ, Session, SessionError};
pub use summary::{Summary, SummaryError};
pub use turn::Turn;
