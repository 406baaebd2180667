#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod generator;
pub mod quiz_service;
pub mod session_view;

pub use curio_core::Clock;

pub use config::QuizConfig;
pub use error::{ConfigError, GeneratorError, QuizError};
pub use generator::{ContentGenerator, PerplexityGenerator, question_schema};
pub use quiz_service::QuizService;
pub use session_view::{QuestionView, SessionView};
