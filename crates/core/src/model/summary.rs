use thiserror::Error;

/// Markdown learning analysis produced once a quiz ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    text: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("summary text is empty")]
    Empty,
}

impl Summary {
    /// Wrap generator output as a summary.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::Empty` for blank text.
    pub fn new(text: impl Into<String>) -> Result<Self, SummaryError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SummaryError::Empty);
        }
        Ok(Self { text })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}
