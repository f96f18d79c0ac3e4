use crate::model::QuestionPair;

/// Normalizes an answer for comparison: trims surrounding whitespace and lowercases.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Exact comparison after normalization. No fuzzy matching.
#[must_use]
pub fn answers_match(expected: &str, given: &str) -> bool {
    normalize_answer(expected) == normalize_answer(given)
}

/// A question the participant got wrong, kept for the report and for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongAnswer {
    pub prompt: String,
    pub expected: String,
    /// `None` when the countdown ran out before any reply.
    pub given: Option<String>,
}

impl WrongAnswer {
    #[must_use]
    pub fn new(pair: &QuestionPair, given: Option<String>) -> Self {
        Self {
            prompt: pair.prompt.clone(),
            expected: pair.answer.clone(),
            given,
        }
    }

    /// The question this entry was recorded for.
    #[must_use]
    pub fn pair(&self) -> QuestionPair {
        QuestionPair::new(self.prompt.clone(), self.expected.clone())
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.given.is_none()
    }
}
