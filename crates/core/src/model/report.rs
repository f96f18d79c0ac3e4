use chrono::{DateTime, Utc};

use crate::model::WrongAnswer;

/// Qualitative feedback band for a final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreBand {
    /// Below 50%.
    KeepPracticing,
    /// 50% and above.
    Average,
    /// 70% and above.
    Good,
    /// 90% and above.
    Excellent,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            ScoreBand::Excellent
        } else if percent >= 70.0 {
            ScoreBand::Good
        } else if percent >= 50.0 {
            ScoreBand::Average
        } else {
            ScoreBand::KeepPracticing
        }
    }
}

/// Why a quiz stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Every question was answered.
    Completed,
    /// The participant confirmed an early exit.
    EndedEarly,
    /// A countdown expired; the quiz ends on the first timeout.
    TimedOut,
}

/// Percentage of correct answers rounded to two decimals, or `0.0` when nothing was presented.
#[must_use]
pub fn percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let raw = correct as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Final statistics of one quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizReport {
    total: usize,
    correct: usize,
    percent: f64,
    band: ScoreBand,
    wrong_answers: Vec<WrongAnswer>,
    reason: FinishReason,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizReport {
    /// Aggregate the state of a finished quiz.
    ///
    /// `cursor` is the number of questions already scored; only those count
    /// toward the total, so an early exit reports a partial quiz.
    #[must_use]
    pub fn aggregate(
        correct: usize,
        cursor: usize,
        question_count: usize,
        wrong_answers: Vec<WrongAnswer>,
        reason: FinishReason,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let total = cursor.min(question_count);
        let percent = percent(correct, total);
        Self {
            total,
            correct,
            percent,
            band: ScoreBand::from_percent(percent),
            wrong_answers,
            reason,
            started_at,
            completed_at,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> usize {
        self.total.saturating_sub(self.correct)
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        self.percent
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        self.band
    }

    #[must_use]
    pub fn wrong_answers(&self) -> &[WrongAnswer] {
        &self.wrong_answers
    }

    #[must_use]
    pub fn has_wrong_answers(&self) -> bool {
        !self.wrong_answers.is_empty()
    }

    #[must_use]
    pub fn reason(&self) -> FinishReason {
        self.reason
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Wall-clock length of the quiz, never negative.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        (self.completed_at - self.started_at).max(chrono::Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionPair;
    use crate::time::fixed_now;

    #[test]
    fn percent_rounds_to_two_decimals() {
        assert_eq!(percent(7, 10), 70.0);
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(5, 5), 100.0);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ScoreBand::from_percent(100.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_percent(90.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_percent(89.99), ScoreBand::Good);
        assert_eq!(ScoreBand::from_percent(70.0), ScoreBand::Good);
        assert_eq!(ScoreBand::from_percent(50.0), ScoreBand::Average);
        assert_eq!(ScoreBand::from_percent(49.99), ScoreBand::KeepPracticing);
        assert_eq!(ScoreBand::from_percent(0.0), ScoreBand::KeepPracticing);
    }

    #[test]
    fn aggregate_counts_only_presented_questions() {
        let wrong = vec![WrongAnswer::new(
            &QuestionPair::new("q2", "a2"),
            Some("x".into()),
        )];
        let now = fixed_now();
        let report = QuizReport::aggregate(1, 2, 10, wrong, FinishReason::EndedEarly, now, now);

        assert_eq!(report.total(), 2);
        assert_eq!(report.correct(), 1);
        assert_eq!(report.wrong(), 1);
        assert_eq!(report.percent(), 50.0);
        assert_eq!(report.band(), ScoreBand::Average);
        assert!(report.has_wrong_answers());
        assert_eq!(report.duration(), chrono::Duration::zero());
    }

    #[test]
    fn aggregate_with_nothing_presented_is_zero() {
        let now = fixed_now();
        let report =
            QuizReport::aggregate(0, 0, 4, Vec::new(), FinishReason::EndedEarly, now, now);
        assert_eq!(report.total(), 0);
        assert_eq!(report.percent(), 0.0);
        assert_eq!(report.band(), ScoreBand::KeepPracticing);
    }
}
