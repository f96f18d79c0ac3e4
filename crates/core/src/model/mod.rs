mod answer;
mod countdown;
mod ids;
mod question;
mod report;
mod session;

pub use answer::{WrongAnswer, answers_match, normalize_answer};
pub use countdown::{CRITICAL_SECS, Urgency};
pub use ids::{ParticipantId, TimerTicket};
pub use question::{ContentKind, ContentSelection, QuestionPair, Tier, TierParseError};
pub use report::{FinishReason, QuizReport, ScoreBand, percent};
pub use session::{
    AnswerOutcome, BackOutcome, ContentStep, Intent, PageView, Progress, QuestionView, Session,
    SessionError, SessionState, TimeoutOutcome, Verdict,
};
