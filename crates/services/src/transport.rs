//! Outbound contract between the engine and whatever shows things to a participant.

use async_trait::async_trait;
use quiz_core::model::{
    ContentKind, Intent, PageView, ParticipantId, QuestionView, QuizReport, Tier, Urgency, Verdict,
};

use crate::error::TransportError;
use crate::sessions::SessionEvent;

//
// ─── NOTICES ───────────────────────────────────────────────────────────────────
//

/// What the participant should be shown.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Welcome,
    ContentMenu {
        intent: Intent,
    },
    CollectionMenu {
        kind: ContentKind,
        names: Vec<String>,
        page_index: usize,
        total_pages: usize,
    },
    TierMenu {
        collection: String,
    },
    CountMenu {
        available: usize,
    },
    CountPrompt {
        available: usize,
    },
    Question(QuestionView),
    Verdict(Verdict),
    Countdown {
        remaining: u32,
        limit: u32,
        urgency: Urgency,
    },
    /// The countdown display should disappear.
    CountdownCleared,
    TimeUp,
    ConfirmExit,
    Report(QuizReport),
    ReplayStarted {
        count: usize,
    },
    Page(PageView),
    /// The last input was not accepted; a fresh prompt follows.
    Rejected {
        reason: String,
    },
}

/// A selectable option attached to a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    StartQuiz,
    Study,
    Dictionaries,
    Grammar,
    RandomPool,
    Collection(String),
    Tier(Tier),
    TakeAll,
    EnterCount,
    PrevPage,
    NextPage,
    Back,
    MainMenu,
    EndQuiz,
    ConfirmEnd,
    ContinueQuiz,
    Replay,
}

impl Choice {
    /// The event selecting this option produces.
    #[must_use]
    pub fn event(&self) -> SessionEvent {
        match self {
            Choice::StartQuiz => SessionEvent::OpenQuiz,
            Choice::Study => SessionEvent::OpenStudy,
            Choice::Dictionaries => SessionEvent::PickSection(ContentKind::Dictionary),
            Choice::Grammar => SessionEvent::PickSection(ContentKind::Grammar),
            Choice::RandomPool => SessionEvent::PickRandom,
            Choice::Collection(name) => SessionEvent::PickCollection(name.clone()),
            Choice::Tier(tier) => SessionEvent::PickTier(*tier),
            Choice::TakeAll => SessionEvent::TakeAll,
            Choice::EnterCount => SessionEvent::EnterCount,
            Choice::PrevPage => SessionEvent::PrevPage,
            Choice::NextPage => SessionEvent::NextPage,
            Choice::Back => SessionEvent::Back,
            Choice::MainMenu => SessionEvent::MainMenu,
            Choice::EndQuiz => SessionEvent::EndQuiz,
            Choice::ConfirmEnd => SessionEvent::ConfirmExit(true),
            Choice::ContinueQuiz => SessionEvent::ConfirmExit(false),
            Choice::Replay => SessionEvent::Replay,
        }
    }
}

/// How the next free-text line should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Pick one of the attached options.
    Menu,
    /// Type a number in `1..=max`.
    Count { max: usize },
    /// Type an answer to the current question.
    Answer,
}

/// One message to a participant.
///
/// `input` is `None` for passive updates (countdown ticks, verdicts) that
/// must not replace the prompt the participant is answering.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub notice: Notice,
    pub options: Vec<Choice>,
    pub input: Option<InputMode>,
}

impl Delivery {
    #[must_use]
    pub fn passive(notice: Notice) -> Self {
        Self {
            notice,
            options: Vec::new(),
            input: None,
        }
    }

    #[must_use]
    pub fn menu(notice: Notice, options: Vec<Choice>) -> Self {
        Self {
            notice,
            options,
            input: Some(InputMode::Menu),
        }
    }

    #[must_use]
    pub fn prompt(notice: Notice, options: Vec<Choice>, input: InputMode) -> Self {
        Self {
            notice,
            options,
            input: Some(input),
        }
    }
}

/// Delivers notices to participants.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns `TransportError` if the participant could not be reached.
    async fn deliver(
        &self,
        participant: ParticipantId,
        delivery: Delivery,
    ) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_map_to_events() {
        assert_eq!(Choice::ConfirmEnd.event(), SessionEvent::ConfirmExit(true));
        assert_eq!(Choice::ContinueQuiz.event(), SessionEvent::ConfirmExit(false));
        assert_eq!(
            Choice::Collection("Animals".into()).event(),
            SessionEvent::PickCollection("Animals".into())
        );
        assert_eq!(
            Choice::Grammar.event(),
            SessionEvent::PickSection(ContentKind::Grammar)
        );
    }

    #[test]
    fn passive_deliveries_take_no_input() {
        let delivery = Delivery::passive(Notice::TimeUp);
        assert!(delivery.input.is_none());
        assert!(delivery.options.is_empty());
    }
}
