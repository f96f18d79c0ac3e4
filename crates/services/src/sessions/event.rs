use quiz_core::model::{ContentKind, Tier, TimerTicket};

/// Everything a participant (or their countdown) can do to a session.
///
/// The transport translates raw input into one of these; the engine never
/// looks at raw text except for `Answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Open the root menu, discarding any session.
    Start,
    /// Return to the root menu, discarding any session.
    MainMenu,
    OpenQuiz,
    OpenStudy,
    PickSection(ContentKind),
    PickRandom,
    PickCollection(String),
    PickTier(Tier),
    NextPage,
    PrevPage,
    /// Ask for a typed question count.
    EnterCount,
    TakeAll,
    Count(usize),
    Answer(String),
    EndQuiz,
    ConfirmExit(bool),
    /// Posted by the countdown of the question holding `ticket`.
    TimerExpired(TimerTicket),
    Replay,
    Back,
}

impl SessionEvent {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::MainMenu => "main_menu",
            Self::OpenQuiz => "open_quiz",
            Self::OpenStudy => "open_study",
            Self::PickSection(_) => "pick_section",
            Self::PickRandom => "pick_random",
            Self::PickCollection(_) => "pick_collection",
            Self::PickTier(_) => "pick_tier",
            Self::NextPage => "next_page",
            Self::PrevPage => "prev_page",
            Self::EnterCount => "enter_count",
            Self::TakeAll => "take_all",
            Self::Count(_) => "count",
            Self::Answer(_) => "answer",
            Self::EndQuiz => "end_quiz",
            Self::ConfirmExit(_) => "confirm_exit",
            Self::TimerExpired(_) => "timer_expired",
            Self::Replay => "replay",
            Self::Back => "back",
        }
    }

    /// Events that stop a running countdown before the session sees them.
    #[must_use]
    pub fn interrupts_countdown(&self) -> bool {
        matches!(
            self,
            Self::Answer(_) | Self::EndQuiz | Self::Back | Self::MainMenu | Self::Start
        )
    }
}
