use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::model::{
    ContentKind, ContentSelection, FinishReason, QuestionPair, QuizReport, Tier, TimerTicket,
    WrongAnswer, answers_match,
};
use crate::pagination::{PaginationError, Paginator};
use crate::sampler::{SamplerError, sample_without_replacement};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Recoverable session failures. The session keeps its state on every one of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("requested {requested} questions, choose between 1 and {available}")]
    InvalidCount { requested: usize, available: usize },

    #[error("the selected content has no items")]
    EmptyPool,

    #[error("there are no wrong answers to replay")]
    NoWrongAnswers,

    #[error(transparent)]
    CountOutOfRange(#[from] SamplerError),

    #[error("{operation} is not available while {state:?}")]
    StateMismatch {
        operation: &'static str,
        state: SessionState,
    },

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    SelectingContent,
    SelectingDifficulty,
    SelectingCount,
    AwaitingAnswer,
    ConfirmingEarlyExit,
    BrowsingContent,
}

/// What the participant opened the content menus for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    Quiz,
    Study,
}

/// Which list is on screen while `SelectingContent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentStep {
    #[default]
    Sections,
    Collections(ContentKind),
}

/// Result of a `back` navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Left the menus entirely; the caller clears the session.
    Root,
    /// Moved up one menu level.
    Stepped,
}

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// The question currently awaiting a reply, with the countdown bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    /// Zero-based position in the quiz.
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub ticket: TimerTicket,
    pub selection: Option<ContentSelection>,
    pub replay: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub expected: String,
    pub given: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Next(QuestionView),
    Finished(QuizReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub verdict: Verdict,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutOutcome {
    pub expected: String,
    pub report: QuizReport,
}

/// One page of read-only content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub items: Vec<QuestionPair>,
    /// Offset of the first item, for numbering.
    pub start: usize,
    pub page_index: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub selection: Option<ContentSelection>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Live state of one participant's quiz or browse interaction.
///
/// Operations validate before they mutate, so a failed call leaves the session
/// exactly as it was. The session only records which countdown should be alive
/// (`active_timer`); running it is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    intent: Intent,
    content_step: ContentStep,
    collection_menu: Option<Paginator<String>>,
    selected_collection: Option<String>,
    content_selection: Option<ContentSelection>,
    available: usize,
    questions: Vec<QuestionPair>,
    cursor: usize,
    correct_count: usize,
    wrong_answers: Vec<WrongAnswer>,
    answered_flag: bool,
    active_timer: Option<TimerTicket>,
    issued_tickets: u64,
    replay: bool,
    pagination: Option<Paginator<QuestionPair>>,
    started_at: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    #[must_use]
    pub fn content_step(&self) -> ContentStep {
        self.content_step
    }

    #[must_use]
    pub fn collection_menu(&self) -> Option<&Paginator<String>> {
        self.collection_menu.as_ref()
    }

    #[must_use]
    pub fn selected_collection(&self) -> Option<&str> {
        self.selected_collection.as_deref()
    }

    #[must_use]
    pub fn content_selection(&self) -> Option<&ContentSelection> {
        self.content_selection.as_ref()
    }

    /// Size of the resolved pool while choosing a count.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionPair] {
        &self.questions
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_answers(&self) -> &[WrongAnswer] {
        &self.wrong_answers
    }

    #[must_use]
    pub fn answered(&self) -> bool {
        self.answered_flag
    }

    #[must_use]
    pub fn active_timer(&self) -> Option<TimerTicket> {
        self.active_timer
    }

    #[must_use]
    pub fn pagination(&self) -> Option<&Paginator<QuestionPair>> {
        self.pagination.as_ref()
    }

    /// True when an ended quiz left wrong answers behind for a replay.
    #[must_use]
    pub fn can_replay(&self) -> bool {
        self.state == SessionState::Idle && !self.wrong_answers.is_empty()
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[SessionState],
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::StateMismatch {
                operation,
                state: self.state,
            })
        }
    }

    //
    // ─── MENUS ─────────────────────────────────────────────────────────────────
    //

    /// Open the quiz or study menu. A top-level action: prior state is discarded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless the session is idle.
    pub fn enter_content_menu(&mut self, intent: Intent) -> Result<(), SessionError> {
        self.expect_state("enter_content_menu", &[SessionState::Idle])?;
        *self = Self {
            state: SessionState::SelectingContent,
            intent,
            issued_tickets: self.issued_tickets,
            ..Self::default()
        };
        Ok(())
    }

    /// Show the collections of one content kind.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if there are no collections of that kind.
    pub fn choose_section(
        &mut self,
        kind: ContentKind,
        collections: Vec<String>,
        menu_page_size: usize,
    ) -> Result<(), SessionError> {
        self.expect_state("choose_section", &[SessionState::SelectingContent])?;
        if self.content_step != ContentStep::Sections {
            return Err(SessionError::StateMismatch {
                operation: "choose_section",
                state: self.state,
            });
        }
        if collections.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        self.collection_menu = Some(Paginator::new(collections, menu_page_size)?);
        self.content_step = ContentStep::Collections(kind);
        Ok(())
    }

    /// Page through the collection list. Clamped at both ends.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless a collection list is shown.
    pub fn page_collections(&mut self, forward: bool) -> Result<(), SessionError> {
        self.expect_state("page_collections", &[SessionState::SelectingContent])?;
        let Some(menu) = self.collection_menu.as_mut() else {
            return Err(SessionError::StateMismatch {
                operation: "page_collections",
                state: self.state,
            });
        };
        if forward {
            menu.next_page();
        } else {
            menu.prev_page();
        }
        Ok(())
    }

    /// Pick a collection from the list.
    ///
    /// Dictionaries move on to tier selection and return `None`. Grammar
    /// categories are complete leaves and return their selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCollection` if the name is not listed.
    pub fn choose_collection(
        &mut self,
        name: &str,
    ) -> Result<Option<ContentSelection>, SessionError> {
        self.expect_state("choose_collection", &[SessionState::SelectingContent])?;
        let ContentStep::Collections(kind) = self.content_step else {
            return Err(SessionError::StateMismatch {
                operation: "choose_collection",
                state: self.state,
            });
        };
        let listed = self
            .collection_menu
            .as_ref()
            .is_some_and(|menu| menu.items().iter().any(|item| item == name));
        if !listed {
            return Err(SessionError::UnknownCollection(name.to_owned()));
        }

        self.selected_collection = Some(name.to_owned());
        match kind {
            ContentKind::Dictionary => {
                self.state = SessionState::SelectingDifficulty;
                Ok(None)
            }
            ContentKind::Grammar => Ok(Some(ContentSelection::grammar(name))),
        }
    }

    /// Pick a tier for the chosen dictionary.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless choosing a difficulty.
    pub fn choose_tier(&mut self, tier: Tier) -> Result<ContentSelection, SessionError> {
        self.expect_state("choose_tier", &[SessionState::SelectingDifficulty])?;
        let name = self
            .selected_collection
            .clone()
            .ok_or(SessionError::StateMismatch {
                operation: "choose_tier",
                state: self.state,
            })?;
        Ok(ContentSelection::dictionary(name, tier))
    }

    /// Record a resolved leaf and ask for a question count.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if the leaf has no items; the session
    /// stays on the current menu.
    pub fn await_count(
        &mut self,
        selection: ContentSelection,
        available: usize,
    ) -> Result<(), SessionError> {
        self.expect_state(
            "await_count",
            &[SessionState::SelectingContent, SessionState::SelectingDifficulty],
        )?;
        if self.intent != Intent::Quiz {
            return Err(SessionError::StateMismatch {
                operation: "await_count",
                state: self.state,
            });
        }
        if available == 0 {
            return Err(SessionError::EmptyPool);
        }
        self.content_selection = Some(selection);
        self.available = available;
        self.state = SessionState::SelectingCount;
        Ok(())
    }

    /// Step back one menu level.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible for symmetry with the other operations.
    pub fn back(&mut self) -> Result<BackOutcome, SessionError> {
        use SessionState as S;

        let outcome = match self.state {
            S::Idle | S::AwaitingAnswer | S::ConfirmingEarlyExit => BackOutcome::Root,
            S::SelectingContent => match self.content_step {
                ContentStep::Sections => BackOutcome::Root,
                ContentStep::Collections(_) => {
                    self.content_step = ContentStep::Sections;
                    self.collection_menu = None;
                    self.selected_collection = None;
                    BackOutcome::Stepped
                }
            },
            S::SelectingDifficulty => {
                self.state = S::SelectingContent;
                self.selected_collection = None;
                BackOutcome::Stepped
            }
            S::SelectingCount => {
                self.state = match self.content_selection.take() {
                    Some(ContentSelection::Dictionary { .. }) => S::SelectingDifficulty,
                    Some(ContentSelection::Grammar { .. }) => S::SelectingContent,
                    Some(ContentSelection::RandomPool) | None => {
                        self.content_step = ContentStep::Sections;
                        S::SelectingContent
                    }
                };
                self.available = 0;
                BackOutcome::Stepped
            }
            S::BrowsingContent => {
                self.pagination = None;
                self.content_selection = None;
                self.state = match self.content_step {
                    ContentStep::Collections(ContentKind::Dictionary) => S::SelectingDifficulty,
                    _ => S::SelectingContent,
                };
                BackOutcome::Stepped
            }
        };

        if outcome == BackOutcome::Root {
            *self = Self::default();
        }
        Ok(outcome)
    }

    //
    // ─── QUIZ ──────────────────────────────────────────────────────────────────
    //

    /// Sample `count` questions from `pool` and ask the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` for an empty pool and
    /// `SessionError::InvalidCount` unless `1 <= count <= pool.len()`.
    pub fn begin<R: Rng + ?Sized>(
        &mut self,
        selection: ContentSelection,
        pool: &[QuestionPair],
        count: usize,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<QuestionView, SessionError> {
        self.expect_state("begin", &[SessionState::SelectingCount])?;
        if pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        if count == 0 || count > pool.len() {
            return Err(SessionError::InvalidCount {
                requested: count,
                available: pool.len(),
            });
        }
        let questions = sample_without_replacement(pool, count, rng)?;
        self.content_selection = Some(selection);
        Ok(self.start_quiz(questions, false, now))
    }

    /// Build a new quiz from exactly the previous quiz's wrong answers, in order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoWrongAnswers` if the last quiz had none, and
    /// `SessionError::StateMismatch` while a quiz or menu is still active.
    pub fn begin_replay(&mut self, now: DateTime<Utc>) -> Result<QuestionView, SessionError> {
        self.expect_state("begin_replay", &[SessionState::Idle])?;
        if self.wrong_answers.is_empty() {
            return Err(SessionError::NoWrongAnswers);
        }
        let questions = self.wrong_answers.iter().map(WrongAnswer::pair).collect();
        Ok(self.start_quiz(questions, true, now))
    }

    fn start_quiz(
        &mut self,
        questions: Vec<QuestionPair>,
        replay: bool,
        now: DateTime<Utc>,
    ) -> QuestionView {
        self.questions = questions;
        self.cursor = 0;
        self.correct_count = 0;
        self.wrong_answers = Vec::new();
        self.replay = replay;
        self.pagination = None;
        self.started_at = Some(now);
        self.ask_current()
    }

    fn ask_current(&mut self) -> QuestionView {
        self.issued_tickets += 1;
        let ticket = TimerTicket::new(self.issued_tickets);
        self.answered_flag = false;
        self.active_timer = Some(ticket);
        self.state = SessionState::AwaitingAnswer;
        QuestionView {
            index: self.cursor,
            total: self.questions.len(),
            prompt: self.questions[self.cursor].prompt.clone(),
            ticket,
            selection: self.content_selection.clone(),
            replay: self.replay,
        }
    }

    /// The question awaiting a reply, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<QuestionView> {
        if self.state != SessionState::AwaitingAnswer {
            return None;
        }
        let pair = self.questions.get(self.cursor)?;
        Some(QuestionView {
            index: self.cursor,
            total: self.questions.len(),
            prompt: pair.prompt.clone(),
            ticket: self.active_timer?,
            selection: self.content_selection.clone(),
            replay: self.replay,
        })
    }

    /// Score a reply to the current question and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless awaiting an answer.
    pub fn submit_answer(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        self.expect_state("submit_answer", &[SessionState::AwaitingAnswer])?;
        self.answered_flag = true;
        self.active_timer = None;

        let pair = self.questions[self.cursor].clone();
        let correct = answers_match(&pair.answer, text);
        let given = text.trim().to_owned();
        if correct {
            self.correct_count += 1;
        } else {
            self.wrong_answers.push(WrongAnswer::new(&pair, Some(given.clone())));
        }
        self.cursor += 1;

        let progress = if self.cursor == self.questions.len() {
            Progress::Finished(self.finalize(FinishReason::Completed, now))
        } else {
            Progress::Next(self.ask_current())
        };

        Ok(AnswerOutcome {
            verdict: Verdict {
                correct,
                expected: pair.answer,
                given,
            },
            progress,
        })
    }

    /// Pause the quiz and ask for confirmation to end it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless awaiting an answer.
    pub fn request_early_exit(&mut self) -> Result<(), SessionError> {
        self.expect_state("request_early_exit", &[SessionState::AwaitingAnswer])?;
        self.active_timer = None;
        self.state = SessionState::ConfirmingEarlyExit;
        Ok(())
    }

    /// End the quiz now (`yes`) or re-ask the current question with a fresh countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless confirming an early exit.
    pub fn confirm_early_exit(
        &mut self,
        yes: bool,
        now: DateTime<Utc>,
    ) -> Result<Progress, SessionError> {
        self.expect_state("confirm_early_exit", &[SessionState::ConfirmingEarlyExit])?;
        if yes {
            Ok(Progress::Finished(self.finalize(FinishReason::EndedEarly, now)))
        } else {
            Ok(Progress::Next(self.ask_current()))
        }
    }

    /// Handle a countdown reaching zero.
    ///
    /// Returns `None` when the expiry is stale: the ticket is not the active
    /// one, the question was already answered, or no question is pending. A
    /// live expiry scores the question as unanswered and ends the quiz.
    pub fn timer_expired(
        &mut self,
        ticket: TimerTicket,
        now: DateTime<Utc>,
    ) -> Option<TimeoutOutcome> {
        if self.state != SessionState::AwaitingAnswer
            || self.answered_flag
            || self.active_timer != Some(ticket)
        {
            return None;
        }
        self.answered_flag = true;
        self.active_timer = None;

        let pair = self.questions[self.cursor].clone();
        self.wrong_answers.push(WrongAnswer::new(&pair, None));
        self.cursor += 1;

        Some(TimeoutOutcome {
            expected: pair.answer,
            report: self.finalize(FinishReason::TimedOut, now),
        })
    }

    fn finalize(&mut self, reason: FinishReason, now: DateTime<Utc>) -> QuizReport {
        self.active_timer = None;
        self.state = SessionState::Idle;
        QuizReport::aggregate(
            self.correct_count,
            self.cursor,
            self.questions.len(),
            self.wrong_answers.clone(),
            reason,
            self.started_at.unwrap_or(now),
            now,
        )
    }

    //
    // ─── BROWSING ──────────────────────────────────────────────────────────────
    //

    /// Show a resolved leaf read-only, `page_size` items at a time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` for an empty leaf and
    /// `SessionError::Pagination` for a zero page size.
    pub fn open_browser(
        &mut self,
        selection: ContentSelection,
        items: Vec<QuestionPair>,
        page_size: usize,
    ) -> Result<PageView, SessionError> {
        self.expect_state(
            "open_browser",
            &[SessionState::SelectingContent, SessionState::SelectingDifficulty],
        )?;
        if items.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        self.pagination = Some(Paginator::new(items, page_size)?);
        self.content_selection = Some(selection);
        self.state = SessionState::BrowsingContent;
        self.current_page()
    }

    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless browsing.
    pub fn next_page(&mut self) -> Result<PageView, SessionError> {
        self.expect_state("next_page", &[SessionState::BrowsingContent])?;
        if let Some(pager) = self.pagination.as_mut() {
            pager.next_page();
        }
        self.current_page()
    }

    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless browsing.
    pub fn prev_page(&mut self) -> Result<PageView, SessionError> {
        self.expect_state("prev_page", &[SessionState::BrowsingContent])?;
        if let Some(pager) = self.pagination.as_mut() {
            pager.prev_page();
        }
        self.current_page()
    }

    /// # Errors
    ///
    /// Returns `SessionError::StateMismatch` unless browsing.
    pub fn current_page(&self) -> Result<PageView, SessionError> {
        let pager = self
            .pagination
            .as_ref()
            .filter(|_| self.state == SessionState::BrowsingContent)
            .ok_or(SessionError::StateMismatch {
                operation: "current_page",
                state: self.state,
            })?;
        Ok(PageView {
            items: pager.page().to_vec(),
            start: pager.page_start(),
            page_index: pager.page_index(),
            total_pages: pager.total_pages(),
            total_items: pager.len(),
            selection: self.content_selection.clone(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
