//! The (state, event) transition table.
//!
//! Pure with respect to timers and storage: the runner loads the session,
//! hands it here, then persists it and reconciles the countdown.

use quiz_core::Clock;
use quiz_core::model::{
    BackOutcome, ContentSelection, ContentStep, Intent, Progress, Session, SessionError,
    SessionState,
};
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::event::SessionEvent;
use super::prompts;
use crate::config::EngineConfig;
use crate::content_service::ContentService;
use crate::error::EngineError;
use crate::transport::{Delivery, Notice};

/// Result of applying one event.
#[derive(Debug, Default)]
pub(crate) struct Applied {
    pub deliveries: Vec<Delivery>,
    /// Forget the stored session instead of saving it.
    pub clear: bool,
    /// The event was refused; the deliveries hold a re-prompt.
    pub rejected: Option<SessionError>,
}

impl Applied {
    fn show(deliveries: Vec<Delivery>) -> Self {
        Self {
            deliveries,
            ..Self::default()
        }
    }
}

pub(crate) struct Machine {
    content: ContentService,
    config: EngineConfig,
    clock: Clock,
    rng: StdRng,
}

impl Machine {
    pub(crate) fn new(
        content: ContentService,
        config: EngineConfig,
        clock: Clock,
        rng: StdRng,
    ) -> Self {
        Self {
            content,
            config,
            clock,
            rng,
        }
    }

    /// Apply `event`. Session errors become a rejection notice plus a fresh
    /// prompt for the unchanged state; only storage failures are returned.
    pub(crate) async fn apply(
        &mut self,
        session: &mut Session,
        event: SessionEvent,
    ) -> Result<Applied, EngineError> {
        let name = event.name();
        match self.transition(session, event).await {
            Ok(applied) => Ok(applied),
            Err(EngineError::Session(err)) => {
                debug!(event = name, %err, "event rejected");
                Ok(Applied {
                    deliveries: vec![
                        Delivery::passive(Notice::Rejected {
                            reason: err.to_string(),
                        }),
                        prompts::prompt_for(session),
                    ],
                    clear: false,
                    rejected: Some(err),
                })
            }
            Err(other) => Err(other),
        }
    }

    async fn transition(
        &mut self,
        session: &mut Session,
        event: SessionEvent,
    ) -> Result<Applied, EngineError> {
        use SessionEvent as E;
        use SessionState as S;

        let state = session.state();
        let applied = match (state, event) {
            (_, E::Start | E::MainMenu) => {
                *session = Session::default();
                Applied {
                    deliveries: vec![prompts::welcome(false)],
                    clear: true,
                    rejected: None,
                }
            }

            (state, E::OpenQuiz) if !in_quiz(state) => self.open_menu(session, Intent::Quiz)?,
            (state, E::OpenStudy) if !in_quiz(state) => self.open_menu(session, Intent::Study)?,

            (S::SelectingContent, E::PickSection(kind))
                if session.content_step() == ContentStep::Sections =>
            {
                let names = self.content.collections(kind).await?;
                session.choose_section(kind, names, self.config.menu_page_size())?;
                Applied::show(vec![prompts::prompt_for(session)])
            }
            (S::SelectingContent, E::PickRandom)
                if session.content_step() == ContentStep::Sections =>
            {
                if session.intent() != Intent::Quiz {
                    return Err(mismatch("pick_random", state));
                }
                self.select_leaf(session, ContentSelection::RandomPool).await?
            }
            (S::SelectingContent, E::NextPage) => {
                session.page_collections(true)?;
                Applied::show(vec![prompts::prompt_for(session)])
            }
            (S::SelectingContent, E::PrevPage) => {
                session.page_collections(false)?;
                Applied::show(vec![prompts::prompt_for(session)])
            }
            (S::SelectingContent, E::PickCollection(name)) => {
                match session.choose_collection(&name)? {
                    Some(selection) => self.select_leaf(session, selection).await?,
                    None => Applied::show(vec![prompts::prompt_for(session)]),
                }
            }
            (S::SelectingDifficulty, E::PickTier(tier)) => {
                let selection = session.choose_tier(tier)?;
                self.select_leaf(session, selection).await?
            }

            (S::SelectingCount, E::EnterCount) => {
                Applied::show(vec![prompts::count_prompt(session.available())])
            }
            (S::SelectingCount, E::TakeAll) => {
                let count = session.available();
                self.begin(session, count).await?
            }
            (S::SelectingCount, E::Count(count)) => match self.begin(session, count).await {
                Err(EngineError::Session(err @ SessionError::InvalidCount { .. })) => {
                    Applied {
                        deliveries: vec![
                            Delivery::passive(Notice::Rejected {
                                reason: err.to_string(),
                            }),
                            prompts::count_prompt(session.available()),
                        ],
                        clear: false,
                        rejected: Some(err),
                    }
                }
                other => other?,
            },

            (S::AwaitingAnswer, E::Answer(text)) => {
                let outcome = session.submit_answer(&text, self.clock.now())?;
                let mut deliveries = vec![Delivery::passive(Notice::Verdict(outcome.verdict))];
                deliveries.push(progress_delivery(outcome.progress));
                Applied::show(deliveries)
            }
            (S::AwaitingAnswer, E::EndQuiz) => {
                session.request_early_exit()?;
                Applied::show(vec![prompts::prompt_for(session)])
            }
            (S::ConfirmingEarlyExit, E::ConfirmExit(yes)) => {
                let progress = session.confirm_early_exit(yes, self.clock.now())?;
                Applied::show(vec![progress_delivery(progress)])
            }

            (_, E::TimerExpired(ticket)) => match session.timer_expired(ticket, self.clock.now()) {
                Some(outcome) => {
                    info!(%ticket, "question timed out, quiz finished");
                    Applied::show(vec![
                        Delivery::passive(Notice::TimeUp),
                        prompts::report(outcome.report),
                    ])
                }
                None => {
                    debug!(%ticket, "stale timer expiry suppressed");
                    Applied::default()
                }
            },

            (S::Idle, E::Replay) => {
                let view = session.begin_replay(self.clock.now())?;
                info!(questions = view.total, "replay started");
                Applied::show(vec![
                    Delivery::passive(Notice::ReplayStarted { count: view.total }),
                    prompts::question(view),
                ])
            }

            (S::BrowsingContent, E::NextPage) => {
                let page = session.next_page()?;
                debug!(page = page.page_index, "browse page");
                Applied::show(vec![prompts::prompt_for(session)])
            }
            (S::BrowsingContent, E::PrevPage) => {
                session.prev_page()?;
                Applied::show(vec![prompts::prompt_for(session)])
            }

            (_, E::Back) => match session.back()? {
                BackOutcome::Root => Applied {
                    deliveries: vec![prompts::welcome(false)],
                    clear: true,
                    rejected: None,
                },
                BackOutcome::Stepped => {
                    Applied::show(vec![prompts::prompt_for(session)])
                }
            },

            (state, event) => return Err(mismatch(event.name(), state)),
        };
        Ok(applied)
    }

    fn open_menu(&mut self, session: &mut Session, intent: Intent) -> Result<Applied, EngineError> {
        if session.state() != SessionState::Idle {
            *session = Session::default();
        }
        session.enter_content_menu(intent)?;
        Ok(Applied::show(vec![prompts::content_menu(intent)]))
    }

    /// A leaf is resolved: ask for a count when quizzing, open the browser when studying.
    async fn select_leaf(
        &mut self,
        session: &mut Session,
        selection: ContentSelection,
    ) -> Result<Applied, EngineError> {
        let items = self.content.resolve(&selection).await?;
        match session.intent() {
            Intent::Quiz => {
                session.await_count(selection, items.len())?;
            }
            Intent::Study => {
                session.open_browser(selection, items, self.config.browse_page_size())?;
            }
        }
        Ok(Applied::show(vec![prompts::prompt_for(session)]))
    }

    async fn begin(&mut self, session: &mut Session, count: usize) -> Result<Applied, EngineError> {
        let selection = session
            .content_selection()
            .cloned()
            .ok_or_else(|| mismatch("begin", session.state()))?;
        let pool = self.content.resolve(&selection).await?;
        let view = session.begin(selection, &pool, count, &mut self.rng, self.clock.now())?;
        info!(questions = view.total, "quiz started");
        Ok(Applied::show(vec![prompts::question(view)]))
    }
}

fn progress_delivery(progress: Progress) -> Delivery {
    match progress {
        Progress::Next(view) => prompts::question(view),
        Progress::Finished(report) => {
            info!(
                total = report.total(),
                correct = report.correct(),
                percent = report.percent(),
                "quiz finished"
            );
            prompts::report(report)
        }
    }
}

/// Top-level menu actions are refused while a question is pending.
fn in_quiz(state: SessionState) -> bool {
    matches!(
        state,
        SessionState::AwaitingAnswer | SessionState::ConfirmingEarlyExit
    )
}

fn mismatch(operation: &'static str, state: SessionState) -> EngineError {
    EngineError::Session(SessionError::StateMismatch { operation, state })
}
