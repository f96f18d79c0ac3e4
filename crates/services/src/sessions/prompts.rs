//! What to show for each session state.

use quiz_core::model::{
    ContentStep, Intent, QuestionView, QuizReport, Session, SessionState, Tier,
};

use crate::transport::{Choice, Delivery, InputMode, Notice};

/// The prompt matching the session's current state.
///
/// Used after navigation and to re-prompt after a rejected event.
#[must_use]
pub fn prompt_for(session: &Session) -> Delivery {
    match session.state() {
        SessionState::Idle => welcome(session.can_replay()),
        SessionState::SelectingContent => match session.content_step() {
            ContentStep::Sections => content_menu(session.intent()),
            ContentStep::Collections(kind) => {
                let Some(menu) = session.collection_menu() else {
                    return content_menu(session.intent());
                };
                let mut options: Vec<Choice> =
                    menu.page().iter().cloned().map(Choice::Collection).collect();
                push_paging(&mut options, menu.has_prev(), menu.has_next());
                options.extend([Choice::Back, Choice::MainMenu]);
                Delivery::menu(
                    Notice::CollectionMenu {
                        kind,
                        names: menu.page().to_vec(),
                        page_index: menu.page_index(),
                        total_pages: menu.total_pages(),
                    },
                    options,
                )
            }
        },
        SessionState::SelectingDifficulty => {
            let mut options: Vec<Choice> = Tier::ALL.into_iter().map(Choice::Tier).collect();
            options.extend([Choice::Back, Choice::MainMenu]);
            Delivery::menu(
                Notice::TierMenu {
                    collection: session.selected_collection().unwrap_or_default().to_owned(),
                },
                options,
            )
        }
        SessionState::SelectingCount => Delivery::menu(
            Notice::CountMenu {
                available: session.available(),
            },
            vec![
                Choice::TakeAll,
                Choice::EnterCount,
                Choice::Back,
                Choice::MainMenu,
            ],
        ),
        SessionState::AwaitingAnswer => match session.current_question() {
            Some(view) => question(view),
            None => welcome(false),
        },
        SessionState::ConfirmingEarlyExit => Delivery::menu(
            Notice::ConfirmExit,
            vec![Choice::ConfirmEnd, Choice::ContinueQuiz],
        ),
        SessionState::BrowsingContent => match session.current_page() {
            Ok(page) => {
                let mut options = Vec::new();
                push_paging(&mut options, page.page_index > 0, page.page_index + 1 < page.total_pages);
                options.extend([Choice::Back, Choice::MainMenu]);
                Delivery::menu(Notice::Page(page), options)
            }
            Err(_) => welcome(false),
        },
    }
}

#[must_use]
pub fn welcome(can_replay: bool) -> Delivery {
    let mut options = vec![Choice::StartQuiz, Choice::Study];
    if can_replay {
        options.push(Choice::Replay);
    }
    Delivery::menu(Notice::Welcome, options)
}

#[must_use]
pub fn content_menu(intent: Intent) -> Delivery {
    let options = match intent {
        Intent::Quiz => vec![
            Choice::Dictionaries,
            Choice::Grammar,
            Choice::RandomPool,
            Choice::MainMenu,
        ],
        Intent::Study => vec![Choice::Dictionaries, Choice::Grammar, Choice::MainMenu],
    };
    Delivery::menu(Notice::ContentMenu { intent }, options)
}

#[must_use]
pub fn question(view: QuestionView) -> Delivery {
    Delivery::prompt(Notice::Question(view), vec![Choice::EndQuiz], InputMode::Answer)
}

#[must_use]
pub fn count_prompt(available: usize) -> Delivery {
    Delivery::prompt(
        Notice::CountPrompt { available },
        vec![Choice::Back, Choice::MainMenu],
        InputMode::Count { max: available },
    )
}

/// The final report, offering a replay when something was missed.
#[must_use]
pub fn report(report: QuizReport) -> Delivery {
    let mut options = Vec::new();
    if report.has_wrong_answers() {
        options.push(Choice::Replay);
    }
    options.extend([Choice::StartQuiz, Choice::MainMenu]);
    Delivery::menu(Notice::Report(report), options)
}

fn push_paging(options: &mut Vec<Choice>, has_prev: bool, has_next: bool) {
    if has_prev {
        options.push(Choice::PrevPage);
    }
    if has_next {
        options.push(Choice::NextPage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_offers_replay_only_with_wrong_answers() {
        let delivery = prompt_for(&Session::new());
        assert_eq!(delivery.notice, Notice::Welcome);
        assert_eq!(delivery.options, vec![Choice::StartQuiz, Choice::Study]);
    }

    #[test]
    fn study_menu_has_no_random_pool() {
        let mut session = Session::new();
        session.enter_content_menu(Intent::Study).unwrap();
        let delivery = prompt_for(&session);
        assert!(!delivery.options.contains(&Choice::RandomPool));
        assert_eq!(delivery.input, Some(InputMode::Menu));
    }

    #[test]
    fn count_prompt_expects_a_number() {
        let delivery = count_prompt(4);
        assert_eq!(delivery.input, Some(InputMode::Count { max: 4 }));
    }
}
