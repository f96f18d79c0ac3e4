//! Line-oriented terminal transport.
//!
//! Renders deliveries as plain text and turns typed lines back into session
//! events, using the options of the last prompt it printed.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::{
    ContentKind, ContentSelection, FinishReason, Intent, PageView, ParticipantId, QuestionView,
    QuizReport, ScoreBand, Urgency,
};
use services::{Choice, Delivery, InputMode, Notice, SessionEvent, Transport, TransportError};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// What the last prompt asked for.
#[derive(Debug, Clone, Default)]
struct PromptState {
    options: Vec<Choice>,
    input: Option<InputMode>,
}

/// Writes rendered deliveries to `W` and remembers the current prompt.
pub struct TerminalTransport<W> {
    out: tokio::sync::Mutex<W>,
    prompt: Arc<Mutex<PromptState>>,
}

impl<W> TerminalTransport<W> {
    /// Build the transport and the parser that reads against its prompts.
    pub fn new(out: W) -> (Self, InputParser) {
        let prompt = Arc::new(Mutex::new(PromptState::default()));
        let transport = Self {
            out: tokio::sync::Mutex::new(out),
            prompt: Arc::clone(&prompt),
        };
        (transport, InputParser { prompt })
    }
}

#[async_trait]
impl<W> Transport for TerminalTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn deliver(
        &self,
        _participant: ParticipantId,
        delivery: Delivery,
    ) -> Result<(), TransportError> {
        if let Some(input) = delivery.input {
            let mut prompt = self
                .prompt
                .lock()
                .map_err(|e| TransportError::Io(std::io::Error::other(e.to_string())))?;
            prompt.options = delivery.options.clone();
            prompt.input = Some(input);
        }

        let Some(text) = render(&delivery) else {
            return Ok(());
        };
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

/// A typed line, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Event(SessionEvent),
    Quit,
    /// Not understood; show the hint and keep the current prompt.
    Invalid(&'static str),
}

pub struct InputParser {
    prompt: Arc<Mutex<PromptState>>,
}

impl InputParser {
    #[must_use]
    pub fn parse(&self, line: &str) -> Parsed {
        let trimmed = line.trim();
        match trimmed {
            "/quit" | "/exit" => return Parsed::Quit,
            "/start" => return Parsed::Event(SessionEvent::Start),
            "/menu" => return Parsed::Event(SessionEvent::MainMenu),
            "/back" => return Parsed::Event(SessionEvent::Back),
            _ => {}
        }

        let state = match self.prompt.lock() {
            Ok(state) => state.clone(),
            Err(_) => return Parsed::Invalid("type /start to begin"),
        };
        match state.input {
            None => Parsed::Invalid("type /start to begin"),
            Some(InputMode::Answer) => match trimmed {
                "/end" => Parsed::Event(SessionEvent::EndQuiz),
                "" => Parsed::Invalid("type an answer, or /end to stop"),
                _ => Parsed::Event(SessionEvent::Answer(trimmed.to_owned())),
            },
            Some(InputMode::Count { .. }) => match trimmed.parse::<usize>() {
                Ok(count) => Parsed::Event(SessionEvent::Count(count)),
                Err(_) => Parsed::Invalid("please enter a number"),
            },
            Some(InputMode::Menu) => pick(&state.options, trimmed)
                .map_or(Parsed::Invalid("please choose from the menu"), |choice| {
                    Parsed::Event(choice.event())
                }),
        }
    }
}

/// Match a menu line by number or by label.
fn pick<'a>(options: &'a [Choice], line: &str) -> Option<&'a Choice> {
    if let Ok(n) = line.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i));
    }
    options
        .iter()
        .find(|choice| label(choice).eq_ignore_ascii_case(line))
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn label(choice: &Choice) -> String {
    match choice {
        Choice::StartQuiz => "Start a quiz".into(),
        Choice::Study => "Study".into(),
        Choice::Dictionaries => "Dictionaries".into(),
        Choice::Grammar => "Grammar".into(),
        Choice::RandomPool => "Random questions".into(),
        Choice::Collection(name) => name.clone(),
        Choice::Tier(tier) => tier.to_string(),
        Choice::TakeAll => "Take all".into(),
        Choice::EnterCount => "Enter a number".into(),
        Choice::PrevPage => "Previous page".into(),
        Choice::NextPage => "Next page".into(),
        Choice::Back => "Back".into(),
        Choice::MainMenu => "Main menu".into(),
        Choice::EndQuiz => "/end".into(),
        Choice::ConfirmEnd => "Yes, end the quiz".into(),
        Choice::ContinueQuiz => "No, continue".into(),
        Choice::Replay => "Replay wrong answers".into(),
    }
}

/// Text for one delivery, or `None` when nothing should be printed.
fn render(delivery: &Delivery) -> Option<String> {
    let mut text = match &delivery.notice {
        Notice::Welcome => "Main menu".to_owned(),
        Notice::ContentMenu { intent } => match intent {
            Intent::Quiz => "What do you want to be quizzed on?".to_owned(),
            Intent::Study => "What do you want to study?".to_owned(),
        },
        Notice::CollectionMenu {
            kind,
            page_index,
            total_pages,
            ..
        } => {
            let what = match kind {
                ContentKind::Dictionary => "a dictionary",
                ContentKind::Grammar => "a grammar topic",
            };
            format!("Choose {what} (page {}/{total_pages}):", page_index + 1)
        }
        Notice::TierMenu { collection } => format!("Choose a difficulty for '{collection}':"),
        Notice::CountMenu { available } => {
            format!("{available} questions available. How many do you want?")
        }
        Notice::CountPrompt { available } => format!("Type a number from 1 to {available}:"),
        Notice::Question(view) => render_question(view),
        Notice::Verdict(verdict) => {
            if verdict.correct {
                "Correct!".to_owned()
            } else {
                format!("Wrong. The answer is: {}", verdict.expected)
            }
        }
        Notice::Countdown {
            remaining,
            limit,
            urgency,
        } => {
            let shown = *remaining == *limit
                || *remaining % 10 == 0
                || *urgency == Urgency::Critical;
            if !shown {
                return None;
            }
            let mark = match urgency {
                Urgency::Normal => "",
                Urgency::Elevated => "!",
                Urgency::Critical => "!!",
            };
            format!("[{remaining}s left{mark}]")
        }
        // A line terminal cannot take back what it printed.
        Notice::CountdownCleared => return None,
        Notice::TimeUp => "Time is up!".to_owned(),
        Notice::ConfirmExit => {
            "End the quiz now? Only the questions answered so far will count.".to_owned()
        }
        Notice::Report(report) => render_report(report),
        Notice::ReplayStarted { count } => format!("Replaying {count} missed question(s)."),
        Notice::Page(page) => render_page(page),
        Notice::Rejected { reason } => format!("Not accepted: {reason}"),
    };
    text.push('\n');

    match delivery.input {
        Some(InputMode::Answer) => text.push_str("(type your answer, or /end to stop)\n"),
        Some(InputMode::Menu | InputMode::Count { .. }) => {
            for (i, choice) in delivery.options.iter().enumerate() {
                let _ = writeln!(text, "  {}) {}", i + 1, label(choice));
            }
        }
        None => {}
    }
    Some(text)
}

fn render_question(view: &QuestionView) -> String {
    let source = match &view.selection {
        Some(ContentSelection::Dictionary { name, tier }) => format!("{name}, {tier}"),
        Some(ContentSelection::Grammar { name }) => format!("{name}, grammar"),
        Some(ContentSelection::RandomPool) | None => "random".to_owned(),
    };
    let replay = if view.replay { " replay" } else { "" };
    format!(
        "Question {}/{} ({source}{replay}): {}",
        view.index + 1,
        view.total,
        view.prompt
    )
}

fn render_report(report: &QuizReport) -> String {
    let reason = match report.reason() {
        FinishReason::Completed => "completed",
        FinishReason::EndedEarly => "ended early",
        FinishReason::TimedOut => "time ran out",
    };
    let band = match report.band() {
        ScoreBand::Excellent => "Excellent!",
        ScoreBand::Good => "Good job.",
        ScoreBand::Average => "Not bad, keep going.",
        ScoreBand::KeepPracticing => "Keep practicing.",
    };

    let mut text = format!("Quiz finished ({reason}).\n");
    let _ = writeln!(text, "Questions: {}", report.total());
    let _ = writeln!(text, "Correct: {}", report.correct());
    let _ = writeln!(text, "Wrong: {}", report.wrong());
    let _ = writeln!(text, "Score: {:.2}% {band}", report.percent());
    let _ = writeln!(text, "Time: {}s", report.duration().num_seconds());
    if report.has_wrong_answers() {
        text.push_str("Missed:\n");
        for wrong in report.wrong_answers() {
            let given = wrong.given.as_deref().map_or_else(
                || "no answer".to_owned(),
                |given| format!("you said '{given}'"),
            );
            let _ = writeln!(
                text,
                "  - {}: {given}, expected '{}'",
                wrong.prompt, wrong.expected
            );
        }
    }
    text.truncate(text.trim_end().len());
    text
}

fn render_page(page: &PageView) -> String {
    let title = page
        .selection
        .as_ref()
        .map_or_else(|| "Items".to_owned(), ToString::to_string);
    let mut text = format!(
        "{title}, page {}/{} ({} items):",
        page.page_index + 1,
        page.total_pages,
        page.total_items
    );
    for (offset, pair) in page.items.iter().enumerate() {
        let _ = write!(
            text,
            "\n  {}. {} - {}",
            page.start + offset + 1,
            pair.prompt,
            pair.answer
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionPair, Tier, TimerTicket, Verdict};

    fn parser_after(delivery: Delivery) -> (TerminalTransport<Vec<u8>>, InputParser) {
        let (transport, parser) = TerminalTransport::new(Vec::new());
        {
            let mut prompt = transport.prompt.lock().unwrap();
            prompt.options = delivery.options;
            prompt.input = delivery.input;
        }
        (transport, parser)
    }

    #[test]
    fn menu_lines_pick_options_by_number_or_label() {
        let (_t, parser) = parser_after(Delivery::menu(
            Notice::Welcome,
            vec![Choice::StartQuiz, Choice::Study],
        ));
        assert_eq!(parser.parse("2"), Parsed::Event(SessionEvent::OpenStudy));
        assert_eq!(
            parser.parse(" start a quiz "),
            Parsed::Event(SessionEvent::OpenQuiz)
        );
        assert_eq!(
            parser.parse("7"),
            Parsed::Invalid("please choose from the menu")
        );
        assert_eq!(
            parser.parse("banana"),
            Parsed::Invalid("please choose from the menu")
        );
    }

    #[test]
    fn answer_mode_passes_text_through() {
        let (_t, parser) = parser_after(Delivery::prompt(
            Notice::TimeUp,
            vec![Choice::EndQuiz],
            InputMode::Answer,
        ));
        assert_eq!(
            parser.parse("  Mushuk "),
            Parsed::Event(SessionEvent::Answer("Mushuk".into()))
        );
        assert_eq!(parser.parse("/end"), Parsed::Event(SessionEvent::EndQuiz));
        assert_eq!(parser.parse("/menu"), Parsed::Event(SessionEvent::MainMenu));
    }

    #[test]
    fn count_mode_expects_numbers() {
        let (_t, parser) = parser_after(Delivery::prompt(
            Notice::CountPrompt { available: 5 },
            vec![],
            InputMode::Count { max: 5 },
        ));
        assert_eq!(parser.parse("3"), Parsed::Event(SessionEvent::Count(3)));
        assert_eq!(parser.parse("three"), Parsed::Invalid("please enter a number"));
    }

    #[test]
    fn nothing_is_accepted_before_the_first_prompt() {
        let (_t, parser) = TerminalTransport::new(Vec::<u8>::new());
        assert_eq!(parser.parse("1"), Parsed::Invalid("type /start to begin"));
        assert_eq!(parser.parse("/start"), Parsed::Event(SessionEvent::Start));
        assert_eq!(parser.parse("/quit"), Parsed::Quit);
    }

    #[tokio::test]
    async fn passive_updates_keep_the_current_prompt() {
        let (transport, parser) = TerminalTransport::new(Vec::<u8>::new());
        let me = ParticipantId::new(1);
        transport
            .deliver(
                me,
                Delivery::menu(Notice::Welcome, vec![Choice::StartQuiz, Choice::Study]),
            )
            .await
            .unwrap();
        transport
            .deliver(
                me,
                Delivery::passive(Notice::Verdict(Verdict {
                    correct: true,
                    expected: "it".into(),
                    given: "it".into(),
                })),
            )
            .await
            .unwrap();
        assert_eq!(parser.parse("1"), Parsed::Event(SessionEvent::OpenQuiz));

        let out = transport.out.lock().await;
        let printed = String::from_utf8_lossy(&out);
        assert!(printed.contains("  1) Start a quiz"));
        assert!(printed.contains("Correct!"));
    }

    #[test]
    fn question_header_names_the_leaf() {
        let view = QuestionView {
            index: 1,
            total: 5,
            prompt: "dog".into(),
            ticket: TimerTicket::new(2),
            selection: Some(ContentSelection::dictionary("Animals", Tier::Easy)),
            replay: false,
        };
        assert_eq!(render_question(&view), "Question 2/5 (Animals, Easy): dog");
    }

    #[test]
    fn countdown_ticks_are_thinned_out() {
        let tick = |remaining| {
            render(&Delivery::passive(Notice::Countdown {
                remaining,
                limit: 30,
                urgency: Urgency::for_remaining(remaining, 30),
            }))
        };
        assert_eq!(tick(30).as_deref(), Some("[30s left]\n"));
        assert!(tick(27).is_none());
        assert_eq!(tick(10).as_deref(), Some("[10s left!]\n"));
        assert_eq!(tick(3).as_deref(), Some("[3s left!!]\n"));
        assert!(render(&Delivery::passive(Notice::CountdownCleared)).is_none());
    }

    #[test]
    fn pages_are_numbered_from_their_offset() {
        let page = PageView {
            items: vec![QuestionPair::new("n20", "20"), QuestionPair::new("n21", "21")],
            start: 20,
            page_index: 2,
            total_pages: 3,
            total_items: 22,
            selection: None,
        };
        let text = render_page(&page);
        assert!(text.starts_with("Items, page 3/3 (22 items):"));
        assert!(text.contains("\n  21. n20 - 20"));
    }
}
