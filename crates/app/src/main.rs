use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::ParticipantId;
use services::{EngineConfig, EngineError, SessionEvent, SessionHub};
use storage::Storage;
use storage::json::load_catalog;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod terminal;

use terminal::{Parsed, TerminalTransport};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(value: String, flag: &'static str) -> Result<T, ArgsError> {
    value
        .trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw: value })
}

struct Args {
    dictionary: PathBuf,
    grammar: PathBuf,
    time_limit: Option<u32>,
    page_size: Option<usize>,
    participant: ParticipantId,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--dictionary <path>] [--grammar <path>] [--time-limit <secs>] [--page-size <n>] [--participant <id>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --dictionary dictionary.json");
    eprintln!("  --grammar grammar.json");
    eprintln!("  --time-limit 30");
    eprintln!("  --page-size 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DICTIONARY, QUIZ_GRAMMAR, QUIZ_TIME_LIMIT (or TIME_LIMIT),");
    eprintln!("  QUIZ_PAGE_SIZE, QUIZ_MENU_PAGE_SIZE, RUST_LOG");
    eprintln!();
    eprintln!("While running: /start, /menu, /back, /end (during a question), /quit");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut dictionary = std::env::var("QUIZ_DICTIONARY")
            .map_or_else(|_| PathBuf::from("dictionary.json"), PathBuf::from);
        let mut grammar = std::env::var("QUIZ_GRAMMAR")
            .map_or_else(|_| PathBuf::from("grammar.json"), PathBuf::from);
        let mut time_limit = None;
        let mut page_size = None;
        let mut participant = ParticipantId::new(1);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dictionary" => dictionary = require_value(args, "--dictionary")?.into(),
                "--grammar" => grammar = require_value(args, "--grammar")?.into(),
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    time_limit = Some(parse_number(value, "--time-limit")?);
                }
                "--page-size" => {
                    let value = require_value(args, "--page-size")?;
                    page_size = Some(parse_number(value, "--page-size")?);
                }
                "--participant" => {
                    let value = require_value(args, "--participant")?;
                    participant = ParticipantId::new(parse_number(value, "--participant")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            dictionary,
            grammar,
            time_limit,
            page_size,
            participant,
        })
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_logging();

    let mut config = EngineConfig::from_env()?;
    if let Some(secs) = args.time_limit {
        config = config.with_time_limit(secs)?;
    }
    if let Some(size) = args.page_size {
        config = config.with_browse_page_size(size)?;
    }

    let catalog = load_catalog(&args.dictionary, &args.grammar)?;
    let storage = Storage::in_memory(catalog);
    let (transport, parser) = TerminalTransport::new(tokio::io::stdout());
    let hub = SessionHub::new(
        config,
        Arc::clone(&storage.content),
        Arc::clone(&storage.sessions),
        Arc::new(transport),
    );
    info!(
        participant = %args.participant,
        time_limit = config.time_limit_secs(),
        "quiz ready"
    );

    let me = args.participant;
    hub.dispatch(me, SessionEvent::Start).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match parser.parse(&line) {
            Parsed::Event(event) => event,
            Parsed::Quit => break,
            Parsed::Invalid(hint) => {
                println!("{hint}");
                continue;
            }
        };
        match hub.dispatch(me, event).await {
            Ok(()) => {}
            // Already shown to the participant with a fresh prompt.
            Err(EngineError::Session(err)) => debug!(%err, "input rejected"),
            Err(err @ EngineError::Transport(_)) => warn!(%err, "output failed"),
            Err(err) => return Err(err.into()),
        }
    }

    info!("bye");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
