use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use wordfray::prelude::*;

/// Plays Wordfray from the terminal. Commands are read from stdin, one per
/// line; everything the game shows is logged.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Settings file (endpoint and game options)
    #[arg(short, long, default_value = "wordfray.json")]
    config: PathBuf,

    /// Server address, overrides the settings file for this run
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Newline-separated word list used to check words before sending
    #[arg(short, long)]
    words: Option<PathBuf>,
}

const HELP: &str = "commands: create | join <code> | type <letters> | back | enter \
                    | sabotage <col> [row] | restart | timer <secs> | endpoint <addr> \
                    | leave | quit";

/// The word checker picked on the command line.
enum Dictionary {
    Any(AcceptAll),
    List(WordList),
}

impl WordChecker for Dictionary {
    fn is_valid(&self, word: &str) -> bool {
        match self {
            Self::Any(any) => any.is_valid(word),
            Self::List(list) => list.is_valid(word),
        }
    }
}

/// Turns one stdin line into inputs. Columns and rows are zero-based.
fn parse_command(line: &str) -> Result<Vec<UserInput>, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(Vec::new());
    };
    let arg = parts.next();

    let number = |what: &str, value: Option<&str>| -> Result<usize, String> {
        let value = value.ok_or_else(|| format!("missing {what}"))?;
        value.parse().map_err(|_| format!("invalid {what}: {value}"))
    };

    let inputs = match command.to_ascii_lowercase().as_str() {
        "create" => vec![UserInput::CreateRoom],
        "join" => vec![UserInput::JoinRoom(arg.ok_or("missing room code")?.to_string())],
        "type" => arg
            .ok_or("missing letters")?
            .chars()
            .map(UserInput::Letter)
            .collect(),
        "back" => vec![UserInput::Backspace],
        "enter" => vec![UserInput::Enter],
        "sabotage" => {
            let column = number("column", arg)?;
            let row = match parts.next() {
                Some(row) => Some(number("row", Some(row))?),
                None => None,
            };
            vec![UserInput::Sabotage { column, row }]
        }
        "restart" => vec![UserInput::ConfirmRestart],
        "timer" => {
            let secs = number("seconds", arg)?;
            let secs = u32::try_from(secs).map_err(|_| format!("invalid seconds: {secs}"))?;
            vec![UserInput::SetTimer(secs)]
        }
        "endpoint" => vec![UserInput::SetEndpoint(arg.ok_or("missing address")?.to_string())],
        "leave" => vec![UserInput::BackToStart],
        "quit" | "exit" => vec![UserInput::Quit],
        other => return Err(format!("unknown command {other:?}")),
    };
    Ok(inputs)
}

async fn read_commands(inputs: mpsc::Sender<UserInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin failed");
                break;
            }
        };
        match parse_command(&line) {
            Ok(batch) => {
                for input in batch {
                    if inputs.send(input).await.is_err() {
                        return;
                    }
                }
            }
            Err(msg) => tracing::warn!("{msg}; {HELP}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let store = ConfigStore::new(&args.config);
    let mut config = store.load().await?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    let words = match &args.words {
        Some(path) => {
            let list = WordList::from_lines(&tokio::fs::read_to_string(path).await?);
            tracing::info!(path = %path.display(), words = list.len(), "word list loaded");
            Dictionary::List(list)
        }
        None => Dictionary::Any(AcceptAll),
    };

    let (mut client, inputs) = GameClientBuilder::new()
        .config(config)
        .store(store)
        .build(WebSocketConnector::new(), TracingPresenter, words);

    tracing::info!("{HELP}");
    tokio::spawn(read_commands(inputs));

    client.run().await;
    Ok(())
}
