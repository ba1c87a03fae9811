//! Interactive command loop for `reclink run`.

use reclink_coordinator::CommandOutcome;
use reclink_protocols::{RecordingLink, Session, UNRESOLVED_SENTINEL};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::app::{App, AppError};

const HELP: &str = "\
Commands:
  extract (or empty line)   run an extraction pass on the active tab
  reconcile                 pair unresolved sessions with late captures
  paste <n> <url>           set the recording link of session n by hand
  export                    write the JSON report
  close-tabs                close Zoom tabs opened during extraction
  list                      show the sessions of the last pass
  status                    show whether the active tab is ready
  help                      show this help
  quit                      exit";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Extract,
    Reconcile,
    /// Zero-based session index.
    Paste { index: usize, url: String },
    Export,
    CloseTabs,
    List,
    Status,
    Help,
    Quit,
}

pub(crate) fn parse_input(line: &str) -> Result<Input, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(Input::Extract);
    };
    let input = match word.to_ascii_lowercase().as_str() {
        "extract" | "e" => Input::Extract,
        "reconcile" | "r" => Input::Reconcile,
        "paste" | "p" => {
            let (Some(n), Some(url)) = (parts.next(), parts.next()) else {
                return Err("usage: paste <n> <url>".to_string());
            };
            let index = match n.parse::<usize>() {
                Ok(n) if n >= 1 => n - 1,
                _ => return Err(format!("not a session number: {}", n)),
            };
            Input::Paste {
                index,
                url: url.to_string(),
            }
        }
        "export" | "x" => Input::Export,
        "close-tabs" | "close" => Input::CloseTabs,
        "list" | "ls" => Input::List,
        "status" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command: {} (try `help`)", other)),
    };
    Ok(input)
}

/// One line per session: number, course, time and link state.
pub(crate) fn format_session(number: usize, session: &Session) -> String {
    let link = match &session.link_url {
        Some(RecordingLink::Resolved(url)) => url.as_str(),
        Some(RecordingLink::Unresolved) => UNRESOLVED_SENTINEL,
        None => "-",
    };
    format!(
        "{:>3}. {} [{}] {} {}  {}",
        number, session.course, session.section, session.date, session.start_time, link
    )
}

pub(crate) fn describe_outcome(outcome: &CommandOutcome, domain: &str) -> String {
    match outcome {
        CommandOutcome::Dispatched(tab) => format!("Extraction started on tab {}", tab),
        CommandOutcome::WrongDomain => format!("Please navigate to {} first", domain),
        CommandOutcome::PageNotConnected => {
            "Schedule page not connected. Please refresh the page and try again".to_string()
        }
        CommandOutcome::HostUnavailable(e) => format!("Browser unavailable: {}", e),
        CommandOutcome::Unknown(name) => format!("Unknown command: {}", name),
    }
}

/// Read commands from stdin until `quit`, end of input or Ctrl-C.
pub(crate) async fn run(app: &mut App) -> Result<(), AppError> {
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        if input == Input::Quit {
            break;
        }
        if let Err(e) = execute(app, input).await {
            error!("Command failed: {}", e);
            println!("Error: {}", e);
        }
    }

    info!("Leaving interactive session");
    Ok(())
}

async fn execute(app: &mut App, input: Input) -> Result<(), AppError> {
    match input {
        Input::Extract => {
            let outcome = app.trigger().await?;
            println!("{}", describe_outcome(&outcome, &app.config().site.domain));
        }
        Input::Reconcile => {
            let outcome = app.extractor()?.reconcile().await?;
            println!(
                "Matched {} session(s), {} still pending",
                outcome.matched.len(),
                outcome.still_unresolved.len()
            );
        }
        Input::Paste { index, url } => {
            app.extractor()?.apply_manual_url(index, &url)?;
            println!("Session {} updated", index + 1);
        }
        Input::Export => println!("Report saved to {}", app.export()?),
        Input::CloseTabs => {
            let count = app.extractor()?.close_zoom_tabs().await?;
            println!("Closed {} Zoom tab(s)", count);
        }
        Input::List => {
            let sessions = app.extractor()?.sessions();
            if sessions.is_empty() {
                println!("No sessions yet");
            }
            for (i, session) in sessions.iter().enumerate() {
                println!("{}", format_session(i + 1, session));
            }
        }
        Input::Status => println!("{}", app.readiness().await?),
        Input::Help => println!("{}", HELP),
        Input::Quit => {}
    }
    Ok(())
}
