//! CLI for running a single weather-agent turn.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;

use crate::agent::weather_agent;
use crate::agent_loop::{consume_with, Runner, TurnEvent, TurnOutcome};
use crate::config::HelmConfig;
use crate::error::HelmError;
use crate::session::InMemorySessionStore;

const CITY_PROMPT: &str = "Enter your city name (e.g., 'New York'): ";
const MAX_EVENT_PREVIEW: usize = 200;

/// Ask the weather agent one question.
#[derive(Parser, Debug)]
#[command(name = "helm", version, about = "Ask a tool-using agent one question")]
pub struct Cli {
    /// Model to use (format: provider:model, e.g., google:gemini-2.0-flash).
    /// Falls back to HELM_MODEL, then the built-in default.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Application name the session is filed under
    #[arg(long)]
    pub app_name: Option<String>,

    #[arg(long, default_value = "user_1")]
    pub user_id: String,

    #[arg(long, default_value = "session_001")]
    pub session_id: String,

    /// Maximum tool round trips before the turn is escalated
    #[arg(long)]
    pub max_round_trips: Option<usize>,

    /// Print tool calls and results to stderr as they happen
    #[arg(short, long)]
    pub verbose: bool,

    /// The question (read from stdin when omitted)
    pub question: Option<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Environment config with command-line overrides applied.
    pub fn config(&self) -> HelmConfig {
        let mut config = HelmConfig::from_env();
        if let Some(ref model) = self.model {
            config = config.with_default_model(model.clone());
        }
        if let Some(ref app_name) = self.app_name {
            config = config.with_app_name(app_name.clone());
        }
        if let Some(max) = self.max_round_trips {
            config = config.with_max_round_trips(max);
        }
        config
    }
}

/// Run one turn for the parsed command line and print the answer.
pub async fn run(cli: Cli) -> Result<TurnOutcome, HelmError> {
    let config = cli.config();
    let question = match cli.question.clone() {
        Some(q) => q,
        None => read_question(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let agent = Arc::new(weather_agent(config.default_model()?));
    let runner = Runner::from_config(agent, Arc::new(InMemorySessionStore::new()), &config)?;

    println!("\n>>> User Input: {question}");
    let verbose = cli.verbose;
    let events = runner.run(&cli.user_id, &cli.session_id, question);
    let outcome = consume_with(events, |event| {
        if verbose {
            eprintln!("{}", describe_event(event));
        }
    })
    .await;
    println!("<<< Agent Response: {outcome}");
    Ok(outcome)
}

/// Prompt on `output` and read one trimmed line from `input`.
pub fn read_question(input: &mut impl BufRead, output: &mut impl Write) -> Result<String, HelmError> {
    write!(output, "{CITY_PROMPT}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// One-line, human-oriented rendering of an event.
pub fn describe_event(event: &TurnEvent) -> String {
    match event {
        TurnEvent::ToolCall {
            call_id,
            tool_name,
            arguments,
        } => format!("-> {tool_name}({}) [{call_id}]", truncate(&arguments.to_string())),
        TurnEvent::ToolResult {
            tool_name, result, ..
        } => format!(
            "<- {tool_name} {}: {}",
            result.status(),
            truncate(&result.to_value().to_string())
        ),
        TurnEvent::FinalResponse { .. } => "== final response".to_string(),
        TurnEvent::Escalation { error_code, .. } => format!("!! escalation {error_code}"),
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_EVENT_PREVIEW {
        return text.to_string();
    }
    let mut end = MAX_EVENT_PREVIEW;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolOutcome;

    #[test]
    fn parse_with_defaults() {
        let cli = Cli::try_parse_from(["helm"]).unwrap();
        assert!(cli.model.is_none());
        assert_eq!(cli.user_id, "user_1");
        assert_eq!(cli.session_id, "session_001");
        assert!(cli.question.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_with_all_options() {
        let cli = Cli::try_parse_from([
            "helm",
            "-m",
            "openai:gpt-4o",
            "--app-name",
            "demo",
            "--user-id",
            "u9",
            "--session-id",
            "s9",
            "--max-round-trips",
            "3",
            "-v",
            "What's the weather in London?",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("openai:gpt-4o"));
        assert_eq!(cli.app_name.as_deref(), Some("demo"));
        assert_eq!(cli.max_round_trips, Some(3));
        assert!(cli.verbose);
        assert_eq!(cli.question.as_deref(), Some("What's the weather in London?"));
    }

    #[test]
    fn non_numeric_round_trips_is_error() {
        assert!(Cli::try_parse_from(["helm", "--max-round-trips", "many"]).is_err());
    }

    #[test]
    fn read_question_prompts_and_trims() {
        let mut input = io::Cursor::new("  Tokyo \n");
        let mut output = Vec::new();
        let question = read_question(&mut input, &mut output).unwrap();
        assert_eq!(question, "Tokyo");
        assert_eq!(String::from_utf8(output).unwrap(), CITY_PROMPT);
    }

    #[test]
    fn long_tool_output_is_truncated_on_char_boundary() {
        let event = TurnEvent::ToolResult {
            call_id: "c1".into(),
            tool_name: "get_weather".into(),
            result: ToolOutcome::success("°".repeat(300)),
        };
        let line = describe_event(&event);
        assert!(line.starts_with("<- get_weather success: "));
        assert!(line.ends_with("..."));
    }
}
