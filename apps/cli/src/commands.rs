//! CLI command definitions, routing, and tracing setup.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use crossterm::style::{Stylize, style};
use indicatif::{ProgressBar, ProgressStyle};
use noahaid_core::{Session, SubmitOutcome, TokioScheduler};
use noahaid_shared::{AppConfig, Message, RichText, Span, init_config, load_config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// NoahAid — keyword-driven first-aid guidance.
#[derive(Parser)]
#[command(
    name = "noahaid",
    version,
    about = "Describe an emergency and get step-by-step first-aid instructions.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Topic table (JSON) to use instead of the configured or bundled one.
    #[arg(long, global = true, env = "NOAHAID_KB")]
    pub kb: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// How replies are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Plain text, keywords in bold on a terminal.
    Text,
    /// `<b>` markup with escaped text.
    Markup,
    /// One JSON message object per line.
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ask a single question and print the reply.
    Ask {
        /// What happened, in your own words.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Reply output format.
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Override the simulated typing delay (milliseconds).
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Chat interactively, one question per line on stdin.
    Chat {
        /// Reply output format.
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Override the simulated typing delay (milliseconds).
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// List the topics NoahAid knows about.
    Topics,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so replies stay
/// clean on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "noahaid=warn",
        1 => "noahaid=info",
        2 => "noahaid=debug",
        _ => "noahaid=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let kb = cli.kb.as_deref();
    match cli.command {
        Command::Ask {
            query,
            format,
            delay_ms,
        } => cmd_ask(kb, &query.join(" "), format, delay_ms).await,
        Command::Chat { format, delay_ms } => cmd_chat(kb, format, delay_ms).await,
        Command::Topics => cmd_topics(kb).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Load config, apply flag overrides, and open a session on the current runtime.
fn open_session(kb: Option<&Path>, delay_ms: Option<u64>) -> Result<(Session, AppConfig)> {
    let mut config = load_config()?;
    if let Some(ms) = delay_ms {
        config.responder.reply_delay_ms = ms;
    }

    let scheduler = TokioScheduler::current()?;
    let session = Session::from_config(&config, kb, Arc::new(scheduler))?;
    info!(topics = session.knowledge_base().len(), "session ready");

    Ok((session, config))
}

async fn cmd_ask(
    kb: Option<&Path>,
    query: &str,
    format: OutputFormat,
    delay_ms: Option<u64>,
) -> Result<()> {
    let (session, config) = open_session(kb, delay_ms)?;

    if !ask_once(&session, &config, query, format).await? {
        warn!("nothing to ask: the query is blank");
    }
    Ok(())
}

async fn cmd_chat(kb: Option<&Path>, format: OutputFormat, delay_ms: Option<u64>) -> Result<()> {
    let (session, config) = open_session(kb, delay_ms)?;
    let interactive = std::io::stdin().is_terminal();

    if interactive {
        println!(
            "{} is ready. Describe the situation (Ctrl-D to quit).",
            config.display.assistant_name
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        ask_once(&session, &config, &line, format).await?;
    }

    Ok(())
}

/// Submit one query, wait out the typing delay, and print the reply.
/// Returns `false` when the query was blank and nothing happened.
async fn ask_once(
    session: &Session,
    config: &AppConfig,
    query: &str,
    format: OutputFormat,
) -> Result<bool> {
    let before = session.snapshot().len();

    let outcome = session.submit(query);
    if outcome == SubmitOutcome::Ignored {
        return Ok(false);
    }

    let spinner = TypingSpinner::new(&config.display.assistant_name);
    session.wait_idle().await;
    spinner.finish();

    let styled = format == OutputFormat::Text && std::io::stdout().is_terminal();
    let state = session.snapshot();
    // Skip the user message we just appended.
    for msg in state.messages().iter().skip(before + 1) {
        println!(
            "{}",
            format_message(msg, &config.display.assistant_name, format, styled)?
        );
    }

    Ok(true)
}

// ---------------------------------------------------------------------------
// Output rendering
// ---------------------------------------------------------------------------

fn format_message(
    msg: &Message,
    assistant_name: &str,
    format: OutputFormat,
    styled: bool,
) -> Result<String> {
    let line = match format {
        OutputFormat::Text => format!("{assistant_name}: {}", render_text(&msg.text, styled)),
        OutputFormat::Markup => msg.text.to_markup(),
        OutputFormat::Json => serde_json::to_string(msg)?,
    };
    Ok(line)
}

/// Plain text, with emphasis in bold when `styled`.
fn render_text(text: &RichText, styled: bool) -> String {
    let mut out = String::new();
    for span in text.spans() {
        match span {
            Span::Emphasis(t) if styled => out.push_str(&style(t.as_str()).bold().to_string()),
            other => out.push_str(other.text()),
        }
    }
    out
}

/// "<name> is typing..." spinner shown while a reply is pending.
struct TypingSpinner {
    spinner: ProgressBar,
}

impl TypingSpinner {
    fn new(assistant_name: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.set_message(format!("{assistant_name} is typing..."));
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(self) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Remaining command handlers
// ---------------------------------------------------------------------------

async fn cmd_topics(kb: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let path = kb.or(config.knowledge_base.path.as_deref().map(Path::new));
    let kb = noahaid_core::KnowledgeBase::resolve(path)?;

    if kb.is_empty() {
        return Err(eyre!("knowledge base is empty"));
    }

    println!("{:<10} {:<28} {:<8} {:>8} {:>6}", "ID", "TITLE", "SEVERITY", "KEYWORDS", "STEPS");
    for topic in &kb {
        println!(
            "{:<10} {:<28} {:<8} {:>8} {:>6}",
            topic.id,
            topic.title,
            topic.severity.to_string(),
            topic.keywords.len(),
            topic.steps.len()
        );
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
