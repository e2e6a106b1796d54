//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wikimd_core::{ConvertResult, FsWriter, ProgressReporter, generate_markdown};
use wikimd_shared::{AppConfig, ConvertConfig, MathStyle, WikiMdError, init_config, load_config};
use wikimd_wiki::WikiClient;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wikimd: turn encyclopedia articles into Markdown.
#[derive(Parser)]
#[command(
    name = "wikimd",
    version,
    about = "Convert Wikipedia articles into Markdown files with linked references.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Answer for yes/no flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum YesNo {
    Yes,
    No,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert an article into a Markdown file.
    Convert(ConvertArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `convert`. Unset flags fall back to the config file.
#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// Article to convert, e.g. "Albert Einstein".
    pub topic: String,

    /// Download images and embed them in the document.
    #[arg(long)]
    pub download_images: Option<YesNo>,

    /// Languages to try, in order (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,

    /// Output directory.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Display-math style: overwrite or wrap.
    #[arg(long)]
    pub math_style: Option<MathStyle>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

impl ConvertArgs {
    /// Runtime config: file settings overridden by flags.
    fn convert_config(&self, app: &AppConfig) -> ConvertConfig {
        let mut config = ConvertConfig::from(app);

        if let Some(answer) = self.download_images {
            config.download_images = answer == YesNo::Yes;
        }
        if let Some(languages) = &self.languages {
            config.languages = languages
                .iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
        }
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(style) = self.math_style {
            config.math_style = style;
        }

        config
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wikimd=info",
        1 => "wikimd=debug",
        _ => "wikimd=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
    match cli.command {
        Command::Convert(args) => cmd_convert(&args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_convert(args: &ConvertArgs) -> Result<()> {
    let app = load_config()?;
    let config = args.convert_config(&app);
    config.validate()?;

    info!(
        topic = %args.topic,
        languages = ?config.languages,
        download_images = config.download_images,
        "converting article"
    );

    let provider = WikiClient::from_config(&config)?;
    let writer = FsWriter::from_config(&config)?;
    let reporter = CliProgress::new();

    match generate_markdown(&args.topic, &config, &provider, &writer, &reporter).await {
        Ok(result) => {
            println!("Markdown file created: {}", result.path.display());
            Ok(())
        }
        Err(WikiMdError::Disambiguation { topic, options }) => {
            reporter.spinner.finish_and_clear();
            eprintln!("\"{topic}\" is ambiguous. Please be more specific. Candidates:");
            for option in &options {
                eprintln!("  - {option}");
            }
            Err(eyre!("ambiguous topic '{topic}'"))
        }
        Err(e) => {
            reporter.spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, result: &ConvertResult) {
        self.spinner.finish_and_clear();
        info!(
            title = %result.title,
            language = %result.language,
            links = result.links_resolved,
            "took {:.1}s",
            result.elapsed.as_secs_f64()
        );
    }
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
