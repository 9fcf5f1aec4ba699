//! Termlens CLI - find and summarize the legal documents a page links to.
//!
//! # Examples
//!
//! ```bash
//! # List the terms / privacy links on a page
//! termlens scan https://example.com
//!
//! # Summarize the first and third link
//! termlens summarize https://example.com --select 1,3
//!
//! # Show the budgeted payload without calling the model
//! termlens summarize https://example.com --all --dry-run --format json
//!
//! # Store credentials
//! termlens settings set --api-key sk-... --model gpt-4o-mini
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use termlens::config::TermlensConfig;
use termlens::detect::{CandidateLink, LinkClassifier};
use termlens::extract::HtmlExtractor;
use termlens::fetch::{FetchBroker, FetchClient, HttpFetcher};
use termlens::pipeline::{ErrorDisplay, Orchestrator};
use termlens::session::SummarizeSession;
use termlens::settings::{JsonSettingsStore, SettingsStore};
use termlens::summarize::ChatCompletionSummarizer;

/// Termlens CLI - legal document detection and summarization.
#[derive(Parser)]
#[command(name = "termlens")]
#[command(about = "Find and summarize the terms of use and privacy policies a page links to")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Settings file holding the API key and model.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Output format.
    #[arg(long, short = 'f', default_value = "text", global = true)]
    format: OutputFormat,

    /// Verbose logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List legal document links found on a page.
    Scan {
        /// Page to scan.
        url: String,
    },

    /// Extract the selected documents and summarize them.
    Summarize(SummarizeArgs),

    /// Show or change stored settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
struct SummarizeArgs {
    /// Page to scan.
    url: String,

    /// 1-based link numbers from `scan`, comma separated.
    #[arg(long, value_delimiter = ',', conflicts_with = "all")]
    select: Vec<usize>,

    /// Use every detected link (the default when nothing is selected).
    #[arg(long)]
    all: bool,

    /// Print the prepared payload instead of calling the model.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the stored settings with the key masked.
    Show,
    /// Update the API key and/or model. The model can be set before a key.
    Set {
        /// API key (must start with `sk-`).
        #[arg(long)]
        api_key: Option<String>,
        /// Model identifier.
        #[arg(long)]
        model: Option<String>,
    },
    /// Check that the stored key is accepted by the endpoint.
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON for scripting.
    Json,
}

fn setup_logging(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("termlens=debug,info")
        } else {
            EnvFilter::new("termlens=warn")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.log_json);

    let config = match &cli.config {
        Some(path) => TermlensConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TermlensConfig::default(),
    };
    debug!(?config, "Configuration loaded");

    match &cli.command {
        Commands::Scan { url } => run_scan(&cli, &config, url).await,
        Commands::Summarize(args) => run_summarize(&cli, &config, args).await,
        Commands::Settings(command) => run_settings(&cli, &config, command).await,
    }
}

fn settings_store(cli: &Cli) -> Result<JsonSettingsStore> {
    match &cli.settings {
        Some(path) => Ok(JsonSettingsStore::new(path)),
        None => JsonSettingsStore::at_default_location()
            .context("No config directory found; pass --settings <file>"),
    }
}

fn spawn_fetch_client(config: &TermlensConfig) -> Result<FetchClient> {
    let fetcher = Arc::new(HttpFetcher::new(config.fetch.clone())?);
    let (client, _broker) = FetchBroker::spawn(fetcher, config.broker_capacity);
    Ok(client)
}

async fn scan_page(client: &FetchClient, config: &TermlensConfig, url: &str) -> Result<Vec<CandidateLink>> {
    let response = client.fetch_content(url).await;
    if !response.success {
        bail!(
            "{}",
            response.error.unwrap_or_else(|| format!("Failed to fetch {url}"))
        );
    }
    let html = response.html.unwrap_or_default();
    let classifier = LinkClassifier::new(config.detection.clone());
    Ok(classifier.scan_document(&html, url)?)
}

async fn run_scan(cli: &Cli, config: &TermlensConfig, url: &str) -> Result<()> {
    let client = spawn_fetch_client(config)?;
    let links = scan_page(&client, config, url).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&links)?),
        OutputFormat::Text => {
            if links.is_empty() {
                println!("No terms or privacy links found on {url}");
            } else {
                println!(
                    "Found {} terms document{}:",
                    links.len(),
                    if links.len() == 1 { "" } else { "s" }
                );
                for (number, link) in links.iter().enumerate() {
                    println!("  {}. {} <{}>", number + 1, link.display_text, link.url);
                }
            }
        }
    }
    Ok(())
}

async fn run_summarize(cli: &Cli, config: &TermlensConfig, args: &SummarizeArgs) -> Result<()> {
    let client = spawn_fetch_client(config)?;
    let links = scan_page(&client, config, &args.url).await?;
    if links.is_empty() {
        bail!("No terms or privacy links found on {}", args.url);
    }

    let mut session = SummarizeSession::new(links);
    if !args.all && !args.select.is_empty() {
        session.select_none();
        for &number in &args.select {
            if number == 0 || number > session.len() {
                bail!("Link number {number} is out of range (1-{})", session.len());
            }
            session.set_selected(number - 1, true);
        }
    }

    let store: Arc<dyn SettingsStore> = Arc::new(settings_store(cli)?);
    let summarizer = Arc::new(ChatCompletionSummarizer::new(config.summarizer.clone())?);
    let orchestrator = Orchestrator::new(client, summarizer, store)
        .with_extractor(Arc::new(HtmlExtractor::new(config.extraction.clone())));

    if args.dry_run {
        let preview = orchestrator.preview(&session.selected_links()).await;
        return match preview {
            Ok(preview) => {
                match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&preview)?),
                    OutputFormat::Text => {
                        println!(
                            "Model: {} | {} characters (budget {}){}",
                            preview.model,
                            preview.budgeted.original_chars,
                            preview.budgeted.max_chars,
                            if preview.budgeted.truncated { ", truncated" } else { "" }
                        );
                        if let Some(note) = preview.batch.partial_note() {
                            println!("{}", note.trim_start());
                        }
                        println!("\n{}", preview.budgeted.content);
                    }
                }
                Ok(())
            }
            Err(display) => report_failure(cli, &display),
        };
    }

    match session.summarize(&orchestrator).await {
        Ok(summary) => {
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "success": true, "summary": summary }));
                }
                OutputFormat::Text => println!("{summary}"),
            }
            Ok(())
        }
        Err(display) => report_failure(cli, &display),
    }
}

fn report_failure(cli: &Cli, display: &ErrorDisplay) -> ! {
    match cli.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "success": false, "error": display })
        ),
        OutputFormat::Text => eprintln!("{display}"),
    }
    std::process::exit(1);
}

async fn run_settings(cli: &Cli, config: &TermlensConfig, command: &SettingsCommand) -> Result<()> {
    let store = settings_store(cli)?;
    match command {
        SettingsCommand::Show => {
            let settings = store.load()?;
            let key = settings
                .api_key()
                .map(mask_key)
                .unwrap_or_else(|_| "not configured".to_string());
            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "path": store.path(),
                        "apiKey": key,
                        "model": settings.model,
                    })
                ),
                OutputFormat::Text => {
                    println!("Settings file: {}", store.path().display());
                    println!("API key:       {key}");
                    println!("Model:         {}", settings.model);
                }
            }
        }
        SettingsCommand::Set { api_key, model } => {
            let store = store.without_env_overrides();
            let settings = store
                .load()?
                .apply_overrides(api_key.clone(), model.clone());
            store.save(&settings)?;
            println!("Settings saved to {}", store.path().display());
        }
        SettingsCommand::Test => {
            let settings = store.load()?;
            let summarizer = ChatCompletionSummarizer::new(config.summarizer.clone())?;
            summarizer
                .check_connection(&settings)
                .await
                .context("Connection failed")?;
            println!("Connection successful!");
        }
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(7).collect();
    format!("{visible}...")
}
