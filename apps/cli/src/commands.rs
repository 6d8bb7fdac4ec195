//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use freshwire_pipeline::Pipeline;
use freshwire_shared::{AppConfig, BatchOutcome, init_config, load_config};
use freshwire_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Freshwire — monitor web sources for new content.
#[derive(Parser)]
#[command(
    name = "freshwire",
    version,
    about = "Retrieve pages, feeds, and blog indexes, and report what is new.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Retrieve all monitored sources and report new content.
    Run {
        /// Retrieve only these URLs instead of the configured sources.
        urls: Vec<String>,
    },

    /// Retrieve a single URL and print the result.
    Fetch {
        /// URL to retrieve.
        url: String,

        /// Print the full item as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Manage monitored sources.
    Source {
        /// Source subcommand.
        #[command(subcommand)]
        action: SourceAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Source registry subcommands.
#[derive(Subcommand)]
pub(crate) enum SourceAction {
    /// Add a source URL to the registry.
    Add {
        /// URL to monitor.
        url: String,

        /// Tags to attach (comma-separated).
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// List active sources.
    List,
    /// Deactivate a source (its history is kept).
    Remove {
        /// URL to deactivate.
        url: String,
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "freshwire=info",
        1 => "freshwire=debug",
        _ => "freshwire=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run { urls } => cmd_run(&urls).await,
        Command::Fetch { url, json } => cmd_fetch(&url, json).await,
        Command::Source { action } => match action {
            SourceAction::Add { url, tags } => cmd_source_add(&url, tags.as_deref()).await,
            SourceAction::List => cmd_source_list().await,
            SourceAction::Remove { url } => cmd_source_remove(&url).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// Expand a leading `~/` against the user's home directory.
fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

async fn open_storage(config: &AppConfig) -> Result<Storage> {
    let db_path = expand_path(&config.storage.db_path);
    Ok(Storage::open(&db_path).await?)
}

/// Cancellation token wired to ctrl-C: in-flight fetches finish, nothing
/// new is dispatched.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight fetches");
            token.cancel();
        }
    });
    cancel
}

fn parse_urls(raw: &[String]) -> Result<Vec<Url>> {
    raw.iter()
        .map(|s| Url::parse(s).map_err(|e| eyre!("invalid URL '{s}': {e}")))
        .collect()
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(url_args: &[String]) -> Result<()> {
    let config = load_config()?;
    let storage = Arc::new(open_storage(&config).await?);

    // Explicit URLs override the configured sources; otherwise the run
    // covers config-file sources plus the persistent registry.
    let raw_urls = if url_args.is_empty() {
        let mut urls = config.sources.urls.clone();
        for url in storage.list_active_sources().await? {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    } else {
        url_args.to_vec()
    };

    if raw_urls.is_empty() {
        println!("No sources configured. Add one with `freshwire source add <url>`.");
        return Ok(());
    }

    let urls = parse_urls(&raw_urls)?;
    let pipeline = Pipeline::new(config.fetch, Arc::clone(&storage))?;

    info!(sources = urls.len(), "starting run");

    let spinner = spinner(format!("Retrieving {} sources", urls.len()));
    let started = Instant::now();
    let outcome = pipeline.retrieve_batch(urls, cancel_on_ctrl_c()).await;
    spinner.finish_and_clear();

    print_summary(&outcome, started.elapsed().as_secs_f64());
    Ok(())
}

async fn cmd_fetch(url: &str, json: bool) -> Result<()> {
    let config = load_config()?;
    let storage = Arc::new(open_storage(&config).await?);
    let parsed = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let pipeline = Pipeline::new(config.fetch, storage)?;
    let outcome = pipeline
        .retrieve_batch(vec![parsed], cancel_on_ctrl_c())
        .await;

    if let Some(failure) = outcome.failures.first() {
        return Err(eyre!("{}: {}", failure.url, failure.error));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.items)?);
        return Ok(());
    }

    for item in &outcome.items {
        println!();
        println!("  URL:    {}", item.url);
        println!("  Title:  {}", item.title);
        println!("  Words:  {}", item.word_count);
        println!("  Hash:   {}", item.content_hash);
        println!("  New:    {}", item.is_new);
        if let Some(feed) = &item.source_feed_url {
            println!("  Feed:   {feed}");
        }
    }
    println!();
    Ok(())
}

async fn cmd_source_add(url: &str, tags: Option<&str>) -> Result<()> {
    // Reject unparseable URLs before they reach the registry.
    Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let config = load_config()?;
    let storage = open_storage(&config).await?;

    let tags: Vec<String> = tags
        .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let user = std::env::var("USER").unwrap_or_else(|_| "cli".into());
    storage.add_source(url, &user, &tags).await?;

    println!("Added source: {url}");
    Ok(())
}

async fn cmd_source_list() -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config).await?;

    let sources = storage.list_active_sources().await?;
    if sources.is_empty() {
        println!("No active sources.");
        return Ok(());
    }
    for url in sources {
        println!("{url}");
    }
    Ok(())
}

async fn cmd_source_remove(url: &str) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config).await?;
    storage.deactivate_source(url).await?;
    println!("Deactivated source: {url}");
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

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("static template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message);
    spinner
}

fn print_summary(outcome: &BatchOutcome, elapsed_secs: f64) {
    let new_items = outcome.items.iter().filter(|i| i.is_new).count();

    println!();
    println!("  Run complete.");
    println!("  Items:      {}", outcome.items.len());
    println!("  New:        {new_items}");
    println!("  Duplicates: {}", outcome.items.len() - new_items);
    println!("  Failures:   {}", outcome.failures.len());
    println!("  Time:       {elapsed_secs:.1}s");
    println!();

    for item in outcome.items.iter().filter(|i| i.is_new) {
        println!("  + {} ({})", item.title, item.url);
    }
    if new_items > 0 {
        println!();
    }
    for failure in &outcome.failures {
        println!("  ! {} [{}] {}", failure.url, failure.error.kind(), failure.error);
    }
    if !outcome.failures.is_empty() {
        println!();
    }
}
