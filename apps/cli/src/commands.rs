//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use hexbridge_crawler::{CrawlEvent, HttpTabDriver, Orchestrator};
use hexbridge_extract::{collect_location_links, extract_merchant, extract_notes, extract_page};
use hexbridge_fetch::{Fetcher, ScrapeEvent};
use hexbridge_shared::{
    AppConfig, CrawlReport, CrawlRequest, ObjectId, TabId, init_config, load_config,
};
use hexbridge_vtt::{FileVtt, JournalWriter, MemoryVtt, VttRuntime};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Hexbridge — bridge hex-crawl map content into a VTT journal.
#[derive(Parser)]
#[command(
    name = "hexbridge",
    version,
    about = "Turn hex-crawl location pages into journal entries and tagged hex notes.",
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
    /// Fetch one location page and print its extracted journal HTML.
    Export {
        /// Location page URL.
        url: String,

        /// Print merchant data (name, bio, inventory) as JSON instead.
        #[arg(long)]
        merchant: bool,
    },

    /// List the location links found on a page.
    Links {
        /// Page URL to scan.
        url: String,

        /// Also fetch each linked location and report its title.
        #[arg(long)]
        follow: bool,
    },

    /// Crawl a page's linked locations into a journal bundle and backfill
    /// its notes with references.
    Crawl {
        /// Origin page URL (a hex or settlement page with location links).
        url: String,

        /// Identifier of the object that receives the notes annotation.
        #[arg(long)]
        object: String,

        /// Journal bundle directory.
        #[arg(long, default_value = "var/journal")]
        out: PathBuf,

        /// Run against an in-memory store; nothing is written to disk.
        #[arg(long)]
        dry_run: bool,
    },

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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "hexbridge=info",
        1 => "hexbridge=debug",
        _ => "hexbridge=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
        Command::Export { url, merchant } => cmd_export(&url, merchant).await,
        Command::Links { url, follow } => cmd_links(&url, follow).await,
        Command::Crawl {
            url,
            object,
            out,
            dry_run,
        } => cmd_crawl(&url, &object, &out, dry_run).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

async fn cmd_export(url: &str, merchant: bool) -> Result<()> {
    let parsed = parse_url(url)?;
    let fetcher = Fetcher::new()?;
    let html = fetcher.fetch_page(&parsed).await?;

    if merchant {
        let data = extract_merchant(&html)
            .ok_or_else(|| eyre!("no merchant data found at '{url}'"))?;
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let page = extract_page(&html);
    if !page.is_usable() {
        return Err(eyre!("no usable content found at '{url}'"));
    }

    println!("<!-- {} -->", page.title);
    println!("{}", page.journal_html());
    Ok(())
}

// ---------------------------------------------------------------------------
// links
// ---------------------------------------------------------------------------

async fn cmd_links(url: &str, follow: bool) -> Result<()> {
    let config = load_config()?;
    let parsed = parse_url(url)?;
    let fetcher = Fetcher::new()?;
    let html = fetcher.fetch_page(&parsed).await?;

    let notes = extract_notes(&html, &config.source);
    let links = collect_location_links(&notes.body_html, &config.source);

    if links.is_empty() {
        println!("No location links found.");
        return Ok(());
    }

    for link in &links {
        println!("{link}");
    }

    if !follow {
        return Ok(());
    }

    // Fetch each linked location out of band and report what resolves.
    let bar = progress_bar(links.len() as u64);
    let outcome = fetcher
        .scrape_locations(&links, &config, |event| match event {
            ScrapeEvent::Scraped { url, title, .. } => {
                bar.set_message(format!("{title} — {url}"));
                bar.inc(1);
            }
            ScrapeEvent::Failed { url, reason, .. } => {
                bar.set_message(format!("failed: {url}: {reason}"));
                bar.inc(1);
            }
        })
        .await;
    bar.finish_and_clear();

    println!();
    for location in &outcome.locations {
        println!("  {:40} {}", location.page.title, location.url);
    }
    println!();
    println!(
        "  Resolved {} of {} linked locations ({} failed).",
        outcome.succeeded,
        links.len(),
        outcome.failed
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// crawl
// ---------------------------------------------------------------------------

async fn cmd_crawl(url: &str, object: &str, out: &PathBuf, dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let parsed = parse_url(url)?;
    let fetcher = Fetcher::new()?;

    let html = fetcher.fetch_page(&parsed).await?;
    let notes = extract_notes(&html, &config.source);
    if !notes.is_usable() {
        return Err(eyre!("no usable notes content found at '{url}'"));
    }
    let links = collect_location_links(&notes.body_html, &config.source);

    info!(
        url,
        title = %notes.title,
        links = links.len(),
        object,
        dry_run,
        "starting crawl"
    );

    let request = CrawlRequest {
        source_tab_id: TabId(1),
        original_url: parsed,
        title: notes.title.clone(),
        raw_body_html: notes.body_html.clone(),
        location_links: links,
        notes_object: ObjectId::new(object),
    };

    let driver = HttpTabDriver::new(Fetcher::new()?);

    let report = if dry_run {
        let writer = JournalWriter::new(MemoryVtt::new(), config.target.clone());
        run_crawl(&driver, &writer, &config, &request).await?
    } else {
        let writer = JournalWriter::new(FileVtt::open(out.clone())?, config.target.clone());
        run_crawl(&driver, &writer, &config, &request).await?
    };

    println!();
    println!("  {}", report.message);
    println!("  Title:     {}", notes.title);
    println!("  Processed: {}", report.processed);
    println!("  Failed:    {}", report.failed);
    if dry_run {
        println!("  Store:     in-memory (dry run)");
    } else {
        println!("  Bundle:    {}", out.display());
    }
    println!();

    Ok(())
}

async fn run_crawl<R: VttRuntime>(
    driver: &HttpTabDriver,
    writer: &JournalWriter<R>,
    config: &AppConfig,
    request: &CrawlRequest,
) -> Result<CrawlReport> {
    let orchestrator = Orchestrator::new(driver, writer, config);
    let bar = progress_bar(request.location_links.len() as u64);

    let report = orchestrator
        .run(request, |event| match event {
            CrawlEvent::Processed { url, .. } => {
                bar.set_message(url.to_string());
                bar.inc(1);
            }
            CrawlEvent::Failed { url, reason, .. } => {
                bar.set_message(format!("failed: {url}: {reason}"));
                bar.inc(1);
            }
        })
        .await?;
    bar.finish_and_clear();

    Ok(report)
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

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
