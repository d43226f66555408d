//! Docs Corpus CLI
//!
//! Crawls a site with a headless browser and turns the rendered pages into
//! Markdown documents with frontmatter.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use docs_corpus::browser::{BrowserConfig, BrowserRenderer, NavigationOptions};
use docs_corpus::crawl::{CrawlConfig, CrawlController, CrawlReport};
use docs_corpus::extraction::{ExtractionPipeline, ExtractionReport, ExtractorConfig, MARKDOWN_DIR};
use docs_corpus::snapshot::SnapshotStore;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Docs Corpus
#[derive(Parser, Debug)]
#[command(name = "docs-corpus")]
#[command(version)]
#[command(about = "Crawl a rendered site and extract it as Markdown")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from a seed URL and store HTML snapshots
    Crawl {
        /// Absolute seed URL
        seed: String,
        /// Output directory (snapshots go to <OUTPUT_DIR>/html)
        output_dir: PathBuf,
        #[command(flatten)]
        crawl: CrawlArgs,
        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Convert stored snapshots to Markdown documents
    Extract {
        /// Output directory of a previous crawl
        output_dir: PathBuf,
        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Crawl, then extract
    Run {
        /// Absolute seed URL
        seed: String,
        /// Output directory
        output_dir: PathBuf,
        #[command(flatten)]
        crawl: CrawlArgs,
        #[command(flatten)]
        browser: BrowserArgs,
        #[command(flatten)]
        extract: ExtractArgs,
    },
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Maximum number of pages to dispatch, failures included
    #[arg(short = 'p', long, default_value = "250")]
    max_pages: usize,

    /// Restrict links to this domain instead of the seed's
    #[arg(long)]
    base_domain: Option<String>,

    /// Delay after every page in milliseconds
    #[arg(long, default_value = "1000")]
    delay_ms: u64,

    /// Additional link suffix to skip (repeatable), e.g. --exclude-ext .svg
    #[arg(long = "exclude-ext")]
    exclude_ext: Vec<String>,
}

#[derive(Args, Debug)]
struct BrowserArgs {
    /// Navigation timeout in milliseconds
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Wait after network idle in milliseconds
    #[arg(long, default_value = "2000")]
    settle_ms: u64,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    no_sandbox: bool,

    /// Show the browser window
    #[arg(long)]
    headful: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Minimum characters of main content for a document to be written
    #[arg(long, default_value = "1")]
    min_chars: usize,

    /// Strip hyperlinks from the Markdown
    #[arg(long)]
    no_links: bool,

    /// Strip images from the Markdown
    #[arg(long)]
    no_images: bool,

    /// Strip tables from the Markdown
    #[arg(long)]
    no_tables: bool,
}

impl CrawlArgs {
    fn to_config(&self) -> CrawlConfig {
        let mut builder = CrawlConfig::builder()
            .max_pages(self.max_pages)
            .politeness_delay(Duration::from_millis(self.delay_ms));
        if let Some(domain) = &self.base_domain {
            builder = builder.base_domain(domain.clone());
        }
        for ext in &self.exclude_ext {
            builder = builder.exclude_extension(ext.clone());
        }
        builder.build()
    }
}

impl BrowserArgs {
    fn to_config(&self) -> BrowserConfig {
        let mut builder = BrowserConfig::builder()
            .headless(!self.headful)
            .sandbox(!self.no_sandbox);
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_path(path.clone());
        }
        builder.build()
    }

    fn navigation(&self) -> NavigationOptions {
        NavigationOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            settle_delay: Duration::from_millis(self.settle_ms),
            ..Default::default()
        }
    }
}

impl ExtractArgs {
    fn to_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            min_text_chars: self.min_chars,
            include_links: !self.no_links,
            include_images: !self.no_images,
            include_tables: !self.no_tables,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Crawl {
            seed,
            output_dir,
            crawl,
            browser,
        } => {
            let report = crawl_phase(&seed, &output_dir, &crawl, &browser).await?;
            println!(
                "Crawled {} pages ({} saved, {} failed) in {:.2}s",
                report.visited,
                report.saved,
                report.failures.len(),
                report.elapsed.as_secs_f64()
            );
        }
        Command::Extract {
            output_dir,
            extract,
        } => {
            let report = extract_phase(&output_dir, &extract).await?;
            print_extraction(&report);
        }
        Command::Run {
            seed,
            output_dir,
            crawl,
            browser,
            extract,
        } => {
            let start = Instant::now();
            tokio::fs::create_dir_all(output_dir.join(MARKDOWN_DIR))
                .await
                .with_context(|| format!("creating {}", output_dir.display()))?;

            let crawled = crawl_phase(&seed, &output_dir, &crawl, &browser).await?;
            let extracted = extract_phase(&output_dir, &extract).await?;
            print_extraction(&extracted);

            println!("Pages processed: {}", crawled.visited);
            println!("Time elapsed: {:.2} seconds", start.elapsed().as_secs_f64());
            println!("Output directory: {}", output_dir.display());
        }
    }

    Ok(())
}

async fn crawl_phase(
    seed: &str,
    output_dir: &Path,
    crawl: &CrawlArgs,
    browser: &BrowserArgs,
) -> anyhow::Result<CrawlReport> {
    let store = SnapshotStore::open(output_dir).await?;
    let renderer = BrowserRenderer::launch(browser.to_config(), browser.navigation())
        .await
        .context("launching browser")?;

    let mut controller = CrawlController::new(renderer, store, crawl.to_config());
    let result = controller.crawl(seed).await;

    // Release the browser whether or not the crawl succeeded
    if let Err(e) = controller.into_renderer().close().await {
        tracing::warn!(error = %e, "Failed to close browser cleanly");
    }

    Ok(result?)
}

async fn extract_phase(output_dir: &Path, extract: &ExtractArgs) -> anyhow::Result<ExtractionReport> {
    let store = SnapshotStore::open_existing(output_dir).await?;
    let pipeline = ExtractionPipeline::new(extract.to_config());
    let report = pipeline
        .run(&store, &output_dir.join(MARKDOWN_DIR))
        .await
        .context("extracting documents")?;
    Ok(report)
}

fn print_extraction(report: &ExtractionReport) {
    println!(
        "Converted {} of {} snapshots ({} skipped, {} failed, {} without provenance)",
        report.converted,
        report.total(),
        report.skipped,
        report.failed,
        report.missing_provenance
    );
}
