// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load and validate the IP ranges (any problem here stops the run)
// 3. Crawl every address on every language edition, printing CSV as we go
// 4. Exit with proper code (0 = complete, 1 = some requests missed, 2 = error)
//
// stdout carries only CSV. Progress and warnings are logged to stderr, so
// the usual way to run this is:
//   wiki-ip-edits ip-ranges.json > results.csv
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wiki_ip_edits::cli::Cli;
use wiki_ip_edits::config::CrawlConfig;
use wiki_ip_edits::crawl::Crawler;
use wiki_ip_edits::output::Emitter;
use wiki_ip_edits::ranges;
use wiki_ip_edits::wiki::HttpTransport;

#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole chain of context messages
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every request succeeded
//   Ok(1) = finished, but some requests were missed (listed at the end)
//   Err   = bad arguments, bad ranges file, or output failure
async fn run() -> Result<i32> {
    // Missing arguments print the usage message and exit here
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CrawlConfig::from_cli(&cli)?;
    let transport = HttpTransport::new(&config.user_agent, config.timeout)?;

    // Ranges are fully validated before the first row is printed
    let ranges = ranges::load_ranges(&cli.ranges, &transport).await?;
    info!(
        labels = ranges.groups().len(),
        blocks = ranges.block_count(),
        addresses = %ranges.address_count(),
        sites = config.sites.len(),
        "loaded ranges"
    );

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Could not create {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };

    let mut emitter = Emitter::new(out)?;
    let mut crawler = Crawler::new(config, transport);
    let stats = crawler.run(&ranges, &mut emitter).await?;
    let rows = emitter.rows_written();
    emitter.finish(crawler.missed())?;

    info!(
        labels = stats.labels,
        addresses = stats.addresses,
        requests = stats.requests,
        rows,
        missed = stats.missed,
        "done"
    );

    if stats.missed > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Logs go to stderr; RUST_LOG overrides the level chosen by --verbose
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}
