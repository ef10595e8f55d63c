// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (warnings go to stderr, URLs go to stdout)
// 3. Walk the sitemaps, printing each URL as soon as it is found
// 4. Exit with proper code (0 = URLs found, 1 = no URLs, 2 = error)
//
// Ctrl-C cancels the walk cleanly instead of killing it mid-write.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use sitemap_walker::{CancellationToken, SitemapFetcher};
use std::io::Write;
use tracing_subscriber::EnvFilter;
use url::Url;

// The #[tokio::main] attribute transforms our async main into a real main function
#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG controls verbosity; warnings are shown by default
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = at least one URL printed (including stopping at --max-urls)
//   Ok(1) = the walk finished without finding any URL
//   Err   = the walk failed
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let start = Url::parse(&cli.url).with_context(|| format!("invalid URL '{}'", cli.url))?;
    let fetcher = SitemapFetcher::new(cli.options()?)?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let json = cli.json;
    let stdout = std::io::stdout();
    let mut printed = 0usize;

    let result = fetcher
        .walk(&cancel, &start, |item| {
            let mut out = stdout.lock();
            if json {
                serde_json::to_writer(&mut out, &item)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", item.loc)?;
            }
            printed += 1;
            Ok(())
        })
        .await;

    match result {
        Ok(()) => {}
        Err(e) if e.is_max_urls() => {
            tracing::info!(limit = cli.max_urls, "stopped at --max-urls");
        }
        Err(e) => return Err(e).with_context(|| format!("failed to walk {}", start)),
    }

    Ok(if printed > 0 { 0 } else { 1 })
}
