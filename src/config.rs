// src/config.rs
// =============================================================================
// Run configuration.
//
// Everything that tunes a crawl (which wikis, which dates, how polite to be)
// lives in one CrawlConfig value that is built from the command line and
// handed to the crawler. Nothing is global.
// =============================================================================

use anyhow::Result;
use std::time::Duration;

use crate::cli::Cli;
use crate::wiki::{Site, TimeWindow};

// Timestamp format: https://www.mediawiki.org/wiki/API:Data_formats#Timestamps
pub const DEFAULT_START: &str = "2014-07-01T00:00:00Z";
pub const DEFAULT_END: &str = "2014-07-27T23:59:59Z";

pub const DEFAULT_DOMAIN: &str = "wikipedia.org";

pub const DEFAULT_USER_AGENT: &str =
    concat!("wiki-ip-edits/", env!("CARGO_PKG_VERSION"), " (edit history crawler)");

// Language editions queried when --langs is not given
pub const DEFAULT_LANGS: &[&str] = &[
    "ar", "bg", "ca", "zh", "cs", "da", "nl", "en", "eo", "eu", "fa", "fi", "fr", "de", "el", "he",
    "hu", "id", "it", "ja", "ko", "lt", "ms", "no", "pl", "pt", "ro", "ru", "sk", "sl", "es", "sv",
    "tr", "uk", "vi", "vo", "co",
];

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Sites queried for every address, in this order
    pub sites: Vec<Site>,
    pub window: TimeWindow,
    /// Pause after each (address, site) query; zero means no pause
    pub delay: Duration,
    pub user_agent: String,
    pub timeout: Duration,
}

impl CrawlConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let codes: Vec<&str> = match &cli.langs {
            Some(langs) => langs.iter().map(String::as_str).collect(),
            None => DEFAULT_LANGS.to_vec(),
        };

        let sites = codes
            .into_iter()
            .map(|code| Site::new(code, &cli.domain))
            .collect::<Result<Vec<_>>>()?;

        if sites.is_empty() {
            anyhow::bail!("No language editions to query");
        }

        Ok(CrawlConfig {
            sites,
            window: TimeWindow::new(cli.start, cli.end)?,
            delay: Duration::from_millis(cli.sleep_ms),
            user_agent: cli.user_agent.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
        })
    }
}
