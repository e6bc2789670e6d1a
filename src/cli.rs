// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   wiki-ip-edits ip-ranges.json > results.csv
//   wiki-ip-edits https://example.org/conf/congressedits.json --langs en,fr
//
// We use clap's "derive" API: the struct below IS the CLI definition, and
// the doc comments on each field become the --help text.
// =============================================================================

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_DOMAIN, DEFAULT_END, DEFAULT_START, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "wiki-ip-edits",
    version,
    about = "Find wiki edits made from a set of IP address ranges",
    long_about = "wiki-ip-edits looks up every edit made from the given IP ranges on many \
                  language editions of a wiki, within a time window, and prints them as CSV. \
                  Progress and warnings go to stderr, so stdout can be redirected to a file."
)]
pub struct Cli {
    /// JSON file (or http/https URL) mapping labels to IP ranges
    ///
    /// Example: {"Senate": ["192.197.83.0/24", ["192.197.84.1", "192.197.84.9"]]}
    pub ranges: String,

    /// Comma-separated language editions to query (default: 37 large editions)
    #[arg(long, value_delimiter = ',')]
    pub langs: Option<Vec<String>>,

    /// Start of the search window (RFC 3339)
    #[arg(long, default_value = DEFAULT_START)]
    pub start: DateTime<Utc>,

    /// End of the search window (RFC 3339)
    #[arg(long, default_value = DEFAULT_END)]
    pub end: DateTime<Utc>,

    /// Milliseconds to wait after each query, to be polite to the servers
    #[arg(long, default_value_t = 0)]
    pub sleep_ms: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Wiki family domain; each language becomes <lang>.<domain>
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Write CSV to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show every request and address in the log
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_is_required() {
        assert!(Cli::try_parse_from(["wiki-ip-edits"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["wiki-ip-edits", "ranges.json"]).unwrap();
        assert_eq!(cli.ranges, "ranges.json");
        assert_eq!(cli.langs, None);
        assert_eq!(cli.start.to_rfc3339(), "2014-07-01T00:00:00+00:00");
        assert_eq!(cli.sleep_ms, 0);
        assert_eq!(cli.domain, "wikipedia.org");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_langs_are_split() {
        let cli = Cli::try_parse_from(["wiki-ip-edits", "r.json", "--langs", "en,fr,de"]).unwrap();
        assert_eq!(
            cli.langs,
            Some(vec!["en".to_string(), "fr".to_string(), "de".to_string()])
        );
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        assert!(Cli::try_parse_from(["wiki-ip-edits", "r.json", "--start", "July 1st"]).is_err());
    }
}
