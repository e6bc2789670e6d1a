// src/ranges/load.rs
// =============================================================================
// Loads the ranges document from disk or from the web.
//
// Anything that starts with http:// or https:// is downloaded (handy for
// shared lists kept in someone's GitHub repo); everything else is treated as
// a local file path.
// =============================================================================

use anyhow::{Context, Result};
use tracing::debug;
use url::Url;

use super::RangeDocument;
use crate::wiki::Transport;

// Reads and parses the ranges document.
//
// The transport is the same one used for the wiki queries, so the download
// goes out with the configured user agent and timeout.
pub async fn load_ranges<T>(source: &str, transport: &T) -> Result<RangeDocument>
where
    T: Transport + ?Sized,
{
    let text = if is_remote(source) {
        let url = Url::parse(source).with_context(|| format!("Invalid ranges URL '{}'", source))?;
        debug!(%url, "downloading ranges document");
        transport
            .get(&url)
            .await
            .with_context(|| format!("Could not download ranges from {}", url))?
    } else {
        debug!(path = source, "reading ranges document");
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Could not read ranges file '{}'", source))?
    };

    let document = text
        .parse::<RangeDocument>()
        .with_context(|| format!("Invalid ranges document '{}'", source))?;
    Ok(document)
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
