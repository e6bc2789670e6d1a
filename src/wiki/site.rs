// src/wiki/site.rs
// =============================================================================
// A Site is one language edition of the wiki (en, fr, de, ...).
//
// Every edition speaks the same API, just on a different host:
//   https://en.wikipedia.org/w/api.php
//   https://fr.wikipedia.org/w/api.php
//
// We build the endpoint URL once when the Site is created, so a bad language
// code or domain is reported at startup instead of halfway through a crawl.
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    code: String,
    api: Url,
}

impl Site {
    // Creates a site for a language code on a wiki family domain
    //
    // Example:
    //   Site::new("fr", "wikipedia.org") -> https://fr.wikipedia.org/w/api.php
    pub fn new(code: &str, domain: &str) -> Result<Self> {
        let code = code.trim().to_ascii_lowercase();

        if code.is_empty() {
            bail!("Empty language code");
        }
        if !code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            bail!("Invalid language code: {}", code);
        }

        let api = Url::parse(&format!("https://{}.{}/w/api.php", code, domain))
            .with_context(|| format!("Invalid wiki domain '{}'", domain))?;

        Ok(Site { code, api })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    // The api.php endpoint for this edition (without any query string)
    pub fn api_url(&self) -> &Url {
        &self.api
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

// In output rows a site is just its language code
impl Serialize for Site {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_endpoint() {
        let site = Site::new("fr", "wikipedia.org").unwrap();
        assert_eq!(site.code(), "fr");
        assert_eq!(site.api_url().as_str(), "https://fr.wikipedia.org/w/api.php");
        assert_eq!(site.to_string(), "fr");
    }

    #[test]
    fn test_site_code_normalized() {
        let site = Site::new(" ZH-Classical ", "wikipedia.org").unwrap();
        assert_eq!(site.code(), "zh-classical");
    }

    #[test]
    fn test_other_wiki_family() {
        let site = Site::new("en", "wiktionary.org").unwrap();
        assert_eq!(site.api_url().host_str(), Some("en.wiktionary.org"));
    }

    #[test]
    fn test_invalid_codes() {
        assert!(Site::new("", "wikipedia.org").is_err());
        assert!(Site::new("en/../x", "wikipedia.org").is_err());
        assert!(Site::new("e n", "wikipedia.org").is_err());
    }
}
