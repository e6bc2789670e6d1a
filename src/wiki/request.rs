// src/wiki/request.rs
// =============================================================================
// Builds usercontribs query URLs.
//
// A query asks one language edition for every edit an (anonymous) user made
// inside a time window:
//
//   https://en.wikipedia.org/w/api.php?action=query&list=usercontribs
//       &ucuser=192.0.2.1&ucstart=...&ucend=...&ucdir=newer&uclimit=500
//       &ucprop=title|timestamp|ids|sizediff&format=json
//
// See https://www.mediawiki.org/wiki/API:Usercontribs
//
// The url crate percent-encodes every value for us ('|' becomes %7C, the
// colons in timestamps and IPv6 addresses are escaped too).
// =============================================================================

use anyhow::{bail, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::net::IpAddr;
use url::Url;

use super::response::Cursor;
use super::site::Site;

/// Most results the API hands out per page for anonymous clients.
pub const PAGE_LIMIT: u32 = 500;

const CONTRIB_PROPS: &str = "title|timestamp|ids|sizediff";

/// Inclusive search window, oldest timestamp first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        // With ucdir=newer the API wants ucstart <= ucend
        if start > end {
            bail!("Search window starts ({}) after it ends ({})", start, end);
        }
        Ok(TimeWindow { start, end })
    }
}

// MediaWiki timestamps look like 2014-07-01T00:00:00Z
fn api_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// One request for one (address, site), optionally continuing a previous page
#[derive(Debug, Clone, Copy)]
pub struct ContribsQuery<'a> {
    pub user: IpAddr,
    pub site: &'a Site,
    pub window: &'a TimeWindow,
    pub cursor: Option<&'a Cursor>,
}

impl ContribsQuery<'_> {
    pub fn to_url(&self) -> Url {
        let mut url = self.site.api_url().clone();

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("action", "query")
                .append_pair("list", "usercontribs")
                .append_pair("ucuser", &self.user.to_string())
                .append_pair("ucstart", &api_timestamp(self.window.start))
                .append_pair("ucend", &api_timestamp(self.window.end))
                .append_pair("ucdir", "newer")
                .append_pair("uclimit", &PAGE_LIMIT.to_string())
                .append_pair("ucprop", CONTRIB_PROPS)
                .append_pair("format", "json");

            if let Some(cursor) = self.cursor {
                pairs.append_pair("uccontinue", &cursor.uccontinue);
                if let Some(marker) = &cursor.marker {
                    pairs.append_pair("continue", marker);
                }
            }
        }

        url
    }
}
