// src/wiki/record.rs
// =============================================================================
// One edit found for a queried address.
//
// The field names double as the CSV column names, so keep them in sync with
// output::HEADER. With pageid and revid you can build a diff link:
//   https://en.wikipedia.org/w/index.php?pageid=123498&oldid=20131642&diff=prev
// =============================================================================

use serde::Serialize;
use std::net::IpAddr;

use super::site::Site;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionRecord {
    /// The address that made the edit
    pub user: IpAddr,
    /// Language edition the edit was made on
    pub lang: Site,
    pub title: String,
    pub timestamp: String,
    pub pageid: u64,
    pub revid: u64,
    pub parentid: u64,
    pub sizediff: Option<i64>,
}
