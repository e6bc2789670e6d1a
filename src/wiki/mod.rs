// src/wiki/mod.rs
// =============================================================================
// This module talks to the wiki's usercontribs API.
//
// Submodules:
// - site: Language editions and their api.php endpoints
// - request: Builds query URLs (and the search time window)
// - response: Decodes result pages and continuation cursors
// - record: The ContributionRecord we emit for each edit
// - transport: The HTTP layer (a trait, so tests can fake it)
// - fetch: Pagination plus bookkeeping of failed requests
// =============================================================================

mod fetch;
mod record;
mod request;
mod response;
mod site;
mod transport;

pub use fetch::{ContribFetcher, ContribPager, MissedRequest};
pub use record::ContributionRecord;
pub use request::{ContribsQuery, TimeWindow, PAGE_LIMIT};
pub use response::{decode_page, Cursor, Page};
pub use site::Site;
pub use transport::{FetchError, HttpTransport, Transport};

#[cfg(test)]
pub(crate) use transport::testing;
