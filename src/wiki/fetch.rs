// src/wiki/fetch.rs
// =============================================================================
// Fetches every contribution of one address on one site, page by page.
//
// How it works:
// 1. Ask for the first page (no cursor)
// 2. Hand the page's records to the caller
// 3. If the response carried a continuation cursor, ask again with it
// 4. Stop when a page comes back without a cursor
//
// Failures never stop the crawl. The URL that failed is remembered as a
// MissedRequest so it can be reported (and rerun by hand) at the end, and
// we move on to the next site.
//
// Rust concepts:
// - Generics: ContribFetcher<T> works with any Transport
// - Borrowing: A pager borrows the fetcher mutably while it runs, so only one
//   pagination can be in flight at a time
// =============================================================================

use std::net::IpAddr;
use tracing::{debug, warn};

use super::record::ContributionRecord;
use super::request::{ContribsQuery, TimeWindow};
use super::response::{decode_page, Cursor};
use super::site::Site;
use super::transport::Transport;

// A request that failed and was not retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedRequest {
    pub url: String,
    pub reason: String,
}

pub struct ContribFetcher<T> {
    transport: T,
    window: TimeWindow,
    missed: Vec<MissedRequest>,
    requests: u64,
}

impl<T: Transport> ContribFetcher<T> {
    pub fn new(transport: T, window: TimeWindow) -> Self {
        ContribFetcher {
            transport,
            window,
            missed: Vec::new(),
            requests: 0,
        }
    }

    // Starts paginating through one (address, site) pair.
    //
    // Nothing is requested until next_page() is awaited.
    pub fn pages<'a>(&'a mut self, user: IpAddr, site: &'a Site) -> ContribPager<'a, T> {
        ContribPager {
            fetcher: self,
            user,
            site,
            cursor: None,
            done: false,
        }
    }

    // Fetches all pages for one (address, site) pair and returns every
    // record, in the order the wiki returned them
    pub async fn fetch(&mut self, user: IpAddr, site: &Site) -> Vec<ContributionRecord> {
        let mut records = Vec::new();
        let mut pager = self.pages(user, site);
        while let Some(page) = pager.next_page().await {
            records.extend(page);
        }
        records
    }

    pub fn missed(&self) -> &[MissedRequest] {
        &self.missed
    }

    // Total number of requests issued, continuation pages included
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}

// Walks the pages of a single (address, site) query
pub struct ContribPager<'a, T> {
    fetcher: &'a mut ContribFetcher<T>,
    user: IpAddr,
    site: &'a Site,
    cursor: Option<Cursor>,
    done: bool,
}

impl<T: Transport> ContribPager<'_, T> {
    // Returns the next page of records, or None when there is nothing left
    // (either the wiki sent no cursor, or a request failed).
    pub async fn next_page(&mut self) -> Option<Vec<ContributionRecord>> {
        if self.done {
            return None;
        }

        let url = ContribsQuery {
            user: self.user,
            site: self.site,
            window: &self.fetcher.window,
            cursor: self.cursor.as_ref(),
        }
        .to_url();

        self.fetcher.requests += 1;
        debug!(%url, "requesting contributions");

        let result = self
            .fetcher
            .transport
            .get(&url)
            .await
            .and_then(|body| decode_page(&body, self.user, self.site));

        match result {
            Ok(page) => {
                self.cursor = page.cursor;
                self.done = self.cursor.is_none();
                Some(page.records)
            }
            Err(e) => {
                warn!(%url, error = %e, "could not load");
                self.fetcher.missed.push(MissedRequest {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
                self.done = true;
                None
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is the 'a in ContribPager<'a, T>?
//    - A lifetime: the pager borrows the fetcher and the site
//    - The compiler guarantees the pager can't outlive either of them
//
// 2. Why hand out pages instead of one big Vec?
//    - The crawl loop writes each page to the CSV as soon as it arrives
//    - fetch() is the convenience version that collects everything
//
// 3. Why does a failure end the pagination?
//    - Without the failed page we have no cursor for the next one
// -----------------------------------------------------------------------------
