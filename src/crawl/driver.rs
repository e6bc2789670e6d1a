// src/crawl/driver.rs
// =============================================================================
// The main crawl loop.
//
// How it works:
//   for each label in the ranges document
//     for each block of that label
//       for each address in the block
//         for each site (language edition)
//           fetch every page of contributions, emitting rows as they arrive
//
// The order is fully deterministic, so two runs over the same ranges produce
// rows in the same order.
//
// Politeness:
// - Requests are made one after another, never in parallel
// - An optional pause follows every (address, site) query
//
// Rust concepts:
// - Nested for loops over iterators (the address range is lazy)
// - Generics: Crawler<T> works with the real HTTP transport or a test fake
// =============================================================================

use anyhow::Result;
use std::io::Write;
use tracing::{debug, info};

use crate::config::CrawlConfig;
use crate::output::Emitter;
use crate::ranges::RangeDocument;
use crate::wiki::{ContribFetcher, MissedRequest, Transport};

// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub labels: u64,
    pub addresses: u64,
    pub requests: u64,
    pub records: u64,
    pub missed: u64,
}

pub struct Crawler<T> {
    config: CrawlConfig,
    fetcher: ContribFetcher<T>,
}

impl<T: Transport> Crawler<T> {
    pub fn new(config: CrawlConfig, transport: T) -> Self {
        let fetcher = ContribFetcher::new(transport, config.window);
        Crawler { config, fetcher }
    }

    // Crawls every address of every block and writes each found edit to
    // the emitter immediately.
    //
    // Only output errors end the run early; failed requests are recorded
    // and can be read back with missed() afterwards.
    pub async fn run<W: Write>(&mut self, ranges: &RangeDocument, emitter: &mut Emitter<W>) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();

        for group in ranges.groups() {
            stats.labels += 1;
            info!(label = %group.label, blocks = group.blocks.len(), "scanning");

            for block in &group.blocks {
                debug!(%block, addresses = %block.addresses().len(), "expanding block");

                for address in block.addresses() {
                    stats.addresses += 1;
                    let mut found = 0u64;

                    for site in &self.config.sites {
                        let mut pager = self.fetcher.pages(address, site);
                        while let Some(records) = pager.next_page().await {
                            for record in &records {
                                emitter.emit(record)?;
                                found += 1;
                            }
                        }

                        if !self.config.delay.is_zero() {
                            tokio::time::sleep(self.config.delay).await;
                        }
                    }

                    if found > 0 {
                        info!(%address, found, "found edits");
                    } else {
                        debug!(%address, sites = self.config.sites.len(), "no edits");
                    }
                    stats.records += found;
                }
            }
        }

        stats.requests = self.fetcher.request_count();
        stats.missed = self.fetcher.missed().len() as u64;
        Ok(stats)
    }

    pub fn missed(&self) -> &[MissedRequest] {
        self.fetcher.missed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::testing::{param, ScriptedTransport};
    use crate::wiki::{FetchError, Site, TimeWindow};
    use std::time::Duration;

    fn config(langs: &[&str]) -> CrawlConfig {
        CrawlConfig {
            sites: langs
                .iter()
                .map(|code| Site::new(code, "wikipedia.org").unwrap())
                .collect(),
            window: TimeWindow::new(
                "2014-07-01T00:00:00Z".parse().unwrap(),
                "2014-07-27T23:59:59Z".parse().unwrap(),
            )
            .unwrap(),
            delay: Duration::ZERO,
            user_agent: "test".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    // (ucuser, host) for each request made
    fn targets(transport: &ScriptedTransport) -> Vec<(String, String)> {
        transport
            .requests()
            .iter()
            .map(|raw| {
                let url = url::Url::parse(raw).unwrap();
                (param(&url, "ucuser").unwrap(), url.host_str().unwrap().to_string())
            })
            .collect()
    }

    fn csv(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_visits_every_address_and_site_in_order() {
        let ranges: RangeDocument = r#"{"Office A": ["198.51.100.0/30"]}"#.parse().unwrap();
        let transport = ScriptedTransport::new(|_| Ok(r#"{"query": {"usercontribs": []}}"#.to_string()));
        let mut crawler = Crawler::new(config(&["en", "fr"]), transport);
        let mut emitter = Emitter::new(Vec::new()).unwrap();

        let stats = crawler.run(&ranges, &mut emitter).await.unwrap();

        assert_eq!(stats.addresses, 4);
        assert_eq!(stats.requests, 8);
        assert_eq!(stats.records, 0);

        let expected: Vec<(String, String)> = ["0", "1", "2", "3"]
            .iter()
            .flat_map(|last| {
                ["en", "fr"].into_iter().map(move |lang| {
                    (format!("198.51.100.{}", last), format!("{}.wikipedia.org", lang))
                })
            })
            .collect();
        assert_eq!(targets(crawler.fetcher.transport()), expected);
    }

    #[tokio::test]
    async fn test_label_then_block_order() {
        let ranges: RangeDocument = r#"{
            "Second": [["10.0.0.5", "10.0.0.6"]],
            "First": ["192.0.2.9", "203.0.113.1/32"]
        }"#
        .parse()
        .unwrap();
        let transport = ScriptedTransport::new(|_| Ok("{}".to_string()));
        let mut crawler = Crawler::new(config(&["en"]), transport);
        let mut emitter = Emitter::new(Vec::new()).unwrap();

        crawler.run(&ranges, &mut emitter).await.unwrap();

        let users: Vec<_> = targets(crawler.fetcher.transport())
            .into_iter()
            .map(|(user, _)| user)
            .collect();
        assert_eq!(users, vec!["10.0.0.5", "10.0.0.6", "192.0.2.9", "203.0.113.1"]);
    }

    #[tokio::test]
    async fn test_rows_are_emitted_with_address_and_site() {
        let ranges: RangeDocument = r#"{"Office A": ["192.0.2.0/31"]}"#.parse().unwrap();
        let transport = ScriptedTransport::new(|url| {
            // Only 192.0.2.1 on fr has edits, spread over two pages
            let user = param(url, "ucuser").unwrap();
            let host = url.host_str().unwrap().to_string();
            if user != "192.0.2.1" || host != "fr.wikipedia.org" {
                return Ok(r#"{"query": {"usercontribs": []}}"#.to_string());
            }
            match param(url, "uccontinue") {
                None => Ok(r#"{"continue": {"uccontinue": "p2", "continue": "-||"},
                    "query": {"usercontribs": [{"pageid": 5, "revid": 100, "parentid": 99,
                    "title": "Paris", "timestamp": "2014-07-04T10:00:00Z", "sizediff": 7}]}}"#
                    .to_string()),
                Some(_) => Ok(r#"{"query": {"usercontribs": [{"pageid": 6, "revid": 101,
                    "parentid": 0, "title": "Lyon", "timestamp": "2014-07-05T10:00:00Z",
                    "sizediff": 250}]}}"#
                    .to_string()),
            }
        });
        let mut crawler = Crawler::new(config(&["en", "fr"]), transport);
        let mut emitter = Emitter::new(Vec::new()).unwrap();

        let stats = crawler.run(&ranges, &mut emitter).await.unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.requests, 5);

        let out = csv(emitter.finish(crawler.missed()).unwrap());
        assert_eq!(
            out,
            "user,lang,title,timestamp,pageid,revid,parentid,sizediff\n\
             192.0.2.1,fr,Paris,2014-07-04T10:00:00Z,5,100,99,7\n\
             192.0.2.1,fr,Lyon,2014-07-05T10:00:00Z,6,101,0,250\n"
        );
    }

    #[tokio::test]
    async fn test_failed_site_does_not_stop_run() {
        let ranges: RangeDocument = r#"{"Office A": ["192.0.2.7"]}"#.parse().unwrap();
        let transport = ScriptedTransport::new(|url| {
            if url.host_str() == Some("de.wikipedia.org") {
                Err(FetchError::Status(503))
            } else {
                Ok(r#"{"query": {"usercontribs": [{"pageid": 1, "revid": 2, "parentid": 1,
                    "title": "Hit", "timestamp": "2014-07-02T00:00:00Z", "sizediff": 1}]}}"#
                    .to_string())
            }
        });
        let mut crawler = Crawler::new(config(&["en", "de", "fr"]), transport);
        let mut emitter = Emitter::new(Vec::new()).unwrap();

        let stats = crawler.run(&ranges, &mut emitter).await.unwrap();

        assert_eq!(stats.requests, 3);
        assert_eq!(stats.records, 2);
        assert_eq!(stats.missed, 1);
        assert!(crawler.missed()[0].url.starts_with("https://de.wikipedia.org/w/api.php?"));

        let out = csv(emitter.finish(crawler.missed()).unwrap());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[1], "192.0.2.7,en,Hit,2014-07-02T00:00:00Z,1,2,1,1");
        assert_eq!(lines[2], "192.0.2.7,fr,Hit,2014-07-02T00:00:00Z,1,2,1,1");
        assert_eq!(lines[3], "Missed URLs:");
        assert!(lines[4].starts_with("https://de.wikipedia.org/"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_follows_each_address_and_site() {
        use std::sync::{Arc, Mutex};
        use tokio::time::Instant;

        let ranges: RangeDocument = r#"{"Office A": ["192.0.2.0/31"]}"#.parse().unwrap();
        let started = Instant::now();
        let times = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&times);
        let transport = ScriptedTransport::new(move |url| {
            seen.lock().unwrap().push(started.elapsed());
            // fr answers in two pages; the pause must not split them
            if url.host_str() == Some("fr.wikipedia.org") && param(url, "uccontinue").is_none() {
                return Ok(r#"{"continue": {"uccontinue": "p2"}, "query": {"usercontribs": []}}"#.to_string());
            }
            Ok(r#"{"query": {"usercontribs": []}}"#.to_string())
        });
        let mut settings = config(&["en", "fr"]);
        settings.delay = Duration::from_millis(50);
        let mut crawler = Crawler::new(settings, transport);
        let mut emitter = Emitter::new(Vec::new()).unwrap();

        let stats = crawler.run(&ranges, &mut emitter).await.unwrap();

        assert_eq!(stats.requests, 6);
        // One pause per (address, site): 2 addresses x 2 sites
        let total = started.elapsed();
        assert!(total >= Duration::from_millis(200) && total < Duration::from_millis(250));

        // Which 50ms slot each request landed in: en, fr page 1, fr page 2,
        // then the same for the second address
        let slots: Vec<u128> = times.lock().unwrap().iter().map(|d| d.as_millis() / 50).collect();
        assert_eq!(slots, vec![0, 1, 1, 2, 3, 3]);
    }

    #[tokio::test]
    async fn test_empty_pair_makes_no_requests() {
        let ranges: RangeDocument = r#"{"Backwards": [["10.0.0.9", "10.0.0.1"]]}"#.parse().unwrap();
        let transport = ScriptedTransport::new(|_| Ok("{}".to_string()));
        let mut crawler = Crawler::new(config(&["en"]), transport);
        let mut emitter = Emitter::new(Vec::new()).unwrap();

        let stats = crawler.run(&ranges, &mut emitter).await.unwrap();

        assert_eq!(stats.labels, 1);
        assert_eq!(stats.addresses, 0);
        assert_eq!(stats.requests, 0);
    }
}
