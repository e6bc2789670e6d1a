// src/wiki/response.rs
// =============================================================================
// Decodes usercontribs responses.
//
// A response page looks like this (trimmed):
//
//   {
//     "continue": { "uccontinue": "20140702123000|616000000", "continue": "-||" },
//     "query": {
//       "usercontribs": [
//         { "user": "192.197.82.203", "pageid": 123498, "revid": 20131642,
//           "parentid": 20131037, "ns": 0, "title": "Senate of Canada",
//           "timestamp": "2014-07-02T18:59:24Z", "sizediff": 42 }
//       ]
//     }
//   }
//
// Older wikis send the cursor as query-continue.usercontribs.uccontinue
// instead; we accept both. A wiki that refuses the query sends an "error"
// object, which we turn into a FetchError.
// =============================================================================

use serde::Deserialize;
use std::net::IpAddr;

use super::record::ContributionRecord;
use super::site::Site;
use super::transport::FetchError;

/// Opaque continuation token handed back by the wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub uccontinue: String,
    // The "continue" marker that must be echoed back with uccontinue
    pub marker: Option<String>,
}

/// One decoded page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<ContributionRecord>,
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Deserialize, Default)]
struct ContribsResponse {
    #[serde(default)]
    query: Option<QueryPayload>,
    #[serde(default, rename = "continue")]
    continuation: Option<ContinuePayload>,
    #[serde(default, rename = "query-continue")]
    legacy_continuation: Option<LegacyContinuePayload>,
    #[serde(default)]
    error: Option<ApiErrorPayload>,
}

#[derive(Debug, Deserialize, Default)]
struct QueryPayload {
    // Some wikis send "usercontribs": null instead of leaving it out
    #[serde(default)]
    usercontribs: Option<Vec<RawContrib>>,
}

#[derive(Debug, Deserialize, Default)]
struct ContinuePayload {
    uccontinue: Option<String>,
    #[serde(rename = "continue")]
    marker: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LegacyContinuePayload {
    usercontribs: Option<LegacyUserContribs>,
}

#[derive(Debug, Deserialize, Default)]
struct LegacyUserContribs {
    uccontinue: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiErrorPayload {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct RawContrib {
    #[serde(default)]
    title: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    pageid: u64,
    revid: u64,
    // Page creations have parentid 0
    #[serde(default)]
    parentid: u64,
    // Missing when the wiki can't compute it (e.g. deleted parent revision)
    #[serde(default)]
    sizediff: Option<i64>,
}

impl ContribsResponse {
    fn cursor(&self) -> Option<Cursor> {
        if let Some(ContinuePayload {
            uccontinue: Some(token),
            marker,
        }) = &self.continuation
        {
            return Some(Cursor {
                uccontinue: token.clone(),
                marker: marker.clone(),
            });
        }

        self.legacy_continuation
            .as_ref()
            .and_then(|legacy| legacy.usercontribs.as_ref())
            .and_then(|contribs| contribs.uccontinue.clone())
            .map(|token| Cursor {
                uccontinue: token,
                marker: None,
            })
    }
}

// Decodes one response body for the given user and site.
//
// A body without a query section (or with an empty or null list) is a
// valid page with zero records, not an error.
pub fn decode_page(body: &str, user: IpAddr, site: &Site) -> Result<Page, FetchError> {
    let mut response: ContribsResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error.take() {
        return Err(FetchError::Api {
            code: error.code,
            info: error.info,
        });
    }

    let cursor = response.cursor();
    let records = response
        .query
        .and_then(|query| query.usercontribs)
        .unwrap_or_default()
        .into_iter()
        .map(|raw| ContributionRecord {
            user,
            lang: site.clone(),
            title: raw.title,
            timestamp: raw.timestamp,
            pageid: raw.pageid,
            revid: raw.revid,
            parentid: raw.parentid,
            sizediff: raw.sizediff,
        })
        .collect();

    Ok(Page { records, cursor })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site::new("en", "wikipedia.org").unwrap()
    }

    fn user() -> IpAddr {
        "192.197.82.203".parse().unwrap()
    }

    #[test]
    fn test_single_page() {
        let body = r#"{
            "batchcomplete": "",
            "query": {"usercontribs": [
                {"userid": 0, "user": "192.197.82.203", "pageid": 123498, "revid": 20131642,
                 "parentid": 20131037, "ns": 0, "title": "Senate of Canada",
                 "timestamp": "2014-07-02T18:59:24Z", "sizediff": -12},
                {"userid": 0, "user": "192.197.82.203", "pageid": 7, "revid": 20131700,
                 "parentid": 0, "ns": 0, "title": "New page",
                 "timestamp": "2014-07-03T08:00:00Z", "sizediff": 300}
            ]}
        }"#;

        let page = decode_page(body, user(), &site()).unwrap();
        assert_eq!(page.cursor, None);
        assert_eq!(page.records.len(), 2);

        let first = &page.records[0];
        assert_eq!(first.user, user());
        assert_eq!(first.lang, site());
        assert_eq!(first.title, "Senate of Canada");
        assert_eq!(first.timestamp, "2014-07-02T18:59:24Z");
        assert_eq!((first.pageid, first.revid, first.parentid), (123498, 20131642, 20131037));
        assert_eq!(first.sizediff, Some(-12));
        assert_eq!(page.records[1].title, "New page");
    }

    #[test]
    fn test_continue_cursor() {
        let body = r#"{
            "continue": {"uccontinue": "20140702123000|616000000", "continue": "-||"},
            "query": {"usercontribs": []}
        }"#;
        let page = decode_page(body, user(), &site()).unwrap();
        assert_eq!(
            page.cursor,
            Some(Cursor {
                uccontinue: "20140702123000|616000000".to_string(),
                marker: Some("-||".to_string()),
            })
        );
    }

    #[test]
    fn test_legacy_query_continue_cursor() {
        let body = r#"{
            "query-continue": {"usercontribs": {"uccontinue": "20140705000000|42"}},
            "query": {"usercontribs": []}
        }"#;
        let page = decode_page(body, user(), &site()).unwrap();
        assert_eq!(page.cursor.map(|c| c.uccontinue), Some("20140705000000|42".to_string()));
    }

    #[test]
    fn test_continue_without_uccontinue_ends() {
        let body = r#"{"continue": {"continue": "||"}, "query": {"usercontribs": []}}"#;
        let page = decode_page(body, user(), &site()).unwrap();
        assert_eq!(page.cursor, None);
    }

    #[test]
    fn test_missing_query_is_empty_page() {
        let page = decode_page(r#"{"batchcomplete": ""}"#, user(), &site()).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.cursor, None);
    }

    #[test]
    fn test_null_usercontribs_is_empty_page() {
        let page = decode_page(r#"{"query": {"usercontribs": null}}"#, user(), &site()).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.cursor, None);
    }

    #[test]
    fn test_missing_sizediff_and_parent() {
        let body = r#"{"query": {"usercontribs": [
            {"pageid": 1, "revid": 2, "title": "T", "timestamp": "2014-07-01T00:00:01Z"}
        ]}}"#;
        let page = decode_page(body, user(), &site()).unwrap();
        assert_eq!(page.records[0].parentid, 0);
        assert_eq!(page.records[0].sizediff, None);
    }

    #[test]
    fn test_api_error() {
        let body = r#"{"error": {"code": "baduser_ucuser", "info": "Invalid value for user parameter"}}"#;
        let err = decode_page(body, user(), &site()).unwrap_err();
        assert!(matches!(err, FetchError::Api { ref code, .. } if code == "baduser_ucuser"));
    }

    #[test]
    fn test_malformed_body() {
        let err = decode_page("<html>Wikimedia Error</html>", user(), &site()).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
