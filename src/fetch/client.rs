//! Synchronous body-log API client.
//!
//! One bearer-authenticated GET per category window. The only retry in the
//! system lives here: a 429 waits out the provider's `Retry-After` interval
//! and retries the request exactly once.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;

use crate::auth::TokenSet;
use crate::table::RawRecord;

use super::{FetchError, MetricCategory};

/// Production API origin.
const API_BASE: &str = "https://api.fitbit.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceiling on how long a `Retry-After` can make us sleep.
const MAX_RETRY_AFTER_SECS: u64 = 300;

/// Bearer-token HTTP client for the body-log endpoints.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    access_token: String,
}

impl ApiClient {
    /// Build a client for the production API.
    pub fn new(token: &TokenSet) -> Self {
        Self::with_base_url(API_BASE, &token.access_token)
    }

    /// Build a client against an explicit origin (tests point this at a
    /// local stub server).
    pub fn with_base_url(base_url: &str, access_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Fetch one category's log entries for an inclusive date range.
    ///
    /// The range must stay within the provider's 31-day cap; the fetcher's
    /// window walk guarantees that. A missing response key (no entries in
    /// the range) yields an empty vec.
    pub fn body_log(
        &self,
        category: MetricCategory,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let url = format!(
            "{}/1/user/-/body/log/{}/date/{}/{}.json",
            self.base_url,
            category.resource(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );

        let mut retried = false;
        loop {
            let result = ureq::get(&url)
                .set("Authorization", &format!("Bearer {}", self.access_token))
                .set("Accept-Language", "en_US")
                .timeout(REQUEST_TIMEOUT)
                .call();

            return match result {
                Ok(response) => parse_entries(response, category),
                Err(ureq::Error::Status(429, response)) => {
                    if retried {
                        return Err(FetchError::RateLimited);
                    }
                    retried = true;
                    thread::sleep(retry_after(&response));
                    continue;
                }
                Err(ureq::Error::Status(status, response)) => Err(FetchError::Api {
                    status,
                    body: response.into_string().unwrap_or_default(),
                }),
                Err(e) => Err(FetchError::Http(e.to_string())),
            };
        }
    }
}

/// Pull the entry array out of the response body.
///
/// The body-log endpoints wrap entries under the category name:
/// `{"weight": [...]}` / `{"fat": [...]}`.
fn parse_entries(
    response: ureq::Response,
    category: MetricCategory,
) -> Result<Vec<RawRecord>, FetchError> {
    let mut body: serde_json::Value = response
        .into_json()
        .map_err(|e| FetchError::Http(format!("unreadable response body: {e}")))?;

    match body.get_mut(category.resource()) {
        Some(entries) => serde_json::from_value(entries.take())
            .map_err(|e| FetchError::Http(format!("unexpected entry shape: {e}"))),
        None => Ok(Vec::new()),
    }
}

/// Provider-specified wait before the single retry.
fn retry_after(response: &ureq::Response) -> Duration {
    let secs = response
        .header("Retry-After")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1);
    Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS))
}
