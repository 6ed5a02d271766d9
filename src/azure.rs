//! Minimal Azure Resource Manager client.
//!
//! Authentication is out of scope: callers hand in a bearer token obtained
//! elsewhere (e.g. `az account get-access-token`).

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

pub const SITES_API_VERSION: &str = "2022-03-01";
pub const RESOURCE_GROUPS_API_VERSION: &str = "2021-04-01";
pub const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";
pub const RESOURCE_GRAPH_API_VERSION: &str = "2021-03-01";

const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Upper bound on continuation pages for a single listing.
const MAX_PAGES: usize = 10_000;

/// Connection settings for [`ArmClient`].
#[derive(Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub access_token: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    /// Base delay between retries; doubled on every attempt.
    pub retry_backoff: Duration,
}

impl ClientSettings {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_MANAGEMENT_ENDPOINT.to_string(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

/// ARM list responses (`value` + optional `nextLink`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub state: String,
}

/// Blocking ARM client with bearer auth and bounded retries.
#[derive(Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: String,
    access_token: String,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl ArmClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("funcscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            access_token: settings.access_token,
            max_attempts: settings.max_attempts.max(1),
            retry_backoff: settings.retry_backoff,
        })
    }

    /// Build `<endpoint><path>?api-version=<version>`.
    pub fn url(&self, path: &str, api_version: &str) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.endpoint, path);
        let mut url = Url::parse(&raw).map_err(|source| FetchError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let body = self.send(url, || self.http.get(url.clone()))?;
        decode(url, &body)
    }

    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &Url,
        payload: &B,
    ) -> Result<T, FetchError> {
        let body = self.send(url, || self.http.post(url.clone()).json(payload))?;
        decode(url, &body)
    }

    /// POST with an empty body (used by `.../list` actions).
    pub fn post_empty<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let body = self.send(url, || {
            self.http
                .post(url.clone())
                .header(reqwest::header::CONTENT_LENGTH, "0")
        })?;
        decode(url, &body)
    }

    /// GET a list endpoint and follow `nextLink` until exhausted.
    pub fn get_paged<T: DeserializeOwned>(&self, url: &Url) -> Result<Vec<T>, FetchError> {
        let mut items = Vec::new();
        let mut guard = PageGuard::new(url.as_str());
        let mut next = Some(url.clone());

        while let Some(current) = next.take() {
            let page: Page<T> = self.get_json(&current)?;
            items.extend(page.value);

            if let Some(link) = page.next_link.filter(|l| !l.is_empty()) {
                guard.follow(&link)?;
                let parsed = Url::parse(&link).map_err(|source| FetchError::InvalidUrl {
                    url: link.clone(),
                    source,
                })?;
                next = Some(parsed);
            }
        }

        Ok(items)
    }

    pub fn list_subscriptions(&self) -> Result<Vec<Subscription>, FetchError> {
        let url = self.url("/subscriptions", SUBSCRIPTIONS_API_VERSION)?;
        let subscriptions: Vec<Subscription> = self.get_paged(&url)?;
        Ok(subscriptions
            .into_iter()
            .filter(|s| s.state.is_empty() || s.state.eq_ignore_ascii_case("enabled"))
            .collect())
    }

    fn send<F>(&self, url: &Url, build: F) -> Result<String, FetchError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(url = %url, attempt, "ARM request");

            let result = build()
                .bearer_auth(&self.access_token)
                .header(reqwest::header::ACCEPT, "application/json")
                .send();

            let (error, retry_after) = match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().map_err(|source| FetchError::Request {
                            url: url.to_string(),
                            source,
                        });
                    }

                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(FetchError::Unauthorized {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let retry_after = parse_retry_after(response.headers());
                    let message = response.text().unwrap_or_default();
                    (
                        FetchError::Http {
                            status: status.as_u16(),
                            url: url.to_string(),
                            message: truncate(&message, 200),
                        },
                        retry_after,
                    )
                }
                Err(source) => (
                    FetchError::Request {
                        url: url.to_string(),
                        source,
                    },
                    None,
                ),
            };

            if !error.is_transient() || attempt >= self.max_attempts {
                return Err(error);
            }

            let delay = retry_after.unwrap_or_else(|| self.retry_backoff * 2u32.pow(attempt - 1));
            warn!(url = %url, attempt, delay_ms = delay.as_millis() as u64, error = %error, "retrying ARM request");
            thread::sleep(delay);
        }
    }
}

/// Continuation tokens (`nextLink`, `$skipToken`) already followed for one
/// listing. Stops a server that repeats a token, or never stops paging,
/// from looping forever.
pub(crate) struct PageGuard<'a> {
    url: &'a str,
    seen: HashSet<String>,
}

impl<'a> PageGuard<'a> {
    pub(crate) fn new(url: &'a str) -> Self {
        Self {
            url,
            seen: HashSet::new(),
        }
    }

    pub(crate) fn follow(&mut self, token: &str) -> Result<(), FetchError> {
        if self.seen.len() >= MAX_PAGES {
            return Err(FetchError::PagingLoop {
                url: self.url.to_string(),
                reason: format!("more than {} pages", MAX_PAGES),
            });
        }
        if !self.seen.insert(token.to_string()) {
            return Err(FetchError::PagingLoop {
                url: self.url.to_string(),
                reason: format!("continuation '{}' returned twice", truncate(token, 80)),
            });
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        message.to_string()
    } else {
        let cut: String = message.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// Percent-encode a single path segment (resource group and site names).
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
