//! Intercom REST API client
//!
//! `IntercomClient` owns the authenticated HTTP plumbing. The per-resource
//! operations live in [`articles`] and [`conversations`], each next to the CLI
//! commands that use them.
//!
//! Read operations come in two forms: `try_*` returns the request error, and the
//! plain form degrades to an empty result through [`read_or_default`]. Write
//! operations always return the error to the caller.

use crate::prelude::*;
use helpcenter_core::articles::{ArticleState, DEFAULT_AUTHOR_ID};
use helpcenter_core::pagination::{next_cursor, Cursor, Paginated};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

pub mod articles;
pub mod conversations;

/// Default Intercom API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.intercom.io";

/// Value of the `Intercom-Version` header sent with every request
pub const API_VERSION: &str = "2.13";

pub type ApiResult<T> = std::result::Result<T, Error>;

/// Intercom configuration, built once from the global CLI arguments
#[derive(Debug, Clone)]
pub struct IntercomConfig {
    pub access_token: String,
    pub author_id: Option<String>,
    pub base_url: String,
    /// Hold new articles as drafts for review
    pub review_mode: bool,
    /// Publish new articles straight away (ignored while `review_mode` is on)
    pub auto_publish: bool,
}

impl IntercomConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            author_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            review_mode: true,
            auto_publish: false,
        }
    }

    /// Load configuration from the global arguments (flags or environment)
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        let access_token = global
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| eyre!("INTERCOM_ACCESS_TOKEN environment variable not set"))?;

        Ok(Self {
            author_id: global.author_id.clone().filter(|id| !id.trim().is_empty()),
            base_url: global.base_url.clone(),
            review_mode: global.review_mode,
            auto_publish: global.auto_publish,
            ..Self::new(access_token)
        })
    }

    /// Admin credited for writes when a call does not name one
    pub fn author_id(&self) -> &str {
        self.author_id.as_deref().unwrap_or(DEFAULT_AUTHOR_ID)
    }

    /// State given to new articles unless the caller asks for another one
    pub fn default_article_state(&self) -> ArticleState {
        if self.auto_publish && !self.review_mode {
            ArticleState::Published
        } else {
            ArticleState::Draft
        }
    }
}

/// Create an HTTP client with the bearer token and Intercom headers
pub fn create_intercom_client(config: &IntercomConfig) -> ApiResult<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

    let token = config.access_token.trim();
    if token.is_empty() {
        return Err(Error::InvalidToken("access token is empty".to_string()));
    }

    let mut headers = HeaderMap::new();
    let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| Error::InvalidToken(format!("not a valid header value: {e}")))?;
    authorization.set_sensitive(true);
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("Intercom-Version", HeaderValue::from_static(API_VERSION));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::request(&config.base_url, e))
}

/// Authenticated Intercom client
///
/// Holds only immutable configuration; requests are issued one at a time.
#[derive(Debug, Clone)]
pub struct IntercomClient {
    http: reqwest::Client,
    base_url: String,
    author_id: String,
}

impl IntercomClient {
    pub fn new(config: &IntercomConfig) -> ApiResult<Self> {
        Ok(Self {
            http: create_intercom_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            author_id: config.author_id().to_string(),
        })
    }

    /// Admin credited for writes that do not name their own author
    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        self.send::<T, ()>(Method::GET, &self.url(path), query, None)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(Method::POST, &self.url(path), &[], Some(body))
            .await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(Method::PUT, &self.url(path), &[], Some(body))
            .await
    }

    /// Send one request and decode the JSON response.
    ///
    /// Transport and decoding problems become [`Error::Request`], non-2xx
    /// responses become [`Error::Status`]. Both are logged here.
    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<T> {
        log::debug!("Making {method} request to {url}");

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            if let Ok(data) = serde_json::to_string_pretty(body) {
                log::debug!("Request data: {data}");
            }
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            log::error!("Intercom API error: {e}");
            Error::request(url, e)
        })?;

        let status = response.status();
        log::debug!("Response status: {status}");

        let text = response.text().await.map_err(|e| {
            log::error!("Intercom API error: failed to read response body: {e}");
            Error::request(url, e)
        })?;
        log::debug!("Response body: {text}");

        if !status.is_success() {
            log::error!("Intercom API error: {status} for {url}");
            log::error!("Response body: {text}");
            return Err(Error::Status {
                status,
                url: url.to_string(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            log::error!("Intercom API error: failed to parse response from {url}: {e}");
            Error::request(url, e)
        })
    }

    /// Follow `pages.next` cursors from `path`, collecting items in response order.
    ///
    /// Stops when a response has no cursor, hands back a cursor this listing
    /// already followed, or points at a URL outside `base_url`. A failed page
    /// fails the whole listing.
    async fn paginate<L>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Vec<L::Item>>
    where
        L: Paginated + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut cursor: Option<Cursor> = None;
        let mut followed: HashSet<Cursor> = HashSet::new();

        loop {
            let page: L = match self.fetch_page(path, query, cursor.as_ref()).await {
                Ok(page) => page,
                Err(err) => {
                    if !items.is_empty() {
                        log::warn!(
                            "Discarding {} item(s) already fetched from {path}",
                            items.len()
                        );
                    }
                    return Err(err);
                }
            };

            let (page_items, pages) = page.into_parts();
            items.extend(page_items);

            let Some(next) = next_cursor(pages.as_ref(), cursor.as_ref()) else {
                break;
            };

            if let Cursor::Url(url) = &next {
                if !self.same_origin(url) {
                    log::warn!("Not following next page {url}: outside {}", self.base_url);
                    break;
                }
            }

            if !followed.insert(next.clone()) {
                log::warn!("Cursor {next:?} for {path} was already followed, stopping");
                break;
            }

            cursor = Some(next);
        }

        Ok(items)
    }

    /// Whether `url` has the same scheme, host and port as `base_url`
    fn same_origin(&self, url: &str) -> bool {
        match (Url::parse(&self.base_url), Url::parse(url)) {
            (Ok(base), Ok(other)) => base.origin() == other.origin(),
            _ => false,
        }
    }

    async fn fetch_page<L: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        cursor: Option<&Cursor>,
    ) -> ApiResult<L> {
        match cursor {
            None => self.get(path, query).await,
            Some(Cursor::Url(url)) => self.send::<L, ()>(Method::GET, url, &[], None).await,
            Some(Cursor::StartingAfter(after)) => {
                let mut query = query.to_vec();
                query.push(("starting_after", after.clone()));
                self.get(path, &query).await
            }
        }
    }
}

/// Read policy: a failed read is logged and replaced by an empty result.
///
/// Every lenient read goes through here; call the matching `try_*` operation to
/// get the error instead.
pub fn read_or_default<T: Default>(operation: &str, result: ApiResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::error!("Error {operation}: {err}");
            T::default()
        }
    }
}

/// Write policy: a failed write is logged and handed back to the caller.
pub fn log_write_failure<T>(operation: &str, result: ApiResult<T>) -> ApiResult<T> {
    result.inspect_err(|err| log::error!("Error {operation}: {err}"))
}
