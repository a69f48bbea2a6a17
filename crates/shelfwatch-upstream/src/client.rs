//! Cache-first HTTP retrieval of upstream resources.
//!
//! Two retrieval modes share the cache-hit path: [`UpstreamClient::fetch_strict`]
//! fails on any non-2xx status, while [`UpstreamClient::fetch_tolerant`] folds
//! the status into a [`FetchOutcome`] so callers can classify failures
//! themselves (the in-store scan resource legitimately returns 503 while a
//! store runs its end-of-day close).

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use shelfwatch_cache::TtlCache;

use crate::error::UpstreamError;

/// Outcome of a tolerant fetch. Produced once per call and consumed
/// immediately by the merge engine; never cached or persisted.
#[derive(Debug)]
pub enum FetchOutcome {
    Success {
        status: u16,
        data: Value,
    },
    Failure {
        status: u16,
        data: Option<Value>,
        text: String,
    },
}

/// HTTP client for the retailer's internal resources.
///
/// Owns the `reqwest::Client` and a handle to the process-wide response
/// cache. Cache keys are the request URL prefixed by a namespace (`json:`,
/// `auth:`, `html:`) so distinct upstream systems that coincidentally share
/// a URL string never collide.
pub struct UpstreamClient {
    client: Client,
    cache: Arc<TtlCache>,
    /// TTL for scraped HTML; store pages change on the order of hours.
    html_ttl: Duration,
    client_id: Option<String>,
}

impl UpstreamClient {
    /// Creates a client with configured timeout and `User-Agent`.
    ///
    /// `client_id` is the identity header value for the buying-options
    /// upstream; `None` makes [`UpstreamClient::fetch_authenticated`] fail
    /// with [`UpstreamError::MissingClientId`].
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        client_id: Option<&str>,
        cache: Arc<TtlCache>,
        html_ttl: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            cache,
            html_ttl,
            client_id: client_id.map(ToOwned::to_owned),
        })
    }

    #[must_use]
    pub fn has_client_id(&self) -> bool {
        self.client_id.is_some()
    }

    /// Fetches a JSON resource, failing on any non-2xx status.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Status`] — non-2xx response, with a ≤400-char body excerpt.
    /// - [`UpstreamError::Deserialize`] — 2xx body that is not valid JSON.
    /// - [`UpstreamError::Http`] — network failure or timeout.
    pub async fn fetch_strict(&self, url: &str) -> Result<Value, UpstreamError> {
        self.fetch_json(url, "json:", false).await
    }

    /// Like [`UpstreamClient::fetch_strict`] but sends the client-identity
    /// header required by the buying-options upstream, and namespaces its
    /// cache entries separately.
    ///
    /// # Errors
    ///
    /// As [`UpstreamClient::fetch_strict`], plus
    /// [`UpstreamError::MissingClientId`] when no client id is configured.
    pub async fn fetch_authenticated(&self, url: &str) -> Result<Value, UpstreamError> {
        if self.client_id.is_none() {
            return Err(UpstreamError::MissingClientId);
        }
        self.fetch_json(url, "auth:", true).await
    }

    async fn fetch_json(
        &self,
        url: &str,
        namespace: &str,
        authenticated: bool,
    ) -> Result<Value, UpstreamError> {
        let key = format!("{namespace}{url}");
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(url, "upstream cache hit");
            return Ok(hit);
        }

        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if authenticated {
            if let Some(id) = &self.client_id {
                request = request.header("x-client-id", id);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
                body_excerpt: excerpt(&body),
            });
        }

        let data: Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
                context: url.to_owned(),
                source: e,
            })?;
        self.cache.set(&key, data.clone());
        Ok(data)
    }

    /// Fetches a JSON resource, returning a [`FetchOutcome`] instead of
    /// failing on non-2xx statuses.
    ///
    /// Only a 2xx outcome with decoded, non-null data is cached — a transient
    /// error body must never be served for a URL that may legitimately
    /// succeed seconds later.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] only on transport failure (connect
    /// error, timeout); HTTP statuses never produce an error here.
    pub async fn fetch_tolerant(&self, url: &str) -> Result<FetchOutcome, UpstreamError> {
        let key = format!("json:{url}");
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(url, "upstream cache hit");
            return Ok(FetchOutcome::Success {
                status: 200,
                data: hit,
            });
        }

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        // Some upstreams mislabel Content-Type, so the body is parsed as
        // JSON regardless of what the header declares.
        let data = serde_json::from_str::<Value>(&text)
            .ok()
            .filter(|v| !v.is_null());

        if (200..300).contains(&status) {
            match data {
                Some(data) => {
                    self.cache.set(&key, data.clone());
                    Ok(FetchOutcome::Success { status, data })
                }
                None => Ok(FetchOutcome::Success {
                    status,
                    data: Value::Null,
                }),
            }
        } else {
            Ok(FetchOutcome::Failure { status, data, text })
        }
    }

    /// Fetches a raw HTML body for scraping, cached under the long-lived
    /// `html:` namespace.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Status`] — non-2xx response.
    /// - [`UpstreamError::Http`] — network failure or timeout.
    pub async fn fetch_text(&self, url: &str) -> Result<String, UpstreamError> {
        let key = format!("html:{url}");
        if let Some(Value::String(hit)) = self.cache.get(&key) {
            tracing::debug!(url, "html cache hit");
            return Ok(hit);
        }

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
                body_excerpt: excerpt(&body),
            });
        }

        self.cache
            .set_with_ttl(&key, Value::String(body.clone()), self.html_ttl);
        Ok(body)
    }
}

/// Truncates a response body to a diagnostics-sized excerpt, snapping to a
/// valid UTF-8 char boundary.
pub(crate) fn excerpt(body: &str) -> String {
    const MAX_EXCERPT_BYTES: usize = 400;
    if body.len() <= MAX_EXCERPT_BYTES {
        return body.to_owned();
    }
    let mut end = MAX_EXCERPT_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_passes_short_bodies_through() {
        assert_eq!(excerpt("oops"), "oops");
    }

    #[test]
    fn excerpt_truncates_to_400_bytes() {
        let body = "x".repeat(1000);
        assert_eq!(excerpt(&body).len(), 400);
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        // 399 ASCII bytes then a 3-byte char straddling the 400-byte mark.
        let body = format!("{}€€€", "x".repeat(399));
        let e = excerpt(&body);
        assert_eq!(e.len(), 399);
        assert!(e.chars().all(|c| c == 'x'));
    }
}
