use thiserror::Error;

/// Errors from a single upstream fetch.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status from a strict fetch. Carries a truncated body excerpt
    /// so operators can tell "article not found" from "upstream outage".
    #[error("unexpected HTTP status {status} from {url}: {body_excerpt}")]
    Status {
        url: String,
        status: u16,
        body_excerpt: String,
    },

    /// A 2xx body that could not be parsed as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The buying-options resource was requested without a configured client id.
    #[error("no upstream client id configured")]
    MissingClientId,
}

/// Fatal failure of a whole lookup.
///
/// Store-closed and soft buying-options failures are not errors; they are
/// recorded on the returned record instead.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("upstream failure {status} from {url}: {body_excerpt}")]
    Upstream {
        url: String,
        status: u16,
        body_excerpt: String,
    },

    #[error("transport failure: {0}")]
    Transport(UpstreamError),
}

impl From<UpstreamError> for LookupError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status {
                url,
                status,
                body_excerpt,
            } => LookupError::Upstream {
                url,
                status,
                body_excerpt,
            },
            other => LookupError::Transport(other),
        }
    }
}

impl LookupError {
    /// Upstream HTTP status for this failure, when one exists.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            LookupError::Upstream { status, .. } => Some(*status),
            LookupError::Transport(_) => None,
        }
    }
}
