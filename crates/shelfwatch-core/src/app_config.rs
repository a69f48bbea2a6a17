use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the retail API (product details + in-store scan resources).
    pub retail_api_base: String,
    /// Base URL of the store availability API.
    pub availability_api_base: String,
    /// Base URL of the buying-options API; `None` disables that resource.
    pub buying_api_base: Option<String>,
    /// Base URL of the public store pages (scraped for opening hours).
    pub store_pages_base: String,
    /// Client identity sent to the buying-options API; `None` disables it.
    pub upstream_client_id: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub html_cache_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("retail_api_base", &self.retail_api_base)
            .field("availability_api_base", &self.availability_api_base)
            .field("buying_api_base", &self.buying_api_base)
            .field("store_pages_base", &self.store_pages_base)
            .field(
                "upstream_client_id",
                &self.upstream_client_id.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("cache_capacity", &self.cache_capacity)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("html_cache_ttl_secs", &self.html_cache_ttl_secs)
            .finish()
    }
}
