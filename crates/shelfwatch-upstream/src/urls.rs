//! Deterministic derivation of upstream resource URLs.
//!
//! Each resource has a fixed template over (article, store, market, lang);
//! the derived URL doubles as the cache key for that resource.

/// Base URLs for the upstream systems, fixed at startup from config.
#[derive(Debug, Clone)]
pub struct UpstreamUrls {
    retail_base: String,
    availability_base: String,
    buying_base: Option<String>,
}

impl UpstreamUrls {
    #[must_use]
    pub fn new(
        retail_base: &str,
        availability_base: &str,
        buying_base: Option<&str>,
    ) -> Self {
        Self {
            retail_base: retail_base.trim_end_matches('/').to_owned(),
            availability_base: availability_base.trim_end_matches('/').to_owned(),
            buying_base: buying_base.map(|b| b.trim_end_matches('/').to_owned()),
        }
    }

    /// Market-wide product-details resource.
    #[must_use]
    pub fn product_details(&self, market: &str, lang: &str, article: &str) -> String {
        format!(
            "{}/{market}/{lang}/articles/{article}/details",
            self.retail_base
        )
    }

    /// Store-specific in-aisle scan resource.
    #[must_use]
    pub fn store_scan(&self, market: &str, lang: &str, store: &str, article: &str) -> String {
        format!(
            "{}/{market}/{lang}/stores/{store}/scan/{article}",
            self.retail_base
        )
    }

    /// Store-specific availability resource.
    #[must_use]
    pub fn availability(&self, market: &str, store: &str, article: &str) -> String {
        format!(
            "{}/{market}/stores/{store}/articles/{article}",
            self.availability_base
        )
    }

    /// Cross-market buying-options resource; `None` when not configured.
    #[must_use]
    pub fn buying_options(&self, market: &str, store: &str, article: &str) -> Option<String> {
        self.buying_base.as_ref().map(|base| {
            format!("{base}/availabilities/{market}?itemNos={article}&stores={store}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> UpstreamUrls {
        UpstreamUrls::new(
            "https://retail.example.test/api/",
            "https://avail.example.test",
            Some("https://buy.example.test/"),
        )
    }

    #[test]
    fn product_details_url() {
        assert_eq!(
            urls().product_details("se", "sv", "40299687"),
            "https://retail.example.test/api/se/sv/articles/40299687/details"
        );
    }

    #[test]
    fn store_scan_url() {
        assert_eq!(
            urls().store_scan("se", "sv", "445", "40299687"),
            "https://retail.example.test/api/se/sv/stores/445/scan/40299687"
        );
    }

    #[test]
    fn availability_url() {
        assert_eq!(
            urls().availability("se", "445", "40299687"),
            "https://avail.example.test/se/stores/445/articles/40299687"
        );
    }

    #[test]
    fn buying_options_url_when_configured() {
        assert_eq!(
            urls().buying_options("se", "445", "40299687").as_deref(),
            Some("https://buy.example.test/availabilities/se?itemNos=40299687&stores=445")
        );
    }

    #[test]
    fn buying_options_absent_without_base() {
        let urls = UpstreamUrls::new("https://r.test", "https://a.test", None);
        assert!(urls.buying_options("se", "445", "40299687").is_none());
    }
}
