//! Concurrent fan-out and reconciliation into one normalized record.
//!
//! For every fact available from both the market-wide details resource and
//! the store-specific scan resource, the store-specific value wins when
//! present — the caller is looking at one physical store. Candidate field
//! paths are a snapshot of the current upstream schemas, not a contract;
//! extending a list is a one-line change when the schemas drift.

use std::sync::Arc;

use serde_json::Value;
use shelfwatch_core::strip_tags;

use crate::buying::summarize;
use crate::client::{excerpt, FetchOutcome, UpstreamClient};
use crate::error::{LookupError, UpstreamError};
use crate::extract::{extract_f64, extract_str, extract_u64};
use crate::quantity::resolve_quantity;
use crate::types::{
    Buying, Location, NormalizedRecord, Price, Prices, ProductFacts, Stock,
};
use crate::urls::UpstreamUrls;

/// Fixed explanation attached to records for a closed store.
const STORE_CLOSED_MESSAGE: &str =
    "Store is closed for the day; store-specific price, stock and location are temporarily unavailable.";

const SCAN_TITLE: &[&str] = &["presentationSection.productCard.product.title"];
const DETAILS_TITLE: &[&str] = &["product.title"];
const DETAILS_DESCRIPTION: &[&str] = &["product.description", "product.typeName"];
const DETAILS_PRODUCT_URL: &[&str] = &["product.productUrl"];
const DETAILS_IMAGE_URL: &[&str] = &["product.images.0.imageUrl", "product.images.0.url"];
const DETAILS_PRICE_RAW: &[&str] = &["product.pricePackage.includingVat.rawPrice"];
const DETAILS_PRICE_TEXT: &[&str] = &["product.pricePackage.includingVat.sellingPrice"];
const SCAN_PRICE_RAW: &[&str] = &[
    "presentationSection.productCard.product.pricePackage.includingVat.rawPrice",
    "buyingDecisionSection.price.rawPrice",
];
const SCAN_PRICE_TEXT: &[&str] = &[
    "presentationSection.productCard.product.pricePackage.includingVat.sellingPrice",
    "buyingDecisionSection.price.sellingPrice",
];
const AVAIL_STATUS_CODE: &[&str] = &["0.status.code", "0.availability.status.code"];
const AVAIL_STATUS_DESCRIPTION: &[&str] =
    &["0.status.description", "0.availability.status.description"];
const SCAN_DIVISION: &[&str] = &[
    "presentationSection.productCard.salesLocation.divisionName",
    "presentationSection.productCard.salesLocation.division",
];
const SCAN_DEPARTMENT: &[&str] = &[
    "presentationSection.productCard.salesLocation.departmentName",
    "presentationSection.productCard.salesLocation.department",
];
const SCAN_LOCATION_CODE: &[&str] = &["presentationSection.productCard.salesLocation.code"];
const SCAN_ITEM_LOCATION_TEXT: &[&str] =
    &["presentationSection.productCard.salesLocation.itemLocationText"];
const SCAN_MAX_ORDER_QTY: &[&str] = &[
    "presentationSection.productCard.stockInfo.maxOrderQuantity",
    "buyingInstructionSection.maxOrderQuantity",
];

/// Orchestrates the upstream fetches for one lookup and reconciles the
/// results. Built once at startup and shared by all requests.
pub struct MergeEngine {
    client: Arc<UpstreamClient>,
    urls: UpstreamUrls,
}

impl MergeEngine {
    #[must_use]
    pub fn new(client: Arc<UpstreamClient>, urls: UpstreamUrls) -> Self {
        Self { client, urls }
    }

    /// Looks up one (article, store, market, lang) key and merges the
    /// upstream resources into a [`NormalizedRecord`].
    ///
    /// The details and availability resources are fatal on failure; the scan
    /// resource tolerates exactly the store-closed condition (HTTP 503 with
    /// a `STORE_CLOSED` marker); the buying-options resource degrades the
    /// record on failure instead of failing the lookup.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] carrying the failing resource's URL, status,
    /// and a body excerpt on any non-recoverable upstream failure. The
    /// store-closed condition never produces an error.
    pub async fn lookup(
        &self,
        article: &str,
        store: &str,
        market: &str,
        lang: &str,
    ) -> Result<NormalizedRecord, LookupError> {
        let details_url = self.urls.product_details(market, lang, article);
        let scan_url = self.urls.store_scan(market, lang, store, article);
        let availability_url = self.urls.availability(market, store, article);
        let buying_url = if self.client.has_client_id() {
            self.urls.buying_options(market, store, article)
        } else {
            None
        };

        let (details, scan, availability, buying) = tokio::join!(
            self.client.fetch_strict(&details_url),
            self.client.fetch_tolerant(&scan_url),
            self.client.fetch_strict(&availability_url),
            fetch_buying(&self.client, buying_url.as_deref()),
        );

        let details = details?;
        let availability = availability?;
        let (scan_payload, store_closed) = classify_scan(&scan_url, scan?)?;
        let scan_payload = scan_payload.as_ref();

        let product = ProductFacts {
            title: prefer_store(scan_payload, SCAN_TITLE, &details, DETAILS_TITLE),
            description: extract_str(&details, DETAILS_DESCRIPTION),
            product_url: extract_str(&details, DETAILS_PRODUCT_URL),
            image_url: extract_str(&details, DETAILS_IMAGE_URL),
        };

        let prices = Prices {
            online: Price {
                raw: extract_f64(&details, DETAILS_PRICE_RAW),
                text: extract_str(&details, DETAILS_PRICE_TEXT),
            },
            store: Price {
                raw: scan_payload.and_then(|p| extract_f64(p, SCAN_PRICE_RAW)),
                text: scan_payload.and_then(|p| extract_str(p, SCAN_PRICE_TEXT)),
            },
        };

        let stock = build_stock(&availability, scan_payload);

        let item_location_text = scan_payload.and_then(|p| extract_str(p, SCAN_ITEM_LOCATION_TEXT));
        let location = Location {
            division: scan_payload.and_then(|p| extract_str(p, SCAN_DIVISION)),
            department: scan_payload.and_then(|p| extract_str(p, SCAN_DEPARTMENT)),
            code: scan_payload.and_then(|p| extract_str(p, SCAN_LOCATION_CODE)),
            item_location_text_plain: item_location_text.as_deref().map(strip_tags),
            item_location_text,
        };

        let buying = match buying {
            None => Buying::default(),
            Some(Ok(data)) => Buying {
                summary: summarize(&data, article, store),
                error: None,
            },
            Some(Err(err)) => {
                tracing::warn!(article, store, error = %err, "buying-options fetch failed; degrading record");
                Buying {
                    summary: None,
                    error: Some(err.to_string()),
                }
            }
        };

        Ok(NormalizedRecord {
            article: article.to_owned(),
            market: market.to_owned(),
            lang: lang.to_owned(),
            store: store.to_owned(),
            store_closed,
            store_closed_message: store_closed.then(|| STORE_CLOSED_MESSAGE.to_owned()),
            product,
            prices,
            stock,
            location,
            buying,
        })
    }
}

async fn fetch_buying(
    client: &UpstreamClient,
    url: Option<&str>,
) -> Option<Result<Value, UpstreamError>> {
    match url {
        Some(url) => Some(client.fetch_authenticated(url).await),
        None => None,
    }
}

/// Classifies the scan outcome: a 503 whose body carries a `STORE_CLOSED`
/// marker (typed or literal, or the `End of day` phrasing) means the store
/// is in its end-of-day close — non-fatal, with store-specific fields
/// unavailable. Any other non-2xx outcome is fatal.
fn classify_scan(
    url: &str,
    outcome: FetchOutcome,
) -> Result<(Option<Value>, bool), LookupError> {
    match outcome {
        FetchOutcome::Success { data, .. } => {
            if data.is_null() {
                Ok((None, false))
            } else {
                Ok((Some(data), false))
            }
        }
        FetchOutcome::Failure { status, data, text } => {
            if status == 503 && is_store_closed_body(data.as_ref(), &text) {
                tracing::info!(url, "scan resource reports store closed");
                Ok((None, true))
            } else {
                Err(LookupError::Upstream {
                    url: url.to_owned(),
                    status,
                    body_excerpt: excerpt(&text),
                })
            }
        }
    }
}

fn is_store_closed_body(data: Option<&Value>, text: &str) -> bool {
    let typed_marker = data
        .and_then(|d| d.get("type"))
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("STORE_CLOSED"));
    typed_marker || text.contains("STORE_CLOSED") || text.contains("End of day")
}

fn build_stock(availability: &Value, scan_payload: Option<&Value>) -> Stock {
    let status = extract_str(availability, AVAIL_STATUS_CODE);
    let description = extract_str(availability, AVAIL_STATUS_DESCRIPTION);
    let description_text = description.as_deref().map(strip_tags);

    let mut qty = resolve_quantity(description_text.as_deref()).or_else(|| {
        scan_payload
            .and_then(|p| extract_u64(p, SCAN_MAX_ORDER_QTY))
            .and_then(|n| u32::try_from(n).ok())
    });

    // Status is authoritative over possibly-stale quantity hints.
    let out_of_stock = description_text
        .as_deref()
        .is_some_and(|t| t.to_ascii_lowercase().contains("out of stock"))
        || status
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("OUT_OF_STOCK"));
    if out_of_stock {
        qty = Some(0);
    }

    Stock {
        qty,
        status,
        description,
        description_text,
    }
}

fn prefer_store(
    scan_payload: Option<&Value>,
    scan_paths: &[&str],
    details: &Value,
    details_paths: &[&str],
) -> Option<String> {
    scan_payload
        .and_then(|p| extract_str(p, scan_paths))
        .or_else(|| extract_str(details, details_paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_closed_typed_body_classifies_non_fatal() {
        let outcome = FetchOutcome::Failure {
            status: 503,
            data: Some(json!({"type": "store_closed"})),
            text: String::new(),
        };
        let (payload, closed) = classify_scan("http://u", outcome).expect("non-fatal");
        assert!(closed);
        assert!(payload.is_none());
    }

    #[test]
    fn store_closed_literal_marker_classifies_non_fatal() {
        let outcome = FetchOutcome::Failure {
            status: 503,
            data: None,
            text: "<html>End of day processing</html>".to_owned(),
        };
        let (_, closed) = classify_scan("http://u", outcome).expect("non-fatal");
        assert!(closed);
    }

    #[test]
    fn unrelated_503_is_fatal() {
        let outcome = FetchOutcome::Failure {
            status: 503,
            data: Some(json!({"type": "MAINTENANCE"})),
            text: "maintenance window".to_owned(),
        };
        let err = classify_scan("http://u", outcome).expect_err("fatal");
        assert!(matches!(
            err,
            LookupError::Upstream { status: 503, .. }
        ));
    }

    #[test]
    fn non_503_failure_is_fatal_even_with_marker() {
        let outcome = FetchOutcome::Failure {
            status: 500,
            data: None,
            text: "STORE_CLOSED".to_owned(),
        };
        let err = classify_scan("http://u", outcome).expect_err("fatal");
        assert!(matches!(
            err,
            LookupError::Upstream { status: 500, .. }
        ));
    }

    #[test]
    fn stock_resolves_quantity_from_description() {
        let availability = json!([
            { "status": { "code": "IN_STOCK", "description": "There are <b>145</b> in stock" } }
        ]);
        let stock = build_stock(&availability, None);
        assert_eq!(stock.qty, Some(145));
        assert_eq!(
            stock.description_text.as_deref(),
            Some("There are 145 in stock")
        );
    }

    #[test]
    fn stock_falls_back_to_max_order_quantity() {
        let availability = json!([
            { "status": { "code": "IN_STOCK", "description": "Available in self-serve" } }
        ]);
        let scan = json!({
            "presentationSection": { "productCard": { "stockInfo": { "maxOrderQuantity": 6 } } }
        });
        let stock = build_stock(&availability, Some(&scan));
        assert_eq!(stock.qty, Some(6));
    }

    #[test]
    fn out_of_stock_status_forces_zero() {
        let availability = json!([
            { "status": { "code": "OUT_OF_STOCK", "description": "Out of stock at this store" } }
        ]);
        let scan = json!({
            "presentationSection": { "productCard": { "stockInfo": { "maxOrderQuantity": 6 } } }
        });
        let stock = build_stock(&availability, Some(&scan));
        assert_eq!(stock.qty, Some(0));
    }

    #[test]
    fn nested_availability_shape_is_recognized() {
        let availability = json!([
            { "availability": { "status": { "code": "LOW_IN_STOCK", "description": "2 left" } } }
        ]);
        let stock = build_stock(&availability, None);
        assert_eq!(stock.status.as_deref(), Some("LOW_IN_STOCK"));
        assert_eq!(stock.qty, Some(2));
    }
}
