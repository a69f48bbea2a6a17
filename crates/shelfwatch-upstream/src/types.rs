//! The normalized record produced by one lookup.

use serde::Serialize;

/// Final output entity for one (article, store, market, lang) lookup.
///
/// Created fresh per request; it has no persistent identity and lives for
/// one request/response cycle.
///
/// When `store_closed` is true, `prices.store` and `stock.qty` may be null
/// or stale — callers must check the flag before reading an absent store
/// price as "genuinely out of stock".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub article: String,
    pub market: String,
    pub lang: String,
    pub store: String,
    pub store_closed: bool,
    pub store_closed_message: Option<String>,
    pub product: ProductFacts,
    pub prices: Prices,
    pub stock: Stock,
    pub location: Location,
    pub buying: Buying,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFacts {
    pub title: Option<String>,
    pub description: Option<String>,
    pub product_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prices {
    pub online: Price,
    pub store: Price,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub raw: Option<f64>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// Always a non-negative integer when present.
    pub qty: Option<u32>,
    pub status: Option<String>,
    pub description: Option<String>,
    /// Markup-stripped form of `description`.
    pub description_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub division: Option<String>,
    pub department: Option<String>,
    pub code: Option<String>,
    pub item_location_text: Option<String>,
    pub item_location_text_plain: Option<String>,
}

/// Buying-options data is optional: its upstream failing degrades the
/// record (`summary: null` plus an error string) rather than the request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Buying {
    pub summary: Option<BuyingSummary>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyingSummary {
    pub channels: Vec<ChannelAvailability>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAvailability {
    pub channel: String,
    pub range: Option<String>,
    pub restock_date: Option<String>,
}

/// Opening hours scraped from a store's public page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHours {
    pub hours: Vec<HoursEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursEntry {
    pub days: String,
    pub hours: String,
}
