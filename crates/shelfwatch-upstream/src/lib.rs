//! Upstream fetch, extraction, and merge pipeline.
//!
//! One lookup for an (article, store, market, lang) key fans out to the
//! retailer's product-details, in-store scan, availability, and (optionally)
//! buying-options resources, reconciles the results, and produces a single
//! [`NormalizedRecord`]. Responses are cached through a shared
//! [`shelfwatch_cache::TtlCache`] to bound upstream request volume.

mod buying;
mod client;
mod error;
mod extract;
mod hours;
mod merge;
mod quantity;
mod types;
mod urls;

pub use client::{FetchOutcome, UpstreamClient};
pub use error::{LookupError, UpstreamError};
pub use extract::{extract, extract_f64, extract_str, extract_u64, pluck};
pub use hours::store_hours;
pub use merge::MergeEngine;
pub use quantity::resolve_quantity;
pub use types::{
    Buying, BuyingSummary, ChannelAvailability, HoursEntry, Location, NormalizedRecord, Price,
    Prices, ProductFacts, Stock, StoreHours,
};
pub use urls::UpstreamUrls;
