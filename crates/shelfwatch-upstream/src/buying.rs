//! Per-channel summary of the cross-market buying-options payload.

use serde_json::Value;

use crate::extract::{extract_str, pluck};
use crate::types::{BuyingSummary, ChannelAvailability};

/// Channel keys as they appear in the payload, with the names surfaced on
/// the record.
const CHANNELS: &[(&str, &str)] = &[
    ("cashCarry", "cash-and-carry"),
    ("clickCollect", "click-and-collect"),
    ("homeDelivery", "home-delivery"),
];

const RANGE_PATHS: &[&str] = &[
    "availability.probability.thisDay.messageType",
    "availability.range",
];
const RESTOCK_PATHS: &[&str] = &[
    "restocks.0.earliestDate",
    "availability.restocks.0.earliestDate",
];

/// Summarizes the `availabilities` entry matching this article (and, when
/// the entry is store-scoped, this store). Returns `None` when no matching
/// entry or no recognizable channel data exists.
#[must_use]
pub(crate) fn summarize(data: &Value, article: &str, store: &str) -> Option<BuyingSummary> {
    let entries = data.get("availabilities")?.as_array()?;
    let entry = entries.iter().find(|e| {
        extract_str(e, &["itemNo"]).is_some_and(|n| n == article)
            && extract_str(e, &["classUnitCode"]).is_none_or(|c| c == store)
    })?;

    let mut channels = Vec::new();
    for (key, name) in CHANNELS {
        let Some(option) = pluck(entry, &format!("buyingOptions.{key}")) else {
            continue;
        };
        channels.push(ChannelAvailability {
            channel: (*name).to_owned(),
            range: extract_str(option, RANGE_PATHS),
            restock_date: extract_str(option, RESTOCK_PATHS),
        });
    }

    if channels.is_empty() {
        None
    } else {
        Some(BuyingSummary { channels })
    }
}
