//! Store opening hours scraped from the public store page.
//!
//! Lower-priority collaborator: the page is HTML, fetched through the
//! long-TTL `html:` cache namespace, and the hours table is pulled out with
//! regexes rather than a full DOM parse.

use std::sync::OnceLock;

use regex::Regex;
use shelfwatch_core::strip_tags;

use crate::client::UpstreamClient;
use crate::error::UpstreamError;
use crate::types::{HoursEntry, StoreHours};

fn row_patterns() -> &'static Vec<Regex> {
    static ROWS: OnceLock<Vec<Regex>> = OnceLock::new();
    ROWS.get_or_init(|| {
        [
            // <tr><td>Mon - Fri</td><td>10:00 - 21:00</td></tr>
            r"(?is)<tr[^>]*>\s*<t[dh][^>]*>(.*?)</t[dh]>\s*<t[dh][^>]*>(.*?)</t[dh]>",
            // <dt>Saturday</dt><dd>10:00 - 18:00</dd>
            r"(?is)<dt[^>]*>(.*?)</dt>\s*<dd[^>]*>(.*?)</dd>",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid hours row pattern"))
        .collect()
    })
}

fn time_pattern() -> &'static Regex {
    static TIME: OnceLock<Regex> = OnceLock::new();
    TIME.get_or_init(|| Regex::new(r"(?i)\d{1,2}[:.]\d{2}|closed").expect("valid time pattern"))
}

/// Fetches and parses the opening hours for one store page slug.
///
/// # Errors
///
/// Returns [`UpstreamError`] when the page cannot be fetched; a page with
/// no recognizable hours table parses to an empty list, not an error.
pub async fn store_hours(
    client: &UpstreamClient,
    store_pages_base: &str,
    slug: &str,
) -> Result<StoreHours, UpstreamError> {
    let url = format!("{}/{slug}", store_pages_base.trim_end_matches('/'));
    let html = client.fetch_text(&url).await?;
    Ok(parse_store_hours(&html))
}

fn parse_store_hours(html: &str) -> StoreHours {
    let mut hours = Vec::new();
    for pattern in row_patterns() {
        for caps in pattern.captures_iter(html) {
            let days = strip_tags(&caps[1]).trim().to_owned();
            let times = strip_tags(&caps[2]).trim().to_owned();
            // Header rows and unrelated two-cell tables carry no time-like text.
            if days.is_empty() || !time_pattern().is_match(&times) {
                continue;
            }
            hours.push(HoursEntry { days, hours: times });
        }
        if !hours.is_empty() {
            break;
        }
    }
    StoreHours { hours }
}
