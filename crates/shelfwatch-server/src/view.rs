//! Plain server-rendered HTML view of a normalized record.
//!
//! External change-monitoring tools poll this page, so the markup stays
//! minimal and stable: no scripts, no styling beyond class names, every
//! fact in its own labelled element.

use axum::{
    extract::{Path, State},
    response::Html,
    Extension,
};
use shelfwatch_upstream::NormalizedRecord;

use crate::api::{map_lookup_error, ApiError, AppState};
use crate::middleware::RequestId;

pub(crate) async fn stock_view(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((market, lang, article, store)): Path<(String, String, String, String)>,
) -> Result<Html<String>, ApiError> {
    let record = state
        .engine
        .lookup(&article, &store, &market, &lang)
        .await
        .map_err(|e| map_lookup_error(req_id.0, &e))?;

    Ok(Html(render_record(&record)))
}

fn render_record(record: &NormalizedRecord) -> String {
    let title = record.product.title.as_deref().unwrap_or("(unknown product)");
    let mut out = String::with_capacity(1024);

    out.push_str("<!doctype html>\n<html lang=\"");
    out.push_str(&escape(&record.lang));
    out.push_str("\">\n<head><meta charset=\"utf-8\"><title>");
    out.push_str(&escape(title));
    out.push_str(" at store ");
    out.push_str(&escape(&record.store));
    out.push_str("</title></head>\n<body>\n");

    out.push_str("<h1 class=\"title\">");
    out.push_str(&escape(title));
    out.push_str("</h1>\n");

    if let Some(description) = &record.product.description {
        push_field(&mut out, "description", description);
    }
    if let Some(text) = &record.prices.online.text {
        push_field(&mut out, "price-online", text);
    }

    if record.store_closed {
        let message = record.store_closed_message.as_deref().unwrap_or_default();
        out.push_str("<p class=\"store-closed\">");
        out.push_str(&escape(message));
        out.push_str("</p>\n");
    } else {
        if let Some(text) = &record.prices.store.text {
            push_field(&mut out, "price-store", text);
        }
        match record.stock.qty {
            Some(qty) => push_field(&mut out, "stock-qty", &qty.to_string()),
            None => push_field(&mut out, "stock-qty", "unknown"),
        }
        if let Some(text) = &record.stock.description_text {
            push_field(&mut out, "stock-description", text);
        }
        if let Some(text) = &record.location.item_location_text_plain {
            push_field(&mut out, "location", text);
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn push_field(out: &mut String, class: &str, value: &str) {
    out.push_str("<p class=\"");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(&escape(value));
    out.push_str("</p>\n");
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_upstream::{
        Buying, Location, Price, Prices, ProductFacts, Stock,
    };

    fn record(store_closed: bool) -> NormalizedRecord {
        NormalizedRecord {
            article: "40299687".to_owned(),
            market: "se".to_owned(),
            lang: "sv".to_owned(),
            store: "445".to_owned(),
            store_closed,
            store_closed_message: store_closed.then(|| "Store is closed for the day.".to_owned()),
            product: ProductFacts {
                title: Some("KALLAX <new>".to_owned()),
                description: Some("Shelving unit".to_owned()),
                product_url: None,
                image_url: None,
            },
            prices: Prices {
                online: Price {
                    raw: Some(899.0),
                    text: Some("899 kr".to_owned()),
                },
                store: Price {
                    raw: if store_closed { None } else { Some(879.0) },
                    text: if store_closed {
                        None
                    } else {
                        Some("879 kr".to_owned())
                    },
                },
            },
            stock: Stock {
                qty: if store_closed { None } else { Some(145) },
                status: Some("IN_STOCK".to_owned()),
                description: Some("There are <b>145</b> in stock".to_owned()),
                description_text: Some("There are 145 in stock".to_owned()),
            },
            location: Location {
                division: None,
                department: None,
                code: None,
                item_location_text: None,
                item_location_text_plain: Some("Aisle 23, section 11".to_owned()),
            },
            buying: Buying::default(),
        }
    }

    #[test]
    fn renders_stock_figures_for_open_store() {
        let html = render_record(&record(false));
        assert!(html.contains(r#"<p class="stock-qty">145</p>"#));
        assert!(html.contains(r#"<p class="price-store">879 kr</p>"#));
        assert!(html.contains(r#"<p class="location">Aisle 23, section 11</p>"#));
        assert!(!html.contains("store-closed"));
    }

    #[test]
    fn renders_closed_message_instead_of_stock() {
        let html = render_record(&record(true));
        assert!(html.contains(r#"<p class="store-closed">Store is closed for the day.</p>"#));
        assert!(!html.contains("stock-qty"));
        assert!(!html.contains("price-store"));
    }

    #[test]
    fn escapes_markup_in_upstream_values() {
        let html = render_record(&record(false));
        assert!(html.contains("KALLAX &lt;new&gt;"));
        assert!(!html.contains("<new>"));
    }
}
