//! End-to-end merge tests: one wiremock server plays all upstream systems.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shelfwatch_cache::TtlCache;
use shelfwatch_upstream::{LookupError, MergeEngine, UpstreamClient, UpstreamUrls};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = "40299687";
const STORE: &str = "445";
const MARKET: &str = "se";
const LANG: &str = "sv";

fn engine(server: &MockServer, with_buying: bool) -> MergeEngine {
    let cache = Arc::new(TtlCache::new(500, Duration::from_secs(60)));
    let client_id = with_buying.then_some("test-client-id");
    let client = Arc::new(
        UpstreamClient::new(
            5,
            "shelfwatch-test/0.1",
            client_id,
            cache,
            Duration::from_secs(3600),
        )
        .expect("client construction should not fail"),
    );
    let uri = server.uri();
    let urls = UpstreamUrls::new(&uri, &uri, with_buying.then_some(uri.as_str()));
    MergeEngine::new(client, urls)
}

fn details_body() -> serde_json::Value {
    json!({
        "product": {
            "title": "KALLAX",
            "description": "Shelving unit, white",
            "productUrl": "https://www.example.test/p/40299687",
            "images": [ { "imageUrl": "https://img.example.test/kallax.jpg" } ],
            "pricePackage": {
                "includingVat": { "rawPrice": 899.0, "sellingPrice": "899 kr" }
            }
        }
    })
}

fn availability_body(description: &str, code: &str) -> serde_json::Value {
    json!([
        { "status": { "code": code, "description": description } }
    ])
}

fn scan_body(title: serde_json::Value) -> serde_json::Value {
    json!({
        "presentationSection": {
            "productCard": {
                "product": {
                    "title": title,
                    "pricePackage": {
                        "includingVat": { "rawPrice": 879.0, "sellingPrice": "879 kr" }
                    }
                },
                "salesLocation": {
                    "divisionName": "Self-serve",
                    "departmentName": "Living room",
                    "code": "23-11",
                    "itemLocationText": "Aisle <b>23</b>, section <b>11</b>"
                },
                "stockInfo": { "maxOrderQuantity": 6 }
            }
        }
    })
}

async fn mount_details(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/{MARKET}/{LANG}/articles/{ARTICLE}/details")))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_body()))
        .mount(server)
        .await;
}

async fn mount_availability(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{MARKET}/stores/{STORE}/articles/{ARTICLE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_scan(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/{MARKET}/{LANG}/stores/{STORE}/scan/{ARTICLE}"
        )))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn store_specific_title_wins_over_market_wide() {
    let server = MockServer::start().await;
    mount_details(&server).await;
    mount_availability(&server, availability_body("There are 145 in stock", "IN_STOCK")).await;
    mount_scan(
        &server,
        ResponseTemplate::new(200).set_body_json(scan_body(json!("KALLAX 4x2"))),
    )
    .await;

    let record = engine(&server, false)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect("lookup should succeed");

    assert_eq!(record.product.title.as_deref(), Some("KALLAX 4x2"));
    assert_eq!(record.prices.online.raw, Some(899.0));
    assert_eq!(record.prices.store.raw, Some(879.0));
    assert_eq!(record.stock.qty, Some(145));
    assert_eq!(record.location.division.as_deref(), Some("Self-serve"));
    assert_eq!(
        record.location.item_location_text_plain.as_deref(),
        Some("Aisle 23, section 11")
    );
    assert!(!record.store_closed);
    assert!(record.store_closed_message.is_none());
}

#[tokio::test]
async fn null_store_title_falls_back_to_market_wide() {
    let server = MockServer::start().await;
    mount_details(&server).await;
    mount_availability(&server, availability_body("In stock: 12", "IN_STOCK")).await;
    mount_scan(
        &server,
        ResponseTemplate::new(200).set_body_json(scan_body(json!(null))),
    )
    .await;

    let record = engine(&server, false)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect("lookup should succeed");

    assert_eq!(record.product.title.as_deref(), Some("KALLAX"));
}

#[tokio::test]
async fn store_closed_503_returns_degraded_record() {
    let server = MockServer::start().await;
    mount_details(&server).await;
    mount_availability(&server, availability_body("There are 145 in stock", "IN_STOCK")).await;
    mount_scan(
        &server,
        ResponseTemplate::new(503).set_body_json(json!({"type": "STORE_CLOSED"})),
    )
    .await;

    let record = engine(&server, false)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect("store-closed must not fail the lookup");

    assert!(record.store_closed);
    assert!(record.store_closed_message.is_some());
    assert!(record.prices.store.raw.is_none());
    assert!(record.location.division.is_none());
    // Market-wide facts survive the closed store.
    assert_eq!(record.product.title.as_deref(), Some("KALLAX"));
    assert_eq!(record.prices.online.raw, Some(899.0));
}

#[tokio::test]
async fn scan_503_with_unrelated_body_is_fatal() {
    let server = MockServer::start().await;
    mount_details(&server).await;
    mount_availability(&server, availability_body("There are 145 in stock", "IN_STOCK")).await;
    mount_scan(
        &server,
        ResponseTemplate::new(503).set_body_string("upstream maintenance"),
    )
    .await;

    let err = engine(&server, false)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect_err("unrelated 503 must be fatal");

    match err {
        LookupError::Upstream {
            status,
            body_excerpt,
            ..
        } => {
            assert_eq!(status, 503);
            assert!(body_excerpt.contains("maintenance"));
        }
        other => panic!("expected Upstream error, got: {other:?}"),
    }
}

#[tokio::test]
async fn details_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{MARKET}/{LANG}/articles/{ARTICLE}/details")))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such article"))
        .mount(&server)
        .await;
    mount_availability(&server, availability_body("There are 145 in stock", "IN_STOCK")).await;
    mount_scan(
        &server,
        ResponseTemplate::new(200).set_body_json(scan_body(json!("KALLAX"))),
    )
    .await;

    let err = engine(&server, false)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect_err("details failure must be fatal");
    assert_eq!(err.upstream_status(), Some(404));
}

#[tokio::test]
async fn out_of_stock_status_forces_zero_quantity() {
    let server = MockServer::start().await;
    mount_details(&server).await;
    mount_availability(
        &server,
        availability_body("Out of stock at this store", "OUT_OF_STOCK"),
    )
    .await;
    mount_scan(
        &server,
        ResponseTemplate::new(200).set_body_json(scan_body(json!("KALLAX"))),
    )
    .await;

    let record = engine(&server, false)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect("lookup should succeed");

    // maxOrderQuantity 6 is available from the scan, but status wins.
    assert_eq!(record.stock.qty, Some(0));
}

#[tokio::test]
async fn buying_options_failure_degrades_record_only() {
    let server = MockServer::start().await;
    mount_details(&server).await;
    mount_availability(&server, availability_body("There are 145 in stock", "IN_STOCK")).await;
    mount_scan(
        &server,
        ResponseTemplate::new(200).set_body_json(scan_body(json!("KALLAX"))),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("/availabilities/{MARKET}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("buying upstream down"))
        .mount(&server)
        .await;

    let record = engine(&server, true)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect("soft buying failure must not fail the lookup");

    assert!(record.buying.summary.is_none());
    assert!(record.buying.error.is_some());
    assert_eq!(record.stock.qty, Some(145));
}

#[tokio::test]
async fn buying_options_success_is_summarized() {
    let server = MockServer::start().await;
    mount_details(&server).await;
    mount_availability(&server, availability_body("There are 145 in stock", "IN_STOCK")).await;
    mount_scan(
        &server,
        ResponseTemplate::new(200).set_body_json(scan_body(json!("KALLAX"))),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("/availabilities/{MARKET}")))
        .and(query_param("itemNos", ARTICLE))
        .and(query_param("stores", STORE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "availabilities": [
                {
                    "itemNo": ARTICLE,
                    "classUnitCode": STORE,
                    "buyingOptions": {
                        "cashCarry": {
                            "availability": {
                                "probability": { "thisDay": { "messageType": "HIGH_IN_STOCK" } }
                            }
                        }
                    }
                }
            ]
        })))
        .mount(&server)
        .await;

    let record = engine(&server, true)
        .lookup(ARTICLE, STORE, MARKET, LANG)
        .await
        .expect("lookup should succeed");

    let summary = record.buying.summary.expect("summary present");
    assert_eq!(summary.channels.len(), 1);
    assert_eq!(summary.channels[0].channel, "cash-and-carry");
    assert_eq!(
        summary.channels[0].range.as_deref(),
        Some("HIGH_IN_STOCK")
    );
    assert!(record.buying.error.is_none());
}
