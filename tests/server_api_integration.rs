//! HTTP-level tests: the full router over a seeded catalog, exercised with
//! in-process requests.

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use petxref::{CatalogStore, InMemoryBackend};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

fn demo_app(config: ServerConfig) -> Router {
    let store = CatalogStore::with_backend(Box::new(InMemoryBackend::with_data(
        petxref::demo_snapshot(),
    )));
    let state = ServerState::with_store(config, Arc::new(store));
    build_router(Arc::new(state))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn compare_raw_over_http() {
    let request = post_json(
        "/compare",
        json!({"product_tokens": ["acme-adult-chicken", "bluff-puppy-harvest"]}),
    );
    let (status, body) = send(demo_app(ServerConfig::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_count"], 2);
    assert_eq!(body["products"][0]["slug"], "acme-adult-chicken");
    assert_eq!(body["products"][0]["token"], "acme-adult-chicken");
    // No line is shared verbatim: "Brewers Rice" vs "Rice".
    assert_eq!(body["in_all"].as_array().unwrap().len(), 0);
    assert_eq!(body["in_some"].as_array().unwrap().len(), 6);
    assert_eq!(body["in_some"][0]["in_count"], 1);
    assert_eq!(body["in_some"][0]["percent"], 0.5);
    assert_eq!(body["notes"]["mode"], "raw");
    assert_eq!(body["notes"]["normalization"], "trim+lower+collapse_spaces");
    assert_eq!(body["notes"]["trace_included"], false);
}

#[tokio::test]
async fn compare_canonical_over_http() {
    let request = post_json(
        "/compare",
        json!({
            "product_tokens": ["acme-adult-chicken", "bluff-puppy-harvest"],
            "mode": "canonical"
        }),
    );
    let (status, body) = send(demo_app(ServerConfig::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    // The contains rules fold "Chicken"/"Chicken Meal" and
    // "Brewers Rice"/"Rice" together.
    let shared: Vec<&str> = body["in_all"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["ingredient"].as_str().unwrap())
        .collect();
    assert_eq!(shared, vec!["Chicken", "Rice"]);

    let partial: Vec<&str> = body["in_some"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["ingredient"].as_str().unwrap())
        .collect();
    assert_eq!(partial, vec!["(unmapped) Corn", "(unmapped) Peas"]);
    assert_eq!(body["in_some"][1]["ingredient_key"], "unmapped:peas");
}

#[tokio::test]
async fn compare_validation_failures_are_bad_requests() {
    let (status, body) = send(
        demo_app(ServerConfig::default()),
        post_json("/compare", json!({"product_tokens": ["acme-adult-chicken"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("at least 2"));
    assert!(body["error"]["request_id"].is_string());

    let (status, body) = send(
        demo_app(ServerConfig::default()),
        post_json(
            "/compare",
            json!({"product_tokens": ["a", "b"], "mode": "fuzzy"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "mode must be one of: raw, canonical"
    );

    let (status, body) = send(
        demo_app(ServerConfig::default()),
        post_json(
            "/compare",
            json!({"product_tokens": ["acme-adult-chicken", "no-such-food"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "At least 2 valid products are required"
    );
}

#[tokio::test]
async fn malformed_compare_body_is_a_bad_request() {
    let request = Request::post("/compare")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(demo_app(ServerConfig::default()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn catalog_listing_detail_and_search() {
    let (status, body) = send(
        demo_app(ServerConfig::default()),
        Request::get("/catalog/products").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["brand"]["slug"], "acme");

    let (status, body) = send(
        demo_app(ServerConfig::default()),
        Request::get("/catalog/products/acme-adult-chicken")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Adult Chicken & Rice");
    assert_eq!(body["ingredient_list"]["version"], 1);
    assert_eq!(
        body["ingredient_list"]["items"][0]["raw_text"],
        "Chicken"
    );

    let (status, body) = send(
        demo_app(ServerConfig::default()),
        Request::get("/catalog/products/not-a-product")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = send(
        demo_app(ServerConfig::default()),
        post_json("/catalog/search", json!({"life_stage": "puppy"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "bluff-puppy-harvest");
}

#[tokio::test]
async fn meta_symptoms_are_served() {
    let (status, body) = send(
        demo_app(ServerConfig::default()),
        Request::get("/meta/symptoms").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["items"].as_array().unwrap().is_empty());
    assert!(body["items"][0]["code"].is_string());
}

#[tokio::test]
async fn admin_backfill_resolves_unmapped_items() {
    let config = ServerConfig {
        admin_key: Some("local-admin-key".to_string()),
        ..ServerConfig::default()
    };
    let app = demo_app(config);

    let request = Request::post("/admin/backfill")
        .header("x-admin-key", "local-admin-key")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    // Chicken, Brewers Rice, Chicken Meal, and Rice resolve; Peas and Corn
    // have no rule yet.
    assert_eq!(body["scanned"], 6);
    assert_eq!(body["backfilled"], 4);
}

#[tokio::test]
async fn server_state_builds_from_a_snapshot_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    let json = serde_json::to_string(&petxref::demo_snapshot()).expect("serialize snapshot");
    file.write_all(json.as_bytes()).expect("write snapshot");

    let config = ServerConfig {
        snapshot_path: Some(file.path().to_string_lossy().to_string()),
        ..ServerConfig::default()
    };
    let state = ServerState::new(config).expect("state builds from snapshot");
    let app = build_router(Arc::new(state));

    let request = post_json(
        "/compare",
        json!({
            "product_tokens": ["acme-adult-chicken", "bluff-puppy-harvest"],
            "mode": "canonical"
        }),
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_count"], 2);
}
