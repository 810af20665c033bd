//! Examples for using the PetXref Server API
//!
//! Start the server first (`cargo run -p petxref-server`), ideally with
//! `PETXREF_SNAPSHOT_PATH` pointing at a catalog snapshot and
//! `PETXREF_ADMIN_KEY` set so the admin example succeeds.

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:8080";
const ADMIN_KEY: &str = "local-admin-key";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: List products
    println!("2. List Products:");
    let resp = client
        .get(format!("{SERVER_URL}/catalog/products"))
        .query(&[("limit", "10")])
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Product detail by slug
    println!("3. Product Detail:");
    let resp = client
        .get(format!("{SERVER_URL}/catalog/products/acme-adult-chicken-rice"))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 4: Search for dry dog food without a specific canonical id
    println!("4. Catalog Search:");
    let resp = client
        .post(format!("{SERVER_URL}/catalog/search"))
        .json(&json!({
            "species": "dog",
            "format": "dry",
            "exclude_canonical_ids": [],
            "limit": 10
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: Raw-mode comparison
    println!("5. Compare (raw mode):");
    let resp = client
        .post(format!("{SERVER_URL}/compare"))
        .json(&json!({
            "product_tokens": ["acme-adult-chicken-rice", "bluff-puppy-chicken-meal"],
            "mode": "raw"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 6: Canonical-mode comparison including trace lines
    println!("6. Compare (canonical mode):");
    let resp = client
        .post(format!("{SERVER_URL}/compare"))
        .json(&json!({
            "product_tokens": [
                "acme-adult-chicken-rice",
                "bluff-puppy-chicken-meal",
                "acme-kitten-salmon-pate"
            ],
            "mode": "canonical",
            "include_trace": true
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 7: Symptom metadata
    println!("7. Symptom Metadata:");
    let resp = client
        .get(format!("{SERVER_URL}/meta/symptoms"))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 8: Canonical-id backfill (admin)
    println!("8. Admin Backfill:");
    let resp = client
        .post(format!("{SERVER_URL}/admin/backfill"))
        .header("x-admin-key", ADMIN_KEY)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 9: Metrics
    println!("9. Prometheus Metrics:");
    let resp = client.get(format!("{SERVER_URL}/metrics")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("All examples completed!");
    Ok(())
}
