//! PetXref Server - HTTP REST API for the product catalog
//!
//! This binary serves the catalog read models and the ingredient
//! comparison engine over REST.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
