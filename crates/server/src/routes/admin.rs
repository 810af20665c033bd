use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Resolve canonical ids for every unmapped ingredient item.
///
/// `POST /admin/backfill` (admin-key gated). Loads the rule set through
/// the engine's cache and writes resolved ids back to the store. The only
/// mutation path in the service.
pub async fn run_backfill(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let report = state.engine.backfill()?;

    Ok(Json(json!({
        "ok": true,
        "scanned": report.scanned,
        "backfilled": report.updated,
    })))
}
